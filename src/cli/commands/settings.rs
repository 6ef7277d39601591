//! Configuration display and editing commands.

use std::path::Path;

use crate::config::{self, Config};
use crate::cover::CoverSettings;

/// Cover settings that can be toggled from the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum CoverSetting {
    /// Fetch missing covers during normal scans
    AutoLoadCovers,
    /// Show static covers instead of animated ones
    DisableAnimatedCovers,
}

/// Print the effective configuration
pub fn cmd_config_show(config: &Config) -> anyhow::Result<()> {
    print!("{}", toml::to_string_pretty(config)?);
    Ok(())
}

/// Print where the config file lives
pub fn cmd_config_path() -> anyhow::Result<()> {
    match config::config_path() {
        Some(path) => {
            let state = if path.exists() { "exists" } else { "not created yet" };
            println!("{} ({})", path.display(), state);
        }
        None => println!("No config directory on this platform"),
    }
    Ok(())
}

/// Change one cover setting and save the config file at `path`
pub fn cmd_config_set(mut config: Config, path: &Path, setting: CoverSetting, value: bool) -> anyhow::Result<()> {
    let settings = apply_setting(&mut config, setting, value);
    config::save_to(&config, path)?;

    println!(
        "auto_load_covers = {}, disable_animated_covers = {}",
        settings.auto_load_covers, settings.disable_animated_covers
    );
    if setting == CoverSetting::AutoLoadCovers && value {
        println!("Run `music-shelf scan` to fetch covers that are still missing.");
    }
    Ok(())
}

fn apply_setting(config: &mut Config, setting: CoverSetting, value: bool) -> CoverSettings {
    match setting {
        CoverSetting::AutoLoadCovers => config.covers.auto_load_covers = value,
        CoverSetting::DisableAnimatedCovers => config.covers.disable_animated_covers = value,
    }
    config.covers.settings()
}
