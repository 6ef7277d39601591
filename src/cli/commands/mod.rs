//! CLI command definitions and dispatch.
//!
//! Each subcommand is implemented in its own submodule:
//! - `covers`: Library cover scan and key inspection
//! - `cache`: Cover cache maintenance
//! - `play`: Now-playing session with on-demand cover loading
//! - `lyrics`: LRC parsing
//! - `settings`: Configuration display and editing

mod cache;
mod covers;
mod lyrics;
mod play;
mod settings;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::runtime::Runtime;

use crate::config::{self, Config, ConfigError};
use crate::cover::{CoverCache, CoverPipeline, CoverResolver, LocalTagLookup};
use crate::enrichment::{ITunesClient, MetadataClient, MetadataLookup};
use crate::library::LibraryState;

pub use cache::{cmd_cache_clear, cmd_cache_forget, cmd_cache_stats};
pub use covers::{cmd_key, cmd_scan};
pub use lyrics::cmd_lyrics;
pub use play::cmd_play;
pub use settings::{CoverSetting, cmd_config_path, cmd_config_set, cmd_config_show};

/// Music Shelf CLI
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand)]
pub enum Commands {
    /// Load the library and fill in missing cover art
    Scan {
        /// Re-check songs that already have a cover
        #[arg(short, long)]
        force: bool,
        /// Library server base URL (overrides config)
        #[arg(long, env = "MUSIC_SHELF_SERVER")]
        server: Option<String>,
        /// Read embedded covers from this local directory
        #[arg(long)]
        music_dir: Option<PathBuf>,
    },
    /// Play a song: load the library, select it and fetch its cover first
    Play {
        filename: String,
        /// Show the static cover even when an animated one exists
        #[arg(long)]
        static_covers: bool,
        /// Library server base URL (overrides config)
        #[arg(long, env = "MUSIC_SHELF_SERVER")]
        server: Option<String>,
        /// Read embedded covers from this local directory
        #[arg(long)]
        music_dir: Option<PathBuf>,
    },
    /// Print the cover cache key for a song
    Key {
        artist: String,
        album: String,
        filename: String,
    },
    /// Inspect or clear the cover cache
    Cache {
        #[command(subcommand)]
        action: CacheAction,
    },
    /// Parse an LRC lyrics file and print its timed lines
    Lyrics {
        /// Path to the .lrc file
        path: PathBuf,
    },
    /// Show configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Cover cache subcommands
#[derive(Subcommand)]
pub enum CacheAction {
    /// Show entry count and size
    Stats,
    /// Delete every cached cover
    Clear,
    /// Drop the cached cover of a song's album (or of the song itself)
    Forget {
        filename: String,
        /// Library server base URL (overrides config)
        #[arg(long, env = "MUSIC_SHELF_SERVER")]
        server: Option<String>,
    },
}

/// Configuration subcommands
#[derive(Subcommand)]
pub enum ConfigAction {
    /// Print the effective configuration as TOML
    Show,
    /// Print the config file location
    Path,
    /// Change a cover setting and save it
    Set {
        setting: CoverSetting,
        #[arg(action = clap::ArgAction::Set)]
        value: bool,
    },
}

/// Run the specified CLI command.
pub fn run_command(cli: &Cli) -> anyhow::Result<()> {
    let config = crate::config::load();

    match &cli.command {
        Commands::Scan {
            force,
            server,
            music_dir,
        } => {
            let rt = Runtime::new()?;
            let config = with_overrides(config, server.as_deref(), music_dir.as_ref());
            cmd_scan(&rt, &config, *force)
        }
        Commands::Play {
            filename,
            static_covers,
            server,
            music_dir,
        } => {
            let rt = Runtime::new()?;
            let config = with_overrides(config, server.as_deref(), music_dir.as_ref());
            cmd_play(&rt, &config, filename, *static_covers)
        }
        Commands::Key {
            artist,
            album,
            filename,
        } => cmd_key(artist, album, filename),
        Commands::Cache { action } => {
            let rt = Runtime::new()?;
            match action {
                CacheAction::Stats => cmd_cache_stats(&rt, &config),
                CacheAction::Clear => cmd_cache_clear(&rt, &config),
                CacheAction::Forget { filename, server } => {
                    let config = with_overrides(config, server.as_deref(), None);
                    cmd_cache_forget(&rt, &config, filename)
                }
            }
        }
        Commands::Lyrics { path } => cmd_lyrics(path),
        Commands::Config { action } => match action {
            ConfigAction::Show => cmd_config_show(&config),
            ConfigAction::Path => cmd_config_path(),
            ConfigAction::Set { setting, value } => {
                let path = config::config_path().ok_or(ConfigError::NoConfigDir)?;
                cmd_config_set(config, &path, *setting, *value)
            }
        },
    }
}

// ============================================================================
// Shared helper functions
// ============================================================================

/// Apply command-line overrides on top of the loaded config.
fn with_overrides(mut config: Config, server: Option<&str>, music_dir: Option<&PathBuf>) -> Config {
    if let Some(server) = server {
        config.server.base_url = server.to_string();
    }
    if let Some(dir) = music_dir {
        config.covers.local_music_dir = Some(dir.clone());
    }
    config
}

/// Wire up a cover pipeline from the config.
///
/// The cache degrades to all-network mode if its database can't be opened.
pub(crate) async fn build_pipeline(config: &Config) -> Arc<CoverPipeline> {
    let cache = CoverCache::open_or_unavailable(&config.covers.cache_path()).await;

    let metadata: Arc<dyn MetadataLookup> = match &config.covers.local_music_dir {
        Some(dir) => Arc::new(LocalTagLookup::new(dir)),
        None => Arc::new(MetadataClient::new(&config.server.base_url)),
    };
    let search = Arc::new(ITunesClient::with_base_url(&config.covers.artwork_search_url));

    Arc::new(CoverPipeline::new(
        Arc::new(LibraryState::new()),
        Arc::new(cache),
        CoverResolver::new(metadata, search),
        config.covers.settings(),
    ))
}
