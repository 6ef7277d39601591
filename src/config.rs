//! Configuration system using TOML files.
//!
//! Config is stored in the OS-standard config directory:
//! - Windows: %APPDATA%\music-shelf\config.toml
//! - macOS: ~/Library/Application Support/music-shelf/config.toml
//! - Linux: ~/.config/music-shelf/config.toml
//!
//! Every section is `#[serde(default)]`, so a partial file only overrides
//! what it names.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::cover::{CoverCache, CoverSettings};

/// Application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Library server connection
    pub server: ServerConfig,

    /// Cover pipeline settings
    pub covers: CoversConfig,
}

/// Library server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Base URL of the library server
    pub base_url: String,

    /// Budget for one library load, in milliseconds
    pub timeout_ms: u64,
}

impl ServerConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:3001".to_string(),
            timeout_ms: 1500,
        }
    }
}

/// Cover art settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CoversConfig {
    /// Fetch missing covers from the network during normal scans
    pub auto_load_covers: bool,

    /// Prefer static covers over animated ones
    pub disable_animated_covers: bool,

    /// Cache database location (empty = OS cache directory)
    pub cache_path: Option<PathBuf>,

    /// Artwork search service
    pub artwork_search_url: String,

    /// Read embedded covers from this directory instead of asking the server
    pub local_music_dir: Option<PathBuf>,
}

impl CoversConfig {
    /// Pipeline settings derived from this section.
    pub fn settings(&self) -> CoverSettings {
        CoverSettings {
            auto_load_covers: self.auto_load_covers,
            disable_animated_covers: self.disable_animated_covers,
        }
    }

    /// Where the cover cache lives.
    pub fn cache_path(&self) -> PathBuf {
        self.cache_path.clone().unwrap_or_else(CoverCache::default_path)
    }
}

impl Default for CoversConfig {
    fn default() -> Self {
        Self {
            auto_load_covers: true,
            disable_animated_covers: false,
            cache_path: None,
            artwork_search_url: "https://itunes.apple.com".to_string(),
            local_music_dir: None,
        }
    }
}

// ============================================================================
// Config File Operations
// ============================================================================

/// Get the config directory path
pub fn config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("music-shelf"))
}

/// Get the full path to the config file
pub fn config_path() -> Option<PathBuf> {
    config_dir().map(|d| d.join("config.toml"))
}

/// Load configuration from disk
///
/// Returns default config if file doesn't exist or can't be parsed.
/// Logs warnings but doesn't fail - we always return a usable config.
pub fn load() -> Config {
    let Some(path) = config_path() else {
        tracing::warn!("Could not determine config directory, using defaults");
        return Config::default();
    };
    load_from(&path)
}

/// Load configuration from a specific file, with the same fallbacks as [`load`].
pub fn load_from(path: &Path) -> Config {
    if !path.exists() {
        tracing::info!("No config file found at {:?}, using defaults", path);
        return Config::default();
    }

    match std::fs::read_to_string(path) {
        Ok(contents) => match toml::from_str(&contents) {
            Ok(config) => {
                tracing::info!("Loaded config from {:?}", path);
                config
            }
            Err(e) => {
                tracing::error!("Failed to parse config file {:?}: {}", path, e);
                tracing::warn!("Using default configuration");
                Config::default()
            }
        },
        Err(e) => {
            tracing::error!("Failed to read config file {:?}: {}", path, e);
            Config::default()
        }
    }
}

/// Save configuration to `path`
///
/// Creates the parent directory if it doesn't exist.
pub fn save_to(config: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir).map_err(|e| ConfigError::CreateDir(dir.to_path_buf(), e))?;
    }

    let contents = toml::to_string_pretty(config).map_err(ConfigError::Serialize)?;

    // Write atomically (write to temp, then rename)
    let temp_path = path.with_extension("toml.tmp");
    std::fs::write(&temp_path, &contents).map_err(|e| ConfigError::Write(temp_path.clone(), e))?;
    std::fs::rename(&temp_path, path)
        .map_err(|e| ConfigError::Rename(temp_path, path.to_path_buf(), e))?;

    tracing::info!("Saved config to {:?}", path);
    Ok(())
}

// ============================================================================
// Error Types
// ============================================================================

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Could not determine config directory")]
    NoConfigDir,

    #[error("Failed to create config directory {0}: {1}")]
    CreateDir(PathBuf, std::io::Error),

    #[error("Failed to serialize config: {0}")]
    Serialize(toml::ser::Error),

    #[error("Failed to write config to {0}: {1}")]
    Write(PathBuf, std::io::Error),

    #[error("Failed to rename temp file {0} to {1}: {2}")]
    Rename(PathBuf, PathBuf, std::io::Error),
}

// ============================================================================
// Tests
// ============================================================================
