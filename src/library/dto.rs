//! Wire types of the library server's registry files.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

/// One row of `GET /api/all-metadata`
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RegistryEntry {
    pub filename: String,
    pub title: Option<String>,
    pub artist: Option<String>,
    pub album: Option<String>,
    /// Duration in seconds
    pub duration: Option<f64>,
}

/// Manual override from `custom_metadata.json`
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct CustomMetadata {
    pub title: Option<String>,
    pub artist: Option<String>,
    pub album: Option<String>,
}

/// `custom_metadata.json`: filename → override, in a stable order
pub type CustomMetadataFile = BTreeMap<String, CustomMetadata>;

/// `custom_covers.json` / `animated_covers.json`:
/// `track:<filename>` or `album:<artist>|<album>` → asset path or URL
pub type CoverRegistryFile = HashMap<String, String>;

/// `album_orders.json`: album name → ordered filenames
pub type AlbumOrdersFile = HashMap<String, Vec<String>>;

/// `lyrics_registry.json`: filename → raw lyrics (string or array of lines)
pub type LyricsRegistryFile = HashMap<String, serde_json::Value>;
