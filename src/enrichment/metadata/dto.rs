//! Wire types of `GET /api/metadata/:filename`.

use serde::{Deserialize, Serialize};

/// Tag data parsed server-side from one audio file
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct FileMetadataResponse {
    pub title: Option<String>,
    pub artist: Option<String>,
    pub album: Option<String>,
    /// Duration in seconds
    pub duration: Option<f64>,
    /// First embedded picture, base64 without a data URI prefix
    pub cover: Option<String>,
}
