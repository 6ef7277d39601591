//! Internal domain types shared by the remote artwork sources.
//!
//! Source clients convert their wire DTOs into [`crate::model::CoverImage`]
//! and report failures as [`EnrichmentError`]. The cover resolver treats every
//! one of these as "no artwork from this source".

/// Errors that can occur while talking to a remote metadata or artwork source
#[derive(Debug, Clone, thiserror::Error)]
pub enum EnrichmentError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("HTTP {status}: {reason}")]
    Http { status: u16, reason: String },

    #[error("Failed to parse response: {0}")]
    Parse(String),

    #[error("No matches found")]
    NoMatches,

    #[error("Failed to read tags from {0}: {1}")]
    Tags(String, String),
}

impl EnrichmentError {
    /// Map a non-success HTTP status. 404 means the source simply has nothing.
    pub fn from_status(status: reqwest::StatusCode) -> Self {
        if status == reqwest::StatusCode::NOT_FOUND {
            return Self::NoMatches;
        }
        Self::Http {
            status: status.as_u16(),
            reason: status.canonical_reason().unwrap_or("Unknown").to_string(),
        }
    }
}

impl From<reqwest::Error> for EnrichmentError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            Self::Parse(e.to_string())
        } else {
            Self::Network(e.to_string())
        }
    }
}
