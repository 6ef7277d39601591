//! iTunes Search API Data Transfer Objects
//!
//! API Reference: https://performance-partners.apple.com/search-api
//!
//! Only the fields the artwork lookup needs are modeled; everything else in
//! the response is ignored.

use serde::{Deserialize, Serialize};

/// Search response envelope
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResponse {
    /// Number of results returned
    #[serde(default)]
    pub result_count: u32,
    /// Matching collections/tracks
    #[serde(default)]
    pub results: Vec<SearchResult>,
}

/// A single album (collection) or track result
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResult {
    pub wrapper_type: Option<String>,
    pub artist_name: Option<String>,
    pub collection_name: Option<String>,
    /// 100px artwork URL; larger sizes are obtained by rewriting the size segment
    pub artwork_url100: Option<String>,
    pub artwork_url60: Option<String>,
}

impl SearchResult {
    /// Best available artwork URL in this result.
    pub fn artwork_url(&self) -> Option<&str> {
        [self.artwork_url100.as_deref(), self.artwork_url60.as_deref()]
            .into_iter()
            .flatten()
            .find(|url| !url.is_empty())
    }
}
