//! iTunes Search HTTP client
//!
//! Looks up album artwork by artist and album name, then downloads the image
//! and inlines it as a base64 data URI.
//!
//! API: https://itunes.apple.com/search

use super::dto;
use crate::enrichment::domain::EnrichmentError;
use crate::model::CoverImage;

/// Pixel size requested for downloaded artwork
pub const ARTWORK_SIZE: u32 = 600;

/// iTunes Search API client
pub struct ITunesClient {
    http_client: reqwest::Client,
    base_url: String,
}

impl ITunesClient {
    /// Create a new client
    pub fn new() -> Self {
        Self::with_base_url("https://itunes.apple.com")
    }

    /// Create a client against a custom base URL (mirrors, tests)
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            http_client: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Search for an album and return the URL of its artwork, if any
    pub async fn find_artwork_url(
        &self,
        artist: &str,
        album: &str,
    ) -> Result<Option<String>, EnrichmentError> {
        let url = self.search_url(artist, album);

        let response = self
            .http_client
            .get(&url)
            .header("Accept", "application/json")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(EnrichmentError::from_status(status));
        }

        let body = response.json::<dto::SearchResponse>().await?;

        Ok(body
            .results
            .iter()
            .find_map(|r| r.artwork_url())
            .map(upscale_artwork_url))
    }

    /// Download an image and convert it into an inline, offline-capable cover
    pub async fn download_as_persistable(&self, url: &str) -> Result<CoverImage, EnrichmentError> {
        let response = self.http_client.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(EnrichmentError::from_status(status));
        }

        let mime_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("image/jpeg")
            .to_string();

        let data = response.bytes().await?;
        if data.is_empty() {
            return Err(EnrichmentError::NoMatches);
        }

        Ok(CoverImage::from_bytes(mime_type, &data))
    }

    fn search_url(&self, artist: &str, album: &str) -> String {
        let term = format!("{} {}", artist.trim(), album.trim());
        format!(
            "{}/search?term={}&media=music&entity=album&limit=1",
            self.base_url,
            urlencoding::encode(&term)
        )
    }
}

impl Default for ITunesClient {
    fn default() -> Self {
        Self::new()
    }
}

/// Rewrite a thumbnail URL (`.../100x100bb.jpg`) to the size we store.
fn upscale_artwork_url(url: &str) -> String {
    let target = format!("{0}x{0}bb", ARTWORK_SIZE);
    url.replace("100x100bb", &target).replace("60x60bb", &target)
}
