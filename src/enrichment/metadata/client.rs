//! HTTP client for the library server's per-file metadata endpoint.

use super::dto;
use crate::enrichment::domain::EnrichmentError;
use crate::model::CoverImage;

/// The server only ever embeds JPEG thumbnails.
const EMBEDDED_MIME: &str = "image/jpeg";

/// Library server metadata client
pub struct MetadataClient {
    http_client: reqwest::Client,
    base_url: String,
}

impl MetadataClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http_client: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Fetch parsed tag data for one file
    pub async fn file_metadata(
        &self,
        filename: &str,
    ) -> Result<dto::FileMetadataResponse, EnrichmentError> {
        let response = self
            .http_client
            .get(self.metadata_url(filename))
            .header("Accept", "application/json")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(EnrichmentError::from_status(status));
        }

        Ok(response.json::<dto::FileMetadataResponse>().await?)
    }

    /// Embedded artwork of a file as an inline image
    pub async fn embedded_artwork(
        &self,
        filename: &str,
    ) -> Result<Option<CoverImage>, EnrichmentError> {
        let metadata = self.file_metadata(filename).await?;
        Ok(metadata
            .cover
            .filter(|data| !data.is_empty())
            .map(|base64| CoverImage::Inline {
                mime_type: EMBEDDED_MIME.to_string(),
                base64,
            }))
    }

    fn metadata_url(&self, filename: &str) -> String {
        format!("{}/api/metadata/{}", self.base_url, urlencoding::encode(filename))
    }
}
