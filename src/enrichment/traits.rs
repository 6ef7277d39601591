//! Trait definitions for the external artwork sources.
//!
//! These traits enable dependency injection and mocking for tests.
//! Production code uses the real client implementations, while tests
//! can substitute mock implementations.
//!
//! # Example
//!
//! ```ignore
//! use music_shelf::enrichment::traits::ArtworkSearch;
//!
//! async fn lookup<T: ArtworkSearch>(search: &T) -> Option<String> {
//!     search.find_artwork_url("SZA", "SOS").await.ok().flatten()
//! }
//! ```

use async_trait::async_trait;

use super::domain::EnrichmentError;
use crate::model::CoverImage;

/// Per-file embedded artwork lookup.
#[async_trait]
pub trait MetadataLookup: Send + Sync {
    /// Artwork embedded in the tags of `filename`, if any.
    async fn embedded_artwork(&self, filename: &str) -> Result<Option<CoverImage>, EnrichmentError>;
}

/// Third-party artwork search by artist/album.
#[async_trait]
pub trait ArtworkSearch: Send + Sync {
    /// URL of the best matching artwork, if any.
    async fn find_artwork_url(
        &self,
        artist: &str,
        album: &str,
    ) -> Result<Option<String>, EnrichmentError>;

    /// Download `url` into a form that can be cached and shown offline.
    async fn download_as_persistable(&self, url: &str) -> Result<CoverImage, EnrichmentError>;
}

// Implement traits for real clients

#[async_trait]
impl MetadataLookup for super::metadata::MetadataClient {
    async fn embedded_artwork(&self, filename: &str) -> Result<Option<CoverImage>, EnrichmentError> {
        self.embedded_artwork(filename).await
    }
}

#[async_trait]
impl ArtworkSearch for super::itunes::ITunesClient {
    async fn find_artwork_url(
        &self,
        artist: &str,
        album: &str,
    ) -> Result<Option<String>, EnrichmentError> {
        self.find_artwork_url(artist, album).await
    }

    async fn download_as_persistable(&self, url: &str) -> Result<CoverImage, EnrichmentError> {
        self.download_as_persistable(url).await
    }
}

/// Mock sources for testing.
///
/// Both mocks write into a shared [`mocks::CallLog`] so tests can assert on
/// call order and on how many lookups were running at once.
#[cfg(test)]
pub mod mocks {
    use super::*;
    use parking_lot::Mutex;
    use std::collections::HashMap;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    /// Shared record of source calls.
    #[derive(Default)]
    pub struct CallLog {
        calls: Mutex<Vec<String>>,
        active: AtomicUsize,
        max_active: AtomicUsize,
    }

    impl CallLog {
        pub fn new() -> Arc<Self> {
            Arc::new(Self::default())
        }

        /// Every call so far, e.g. `"embedded:a.mp3"` or `"search:SZA|SOS"`.
        pub fn calls(&self) -> Vec<String> {
            self.calls.lock().clone()
        }

        /// Calls whose label starts with `prefix`.
        pub fn calls_with(&self, prefix: &str) -> Vec<String> {
            self.calls().into_iter().filter(|c| c.starts_with(prefix)).collect()
        }

        /// Highest number of calls observed running at the same time.
        pub fn max_concurrent(&self) -> usize {
            self.max_active.load(Ordering::SeqCst)
        }

        async fn record(&self, label: String, delay: Duration) {
            self.calls.lock().push(label);
            let now = self.active.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_active.fetch_max(now, Ordering::SeqCst);
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            self.active.fetch_sub(1, Ordering::SeqCst);
        }
    }

    /// Mock embedded-artwork lookup.
    pub struct MockMetadata {
        /// Artwork per filename; anything missing has none
        pub covers: HashMap<String, CoverImage>,
        /// Error to return for every lookup (takes precedence)
        pub error: Option<EnrichmentError>,
        pub delay: Duration,
        pub log: Arc<CallLog>,
    }

    impl MockMetadata {
        /// A lookup that never finds embedded artwork.
        pub fn empty(log: Arc<CallLog>) -> Self {
            Self {
                covers: HashMap::new(),
                error: None,
                delay: Duration::ZERO,
                log,
            }
        }

        /// A lookup that fails for every file.
        pub fn failing(log: Arc<CallLog>) -> Self {
            Self {
                error: Some(EnrichmentError::Network("connection refused".to_string())),
                ..Self::empty(log)
            }
        }

        pub fn with_cover(mut self, filename: &str, cover: CoverImage) -> Self {
            self.covers.insert(filename.to_string(), cover);
            self
        }

        pub fn with_delay(mut self, delay: Duration) -> Self {
            self.delay = delay;
            self
        }
    }

    #[async_trait]
    impl MetadataLookup for MockMetadata {
        async fn embedded_artwork(
            &self,
            filename: &str,
        ) -> Result<Option<CoverImage>, EnrichmentError> {
            self.log.record(format!("embedded:{}", filename), self.delay).await;
            if let Some(ref err) = self.error {
                return Err(err.clone());
            }
            Ok(self.covers.get(filename).cloned())
        }
    }

    /// Mock artwork search. Downloads turn the URL into a tiny inline image.
    pub struct MockArtworkSearch {
        /// Artwork URL per `artist|album`
        pub urls: HashMap<String, String>,
        /// Error to return from downloads (takes precedence)
        pub download_error: Option<EnrichmentError>,
        pub log: Arc<CallLog>,
    }

    impl MockArtworkSearch {
        pub fn empty(log: Arc<CallLog>) -> Self {
            Self {
                urls: HashMap::new(),
                download_error: None,
                log,
            }
        }

        pub fn with_album(mut self, artist: &str, album: &str, url: &str) -> Self {
            self.urls.insert(format!("{}|{}", artist, album), url.to_string());
            self
        }

        pub fn failing_downloads(mut self) -> Self {
            self.download_error = Some(EnrichmentError::Http {
                status: 503,
                reason: "Service Unavailable".to_string(),
            });
            self
        }

        /// The inline image a successful download of `url` produces.
        pub fn image_for(url: &str) -> CoverImage {
            CoverImage::from_bytes("image/jpeg", url.as_bytes())
        }
    }

    #[async_trait]
    impl ArtworkSearch for MockArtworkSearch {
        async fn find_artwork_url(
            &self,
            artist: &str,
            album: &str,
        ) -> Result<Option<String>, EnrichmentError> {
            let key = format!("{}|{}", artist, album);
            self.log.record(format!("search:{}", key), Duration::ZERO).await;
            Ok(self.urls.get(&key).cloned())
        }

        async fn download_as_persistable(&self, url: &str) -> Result<CoverImage, EnrichmentError> {
            self.log.record(format!("download:{}", url), Duration::ZERO).await;
            if let Some(ref err) = self.download_error {
                return Err(err.clone());
            }
            Ok(Self::image_for(url))
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[tokio::test]
        async fn test_mock_metadata_returns_configured_cover() {
            let log = CallLog::new();
            let cover = CoverImage::from_bytes("image/jpeg", b"art");
            let mock = MockMetadata::empty(log.clone()).with_cover("a.mp3", cover.clone());

            assert_eq!(mock.embedded_artwork("a.mp3").await.unwrap(), Some(cover));
            assert_eq!(mock.embedded_artwork("b.mp3").await.unwrap(), None);
            assert_eq!(log.calls(), vec!["embedded:a.mp3", "embedded:b.mp3"]);
        }

        #[tokio::test]
        async fn test_mock_metadata_error() {
            let mock = MockMetadata::failing(CallLog::new());
            let result = mock.embedded_artwork("a.mp3").await;
            assert!(matches!(result, Err(EnrichmentError::Network(_))));
        }

        #[tokio::test]
        async fn test_mock_search_and_download() {
            let log = CallLog::new();
            let mock = MockArtworkSearch::empty(log.clone()).with_album("SZA", "SOS", "https://art/sos");

            let url = mock.find_artwork_url("SZA", "SOS").await.unwrap();
            assert_eq!(url.as_deref(), Some("https://art/sos"));
            assert!(mock.find_artwork_url("SZA", "Ctrl").await.unwrap().is_none());

            let image = mock.download_as_persistable("https://art/sos").await.unwrap();
            assert_eq!(image, MockArtworkSearch::image_for("https://art/sos"));
            assert_eq!(log.calls_with("search:").len(), 2);
        }
    }
}
