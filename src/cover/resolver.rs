//! Cover art resolver - walks the source chain for one song.
//!
//! Resolves cover art from multiple sources with proper priority:
//! 1. Embedded in file tags (most accurate)
//! 2. Artwork search by artist/album (only for songs that belong to a real album)
//!
//! # Design
//!
//! Every source failure is swallowed: network errors, 404s and malformed
//! responses are logged and the chain moves on. The worst outcome of a
//! resolution is "no artwork this pass".

use std::sync::Arc;

use crate::enrichment::{ArtworkSearch, MetadataLookup};
use crate::model::{CoverImage, Song};

use super::CoverKey;

/// Where the cover art came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoverSource {
    /// Embedded in the audio file's tags
    Embedded,
    /// Found by artwork search and downloaded
    Search,
}

/// Artwork found for a song
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedCover {
    pub image: CoverImage,
    pub source: CoverSource,
}

/// Source chain resolver.
pub struct CoverResolver {
    metadata: Arc<dyn MetadataLookup>,
    search: Option<Arc<dyn ArtworkSearch>>,
}

impl CoverResolver {
    /// Resolver over embedded tags and an artwork search service.
    pub fn new(metadata: Arc<dyn MetadataLookup>, search: Arc<dyn ArtworkSearch>) -> Self {
        Self {
            metadata,
            search: Some(search),
        }
    }

    /// Resolver that only looks at embedded tags.
    pub fn embedded_only(metadata: Arc<dyn MetadataLookup>) -> Self {
        Self {
            metadata,
            search: None,
        }
    }

    /// Resolve artwork for a song, trying each source in order.
    pub async fn resolve(&self, song: &Song) -> Option<ResolvedCover> {
        // Priority 1: embedded tags
        match self.metadata.embedded_artwork(&song.filename).await {
            Ok(Some(image)) => {
                tracing::debug!("Embedded cover found for {}", song.filename);
                return Some(ResolvedCover {
                    image,
                    source: CoverSource::Embedded,
                });
            }
            Ok(None) => {}
            Err(e) => {
                tracing::debug!("Embedded cover lookup failed for {}: {}", song.filename, e);
            }
        }

        // Priority 2: artwork search, only when there is a real album to search for
        if !CoverKey::for_song(song).is_shared() {
            return None;
        }
        let search = self.search.as_ref()?;

        let url = match search.find_artwork_url(&song.artist, &song.album).await {
            Ok(Some(url)) => url,
            Ok(None) => {
                tracing::debug!("No artwork found for {} - {}", song.artist, song.album);
                return None;
            }
            Err(e) => {
                tracing::warn!("Artwork search failed for {} - {}: {}", song.artist, song.album, e);
                return None;
            }
        };

        match search.download_as_persistable(&url).await {
            Ok(image) => Some(ResolvedCover {
                image,
                source: CoverSource::Search,
            }),
            Err(e) => {
                tracing::warn!("Artwork download failed for {}: {}", url, e);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enrichment::traits::mocks::{CallLog, MockArtworkSearch, MockMetadata};
    use crate::test_utils::song;

    #[tokio::test]
    async fn test_embedded_wins() {
        let log = CallLog::new();
        let embedded = CoverImage::from_bytes("image/jpeg", b"embedded");
        let resolver = CoverResolver::new(
            Arc::new(MockMetadata::empty(log.clone()).with_cover("a.mp3", embedded.clone())),
            Arc::new(MockArtworkSearch::empty(log.clone()).with_album("SZA", "SOS", "https://art/sos")),
        );

        let resolved = resolver.resolve(&song("a.mp3", "SZA", "SOS")).await.unwrap();
        assert_eq!(resolved.image, embedded);
        assert_eq!(resolved.source, CoverSource::Embedded);
        assert!(log.calls_with("search:").is_empty());
    }

    #[tokio::test]
    async fn test_falls_back_to_search_after_embedded_error() {
        let log = CallLog::new();
        let resolver = CoverResolver::new(
            Arc::new(MockMetadata::failing(log.clone())),
            Arc::new(MockArtworkSearch::empty(log.clone()).with_album("SZA", "SOS", "https://art/sos")),
        );

        let resolved = resolver.resolve(&song("a.mp3", "SZA", "SOS")).await.unwrap();
        assert_eq!(resolved.image, MockArtworkSearch::image_for("https://art/sos"));
        assert_eq!(resolved.source, CoverSource::Search);
        assert_eq!(
            log.calls(),
            vec!["embedded:a.mp3", "search:SZA|SOS", "download:https://art/sos"]
        );
    }

    #[tokio::test]
    async fn test_generic_song_never_searches() {
        let log = CallLog::new();
        let resolver = CoverResolver::new(
            Arc::new(MockMetadata::empty(log.clone())),
            Arc::new(MockArtworkSearch::empty(log.clone())),
        );

        let result = resolver
            .resolve(&song("x.mp3", "Unknown Artist", "Unknown Album"))
            .await;
        assert!(result.is_none());
        assert_eq!(log.calls(), vec!["embedded:x.mp3"]);
    }

    #[tokio::test]
    async fn test_download_failure_is_unresolved() {
        let log = CallLog::new();
        let resolver = CoverResolver::new(
            Arc::new(MockMetadata::empty(log.clone())),
            Arc::new(
                MockArtworkSearch::empty(log.clone())
                    .with_album("SZA", "SOS", "https://art/sos")
                    .failing_downloads(),
            ),
        );

        assert!(resolver.resolve(&song("a.mp3", "SZA", "SOS")).await.is_none());
    }

    #[tokio::test]
    async fn test_embedded_only_resolver() {
        let log = CallLog::new();
        let resolver = CoverResolver::embedded_only(Arc::new(MockMetadata::empty(log.clone())));
        assert!(resolver.resolve(&song("a.mp3", "SZA", "SOS")).await.is_none());
        assert_eq!(log.calls(), vec!["embedded:a.mp3"]);
    }
}
