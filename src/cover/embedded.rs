//! Extract cover art embedded in local audio file tags.
//!
//! Uses lofty to read picture data from:
//! - ID3v2 tags (MP3)
//! - Vorbis comments (FLAC, OGG)
//! - MP4 atoms (M4A/AAC)
//!
//! [`LocalTagLookup`] exposes this as a [`MetadataLookup`] for libraries whose
//! files live on the local disk, so the resolver can skip the server round trip.

use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use lofty::file::TaggedFileExt;
use lofty::probe::Probe;

use crate::enrichment::{EnrichmentError, MetadataLookup};
use crate::model::CoverImage;

/// Extract the front cover from embedded tags.
///
/// This is a synchronous operation that only reads the tag data.
/// Returns None if no cover art is embedded or the file can't be read.
pub fn extract_embedded_cover(path: &Path) -> Option<CoverImage> {
    let tagged_file = Probe::open(path).ok()?.read().ok()?;

    let tag = tagged_file
        .primary_tag()
        .or_else(|| tagged_file.first_tag())?;

    // Prefer front cover, fall back to first picture
    let pictures = tag.pictures();
    let picture = pictures
        .iter()
        .find(|p| p.pic_type() == lofty::picture::PictureType::CoverFront)
        .or_else(|| pictures.first())?;

    let mime_type = match picture.mime_type() {
        Some(lofty::picture::MimeType::Png) => "image/png",
        Some(lofty::picture::MimeType::Gif) => "image/gif",
        Some(lofty::picture::MimeType::Bmp) => "image/bmp",
        Some(lofty::picture::MimeType::Tiff) => "image/tiff",
        _ => "image/jpeg",
    };

    if picture.data().is_empty() {
        return None;
    }

    Some(CoverImage::from_bytes(mime_type, picture.data()))
}

/// Embedded artwork lookup against a local music directory.
pub struct LocalTagLookup {
    music_dir: PathBuf,
}

impl LocalTagLookup {
    pub fn new(music_dir: impl Into<PathBuf>) -> Self {
        Self {
            music_dir: music_dir.into(),
        }
    }

    /// Resolve a library filename inside the music directory.
    ///
    /// Filenames that would escape the directory are rejected.
    fn resolve(&self, filename: &str) -> Option<PathBuf> {
        let relative = Path::new(filename);
        let escapes = relative
            .components()
            .any(|c| matches!(c, Component::ParentDir | Component::RootDir | Component::Prefix(_)));
        if escapes || filename.is_empty() {
            return None;
        }
        Some(self.music_dir.join(relative))
    }
}

#[async_trait]
impl MetadataLookup for LocalTagLookup {
    async fn embedded_artwork(&self, filename: &str) -> Result<Option<CoverImage>, EnrichmentError> {
        let path = self
            .resolve(filename)
            .ok_or_else(|| EnrichmentError::Tags(filename.to_string(), "invalid filename".to_string()))?;

        if !path.is_file() {
            return Err(EnrichmentError::Tags(filename.to_string(), "file not found".to_string()));
        }

        tokio::task::spawn_blocking(move || extract_embedded_cover(&path))
            .await
            .map_err(|e| EnrichmentError::Tags(filename.to_string(), e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::{NamedTempFile, TempDir};

    #[test]
    fn test_extract_from_nonexistent_file() {
        let result = extract_embedded_cover(Path::new("nonexistent.mp3"));
        assert!(result.is_none());
    }

    #[test]
    fn test_extract_from_non_audio_file() {
        let mut file = NamedTempFile::new().expect("Failed to create temp file");
        writeln!(file, "Not an audio file").expect("Failed to write");

        let result = extract_embedded_cover(file.path());
        assert!(result.is_none());
    }

    #[test]
    fn test_resolve_rejects_traversal() {
        let lookup = LocalTagLookup::new("/music");
        assert!(lookup.resolve("../etc/passwd").is_none());
        assert!(lookup.resolve("/etc/passwd").is_none());
        assert!(lookup.resolve("").is_none());
        assert_eq!(lookup.resolve("a.mp3"), Some(PathBuf::from("/music/a.mp3")));
    }

    #[tokio::test]
    async fn test_lookup_missing_file_is_error() {
        let temp = TempDir::new().unwrap();
        let lookup = LocalTagLookup::new(temp.path());
        let result = lookup.embedded_artwork("missing.mp3").await;
        assert!(matches!(result, Err(EnrichmentError::Tags(_, _))));
    }

    #[tokio::test]
    async fn test_lookup_untagged_file_has_no_cover() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("track.mp3"), b"fake audio").unwrap();

        let lookup = LocalTagLookup::new(temp.path());
        let result = lookup.embedded_artwork("track.mp3").await;
        assert!(matches!(result, Ok(None)));
    }
}
