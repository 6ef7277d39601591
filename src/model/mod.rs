//! Core data models for the music library.
//!
//! Defines [`Song`], its timestamped [`LyricLine`]s, and [`CoverImage`], the
//! image reference the cover pipeline resolves and caches.
//!
//! Songs are identified by their `filename`. Everything except `cover` and
//! `animated_cover` is owned by the library provider and replaced wholesale
//! on reload.

use std::fmt;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};

/// A single timestamped lyric line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LyricLine {
    /// Offset into the track in seconds
    pub time: f64,
    /// Lyric text (trimmed, never empty)
    pub text: String,
}

/// A song in the library.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Song {
    /// Stable identity (file name on the server)
    pub filename: String,
    /// Track title
    pub title: String,
    /// Artist name
    pub artist: String,
    /// Album title
    pub album: String,
    /// Duration in seconds
    pub duration_sec: f64,
    /// Display duration ("3:45")
    pub duration: String,
    /// Playable media locator
    pub file_url: String,
    /// Resolved static artwork
    pub cover: Option<CoverImage>,
    /// Animated artwork (GIF/video), from the animated cover registry
    pub animated_cover: Option<CoverImage>,
    /// Synced lyrics, ordered by time
    pub lyrics: Option<Vec<LyricLine>>,
}

impl Song {
    /// Whether a static cover is present.
    pub fn has_cover(&self) -> bool {
        self.cover.is_some()
    }

    /// The artwork a renderer should show.
    ///
    /// Animated covers win unless they are disabled in settings.
    pub fn display_cover(&self, disable_animated: bool) -> Option<&CoverImage> {
        match (&self.animated_cover, disable_animated) {
            (Some(animated), false) => Some(animated),
            _ => self.cover.as_ref(),
        }
    }
}

/// Format a duration in seconds as `m:ss`.
///
/// Missing or non-finite durations fall back to "3:45", like the registry does.
pub fn format_duration(seconds: f64) -> String {
    if !seconds.is_finite() || seconds <= 0.0 {
        return "3:45".to_string();
    }
    let total = seconds.floor() as u64;
    format!("{}:{:02}", total / 60, total % 60)
}

/// Reference to a piece of artwork.
///
/// Either a remote URL or an inline `data:` URI that works offline. The string
/// form is what gets persisted in the image cache.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CoverImage {
    /// Remote reference (http/https or server-relative asset URL)
    Remote(String),
    /// Inline image encoded as a base64 data URI
    Inline { mime_type: String, base64: String },
}

impl CoverImage {
    /// Wrap raw image bytes as an inline data URI.
    pub fn from_bytes(mime_type: impl Into<String>, data: &[u8]) -> Self {
        Self::Inline {
            mime_type: mime_type.into(),
            base64: STANDARD.encode(data),
        }
    }

    /// Parse a persisted reference. Returns `None` for empty input.
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        if raw.is_empty() {
            return None;
        }

        if let Some(rest) = raw.strip_prefix("data:")
            && let Some((mime_type, payload)) = rest.split_once(";base64,")
        {
            return Some(Self::Inline {
                mime_type: mime_type.to_string(),
                base64: payload.to_string(),
            });
        }

        Some(Self::Remote(raw.to_string()))
    }

    /// Whether the image is available without network access.
    pub fn is_inline(&self) -> bool {
        matches!(self, Self::Inline { .. })
    }

    /// Decode the inline payload. Remote references have no local bytes.
    pub fn decode(&self) -> Option<Vec<u8>> {
        match self {
            Self::Inline { base64, .. } => STANDARD.decode(base64).ok(),
            Self::Remote(_) => None,
        }
    }
}

impl fmt::Display for CoverImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Remote(url) => f.write_str(url),
            Self::Inline { mime_type, base64 } => {
                write!(f, "data:{};base64,{}", mime_type, base64)
            }
        }
    }
}

impl Serialize for CoverImage {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for CoverImage {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).ok_or_else(|| serde::de::Error::custom("empty image reference"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::song;

    #[test]
    fn test_inline_cover_string_form() {
        let cover = CoverImage::from_bytes("image/png", &[1, 2, 3]);
        let text = cover.to_string();
        assert!(text.starts_with("data:image/png;base64,"));
        assert_eq!(CoverImage::parse(&text), Some(cover.clone()));
        assert_eq!(cover.decode(), Some(vec![1, 2, 3]));
        assert!(cover.is_inline());
    }

    #[test]
    fn test_remote_cover_parse() {
        let cover = CoverImage::parse("https://example.com/a.jpg").unwrap();
        assert_eq!(cover, CoverImage::Remote("https://example.com/a.jpg".to_string()));
        assert!(!cover.is_inline());
        assert!(cover.decode().is_none());
        assert!(CoverImage::parse("   ").is_none());
    }

    #[test]
    fn test_display_cover_prefers_animated() {
        let mut s = song("a.mp3", "SZA", "SOS");
        s.cover = CoverImage::parse("https://example.com/static.jpg");
        s.animated_cover = CoverImage::parse("https://example.com/anim.gif");

        assert_eq!(s.display_cover(false), s.animated_cover.as_ref());
        assert_eq!(s.display_cover(true), s.cover.as_ref());

        s.animated_cover = None;
        assert_eq!(s.display_cover(false), s.cover.as_ref());
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(225.0), "3:45");
        assert_eq!(format_duration(61.9), "1:01");
        assert_eq!(format_duration(0.0), "3:45");
        assert_eq!(format_duration(f64::NAN), "3:45");
    }
}
