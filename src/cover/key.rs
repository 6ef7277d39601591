//! Cover unit keys.
//!
//! Songs that share an album share one piece of artwork, so they share one
//! cache key. Songs without usable grouping information (unknown artist,
//! missing or placeholder album) each get a key of their own.
//!
//! Every cache read and write goes through [`CoverKey`]; computing keys any
//! other way makes cache entries unreachable.

use std::fmt;

use crate::model::Song;

/// Placeholder artist assigned by the registry.
pub const UNKNOWN_ARTIST: &str = "Unknown Artist";
/// Placeholder album assigned by the registry.
pub const UNKNOWN_ALBUM: &str = "Unknown Album";
/// Album name the downloader gives to loose tracks.
pub const DOWNLOADS_ALBUM: &str = "Downloads";

/// Canonical cache key of a cover unit.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CoverKey(String);

impl CoverKey {
    /// Compute the key for an (artist, album, filename) triple.
    pub fn for_parts(artist: &str, album: &str, filename: &str) -> Self {
        if is_generic(artist, album) {
            Self(format!("song:{}", filename))
        } else {
            Self(format!("album:{}|{}", artist.trim(), album.trim()))
        }
    }

    /// Compute the key for a song.
    pub fn for_song(song: &Song) -> Self {
        Self::for_parts(&song.artist, &song.album, &song.filename)
    }

    /// Whether this key groups a whole album (as opposed to a single track).
    pub fn is_shared(&self) -> bool {
        self.0.starts_with("album:")
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CoverKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for CoverKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Whether an artist/album pair carries too little information to group on.
pub fn is_generic(artist: &str, album: &str) -> bool {
    artist == UNKNOWN_ARTIST || album.is_empty() || album == UNKNOWN_ALBUM || album == DOWNLOADS_ALBUM
}
