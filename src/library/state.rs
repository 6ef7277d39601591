//! In-memory library projection.
//!
//! Owns the current song collection, the now-playing song and the album
//! orderings. The collection is an immutable `Arc<Vec<Song>>` snapshot that is
//! swapped out wholesale on every change, so readers always see a consistent
//! list. Consumers watch [`LibraryState::subscribe`] and re-read the snapshot
//! whenever the revision ticks.
//!
//! Cover updates are matched by filename and cover key, never by object
//! identity, so the now-playing song picks up new artwork even after its
//! record has been replaced.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use tokio::sync::watch;

use super::LibrarySnapshot;
use crate::cover::CoverKey;
use crate::model::{CoverImage, Song};

/// Shared song collection and now-playing reference.
pub struct LibraryState {
    songs: RwLock<Arc<Vec<Song>>>,
    now_playing: RwLock<Option<Song>>,
    album_orders: RwLock<HashMap<String, Vec<String>>>,
    revision: watch::Sender<u64>,
}

impl LibraryState {
    pub fn new() -> Self {
        let (revision, _) = watch::channel(0);
        Self {
            songs: RwLock::new(Arc::new(Vec::new())),
            now_playing: RwLock::new(None),
            album_orders: RwLock::new(HashMap::new()),
            revision,
        }
    }

    /// Current song collection.
    pub fn songs(&self) -> Arc<Vec<Song>> {
        Arc::clone(&self.songs.read())
    }

    /// Look up a song by filename.
    pub fn song(&self, filename: &str) -> Option<Song> {
        self.songs.read().iter().find(|s| s.filename == filename).cloned()
    }

    pub fn now_playing(&self) -> Option<Song> {
        self.now_playing.read().clone()
    }

    pub fn album_orders(&self) -> HashMap<String, Vec<String>> {
        self.album_orders.read().clone()
    }

    /// Ordered songs of an album, following the album order registry when present.
    pub fn album_tracks(&self, album: &str) -> Vec<Song> {
        let songs = self.songs();
        let mut tracks: Vec<Song> = songs.iter().filter(|s| s.album == album).cloned().collect();

        if let Some(order) = self.album_orders.read().get(album) {
            let position = |filename: &str| order.iter().position(|f| f == filename).unwrap_or(usize::MAX);
            tracks.sort_by_key(|s| position(&s.filename));
        }
        tracks
    }

    /// Receiver that ticks whenever songs or the now-playing song change.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.revision.subscribe()
    }

    /// Current revision number.
    pub fn revision(&self) -> u64 {
        *self.revision.borrow()
    }

    /// Replace the whole collection with a fresh library load.
    ///
    /// The now-playing song is re-pointed at its new record when it still exists.
    pub fn replace(&self, snapshot: LibrarySnapshot) {
        {
            let mut songs = self.songs.write();
            let mut now_playing = self.now_playing.write();
            let fresh = now_playing
                .as_ref()
                .and_then(|current| snapshot.songs.iter().find(|s| s.filename == current.filename))
                .cloned();
            if fresh.is_some() {
                *now_playing = fresh;
            }
            *songs = Arc::new(snapshot.songs);
        }
        *self.album_orders.write() = snapshot.album_orders;
        self.bump();
    }

    /// Make `filename` the now-playing song.
    pub fn set_now_playing(&self, filename: &str) -> Option<Song> {
        let song = self.song(filename)?;
        *self.now_playing.write() = Some(song.clone());
        self.bump();
        Some(song)
    }

    /// Apply covers to every song sharing each key.
    ///
    /// Songs that already have a cover are only touched when `overwrite` is
    /// set. Afterwards the now-playing song is refreshed by filename (or by
    /// key when it is no longer in the collection). Returns how many songs in
    /// the collection changed.
    pub fn apply_covers(&self, covers: &[(CoverKey, CoverImage)], overwrite: bool) -> usize {
        if covers.is_empty() {
            return 0;
        }

        let mut songs = self.songs.write();
        let mut now_playing = self.now_playing.write();
        let mut updated = 0;

        let next: Vec<Song> = songs
            .iter()
            .map(|song| match cover_for(song, covers, overwrite) {
                Some(image) if song.cover.as_ref() != Some(image) => {
                    updated += 1;
                    Song {
                        cover: Some(image.clone()),
                        ..song.clone()
                    }
                }
                _ => song.clone(),
            })
            .collect();

        let mut playing_changed = false;
        if let Some(current) = now_playing.as_mut() {
            let fresh_cover = match next.iter().find(|s| s.filename == current.filename) {
                Some(fresh) => fresh.cover.clone(),
                None => cover_for(current, covers, overwrite).cloned().or_else(|| current.cover.clone()),
            };
            if fresh_cover != current.cover {
                current.cover = fresh_cover;
                playing_changed = true;
            }
        }

        if updated > 0 {
            *songs = Arc::new(next);
        }
        drop(now_playing);
        drop(songs);

        if updated > 0 || playing_changed {
            self.bump();
        }
        updated
    }

    fn bump(&self) {
        self.revision.send_modify(|rev| *rev += 1);
    }
}

impl Default for LibraryState {
    fn default() -> Self {
        Self::new()
    }
}

/// The cover a song should receive from `covers`, if any.
fn cover_for<'a>(song: &Song, covers: &'a [(CoverKey, CoverImage)], overwrite: bool) -> Option<&'a CoverImage> {
    if song.has_cover() && !overwrite {
        return None;
    }
    let key = CoverKey::for_song(song);
    covers.iter().find(|(k, _)| *k == key).map(|(_, image)| image)
}
