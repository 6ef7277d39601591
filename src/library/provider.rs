//! Library provider - assembles the song collection from the server.
//!
//! The library is stitched together from several partial sources:
//! 1. **Registry** (`/api/all-metadata`) - downloaded songs, required
//! 2. **Manual overrides** (`custom_metadata.json`) - title/artist/album edits
//! 3. **Cover registries** (`custom_covers.json`, `animated_covers.json`)
//! 4. **Album orders** and **lyrics** registries
//!
//! Only the registry is mandatory. Every optional file that fails to load is
//! treated as empty.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;

use super::dto::{
    AlbumOrdersFile, CoverRegistryFile, CustomMetadataFile, LyricsRegistryFile, RegistryEntry,
};
use super::lyrics::parse_lyrics;
use crate::cover::{UNKNOWN_ALBUM, UNKNOWN_ARTIST};
use crate::error::{Error, Result};
use crate::model::{CoverImage, Song, format_duration};

/// Duration assumed for songs that only exist as manual overrides.
const FALLBACK_DURATION_SECS: f64 = 220.0;

/// Everything a library load produces.
#[derive(Debug, Clone, Default)]
pub struct LibrarySnapshot {
    pub songs: Vec<Song>,
    /// Album name → ordered filenames
    pub album_orders: HashMap<String, Vec<String>>,
}

/// Source of the song collection.
#[async_trait]
pub trait LibraryProvider: Send + Sync {
    async fn load_library(&self) -> Result<LibrarySnapshot>;
}

/// Provider backed by the library server's HTTP API.
pub struct HttpLibraryProvider {
    http_client: reqwest::Client,
    base_url: String,
    timeout: Duration,
}

impl HttpLibraryProvider {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            http_client: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            timeout,
        }
    }

    async fn fetch_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = format!("{}/{}", self.base_url, path);
        let response = self
            .http_client
            .get(&url)
            .send()
            .await
            .map_err(|e| Error::library(format!("GET {} failed: {}", url, e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::library(format!("GET {} returned {}", url, status)));
        }

        response
            .json::<T>()
            .await
            .map_err(|e| Error::library(format!("Invalid JSON from {}: {}", url, e)))
    }

    /// Fetch an optional registry file, falling back to empty.
    async fn fetch_optional<T: DeserializeOwned + Default>(&self, path: &str) -> T {
        match self.fetch_json(path).await {
            Ok(value) => value,
            Err(e) => {
                tracing::debug!("Optional registry {} unavailable: {}", path, e);
                T::default()
            }
        }
    }
}

#[async_trait]
impl LibraryProvider for HttpLibraryProvider {
    async fn load_library(&self) -> Result<LibrarySnapshot> {
        let fetch_all = async {
            tokio::join!(
                self.fetch_json::<Vec<RegistryEntry>>("api/all-metadata"),
                self.fetch_optional::<CustomMetadataFile>("music/custom_metadata.json"),
                self.fetch_optional::<CoverRegistryFile>("music/custom_covers.json"),
                self.fetch_optional::<CoverRegistryFile>("music/animated_covers.json"),
                self.fetch_optional::<AlbumOrdersFile>("music/album_orders.json"),
                self.fetch_optional::<LyricsRegistryFile>("music/lyrics_registry.json"),
            )
        };

        let (registry, custom_metadata, custom_covers, animated_covers, album_orders, lyrics) =
            tokio::time::timeout(self.timeout, fetch_all)
                .await
                .map_err(|_| Error::library(format!("Library server did not answer within {:?}", self.timeout)))?;

        let sources = LibrarySources {
            registry: registry?,
            custom_metadata,
            custom_covers,
            animated_covers,
            album_orders,
            lyrics,
        };

        let snapshot = sources.merge(&self.base_url);
        tracing::info!(
            "Loaded {} songs ({} albums ordered) from {}",
            snapshot.songs.len(),
            snapshot.album_orders.len(),
            self.base_url
        );
        Ok(snapshot)
    }
}

/// Raw registry files, before merging.
#[derive(Debug, Clone, Default)]
pub struct LibrarySources {
    pub registry: Vec<RegistryEntry>,
    pub custom_metadata: CustomMetadataFile,
    pub custom_covers: CoverRegistryFile,
    pub animated_covers: CoverRegistryFile,
    pub album_orders: AlbumOrdersFile,
    pub lyrics: LyricsRegistryFile,
}

impl LibrarySources {
    /// Merge all sources into a song collection. Asset paths resolve against `base_url`.
    pub fn merge(self, base_url: &str) -> LibrarySnapshot {
        let base_url = base_url.trim_end_matches('/');
        let lyrics_for = |filename: &str| self.lyrics.get(filename).and_then(parse_lyrics);

        // 1. Registry rows
        let mut songs: Vec<Song> = self
            .registry
            .iter()
            .filter(|row| !row.filename.is_empty())
            .map(|row| {
                let duration_sec = row.duration.unwrap_or(0.0);
                Song {
                    filename: row.filename.clone(),
                    title: non_empty(row.title.as_deref())
                        .map(str::to_string)
                        .unwrap_or_else(|| default_title(&row.filename)),
                    artist: non_empty(row.artist.as_deref()).unwrap_or(UNKNOWN_ARTIST).to_string(),
                    album: row.album.clone().unwrap_or_default(),
                    duration_sec,
                    duration: format_duration(duration_sec),
                    file_url: file_url(base_url, &row.filename),
                    cover: None,
                    animated_cover: None,
                    lyrics: lyrics_for(&row.filename),
                }
            })
            .collect();

        // 2. Manual overrides replace registry fields or add songs
        for (filename, meta) in &self.custom_metadata {
            let title = non_empty(meta.title.as_deref())
                .map(str::to_string)
                .unwrap_or_else(|| default_title(filename));
            let artist = non_empty(meta.artist.as_deref()).unwrap_or(UNKNOWN_ARTIST).to_string();
            let album = non_empty(meta.album.as_deref()).unwrap_or(UNKNOWN_ALBUM).to_string();

            match songs.iter_mut().find(|s| &s.filename == filename) {
                Some(existing) => {
                    existing.title = title;
                    existing.artist = artist;
                    existing.album = album;
                    existing.lyrics = lyrics_for(filename);
                    if existing.duration_sec <= 0.0 {
                        existing.duration_sec = FALLBACK_DURATION_SECS;
                        existing.duration = format_duration(FALLBACK_DURATION_SECS);
                    }
                }
                None => songs.push(Song {
                    filename: filename.clone(),
                    title,
                    artist,
                    album,
                    duration_sec: FALLBACK_DURATION_SECS,
                    duration: format_duration(FALLBACK_DURATION_SECS),
                    file_url: file_url(base_url, filename),
                    cover: None,
                    animated_cover: None,
                    lyrics: lyrics_for(filename),
                }),
            }
        }

        // 3. Custom and animated cover registries, track entries before album entries
        for song in &mut songs {
            let track_key = format!("track:{}", song.filename);
            let album_key = format!("album:{}|{}", song.artist, song.album);

            let lookup = |registry: &CoverRegistryFile| {
                registry
                    .get(&track_key)
                    .or_else(|| registry.get(&album_key))
                    .and_then(|path| CoverImage::parse(&asset_url(base_url, path)))
            };

            if let Some(cover) = lookup(&self.custom_covers) {
                song.cover = Some(cover);
            }
            if let Some(animated) = lookup(&self.animated_covers) {
                song.animated_cover = Some(animated);
            }
        }

        LibrarySnapshot {
            songs,
            album_orders: self.album_orders,
        }
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

fn default_title(filename: &str) -> String {
    filename.replacen(".mp3", "", 1)
}

fn file_url(base_url: &str, filename: &str) -> String {
    format!("{}/music/{}", base_url, urlencoding::encode(filename))
}

/// Resolve a registry asset path. Absolute URLs and data URIs pass through.
pub fn asset_url(base_url: &str, path: &str) -> String {
    if path.starts_with("http") || path.starts_with("data:") {
        return path.to_string();
    }
    format!("{}/music/{}", base_url.trim_end_matches('/'), path)
}
