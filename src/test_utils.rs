//! Test utilities and fixtures for music-shelf tests.
//!
//! Song and snapshot builders, canned library providers and a cache wrapper
//! that counts reads. Mock artwork sources live in
//! [`crate::enrichment::traits::mocks`].
//!
//! # Example
//!
//! ```ignore
//! use crate::test_utils::{snapshot, song};
//!
//! let state = LibraryState::new();
//! state.replace(snapshot(vec![song("a.mp3", "SZA", "SOS")]));
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

use crate::cover::{CoverCache, CoverKey, ImageCache};
use crate::error::{Error, Result};
use crate::library::{LibraryProvider, LibrarySnapshot};
use crate::model::{CoverImage, Song};

/// Creates a song with no artwork and sensible defaults.
///
/// Customize using struct update syntax:
///
/// ```ignore
/// let covered = Song {
///     cover: Some(remote("sos")),
///     ..song("a.mp3", "SZA", "SOS")
/// };
/// ```
pub fn song(filename: &str, artist: &str, album: &str) -> Song {
    Song {
        filename: filename.to_string(),
        title: filename.trim_end_matches(".mp3").to_string(),
        artist: artist.to_string(),
        album: album.to_string(),
        duration_sec: 180.0,
        duration: "3:00".to_string(),
        file_url: format!("http://localhost:3001/music/{}", filename),
        cover: None,
        animated_cover: None,
        lyrics: None,
    }
}

/// A remote cover image with a recognizable URL.
pub fn remote(name: &str) -> CoverImage {
    CoverImage::Remote(format!("https://art.example/{}.jpg", name))
}

/// A library snapshot with no album orders.
pub fn snapshot(songs: Vec<Song>) -> LibrarySnapshot {
    LibrarySnapshot {
        songs,
        ..Default::default()
    }
}

/// Provider that always returns the same snapshot.
pub struct StaticLibrary(pub LibrarySnapshot);

#[async_trait]
impl LibraryProvider for StaticLibrary {
    async fn load_library(&self) -> Result<LibrarySnapshot> {
        Ok(self.0.clone())
    }
}

/// Provider whose server is always down.
pub struct FailingLibrary;

#[async_trait]
impl LibraryProvider for FailingLibrary {
    async fn load_library(&self) -> Result<LibrarySnapshot> {
        Err(Error::library("server unreachable"))
    }
}

/// Cover cache wrapper that counts reads.
pub struct CountingCache {
    inner: CoverCache,
    gets: AtomicUsize,
}

impl CountingCache {
    pub fn new(inner: CoverCache) -> Self {
        Self {
            inner,
            gets: AtomicUsize::new(0),
        }
    }

    pub fn inner(&self) -> &CoverCache {
        &self.inner
    }

    /// Number of `get` calls so far.
    pub fn gets(&self) -> usize {
        self.gets.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ImageCache for CountingCache {
    async fn get(&self, key: &CoverKey) -> Option<CoverImage> {
        self.gets.fetch_add(1, Ordering::SeqCst);
        self.inner.get(key).await
    }

    async fn put(&self, key: &CoverKey, image: &CoverImage) {
        self.inner.put(key, image).await
    }

    async fn remove(&self, key: &CoverKey) {
        self.inner.remove(key).await
    }
}

/// One canned response of [`serve`]: request path (query ignored), status, body.
pub type Route = (&'static str, u16, &'static str);

/// Start a tiny HTTP server on localhost and return its base URL.
///
/// `{base}` inside a body is replaced with the server's own URL. Unknown
/// paths get a 404. Every connection is answered once and closed.
pub async fn serve(routes: Vec<Route>) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind test server");
    let base = format!("http://{}", listener.local_addr().expect("test server address"));
    let routes = Arc::new(routes);

    let server_base = base.clone();
    tokio::spawn(async move {
        while let Ok((socket, _)) = listener.accept().await {
            let routes = Arc::clone(&routes);
            let base = server_base.clone();
            tokio::spawn(async move { respond(socket, &routes, &base).await });
        }
    });
    base
}

/// Start a server that accepts connections and never answers.
pub async fn serve_silent() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind test server");
    let base = format!("http://{}", listener.local_addr().expect("test server address"));
    tokio::spawn(async move {
        let mut held = Vec::new();
        while let Ok((socket, _)) = listener.accept().await {
            held.push(socket);
        }
    });
    base
}

async fn respond(mut socket: TcpStream, routes: &[Route], base: &str) {
    let Some(path) = read_request_path(&mut socket).await else {
        return;
    };
    let (status, body) = routes
        .iter()
        .find(|(route, _, _)| *route == path)
        .map(|(_, status, body)| (*status, body.replace("{base}", base)))
        .unwrap_or((404, "not found".to_string()));

    let reason = if status == 200 { "OK" } else { "Error" };
    let content_type = if path.ends_with(".jpg") { "image/jpeg" } else { "application/json" };
    let response = format!(
        "HTTP/1.1 {} {}\r\nContent-Type: {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        status,
        reason,
        content_type,
        body.len(),
        body
    );
    let _ = socket.write_all(response.as_bytes()).await;
    let _ = socket.shutdown().await;
}

async fn read_request_path(socket: &mut TcpStream) -> Option<String> {
    let mut request = Vec::new();
    let mut buf = [0u8; 1024];
    while !request.windows(4).any(|w| w == b"\r\n\r\n") {
        let n = socket.read(&mut buf).await.ok()?;
        if n == 0 {
            break;
        }
        request.extend_from_slice(&buf[..n]);
    }
    let text = String::from_utf8_lossy(&request);
    let target = text.split_whitespace().nth(1)?;
    target.split('?').next().map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_song_defaults() {
        let s = song("kill-bill.mp3", "SZA", "SOS");
        assert_eq!(s.title, "kill-bill");
        assert!(!s.has_cover());
    }

    #[tokio::test]
    async fn test_counting_cache_counts_reads() {
        let cache = CountingCache::new(CoverCache::in_memory().await.unwrap());
        let key = CoverKey::for_parts("SZA", "SOS", "a.mp3");

        assert!(cache.get(&key).await.is_none());
        cache.put(&key, &remote("sos")).await;
        assert_eq!(cache.get(&key).await, Some(remote("sos")));
        assert_eq!(cache.gets(), 2);
    }

    #[tokio::test]
    async fn test_static_and_failing_providers() {
        let snap = StaticLibrary(snapshot(vec![song("a.mp3", "SZA", "SOS")]))
            .load_library()
            .await
            .unwrap();
        assert_eq!(snap.songs.len(), 1);
        assert!(FailingLibrary.load_library().await.is_err());
    }

    #[tokio::test]
    async fn test_serve_answers_routes_and_404s() {
        let base = serve(vec![("/hello", 200, r#"{"from": "{base}"}"#)]).await;
        let client = reqwest::Client::new();

        let found = client.get(format!("{}/hello?x=1", base)).send().await.unwrap();
        assert_eq!(found.status(), 200);
        assert_eq!(found.text().await.unwrap(), format!(r#"{{"from": "{}"}}"#, base));

        let missing = client.get(format!("{}/nope", base)).send().await.unwrap();
        assert_eq!(missing.status(), 404);
    }
}
