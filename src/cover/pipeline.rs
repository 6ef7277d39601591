//! Cover pipeline - keeps the library's artwork filled in.
//!
//! Two cooperating tasks share the library state and the fetch queue:
//!
//! - **Scan** ([`CoverPipeline::scan`]) walks the collection, applies cache
//!   hits to whole cover units and queues one representative per miss. It
//!   never touches the network.
//! - **Worker** ([`CoverPipeline::run_worker`]) takes one filename at a time
//!   from the queue, resolves artwork through the source chain, caches it and
//!   broadcasts it to every song of the unit.
//!
//! The queue's in-flight slot is the only busy flag: while it is held no
//! second resolution starts, no matter who calls [`CoverPipeline::process_next`].

use std::collections::HashSet;
use std::sync::Arc;

use futures::future::join_all;
use parking_lot::{Mutex, RwLock};
use tokio::sync::Notify;
use tokio::task::JoinHandle;

use super::{CoverKey, CoverResolver, CoverSource, FetchQueue, ImageCache};
use crate::error::Result;
use crate::library::{LibraryProvider, LibraryState};
use crate::model::Song;

/// Settings the pipeline consumes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CoverSettings {
    /// Queue cache misses for network resolution during normal scans
    pub auto_load_covers: bool,
    /// Show static covers even when an animated one exists (display only)
    pub disable_animated_covers: bool,
}

impl Default for CoverSettings {
    fn default() -> Self {
        Self {
            auto_load_covers: true,
            disable_animated_covers: false,
        }
    }
}

/// What one scan pass did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanReport {
    /// Cover units satisfied from the cache
    pub cache_hits: usize,
    /// Songs whose cover changed
    pub songs_updated: usize,
    /// Representatives added to the fetch queue
    pub queued: usize,
}

/// Result of resolving one queued filename.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// Artwork found, cached and applied
    Resolved {
        filename: String,
        key: CoverKey,
        source: CoverSource,
        songs_updated: usize,
    },
    /// Every source came up empty
    Unresolved { filename: String },
    /// The song left the library before its turn
    Dropped { filename: String },
}

impl FetchOutcome {
    pub fn filename(&self) -> &str {
        match self {
            Self::Resolved { filename, .. }
            | Self::Unresolved { filename }
            | Self::Dropped { filename } => filename,
        }
    }
}

/// Long-lived cover orchestrator, one per session.
pub struct CoverPipeline {
    library: Arc<LibraryState>,
    cache: Arc<dyn ImageCache>,
    resolver: CoverResolver,
    settings: RwLock<CoverSettings>,
    queue: Mutex<FetchQueue>,
    /// Wakes the worker when something is queued
    wakeup: Notify,
    /// Signalled whenever an in-flight item finishes
    progress: Notify,
}

impl CoverPipeline {
    pub fn new(
        library: Arc<LibraryState>,
        cache: Arc<dyn ImageCache>,
        resolver: CoverResolver,
        settings: CoverSettings,
    ) -> Self {
        Self {
            library,
            cache,
            resolver,
            settings: RwLock::new(settings),
            queue: Mutex::new(FetchQueue::new()),
            wakeup: Notify::new(),
            progress: Notify::new(),
        }
    }

    pub fn library(&self) -> &Arc<LibraryState> {
        &self.library
    }

    pub fn settings(&self) -> CoverSettings {
        *self.settings.read()
    }

    /// Replace the settings and rescan with them.
    pub async fn set_settings(&self, settings: CoverSettings) -> ScanReport {
        *self.settings.write() = settings;
        self.scan(false).await
    }

    /// Copy of the current queue.
    pub fn queue(&self) -> FetchQueue {
        self.queue.lock().clone()
    }

    /// Queue a filename for resolution. Returns false if it was already queued.
    pub fn enqueue(&self, filename: &str) -> bool {
        let added = self.queue.lock().push_back(filename);
        if added {
            self.wakeup.notify_one();
        }
        added
    }

    /// Load the library from `provider`, replace the collection and rescan.
    ///
    /// On failure the current collection is left untouched.
    pub async fn reload(&self, provider: &dyn LibraryProvider) -> Result<ScanReport> {
        match provider.load_library().await {
            Ok(snapshot) => {
                self.library.replace(snapshot);
                Ok(self.scan(false).await)
            }
            Err(e) => {
                tracing::warn!("Library reload failed, keeping current songs: {}", e);
                Err(e)
            }
        }
    }

    /// Manual "reload covers": re-check every song, covered or not.
    pub async fn rescan(&self) -> ScanReport {
        self.scan(true).await
    }

    /// Check the cache for every song missing a cover and queue the misses.
    ///
    /// In `force` mode songs that already have a cover are re-checked too, and
    /// cache hits overwrite their current cover.
    pub async fn scan(&self, force: bool) -> ScanReport {
        let songs = self.library.songs();
        if songs.is_empty() {
            return ScanReport::default();
        }
        let settings = self.settings();

        // Units whose representative is already queued count as handled.
        let (queued_files, mut handled) = {
            let queue = self.queue.lock();
            let files: HashSet<String> = queue.all().map(str::to_string).collect();
            let keys: HashSet<CoverKey> = songs
                .iter()
                .filter(|s| files.contains(&s.filename))
                .map(CoverKey::for_song)
                .collect();
            (files, keys)
        };

        // One representative per unit that still needs artwork
        let mut candidates = Vec::new();
        for song in songs.iter() {
            if song.has_cover() && !force {
                continue;
            }
            if queued_files.contains(&song.filename) {
                continue;
            }

            let key = CoverKey::for_song(song);
            if handled.insert(key.clone()) {
                candidates.push((key, song.filename.clone()));
            }
        }

        let cached = join_all(candidates.iter().map(|(key, _)| self.cache.get(key))).await;

        let mut hits = Vec::new();
        let mut misses = Vec::new();
        for ((key, filename), image) in candidates.into_iter().zip(cached) {
            match image {
                Some(image) => hits.push((key, image)),
                None if settings.auto_load_covers || force => misses.push(filename),
                None => {}
            }
        }

        let songs_updated = self.library.apply_covers(&hits, force);

        let queued = {
            let mut queue = self.queue.lock();
            misses.into_iter().filter(|f| queue.push_back(f.as_str())).count()
        };
        if queued > 0 {
            self.wakeup.notify_one();
        }

        let report = ScanReport {
            cache_hits: hits.len(),
            songs_updated,
            queued,
        };
        if report == ScanReport::default() {
            tracing::debug!("Cover scan (force={}) found nothing to do", force);
        } else {
            tracing::info!(
                "Cover scan (force={}): {} cached units, {} songs updated, {} queued",
                force,
                report.cache_hits,
                report.songs_updated,
                report.queued
            );
        }
        report
    }

    /// Make a song the now-playing song, jumping the queue if it has no artwork.
    pub fn select_song(&self, filename: &str) -> Option<Song> {
        let song = self.library.set_now_playing(filename)?;
        if song.cover.is_none() && song.animated_cover.is_none() && self.queue.lock().push_front(filename) {
            tracing::debug!("Prioritized cover fetch for {}", filename);
            self.wakeup.notify_one();
        }
        Some(song)
    }

    /// Drop the cached image of a song's cover unit.
    ///
    /// Returns false when the song isn't in the library.
    pub async fn forget_cover(&self, filename: &str) -> bool {
        let Some(song) = self.library.song(filename) else {
            return false;
        };
        let key = CoverKey::for_song(&song);
        self.cache.remove(&key).await;
        tracing::info!("Forgot cached cover {}", key);
        true
    }

    /// Resolve the head of the queue.
    ///
    /// Returns `None` when the queue is empty or another resolution is in flight.
    pub async fn process_next(&self) -> Option<FetchOutcome> {
        let filename = self.queue.lock().begin_next()?;
        let _slot = InFlight {
            pipeline: self,
            filename: filename.clone(),
        };
        Some(self.resolve_queued(filename).await)
    }

    async fn resolve_queued(&self, filename: String) -> FetchOutcome {
        let Some(song) = self.library.song(&filename) else {
            tracing::debug!("{} left the library before its cover fetch", filename);
            return FetchOutcome::Dropped { filename };
        };

        let Some(resolved) = self.resolver.resolve(&song).await else {
            tracing::debug!("No cover found for {}", filename);
            return FetchOutcome::Unresolved { filename };
        };

        let key = CoverKey::for_song(&song);
        self.cache.put(&key, &resolved.image).await;
        let songs_updated = self.library.apply_covers(&[(key.clone(), resolved.image)], true);

        tracing::info!(
            "Resolved cover {} via {:?} for {} ({} songs updated)",
            key,
            resolved.source,
            filename,
            songs_updated
        );

        FetchOutcome::Resolved {
            filename,
            key,
            source: resolved.source,
            songs_updated,
        }
    }

    /// Resolve queued items until the queue is empty.
    ///
    /// Waits out a resolution started elsewhere instead of running beside it.
    pub async fn drain(&self) -> Vec<FetchOutcome> {
        let mut outcomes = Vec::new();
        loop {
            if let Some(outcome) = self.process_next().await {
                outcomes.push(outcome);
                continue;
            }

            let notified = self.progress.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            let (idle, busy) = {
                let queue = self.queue.lock();
                (queue.is_idle(), queue.is_busy())
            };
            if idle {
                return outcomes;
            }
            if busy {
                notified.await;
            }
        }
    }

    /// Wait until nothing is queued or in flight.
    pub async fn wait_idle(&self) {
        loop {
            let notified = self.progress.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            if self.queue.lock().is_idle() {
                return;
            }
            notified.await;
        }
    }

    /// Worker loop: resolve queued items one by one, sleep while the queue is empty.
    pub async fn run_worker(&self) {
        tracing::debug!("Cover worker started");
        loop {
            if self.process_next().await.is_none() {
                self.wakeup.notified().await;
            }
        }
    }

    /// Spawn [`Self::run_worker`] on the tokio runtime.
    pub fn spawn_worker(self: &Arc<Self>) -> JoinHandle<()> {
        let pipeline = Arc::clone(self);
        tokio::spawn(async move { pipeline.run_worker().await })
    }
}

/// Holds the queue's in-flight slot; releasing it is unconditional.
struct InFlight<'a> {
    pipeline: &'a CoverPipeline,
    filename: String,
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        let more = {
            let mut queue = self.pipeline.queue.lock();
            queue.finish(&self.filename);
            queue.len() > 0
        };
        self.pipeline.progress.notify_waiters();
        if more {
            self.pipeline.wakeup.notify_one();
        }
    }
}
