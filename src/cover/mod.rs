//! Cover art resolution and caching.
//!
//! Most songs arrive without artwork. This module groups them into cover
//! units, resolves one piece of artwork per unit and keeps it in an offline
//! cache:
//!
//! 1. **Key** - songs of the same album share a [`CoverKey`]; loose tracks get their own
//! 2. **Cache** - [`CoverCache`] persists key → image across sessions
//! 3. **Resolver** - [`CoverResolver`] tries embedded tags, then artwork search
//! 4. **Queue** - [`FetchQueue`] holds one representative filename per unit
//! 5. **Pipeline** - [`CoverPipeline`] scans the library against the cache and
//!    drains the queue one song at a time
//!
//! # Design Principles
//!
//! - **Non-blocking**: scans only touch the cache; network work happens in the worker
//! - **Graceful degradation**: missing art is fine, every source failure just means None
//! - **One fetch at a time**: the queue has a single in-flight slot
//! - **Broadcast by key**: one resolved image lands on every song of its unit

mod cache;
mod embedded;
mod key;
mod pipeline;
mod queue;
mod resolver;

pub use cache::{CacheError, CoverCache, DEFAULT_CACHE_NAME, ImageCache};
pub use embedded::{LocalTagLookup, extract_embedded_cover};
pub use key::{CoverKey, DOWNLOADS_ALBUM, UNKNOWN_ALBUM, UNKNOWN_ARTIST, is_generic};
pub use pipeline::{CoverPipeline, CoverSettings, FetchOutcome, ScanReport};
pub use queue::FetchQueue;
pub use resolver::{CoverResolver, CoverSource, ResolvedCover};
