//! Remote artwork sources.
//!
//! # Architecture
//!
//! Same split as every external integration in this crate:
//! - **Domain** (`domain.rs`) - the error type the rest of the crate sees
//! - **DTOs** (`metadata/dto.rs`, `itunes/dto.rs`) - exact API response shapes
//! - **Clients** - HTTP clients that turn DTOs into [`crate::model::CoverImage`]
//! - **Traits** (`traits.rs`) - the seams the cover resolver depends on
//!
//! Sources:
//! 1. [`MetadataClient`] - artwork embedded in the file, parsed by the library server
//! 2. [`ITunesClient`] - album artwork found by artist/album search

pub mod domain;
pub mod itunes;
pub mod metadata;
pub mod traits;

pub use domain::EnrichmentError;
pub use itunes::ITunesClient;
pub use metadata::MetadataClient;
pub use traits::{ArtworkSearch, MetadataLookup};
