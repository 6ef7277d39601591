//! Library loading and the in-memory library projection.
//!
//! - [`provider`] builds a [`LibrarySnapshot`] from the library server
//! - [`state`] owns the live song collection the cover pipeline writes into
//! - [`lyrics`] parses LRC lyrics attached by the lyrics registry

pub mod dto;
pub mod lyrics;
pub mod provider;
pub mod state;

pub use provider::{HttpLibraryProvider, LibraryProvider, LibrarySnapshot, LibrarySources};
pub use state::LibraryState;
