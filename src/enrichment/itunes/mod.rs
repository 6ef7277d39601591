//! iTunes Search API integration
//!
//! Finds album artwork by artist/album name and downloads it as an inline
//! image so it survives offline. No API key required.

pub mod dto;
mod client;

pub use client::{ITunesClient, ARTWORK_SIZE};
