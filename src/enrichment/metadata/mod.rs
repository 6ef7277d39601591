//! Library server metadata endpoint
//!
//! The server parses tags of the files it hosts and returns the embedded
//! picture base64-encoded. This is the first, most accurate artwork source.

pub mod dto;
mod client;

pub use client::MetadataClient;
