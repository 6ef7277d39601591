//! Music Shelf - cover art and library companion for a streaming music server.
//!
//! Loads the song collection from the library server, fills in missing
//! album artwork from embedded tags and an artwork search service, and keeps
//! it in a persistent cache so each album is only ever fetched once.

pub mod cli;
pub mod config;
pub mod cover;
pub mod enrichment;
pub mod error;
pub mod library;
pub mod model;
#[cfg(test)]
pub mod test_utils;

use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

fn main() -> anyhow::Result<()> {
    let args = cli::Cli::parse();

    // Initialize logging
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true))
        .with(EnvFilter::from_default_env().add_directive("music_shelf=info".parse()?))
        .init();

    cli::run_command(&args)
}
