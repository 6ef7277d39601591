//! Command-line interface for music-shelf.
//!
//! This module provides CLI commands for filling in cover art, inspecting
//! the cover cache, parsing lyrics and showing the configuration.

mod commands;

pub use commands::{Cli, Commands, run_command};
