//! Lyrics parsing command.

use std::path::Path;

use crate::error::ResultExt;
use crate::library::lyrics::parse_lrc;

/// Parse an LRC file and print its timed lines
pub fn cmd_lyrics(path: &Path) -> anyhow::Result<()> {
    let text = std::fs::read_to_string(path).with_context(format!("reading {}", path.display()))?;

    let Some(lines) = parse_lrc(&text) else {
        println!("No timed lyrics in {}", path.display());
        return Ok(());
    };

    for line in &lines {
        let minutes = (line.time / 60.0).floor();
        let seconds = line.time - minutes * 60.0;
        println!("[{:02}:{:05.2}] {}", minutes as u64, seconds, line.text);
    }
    println!("\n{} lines", lines.len());
    Ok(())
}
