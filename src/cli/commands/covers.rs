//! Cover scan and key inspection commands.

use tokio::runtime::Runtime;

use super::build_pipeline;
use crate::config::Config;
use crate::cover::{CoverKey, FetchOutcome};
use crate::library::HttpLibraryProvider;
use crate::model::CoverImage;

/// Load the library, scan for covers and resolve everything that was queued
pub fn cmd_scan(rt: &Runtime, config: &Config, force: bool) -> anyhow::Result<()> {
    rt.block_on(async {
        let pipeline = build_pipeline(config).await;
        let provider = HttpLibraryProvider::new(&config.server.base_url, config.server.timeout());

        println!("Loading library from {}", config.server.base_url);
        let mut report = pipeline.reload(&provider).await?;
        if force {
            report = pipeline.rescan().await;
        }

        println!(
            "{} songs, {} cached covers applied to {} songs, {} to fetch",
            pipeline.library().songs().len(),
            report.cache_hits,
            report.songs_updated,
            report.queued
        );
        if report.queued == 0 && !config.covers.auto_load_covers && !force {
            println!("Automatic cover loading is off; use --force to fetch missing covers.");
        }

        let outcomes = pipeline.drain().await;
        let mut resolved = 0;
        for outcome in &outcomes {
            match outcome {
                FetchOutcome::Resolved {
                    filename,
                    key,
                    source,
                    songs_updated,
                } => {
                    resolved += 1;
                    println!("  ✓ {} ({:?}) via {} → {} songs", key, source, filename, songs_updated);
                }
                FetchOutcome::Unresolved { filename } => println!("  ? {} no artwork found", filename),
                FetchOutcome::Dropped { filename } => println!("  - {} left the library", filename),
            }
        }

        let disable_animated = pipeline.settings().disable_animated_covers;
        let songs = pipeline.library().songs();
        let missing: Vec<&str> = songs
            .iter()
            .filter(|s| s.display_cover(disable_animated).is_none())
            .map(|s| s.filename.as_str())
            .collect();
        let offline = songs
            .iter()
            .filter_map(|s| s.display_cover(disable_animated))
            .filter(|c| c.is_inline())
            .count();

        println!(
            "\nResolved {}/{} queued. {} songs without a cover, {} covers available offline.",
            resolved,
            outcomes.len(),
            missing.len(),
            offline
        );
        for filename in missing {
            println!("  {}", filename);
        }
        anyhow::Ok(())
    })
}

/// Print the cover unit key for an (artist, album, filename) triple
pub fn cmd_key(artist: &str, album: &str, filename: &str) -> anyhow::Result<()> {
    let key = CoverKey::for_parts(artist, album, filename);
    let scope = if key.is_shared() { "album" } else { "song" };
    println!("{} ({}-level)", key, scope);
    Ok(())
}

/// Short human description of where a cover lives
pub(crate) fn describe(image: &CoverImage) -> String {
    match image {
        CoverImage::Remote(url) => url.clone(),
        CoverImage::Inline { mime_type, base64 } => {
            format!("inline {} ({} bytes)", mime_type, base64.len() * 3 / 4)
        }
    }
}
