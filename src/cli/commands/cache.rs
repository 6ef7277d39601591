//! Cover cache maintenance commands.

use tokio::runtime::Runtime;

use super::build_pipeline;
use super::covers::describe;
use crate::config::Config;
use crate::cover::{CoverCache, CoverKey};
use crate::error::ResultExt;
use crate::library::HttpLibraryProvider;
use crate::model::CoverImage;

async fn open_cache(config: &Config) -> anyhow::Result<CoverCache> {
    let path = config.covers.cache_path();
    let cache = CoverCache::open(&path)
        .await
        .with_context(format!("opening cover cache at {}", path.display()))?;
    Ok(cache)
}

/// Show cover cache statistics
pub fn cmd_cache_stats(rt: &Runtime, config: &Config) -> anyhow::Result<()> {
    rt.block_on(async {
        let cache = open_cache(config).await?;
        let count = cache.count().await?;
        let size = cache.size_bytes().await?;

        println!("Cover Cache");
        println!("===========");
        println!("Location: {}", config.covers.cache_path().display());
        println!("Entries:  {}", count);
        println!("Size:     {:.1} KiB", size as f64 / 1024.0);
        anyhow::Ok(())
    })
}

/// Delete every cached cover
pub fn cmd_cache_clear(rt: &Runtime, config: &Config) -> anyhow::Result<()> {
    rt.block_on(async {
        let cache = open_cache(config).await?;
        let removed = cache.clear().await?;
        println!("Removed {} cached covers.", removed);
        anyhow::Ok(())
    })
}

/// Forget the cached cover of one song's cover unit
pub fn cmd_cache_forget(rt: &Runtime, config: &Config, filename: &str) -> anyhow::Result<()> {
    rt.block_on(async {
        let (key, cover) = forget_song_cover(config, filename).await?;
        if let Some(cover) = &cover {
            println!("Current cover: {}", describe(cover));
        }
        println!("Forgot {}; the next scan fetches it again.", key);
        anyhow::Ok(())
    })
}

/// Load the library, then drop the cache entry of `filename`'s unit.
///
/// Returns the key and the cover the song had before.
async fn forget_song_cover(config: &Config, filename: &str) -> anyhow::Result<(CoverKey, Option<CoverImage>)> {
    let pipeline = build_pipeline(config).await;
    let provider = HttpLibraryProvider::new(&config.server.base_url, config.server.timeout());
    pipeline.reload(&provider).await?;

    let Some(song) = pipeline.library().song(filename) else {
        anyhow::bail!("{} is not in the library", filename);
    };

    pipeline.forget_cover(filename).await;
    Ok((CoverKey::for_song(&song), song.cover))
}
