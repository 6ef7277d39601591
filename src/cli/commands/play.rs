//! Now-playing command: select a song and load its cover on demand.

use std::time::Duration;

use tokio::runtime::Runtime;

use super::build_pipeline;
use super::covers::describe;
use crate::config::Config;
use crate::cover::CoverSettings;
use crate::library::HttpLibraryProvider;
use crate::model::Song;

/// How long to wait for the selected song's cover
const COVER_WAIT: Duration = Duration::from_secs(30);

/// What a play session ended with.
pub(crate) struct PlaySession {
    /// The now-playing song, with whatever cover it has by now
    pub song: Song,
    /// Its album in play order
    pub album: Vec<Song>,
    /// Whether the library changed while waiting for the cover
    pub cover_fetched: bool,
    pub disable_animated: bool,
}

/// Make a song the now-playing song and show its cover
pub fn cmd_play(rt: &Runtime, config: &Config, filename: &str, static_covers: bool) -> anyhow::Result<()> {
    rt.block_on(async {
        let session = play(config, filename, static_covers).await?;
        let song = &session.song;

        println!("▶ {} - {} [{}]", song.artist, song.title, song.duration);
        match song.display_cover(session.disable_animated) {
            Some(cover) => {
                let note = if session.cover_fetched { " (fetched now)" } else { "" };
                println!("  Cover: {}{}", describe(cover), note);
            }
            None => println!("  No cover found"),
        }

        if session.album.len() > 1 {
            println!("\n{}:", song.album);
            for (i, track) in session.album.iter().enumerate() {
                let marker = if track.filename == song.filename { "▶" } else { " " };
                println!("  {} {:>2}. {} [{}]", marker, i + 1, track.title, track.duration);
            }
        }
        anyhow::Ok(())
    })
}

/// Run a short session: load the library, select `filename` and wait for its cover.
///
/// Automatic loading is off for the session, so only the selected song is
/// fetched.
pub(crate) async fn play(config: &Config, filename: &str, static_covers: bool) -> anyhow::Result<PlaySession> {
    let pipeline = build_pipeline(config).await;
    pipeline
        .set_settings(CoverSettings {
            auto_load_covers: false,
            disable_animated_covers: static_covers || config.covers.disable_animated_covers,
        })
        .await;

    let provider = HttpLibraryProvider::new(&config.server.base_url, config.server.timeout());
    pipeline.reload(&provider).await?;

    let worker = pipeline.spawn_worker();
    let Some(selected) = pipeline.select_song(filename) else {
        worker.abort();
        anyhow::bail!("{} is not in the library", filename);
    };
    let revisions = pipeline.library().subscribe();

    let finished = tokio::time::timeout(COVER_WAIT, pipeline.wait_idle()).await;
    worker.abort();
    if finished.is_err() {
        tracing::warn!("Cover lookup for {} still running after {:?}", filename, COVER_WAIT);
    }

    let library = pipeline.library();
    Ok(PlaySession {
        song: library.now_playing().unwrap_or(selected),
        album: library.album_tracks(&library.song(filename).map(|s| s.album).unwrap_or_default()),
        cover_fetched: revisions.has_changed().unwrap_or(false),
        disable_animated: pipeline.settings().disable_animated_covers,
    })
}
