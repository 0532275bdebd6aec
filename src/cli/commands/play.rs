use std::io::{stdout, Write};
use std::path::Path;
use std::time::{Duration, Instant};

use anyhow::{bail, Context, Result};
use crossterm::event::{self, Event, KeyEventKind};
use crossterm::{cursor, execute, style::Print, terminal};
use tracing::info;

use crate::navigation::{Location, Navigator, PendingNavigator};
use crate::playback::cursor::{PlaylistCursor, TrackId};
use crate::playback::engine::PlaybackEngine;
use crate::playback::keys;
use crate::playback::session::{Flow, Session};
use crate::playback::MpvEngine;
use crate::state::{Config, FileFlagStore, Library};

const KEY_POLL: Duration = Duration::from_millis(50);

pub async fn run(id: TrackId, config: &Config, library_path: &Path) -> Result<()> {
    if !library_path.exists() {
        bail!("No library at {:?}. Create one or pass --library.", library_path);
    }
    let library = Library::load(library_path)?;
    if library.songs.is_empty() {
        bail!("Library is empty");
    }

    let mut engine = MpvEngine::spawn().await?;
    let result = {
        let _raw = RawMode::enable()?;
        play_from(id, &library, config, &mut engine).await
    };

    let _ = engine.quit().await;
    println!();

    if let Some(location) = result? {
        println!("Open {}", location);
    }
    Ok(())
}

pub async fn open(kind: &str, id: i64, config: &Config, library_path: &Path) -> Result<()> {
    let location = Location::for_item(kind, id)
        .with_context(|| format!("Unknown item kind '{}'", kind))?;

    let mut nav = PendingNavigator::new();
    nav.navigate(location)?;

    match nav.take() {
        Some(Location::Song(song_id)) => run(song_id, config, library_path).await,
        Some(other) => {
            println!("{}", other);
            Ok(())
        }
        None => Ok(()),
    }
}

/// Plays `id`, then whatever the user or the end of a track navigates to.
/// Each song gets a fresh session, the same way each page load rebuilds
/// the player. Returns a location the terminal player cannot show.
async fn play_from(
    mut id: TrackId,
    library: &Library,
    config: &Config,
    engine: &mut dyn PlaybackEngine,
) -> Result<Option<Location>> {
    let mut volume = config.volume;

    loop {
        let song = library
            .song(id)
            .with_context(|| format!("Song {} is not in the library", id))?;
        let title = format!("{} - {}", song.title, song.artist);

        let store = FileFlagStore::new(config.flags_path());
        let cursor = PlaylistCursor::with_entropy(library.ids(), id, store);
        let mut session = Session::new(cursor, config.progress_interval(), volume);
        let mut nav = PendingNavigator::new();

        session.start(engine, &song.source).await?;
        render(&session.status_line(&title))?;

        let next = drive(&mut session, engine, &mut nav, config, &title).await?;
        volume = session.volume();

        match next {
            Some(Location::Song(next_id)) => {
                info!("moving from song {} to {}", id, next_id);
                id = next_id;
            }
            other => return Ok(other),
        }
    }
}

async fn drive(
    session: &mut Session<FileFlagStore>,
    engine: &mut dyn PlaybackEngine,
    nav: &mut PendingNavigator,
    config: &Config,
    title: &str,
) -> Result<Option<Location>> {
    loop {
        let mut flow = session.tick(Instant::now());

        while let Some(engine_event) = engine.try_next_event() {
            let handled = session
                .handle_event(engine_event, engine, nav, Instant::now())
                .await;
            if handled == Flow::Redraw {
                flow = Flow::Redraw;
            }
        }

        if event::poll(KEY_POLL).context("Failed to poll terminal")? {
            if let Event::Key(key) = event::read().context("Failed to read terminal event")? {
                if key.kind == KeyEventKind::Press {
                    if let Some(command) = keys::dispatch(key.into(), config.seek_step_secs) {
                        match session.handle_command(command, engine, nav).await {
                            Flow::Quit => return Ok(None),
                            Flow::Redraw => flow = Flow::Redraw,
                            Flow::Continue => {}
                        }
                    }
                }
            }
        }

        if let Some(location) = nav.take() {
            return Ok(Some(location));
        }

        if flow == Flow::Redraw {
            render(&session.status_line(title))?;
        }
    }
}

fn render(line: &str) -> Result<()> {
    let mut out = stdout();
    execute!(
        out,
        cursor::MoveToColumn(0),
        terminal::Clear(terminal::ClearType::CurrentLine),
        Print(line)
    )
    .context("Failed to draw status line")?;
    out.flush().context("Failed to flush stdout")
}

struct RawMode;

impl RawMode {
    fn enable() -> Result<Self> {
        terminal::enable_raw_mode().context("Failed to enable raw mode")?;
        Ok(Self)
    }
}

impl Drop for RawMode {
    fn drop(&mut self) {
        let _ = terminal::disable_raw_mode();
    }
}
