use std::time::{Duration, Instant};

use anyhow::Result;
use rand::{rngs::StdRng, Rng};
use tracing::{debug, info, warn};

use crate::navigation::{Location, Navigator};
use crate::playback::cursor::PlaylistCursor;
use crate::playback::engine::PlaybackEngine;
use crate::playback::events::{EndAction, EngineEvent, PlayerCommand, MEDIA_ERR_SRC_NOT_SUPPORTED};
use crate::playback::progress::Progress;
use crate::playback::throttle::Throttle;
use crate::state::flags::FlagStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Redraw,
    Quit,
}

/// One loaded track: the cursor around it plus what the player shows.
pub struct Session<S, R = StdRng> {
    cursor: PlaylistCursor<S, R>,
    throttle: Throttle<f64>,
    progress: Progress,
    paused: bool,
    muted: bool,
    volume: f64,
    error: Option<String>,
}

impl<S: FlagStore, R: Rng> Session<S, R> {
    pub fn new(cursor: PlaylistCursor<S, R>, progress_interval: Duration, volume: f64) -> Self {
        Self {
            cursor,
            throttle: Throttle::new(progress_interval),
            progress: Progress::default(),
            paused: true,
            muted: false,
            volume: volume.clamp(0.0, 1.0),
            error: None,
        }
    }

    pub fn cursor(&self) -> &PlaylistCursor<S, R> {
        &self.cursor
    }

    pub fn progress(&self) -> Progress {
        self.progress
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn is_muted(&self) -> bool {
        self.muted
    }

    pub fn volume(&self) -> f64 {
        self.volume
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn set_error(&mut self, msg: String) {
        self.error = Some(msg);
    }

    pub fn clear_error(&mut self) {
        self.error = None;
    }

    /// Loads `source` and tries to start it. A refused start leaves the
    /// session paused until the user asks for playback.
    pub async fn start(&mut self, engine: &mut dyn PlaybackEngine, source: &str) -> Result<()> {
        // Notifications still queued belong to the previous track.
        let mut stale = 0;
        while engine.try_next_event().is_some() {
            stale += 1;
        }
        if stale > 0 {
            debug!("dropped {} notifications from the previous track", stale);
        }

        engine.load(source).await?;
        engine.set_volume(self.volume).await?;

        match engine.play().await {
            Ok(()) => {
                info!("playing {}", source);
                self.paused = false;
            }
            Err(e) => {
                info!("autoplay prevented, waiting for user interaction: {:#}", e);
                self.paused = true;
            }
        }
        Ok(())
    }

    pub async fn handle_event(
        &mut self,
        event: EngineEvent,
        engine: &mut dyn PlaybackEngine,
        nav: &mut dyn Navigator,
        now: Instant,
    ) -> Flow {
        match event {
            EngineEvent::MetadataReady { duration } => {
                debug!("metadata loaded, duration {}", duration);
                self.progress.duration = duration;
                Flow::Redraw
            }
            EngineEvent::TimeAdvanced { position } => match self.throttle.offer(position, now) {
                Some(position) => {
                    self.progress.position = position;
                    Flow::Redraw
                }
                None => Flow::Continue,
            },
            EngineEvent::Ended => self.track_ended(engine, nav).await,
            EngineEvent::Error { code, message } => {
                warn!("playback error {}: {}", code, message);
                if code == MEDIA_ERR_SRC_NOT_SUPPORTED {
                    warn!("source not supported or file not found");
                }
                self.set_error(format!("Playback error: {}", message));
                Flow::Redraw
            }
        }
    }

    /// Applies a progress value held back by the throttle once its tick comes.
    pub fn tick(&mut self, now: Instant) -> Flow {
        match self.throttle.poll(now) {
            Some(position) => {
                self.progress.position = position;
                Flow::Redraw
            }
            None => Flow::Continue,
        }
    }

    pub async fn handle_command(
        &mut self,
        command: PlayerCommand,
        engine: &mut dyn PlaybackEngine,
        nav: &mut dyn Navigator,
    ) -> Flow {
        self.clear_error();

        match command {
            PlayerCommand::Quit => return Flow::Quit,
            PlayerCommand::TogglePlay => {
                let res = if self.paused {
                    engine.play().await
                } else {
                    engine.pause().await
                };
                match res {
                    Ok(()) => self.paused = !self.paused,
                    Err(e) => self.set_error(format!("Could not toggle playback: {:#}", e)),
                }
            }
            PlayerCommand::Next => {
                if let Some(id) = self.cursor.next_id() {
                    self.go(nav, Location::Song(id));
                }
            }
            PlayerCommand::Previous => {
                if let Some(id) = self.cursor.prev_id() {
                    self.go(nav, Location::Song(id));
                }
            }
            PlayerCommand::ToggleShuffle => self.cursor.toggle_shuffle(),
            PlayerCommand::ToggleRepeat => self.cursor.toggle_repeat(),
            PlayerCommand::SeekRelative(delta) => {
                let target = self.progress.seek_relative(delta);
                self.seek(engine, target).await;
            }
            PlayerCommand::SeekFraction(fraction) => {
                let target = self.progress.seek_from_fraction(fraction);
                self.seek(engine, target).await;
            }
            PlayerCommand::ChangeVolume(delta) => {
                let volume = (self.volume + delta).clamp(0.0, 1.0);
                match engine.set_volume(volume).await {
                    Ok(()) => self.volume = volume,
                    Err(e) => self.set_error(format!("Could not set volume: {:#}", e)),
                }
            }
            PlayerCommand::ToggleMute => match engine.set_muted(!self.muted).await {
                Ok(()) => self.muted = !self.muted,
                Err(e) => self.set_error(format!("Could not toggle mute: {:#}", e)),
            },
        }

        Flow::Redraw
    }

    pub fn status_line(&self, title: &str) -> String {
        let state = if self.is_paused() { "||" } else { ">" };
        let progress = self.progress();
        let cursor = self.cursor();
        let position = match cursor.current_index() {
            Some(idx) => format!("{}/{}", idx + 1, cursor.active_order().len()),
            None => format!("-/{}", cursor.active_order().len()),
        };
        let mut line = format!(
            "{} [{}] {}  {} {} {}  vol {:.0}%",
            state,
            position,
            title,
            progress.elapsed_label(),
            progress.bar(20),
            progress.duration_label(),
            self.volume * 100.0
        );
        if cursor.is_shuffle() {
            line.push_str("  [shuffle]");
        }
        if cursor.is_repeat() {
            line.push_str("  [repeat]");
        }
        if self.is_muted() {
            line.push_str("  [muted]");
        }
        if let Some(err) = self.error() {
            line.push_str(&format!("  ! {}", err));
        }
        line
    }

    async fn track_ended(&mut self, engine: &mut dyn PlaybackEngine, nav: &mut dyn Navigator) -> Flow {
        match self.cursor.on_track_ended() {
            EndAction::Restart => {
                let res = match engine.seek_to(0.0).await {
                    Ok(()) => engine.play().await,
                    Err(e) => Err(e),
                };
                match res {
                    Ok(()) => {
                        self.throttle.reset();
                        self.progress.position = 0.0;
                        self.paused = false;
                    }
                    Err(e) => self.set_error(format!("Could not restart track: {:#}", e)),
                }
            }
            EndAction::Navigate(id) => self.go(nav, Location::Song(id)),
            EndAction::Stay => self.paused = true,
        }
        Flow::Redraw
    }

    fn go(&mut self, nav: &mut dyn Navigator, to: Location) {
        if let Err(e) = nav.navigate(to) {
            warn!("navigation to {} failed: {:#}", to, e);
            self.set_error(e.to_string());
        }
    }

    async fn seek(&mut self, engine: &mut dyn PlaybackEngine, target: Option<f64>) {
        let Some(target) = target else {
            return;
        };
        match engine.seek_to(target).await {
            Ok(()) => {
                // A held pre-seek position must not land after the seek.
                self.throttle.reset();
                self.progress.position = target;
            }
            Err(e) => self.set_error(format!("Could not seek: {:#}", e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::navigation::PendingNavigator;
    use crate::playback::cursor::TrackId;
    use crate::state::flags::{MemoryFlagStore, REPEAT_KEY};
    use async_trait::async_trait;
    use rand::SeedableRng;
    use std::collections::VecDeque;

    #[derive(Default)]
    struct FakeEngine {
        calls: Vec<String>,
        refuse_play: bool,
        queued: VecDeque<EngineEvent>,
    }

    #[async_trait]
    impl PlaybackEngine for FakeEngine {
        async fn load(&mut self, source: &str) -> Result<()> {
            self.calls.push(format!("load {}", source));
            Ok(())
        }

        async fn play(&mut self) -> Result<()> {
            if self.refuse_play {
                anyhow::bail!("not allowed");
            }
            self.calls.push("play".to_string());
            Ok(())
        }

        async fn pause(&mut self) -> Result<()> {
            self.calls.push("pause".to_string());
            Ok(())
        }

        async fn seek_to(&mut self, seconds: f64) -> Result<()> {
            self.calls.push(format!("seek {}", seconds));
            Ok(())
        }

        async fn set_volume(&mut self, volume: f64) -> Result<()> {
            self.calls.push(format!("volume {}", volume));
            Ok(())
        }

        async fn set_muted(&mut self, muted: bool) -> Result<()> {
            self.calls.push(format!("mute {}", muted));
            Ok(())
        }

        fn try_next_event(&mut self) -> Option<EngineEvent> {
            self.queued.pop_front()
        }
    }

    fn session(ids: &[TrackId], current: TrackId, store: MemoryFlagStore) -> Session<MemoryFlagStore> {
        let cursor = PlaylistCursor::new(ids.to_vec(), Some(current), store, StdRng::seed_from_u64(1));
        Session::new(cursor, Duration::from_millis(200), 0.5)
    }

    #[tokio::test]
    async fn test_start_plays_at_configured_volume() {
        let mut engine = FakeEngine::default();
        let mut s = session(&[1, 2], 1, MemoryFlagStore::new());

        s.start(&mut engine, "song.mp3").await.unwrap();
        assert_eq!(engine.calls, vec!["load song.mp3", "volume 0.5", "play"]);
        assert!(!s.is_paused());
    }

    #[tokio::test]
    async fn test_refused_autoplay_stays_paused() {
        let mut engine = FakeEngine {
            refuse_play: true,
            ..Default::default()
        };
        let mut s = session(&[1, 2], 1, MemoryFlagStore::new());

        s.start(&mut engine, "song.mp3").await.unwrap();
        assert!(s.is_paused());
    }

    #[tokio::test]
    async fn test_ended_navigates_to_next() {
        let mut engine = FakeEngine::default();
        let mut nav = PendingNavigator::new();
        let mut s = session(&[10, 20, 30], 30, MemoryFlagStore::new());

        s.handle_event(EngineEvent::Ended, &mut engine, &mut nav, Instant::now()).await;
        assert_eq!(nav.take(), Some(Location::Song(10)));
        assert!(engine.calls.is_empty());
    }

    #[tokio::test]
    async fn test_ended_with_repeat_restarts() {
        let mut engine = FakeEngine::default();
        let mut nav = PendingNavigator::new();
        let store = MemoryFlagStore::new().with(REPEAT_KEY, true);
        let mut s = session(&[10, 20, 30], 20, store);

        let now = Instant::now();
        s.handle_event(EngineEvent::TimeAdvanced { position: 99.0 }, &mut engine, &mut nav, now).await;
        s.handle_event(EngineEvent::Ended, &mut engine, &mut nav, now).await;

        assert!(nav.take().is_none());
        assert_eq!(engine.calls, vec!["seek 0", "play"]);
        assert_eq!(s.progress().position, 0.0);
        assert_eq!(s.cursor().current_index(), Some(1));
    }

    #[tokio::test]
    async fn test_error_leaves_state_alone() {
        let mut engine = FakeEngine::default();
        let mut nav = PendingNavigator::new();
        let mut s = session(&[10, 20], 10, MemoryFlagStore::new());

        let event = EngineEvent::Error {
            code: MEDIA_ERR_SRC_NOT_SUPPORTED,
            message: "missing".to_string(),
        };
        s.handle_event(event, &mut engine, &mut nav, Instant::now()).await;

        assert!(nav.take().is_none());
        assert!(engine.calls.is_empty());
        assert!(s.error().is_some());
        assert_eq!(s.cursor().next_id(), Some(20));
    }

    #[tokio::test]
    async fn test_progress_is_throttled() {
        let mut engine = FakeEngine::default();
        let mut nav = PendingNavigator::new();
        let mut s = session(&[1], 1, MemoryFlagStore::new());
        let start = Instant::now();

        let flow = s
            .handle_event(EngineEvent::MetadataReady { duration: 100.0 }, &mut engine, &mut nav, start)
            .await;
        assert_eq!(flow, Flow::Redraw);

        let first = EngineEvent::TimeAdvanced { position: 1.0 };
        assert_eq!(s.handle_event(first, &mut engine, &mut nav, start).await, Flow::Redraw);

        let early = EngineEvent::TimeAdvanced { position: 1.1 };
        let at = start + Duration::from_millis(50);
        assert_eq!(s.handle_event(early, &mut engine, &mut nav, at).await, Flow::Continue);
        assert_eq!(s.progress().position, 1.0);

        assert_eq!(s.tick(start + Duration::from_millis(100)), Flow::Continue);
        assert_eq!(s.tick(start + Duration::from_millis(250)), Flow::Redraw);
        assert_eq!(s.progress().position, 1.1);
    }

    #[tokio::test]
    async fn test_next_and_previous_commands() {
        let mut engine = FakeEngine::default();
        let mut nav = PendingNavigator::new();
        let mut s = session(&[10, 20, 30], 20, MemoryFlagStore::new());

        s.handle_command(PlayerCommand::Next, &mut engine, &mut nav).await;
        assert_eq!(nav.take(), Some(Location::Song(30)));

        s.handle_command(PlayerCommand::Previous, &mut engine, &mut nav).await;
        assert_eq!(nav.take(), Some(Location::Song(10)));
    }

    #[tokio::test]
    async fn test_empty_playlist_never_navigates() {
        let mut engine = FakeEngine::default();
        let mut nav = PendingNavigator::new();
        let mut s = session(&[], 1, MemoryFlagStore::new());

        s.handle_command(PlayerCommand::Next, &mut engine, &mut nav).await;
        s.handle_command(PlayerCommand::Previous, &mut engine, &mut nav).await;
        s.handle_event(EngineEvent::Ended, &mut engine, &mut nav, Instant::now()).await;
        assert!(nav.take().is_none());
    }

    #[tokio::test]
    async fn test_seek_and_toggles() {
        let mut engine = FakeEngine::default();
        let mut nav = PendingNavigator::new();
        let mut s = session(&[1, 2, 3], 2, MemoryFlagStore::new());
        let now = Instant::now();

        s.handle_event(EngineEvent::MetadataReady { duration: 60.0 }, &mut engine, &mut nav, now).await;
        s.handle_command(PlayerCommand::SeekRelative(-10.0), &mut engine, &mut nav).await;
        s.handle_command(PlayerCommand::SeekFraction(0.5), &mut engine, &mut nav).await;
        s.handle_command(PlayerCommand::ToggleMute, &mut engine, &mut nav).await;
        s.handle_command(PlayerCommand::ChangeVolume(0.7), &mut engine, &mut nav).await;
        s.handle_command(PlayerCommand::TogglePlay, &mut engine, &mut nav).await;

        assert_eq!(engine.calls, vec!["seek 0", "seek 30", "mute true", "volume 1", "play"]);
        assert!(s.is_muted());
        assert_eq!(s.volume(), 1.0);
        assert!(!s.is_paused());

        s.handle_command(PlayerCommand::ToggleShuffle, &mut engine, &mut nav).await;
        assert_eq!(s.cursor().active_order()[0], 2);
        let status = s.status_line("Song");
        assert!(status.contains("[shuffle]"));
        assert!(status.contains("[1/3]"));
        assert!(status.contains("vol 100%"));

        s.handle_command(PlayerCommand::ChangeVolume(-0.25), &mut engine, &mut nav).await;
        assert_eq!(s.volume(), 0.75);

        let flow = s.handle_command(PlayerCommand::Quit, &mut engine, &mut nav).await;
        assert_eq!(flow, Flow::Quit);
    }

    #[tokio::test]
    async fn test_seek_drops_held_progress() {
        let mut engine = FakeEngine::default();
        let mut nav = PendingNavigator::new();
        let mut s = session(&[1, 2], 1, MemoryFlagStore::new());
        let start = Instant::now();

        s.handle_event(EngineEvent::MetadataReady { duration: 100.0 }, &mut engine, &mut nav, start).await;
        s.handle_event(EngineEvent::TimeAdvanced { position: 50.0 }, &mut engine, &mut nav, start).await;
        let held = start + Duration::from_millis(50);
        s.handle_event(EngineEvent::TimeAdvanced { position: 50.1 }, &mut engine, &mut nav, held).await;

        s.handle_command(PlayerCommand::SeekRelative(-10.0), &mut engine, &mut nav).await;
        assert_eq!(s.progress().position, 40.0);

        s.tick(start + Duration::from_millis(250));
        assert_eq!(s.progress().position, 40.0);
    }

    #[tokio::test]
    async fn test_start_discards_previous_track_events() {
        let mut engine = FakeEngine::default();
        engine.queued.push_back(EngineEvent::MetadataReady { duration: 300.0 });
        engine.queued.push_back(EngineEvent::TimeAdvanced { position: 250.0 });
        let mut nav = PendingNavigator::new();
        let mut s = session(&[1, 2], 2, MemoryFlagStore::new());

        s.start(&mut engine, "next.mp3").await.unwrap();
        assert!(engine.try_next_event().is_none());

        let now = Instant::now();
        s.handle_event(EngineEvent::TimeAdvanced { position: 0.5 }, &mut engine, &mut nav, now).await;
        assert_eq!(s.progress(), Progress { position: 0.5, duration: 0.0 });
    }
}
