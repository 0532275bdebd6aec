use anyhow::Result;
use async_trait::async_trait;

use crate::playback::events::EngineEvent;

/// Something that can decode and play one audio source at a time.
#[async_trait]
pub trait PlaybackEngine: Send {
    async fn load(&mut self, source: &str) -> Result<()>;

    async fn play(&mut self) -> Result<()>;

    async fn pause(&mut self) -> Result<()>;

    /// Absolute seek, in seconds.
    async fn seek_to(&mut self, seconds: f64) -> Result<()>;

    /// `volume` is in `[0, 1]`.
    async fn set_volume(&mut self, volume: f64) -> Result<()>;

    async fn set_muted(&mut self, muted: bool) -> Result<()>;

    /// Next queued notification, without waiting.
    fn try_next_event(&mut self) -> Option<EngineEvent>;
}
