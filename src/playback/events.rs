use crate::playback::cursor::TrackId;

/// What to do once the current track has played to its end.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndAction {
    /// Seek back to zero and keep playing.
    Restart,
    Navigate(TrackId),
    Stay,
}

/// Source not supported or file not found.
pub const MEDIA_ERR_SRC_NOT_SUPPORTED: i32 = 4;

#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    MetadataReady { duration: f64 },
    TimeAdvanced { position: f64 },
    Ended,
    Error { code: i32, message: String },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PlayerCommand {
    TogglePlay,
    Next,
    Previous,
    ToggleShuffle,
    ToggleRepeat,
    SeekRelative(f64),
    SeekFraction(f64),
    /// Volume step, applied within `[0, 1]`.
    ChangeVolume(f64),
    ToggleMute,
    Quit,
}
