use std::fmt;

use anyhow::bail;
use tracing::info;

use crate::playback::cursor::TrackId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Location {
    Song(TrackId),
    Artist(i64),
    Album(i64),
    Playlist(i64),
}

impl Location {
    pub fn path(&self) -> String {
        match self {
            Location::Song(id) => format!("/player/?id={}", id),
            Location::Artist(id) => format!("/artista/{}/", id),
            Location::Album(id) => format!("/album/{}/", id),
            Location::Playlist(id) => format!("/playlist/{}/", id),
        }
    }

    /// Maps a clicked library item to where it leads, using the item's kind
    /// label (`song`/`cancion`, `artist`, `album`, `playlist`).
    pub fn for_item(kind: &str, id: i64) -> Option<Self> {
        let kind = kind.to_lowercase();
        if kind.contains("cancion") || kind.contains("song") {
            Some(Location::Song(id))
        } else if kind.contains("artist") {
            Some(Location::Artist(id))
        } else if kind.contains("album") {
            Some(Location::Album(id))
        } else if kind.contains("playlist") {
            Some(Location::Playlist(id))
        } else {
            None
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

pub trait Navigator {
    fn navigate(&mut self, to: Location) -> anyhow::Result<()>;
}

/// Remembers the last requested location so the player loop can rebuild
/// itself around it.
#[derive(Debug, Default)]
pub struct PendingNavigator {
    pending: Option<Location>,
}

impl PendingNavigator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn take(&mut self) -> Option<Location> {
        self.pending.take()
    }
}

impl Navigator for PendingNavigator {
    fn navigate(&mut self, to: Location) -> anyhow::Result<()> {
        if let Location::Playlist(id) = to {
            bail!("Playlist {} cannot be opened: playlists are not available yet", id);
        }
        info!("navigating to {}", to);
        self.pending = Some(to);
        Ok(())
    }
}
