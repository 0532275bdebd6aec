use rand::{rngs::StdRng, seq::SliceRandom, Rng, SeedableRng};
use tracing::{debug, warn};

use crate::playback::events::EndAction;
use crate::state::flags::{FlagStore, REPEAT_KEY, SHUFFLE_KEY};

pub type TrackId = i64;

/// Position within a playlist plus the shuffle/repeat preferences.
///
/// A cursor lives for one player session. Moving to another track never
/// mutates it: the caller computes the target with [`next_id`] or
/// [`prev_id`], navigates, and builds a fresh cursor for the new track.
///
/// [`next_id`]: PlaylistCursor::next_id
/// [`prev_id`]: PlaylistCursor::prev_id
pub struct PlaylistCursor<S, R = StdRng> {
    original_order: Vec<TrackId>,
    active_order: Vec<TrackId>,
    current_id: Option<TrackId>,
    current_index: Option<usize>,
    shuffle: bool,
    repeat: bool,
    store: S,
    rng: R,
}

impl<S: FlagStore> PlaylistCursor<S, StdRng> {
    pub fn with_entropy(ids: Vec<TrackId>, current: TrackId, store: S) -> Self {
        Self::new(ids, Some(current), store, StdRng::from_entropy())
    }
}

impl<S: FlagStore, R: Rng> PlaylistCursor<S, R> {
    pub fn new(ids: Vec<TrackId>, current: Option<TrackId>, store: S, rng: R) -> Self {
        let shuffle = store.get(SHUFFLE_KEY);
        let repeat = store.get(REPEAT_KEY);

        let mut cursor = Self {
            active_order: ids.clone(),
            original_order: ids,
            current_id: current,
            current_index: None,
            shuffle,
            repeat,
            store,
            rng,
        };

        if cursor.shuffle {
            cursor.apply_shuffle();
        }
        cursor.reindex();

        debug!(
            tracks = cursor.original_order.len(),
            current = ?cursor.current_id,
            index = ?cursor.current_index,
            shuffle = cursor.shuffle,
            repeat = cursor.repeat,
            "playlist cursor ready"
        );

        cursor
    }

    /// Builds a cursor from the textual form a page embeds: a JSON array of
    /// ids and the current id. Anything unparsable yields an empty playlist.
    pub fn from_serialized(ids_json: &str, current: &str, store: S, rng: R) -> Self {
        let ids = serde_json::from_str::<Vec<TrackId>>(ids_json);
        let current = current.trim().parse::<TrackId>();

        match (ids, current) {
            (Ok(ids), Ok(current)) => Self::new(ids, Some(current), store, rng),
            (ids, current) => {
                if let Err(e) = ids {
                    warn!("malformed playlist ids, using an empty playlist: {}", e);
                }
                if let Err(e) = current {
                    warn!("malformed current id, using an empty playlist: {}", e);
                }
                Self::new(Vec::new(), None, store, rng)
            }
        }
    }

    pub fn active_order(&self) -> &[TrackId] {
        &self.active_order
    }

    pub fn current_index(&self) -> Option<usize> {
        self.current_index
    }

    pub fn is_shuffle(&self) -> bool {
        self.shuffle
    }

    pub fn is_repeat(&self) -> bool {
        self.repeat
    }

    pub fn toggle_shuffle(&mut self) {
        self.shuffle = !self.shuffle;
        self.store.set(SHUFFLE_KEY, self.shuffle);

        if self.shuffle {
            self.apply_shuffle();
        } else {
            self.active_order = self.original_order.clone();
        }
        self.reindex();

        debug!(shuffle = self.shuffle, order = ?self.active_order, "shuffle toggled");
    }

    pub fn toggle_repeat(&mut self) {
        self.repeat = !self.repeat;
        self.store.set(REPEAT_KEY, self.repeat);

        debug!(repeat = self.repeat, "repeat toggled");
    }

    /// The id after the current one. The playlist is circular whatever the
    /// repeat flag says.
    pub fn next_id(&self) -> Option<TrackId> {
        let len = self.active_order.len();
        if len == 0 {
            return None;
        }

        let next = match self.current_index {
            Some(idx) => (idx + 1) % len,
            None => 0,
        };
        self.active_order.get(next).copied()
    }

    pub fn prev_id(&self) -> Option<TrackId> {
        let len = self.active_order.len();
        if len == 0 {
            return None;
        }

        let prev = match self.current_index {
            Some(idx) => (idx + len - 1) % len,
            None => len - 1,
        };
        self.active_order.get(prev).copied()
    }

    pub fn on_track_ended(&self) -> EndAction {
        if self.repeat {
            return EndAction::Restart;
        }

        match self.next_id() {
            Some(id) => EndAction::Navigate(id),
            None => EndAction::Stay,
        }
    }

    fn apply_shuffle(&mut self) {
        let mut rest = self.original_order.clone();

        // Only the first occurrence is pinned so duplicates keep their count.
        let pinned = self
            .current_id
            .and_then(|id| rest.iter().position(|&t| t == id))
            .map(|pos| rest.remove(pos));

        rest.shuffle(&mut self.rng);

        self.active_order = match pinned {
            Some(id) => std::iter::once(id).chain(rest).collect(),
            None => rest,
        };
    }

    fn reindex(&mut self) {
        self.current_index = self
            .current_id
            .and_then(|id| self.active_order.iter().position(|&t| t == id));
    }
}
