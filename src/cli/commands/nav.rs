use anyhow::Result;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::navigation::Location;
use crate::playback::cursor::PlaylistCursor;
use crate::state::flags::{FlagStore, REPEAT_KEY, SHUFFLE_KEY};
use crate::state::{Config, FileFlagStore};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Next,
    Prev,
}

/// Where the next/prev button would send the user. `None` for an empty or
/// malformed playlist.
pub fn step<S: FlagStore, R: Rng>(
    direction: Direction,
    ids: &str,
    current: &str,
    store: S,
    rng: R,
) -> Option<Location> {
    let cursor = PlaylistCursor::from_serialized(ids, current, store, rng);
    let id = match direction {
        Direction::Next => cursor.next_id(),
        Direction::Prev => cursor.prev_id(),
    }?;
    Some(Location::Song(id))
}

pub fn run_step(direction: Direction, ids: &str, current: &str, config: &Config) -> Result<()> {
    let store = FileFlagStore::new(config.flags_path());

    match step(direction, ids, current, store, StdRng::from_entropy()) {
        Some(location) => println!("{}", location),
        None => println!("Playlist is empty, nothing to play"),
    }
    Ok(())
}

pub fn toggle(key: &str, config: &Config) -> Result<()> {
    let mut store = FileFlagStore::new(config.flags_path());
    let enabled = toggle_flag(&mut store, key);

    let name = if key == SHUFFLE_KEY { "Shuffle" } else { "Repeat" };
    println!("{} {}", name, if enabled { "on" } else { "off" });
    Ok(())
}

pub fn toggle_flag<S: FlagStore>(store: &mut S, key: &str) -> bool {
    let enabled = !store.get(key);
    store.set(key, enabled);
    enabled
}

pub fn status(config: &Config) -> Result<()> {
    let store = FileFlagStore::new(config.flags_path());
    let on_off = |v: bool| if v { "on" } else { "off" };

    println!("Shuffle: {}", on_off(store.get(SHUFFLE_KEY)));
    println!("Repeat:  {}", on_off(store.get(REPEAT_KEY)));
    println!("Stored in {:?}", store.path());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::flags::MemoryFlagStore;

    fn rng() -> StdRng {
        StdRng::seed_from_u64(5)
    }

    #[test]
    fn test_step() {
        let store = MemoryFlagStore::new();
        assert_eq!(
            step(Direction::Next, "[10, 20, 30]", "30", store.clone(), rng()),
            Some(Location::Song(10))
        );
        assert_eq!(
            step(Direction::Prev, "[10, 20, 30]", "20", store, rng()),
            Some(Location::Song(10))
        );
    }

    #[test]
    fn test_step_malformed() {
        assert_eq!(step(Direction::Next, "oops", "1", MemoryFlagStore::new(), rng()), None);
        assert_eq!(step(Direction::Prev, "[]", "1", MemoryFlagStore::new(), rng()), None);
    }

    #[test]
    fn test_step_with_shuffle_stays_in_playlist() {
        let store = MemoryFlagStore::new().with(SHUFFLE_KEY, true);
        let next = step(Direction::Next, "[1, 2, 3, 4]", "2", store, rng()).unwrap();
        assert!(matches!(next, Location::Song(id) if [1, 3, 4].contains(&id)));
    }

    #[test]
    fn test_toggle_flag() {
        let mut store = MemoryFlagStore::new();
        assert!(toggle_flag(&mut store, REPEAT_KEY));
        assert!(store.get(REPEAT_KEY));
        assert!(!toggle_flag(&mut store, REPEAT_KEY));
        assert!(!store.get(SHUFFLE_KEY));
    }
}
