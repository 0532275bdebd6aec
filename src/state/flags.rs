use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
};

use anyhow::Context;
use tracing::{debug, warn};

pub const SHUFFLE_KEY: &str = "playerShuffle";
pub const REPEAT_KEY: &str = "playerRepeat";

/// Durable boolean settings. A missing or unreadable entry reads as `false`
/// and write failures never reach the caller.
pub trait FlagStore {
    fn get(&self, key: &str) -> bool;
    fn set(&mut self, key: &str, value: bool);
}

/// Flags kept as a JSON object in a single file.
#[derive(Debug, Clone)]
pub struct FileFlagStore {
    path: PathBuf,
}

impl FileFlagStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> anyhow::Result<BTreeMap<String, bool>> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }

        let content = fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read flags from {:?}", self.path))?;

        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse flags in {:?}", self.path))
    }

    fn write_all(&self, flags: &BTreeMap<String, bool>) -> anyhow::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {:?}", parent))?;
        }

        let json = serde_json::to_string_pretty(flags).context("Failed to serialize flags")?;

        fs::write(&self.path, json)
            .with_context(|| format!("Failed to write flags to {:?}", self.path))
    }
}

impl FlagStore for FileFlagStore {
    fn get(&self, key: &str) -> bool {
        match self.read_all() {
            Ok(flags) => flags.get(key).copied().unwrap_or(false),
            Err(e) => {
                debug!("flag {} treated as unset: {:#}", key, e);
                false
            }
        }
    }

    fn set(&mut self, key: &str, value: bool) {
        // An unreadable file is replaced rather than blocking the toggle.
        let mut flags = self.read_all().unwrap_or_default();
        flags.insert(key.to_string(), value);

        if let Err(e) = self.write_all(&flags) {
            warn!("could not persist flag {}: {:#}", key, e);
        }
    }
}

#[cfg(test)]
#[derive(Debug, Default, Clone)]
pub struct MemoryFlagStore {
    flags: BTreeMap<String, bool>,
}

#[cfg(test)]
impl MemoryFlagStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: &str, value: bool) -> Self {
        self.flags.insert(key.to_string(), value);
        self
    }
}

#[cfg(test)]
impl FlagStore for MemoryFlagStore {
    fn get(&self, key: &str) -> bool {
        self.flags.get(key).copied().unwrap_or(false)
    }

    fn set(&mut self, key: &str, value: bool) {
        self.flags.insert(key.to_string(), value);
    }
}

#[cfg(test)]
impl<T: FlagStore + ?Sized> FlagStore for &mut T {
    fn get(&self, key: &str) -> bool {
        (**self).get(key)
    }

    fn set(&mut self, key: &str, value: bool) {
        (**self).set(key, value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_reads_false() {
        let temp = TempDir::new().unwrap();
        let store = FileFlagStore::new(temp.path().join("flags.json"));

        assert!(!store.get(SHUFFLE_KEY));
        assert!(!store.get(REPEAT_KEY));
    }

    #[test]
    fn test_set_and_reload() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("nested").join("flags.json");

        let mut store = FileFlagStore::new(&path);
        store.set(SHUFFLE_KEY, true);
        store.set(REPEAT_KEY, false);

        let reopened = FileFlagStore::new(&path);
        assert!(reopened.get(SHUFFLE_KEY));
        assert!(!reopened.get(REPEAT_KEY));
    }

    #[test]
    fn test_corrupt_file_is_unset_and_recovers() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("flags.json");
        fs::write(&path, "not json").unwrap();

        let mut store = FileFlagStore::new(&path);
        assert!(!store.get(REPEAT_KEY));

        store.set(REPEAT_KEY, true);
        assert!(store.get(REPEAT_KEY));
    }

    #[test]
    fn test_unwritable_location_does_not_fail() {
        let temp = TempDir::new().unwrap();
        let blocker = temp.path().join("blocker");
        fs::write(&blocker, "file, not a directory").unwrap();

        let mut store = FileFlagStore::new(blocker.join("flags.json"));
        store.set(SHUFFLE_KEY, true);
        assert!(!store.get(SHUFFLE_KEY));
    }

    #[test]
    fn test_memory_store() {
        let mut store = MemoryFlagStore::new().with(SHUFFLE_KEY, true);
        assert!(store.get(SHUFFLE_KEY));
        assert!(!store.get(REPEAT_KEY));

        store.set(SHUFFLE_KEY, false);
        assert!(!store.get(SHUFFLE_KEY));
    }
}
