use std::{fs, path::Path};

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::playback::cursor::TrackId;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Song {
    pub id: TrackId,
    pub title: String,
    pub artist: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub album: Option<String>,
    /// File path or URL handed to the playback engine.
    pub source: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Artist {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Album {
    pub id: i64,
    pub title: String,
    pub artist: String,
}

/// Songs in playlist order, with the artists and albums they belong to.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Library {
    #[serde(default)]
    pub songs: Vec<Song>,
    #[serde(default)]
    pub artists: Vec<Artist>,
    #[serde(default)]
    pub albums: Vec<Album>,
}

#[derive(Debug, Default, PartialEq)]
pub struct Matches<'a> {
    pub songs: Vec<&'a Song>,
    pub artists: Vec<&'a Artist>,
    pub albums: Vec<&'a Album>,
}

impl Matches<'_> {
    pub fn is_empty(&self) -> bool {
        self.songs.is_empty() && self.artists.is_empty() && self.albums.is_empty()
    }
}

impl Library {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read library from {:?}", path))?;

        serde_yaml::from_str(&content).with_context(|| "Failed to parse library YAML")
    }

    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        let yaml = serde_yaml::to_string(self).with_context(|| "Failed to serialize library")?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {:?}", parent))?;
        }

        fs::write(path, yaml).with_context(|| format!("Failed to write library to {:?}", path))
    }

    pub fn ids(&self) -> Vec<TrackId> {
        self.songs.iter().map(|s| s.id).collect()
    }

    pub fn song(&self, id: TrackId) -> Option<&Song> {
        self.songs.iter().find(|s| s.id == id)
    }

    /// Case-insensitive substring search. Songs and albums match on title or
    /// artist, artists on name. An empty term matches everything.
    pub fn search(&self, term: &str) -> Matches<'_> {
        let term = term.trim().to_lowercase();
        let hit = |text: &str| text.to_lowercase().contains(&term);

        Matches {
            songs: self
                .songs
                .iter()
                .filter(|s| hit(s.title.as_str()) || hit(s.artist.as_str()))
                .collect(),
            artists: self.artists.iter().filter(|a| hit(a.name.as_str())).collect(),
            albums: self
                .albums
                .iter()
                .filter(|a| hit(a.title.as_str()) || hit(a.artist.as_str()))
                .collect(),
        }
    }
}
