use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::Context;
use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub data_dir: PathBuf,
    pub server_url: String,
    pub volume: f64,
    pub progress_interval_ms: u64,
    pub seek_step_secs: f64,
    pub min_query_len: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(".playnav"),
            server_url: "http://127.0.0.1:8000".to_string(),
            volume: 0.5,
            progress_interval_ms: 200,
            seek_step_secs: 10.0,
            min_query_len: 2,
        }
    }
}

impl Config {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config from {:?}", path))?;
        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config TOML from {:?}", path))
    }

    /// Reads `config.toml` from `data_dir`, falling back to defaults (with
    /// that directory) when the file does not exist yet.
    pub fn load_or_default(data_dir: &Path) -> anyhow::Result<Self> {
        let path = data_dir.join("config.toml");
        if !path.exists() {
            debug!("no config at {:?}, using defaults", path);
            return Ok(Self {
                data_dir: data_dir.to_path_buf(),
                ..Self::default()
            });
        }

        let mut config = Self::load(&path)?;
        config.data_dir = data_dir.to_path_buf();
        Ok(config)
    }

    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        let content =
            toml::to_string_pretty(&self).with_context(|| "Failed to serialize config to TOML")?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {:?}", parent))?;
        }

        fs::write(path, content).with_context(|| format!("Failed to write config to {:?}", path))
    }

    pub fn config_path(&self) -> PathBuf {
        self.data_dir.join("config.toml")
    }

    pub fn flags_path(&self) -> PathBuf {
        self.data_dir.join("flags.json")
    }

    pub fn library_path(&self) -> PathBuf {
        self.data_dir.join("library.yaml")
    }

    pub fn progress_interval(&self) -> Duration {
        Duration::from_millis(self.progress_interval_ms)
    }
}
