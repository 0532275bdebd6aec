use std::path::{Path, PathBuf};

use anyhow::Result;

use crate::state::{Config, Library};

/// Writes a default config and an empty library into the data directory,
/// leaving files that already exist alone. Returns what was created.
pub fn create_missing(config: &Config, library_path: &Path) -> Result<Vec<PathBuf>> {
    let mut created = Vec::new();

    let config_path = config.config_path();
    if !config_path.exists() {
        config.save(&config_path)?;
        created.push(config_path);
    }

    if !library_path.exists() {
        Library::default().save(library_path)?;
        created.push(library_path.to_path_buf());
    }

    Ok(created)
}

pub fn run(config: &Config, library_path: &Path) -> Result<()> {
    let created = create_missing(config, library_path)?;

    if created.is_empty() {
        println!("Already initialized in {:?}", config.data_dir);
        return Ok(());
    }

    for path in &created {
        println!("  Created {:?}", path);
    }
    println!("\nAdd songs to {:?} and run 'playnav play <id>'.", library_path);
    Ok(())
}
