use std::path::Path;

use anyhow::{bail, Result};

use crate::navigation::Location;
use crate::provider::{self, ServerSuggestions};
use crate::state::{Config, Library};

pub fn find(term: &str, library_path: &Path) -> Result<()> {
    if !library_path.exists() {
        bail!("No library at {:?}. Create one or pass --library.", library_path);
    }

    let library = Library::load(library_path)?;
    let matches = library.search(term);

    if matches.is_empty() {
        println!("Nothing found matching '{}'", term);
        return Ok(());
    }

    if !matches.songs.is_empty() {
        println!("\nSongs:");
        for song in &matches.songs {
            println!("  {} - {}  {}", song.title, song.artist, Location::Song(song.id));
        }
    }

    if !matches.artists.is_empty() {
        println!("\nArtists:");
        for artist in &matches.artists {
            println!("  {}  {}", artist.name, Location::Artist(artist.id));
        }
    }

    if !matches.albums.is_empty() {
        println!("\nAlbums:");
        for album in &matches.albums {
            println!("  {} - {}  {}", album.title, album.artist, Location::Album(album.id));
        }
    }

    Ok(())
}

pub async fn suggest(query: &str, server_url: Option<&str>, config: &Config) -> Result<()> {
    let base_url = server_url.unwrap_or(&config.server_url);
    let source = ServerSuggestions::new(base_url);

    let results = provider::suggest(&source, query, config.min_query_len).await?;

    if results.is_empty() {
        println!("No suggestions for '{}'", query.trim());
        return Ok(());
    }

    for (i, item) in results.iter().enumerate() {
        println!("{}. {} - {}  {}", i + 1, item.title, item.artist, Location::Song(item.id));
    }

    Ok(())
}
