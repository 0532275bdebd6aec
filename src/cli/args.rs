use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::playback::cursor::TrackId;

/// playnav - terminal player for a music library
///
/// Plays songs from a library snapshot with shuffle/repeat that persist
/// between runs, and looks up songs on the library server.
#[derive(Parser, Debug)]
#[command(name = "playnav")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Directory holding config.toml, flags.json and library.yaml
    #[arg(short, long, global = true, default_value = ".playnav")]
    pub data_dir: PathBuf,

    /// Library snapshot to use instead of <data-dir>/library.yaml
    #[arg(short = 'L', long, global = true)]
    pub library: Option<PathBuf>,

    #[arg(short, long, global = true, default_value_t = false)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create a default config and an empty library in the data directory
    Init,
    /// Play a song from the library and keep going through the playlist
    Play {
        /// Song id to start with
        id: TrackId,
    },
    /// Open a library item: songs start playing, other items print their page
    Open {
        /// Item kind: song, artist, album or playlist
        kind: String,
        /// Item id
        id: i64,
    },
    /// Print the song that follows the current one
    Next {
        /// Playlist ids as a JSON array, e.g. "[10, 20, 30]"
        #[arg(long)]
        ids: String,
        /// Id of the current song
        #[arg(long)]
        current: String,
    },
    /// Print the song that precedes the current one
    Prev {
        /// Playlist ids as a JSON array, e.g. "[10, 20, 30]"
        #[arg(long)]
        ids: String,
        /// Id of the current song
        #[arg(long)]
        current: String,
    },
    /// Toggle shuffle
    Shuffle,
    /// Toggle repeat of the current song
    Repeat,
    /// Show shuffle and repeat settings
    Status,
    /// Search songs, artists and albums in the library
    Find {
        /// Search term (empty lists everything)
        #[arg(default_value = "")]
        term: String,
    },
    /// Ask the library server for song suggestions
    Suggest {
        /// Search query (at least 2 characters)
        query: String,
        /// Library server base URL
        #[arg(long, env = "PLAYNAV_SERVER_URL")]
        server_url: Option<String>,
    },
}
