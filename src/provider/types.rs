use serde::{Deserialize, Serialize};

use crate::playback::cursor::TrackId;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Suggestion {
    pub id: TrackId,
    #[serde(alias = "titulo")]
    pub title: String,
    #[serde(alias = "artista")]
    pub artist: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SuggestionResponse {
    #[serde(default)]
    pub results: Vec<Suggestion>,
}
