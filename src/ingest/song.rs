//! Song-metadata records
//!
//! The song source has a fixed schema, enforced strictly: a wrong-typed field
//! or a missing required field fails the read. No coercion, no partial
//! acceptance.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// One song-metadata record.
///
/// `song_id`, `artist_id`, `title` and `year` are required (non-nullable);
/// the rest may be absent or null.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SongRecord {
    #[serde(default)]
    pub num_songs: Option<i64>,
    pub artist_id: String,
    #[serde(default)]
    pub artist_latitude: Option<f64>,
    #[serde(default)]
    pub artist_longitude: Option<f64>,
    #[serde(default)]
    pub artist_location: Option<String>,
    #[serde(default)]
    pub artist_name: Option<String>,
    pub song_id: String,
    pub title: String,
    #[serde(default)]
    pub duration: Option<f64>,
    pub year: i32,
}

/// Parse the song records in one file.
///
/// `path` labels schema violations so a bad file can be located.
pub fn parse_song_records(path: &str, content: &str) -> Result<Vec<SongRecord>> {
    let documents =
        super::parse_json_documents(content).map_err(|e| Error::schema(path, e.to_string()))?;

    documents
        .into_iter()
        .map(|value| serde_json::from_value(value).map_err(|e| Error::schema(path, e.to_string())))
        .collect()
}
