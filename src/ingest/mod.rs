//! JSON ingestion
//!
//! Reads the two input sources: song-metadata files (strict, fixed schema)
//! and event-log files (lenient, schema inferred). Both are newline-delimited
//! JSON; a file holding a single top-level object or array is also accepted.

mod events;
mod song;

pub use events::{filter_next_song, parse_log_events, PAGE_NEXT_SONG};
pub use song::{parse_song_records, SongRecord};

use crate::types::JsonValue;

/// Split a file's content into JSON documents.
///
/// A payload that parses as one document yields that object (or the elements
/// of that array); anything else is treated as one document per line.
fn parse_json_documents(content: &str) -> Result<Vec<JsonValue>, serde_json::Error> {
    let trimmed = content.trim();
    if trimmed.is_empty() {
        return Ok(Vec::new());
    }

    if let Ok(value) = serde_json::from_str::<JsonValue>(trimmed) {
        return Ok(match value {
            JsonValue::Array(items) => items,
            other => vec![other],
        });
    }

    trimmed
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(serde_json::from_str)
        .collect()
}
