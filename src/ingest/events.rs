//! Event-log records
//!
//! Event files have no fixed schema; records are kept as raw JSON objects and
//! projected later. Only `page == "NextSong"` rows describe song plays.

use crate::error::{Error, Result};
use crate::types::JsonValue;

/// Page value marking a song-play event
pub const PAGE_NEXT_SONG: &str = "NextSong";

/// Parse the event records in one file.
///
/// Malformed JSON is fatal; non-object documents are rejected because every
/// downstream projection expects named columns.
pub fn parse_log_events(path: &str, content: &str) -> Result<Vec<JsonValue>> {
    let documents =
        super::parse_json_documents(content).map_err(|e| Error::schema(path, e.to_string()))?;

    for document in &documents {
        if !document.is_object() {
            return Err(Error::schema(path, "expected a JSON object per record"));
        }
    }
    Ok(documents)
}

/// Keep only song-play events
pub fn filter_next_song(events: Vec<JsonValue>) -> Vec<JsonValue> {
    events
        .into_iter()
        .filter(|event| {
            event
                .get("page")
                .and_then(JsonValue::as_str)
                .is_some_and(|page| page == PAGE_NEXT_SONG)
        })
        .collect()
}
