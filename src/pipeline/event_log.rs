//! Event-Log Transform
//!
//! Reads the event-log files, keeps the song-play events, and writes the
//! `users` and `time` dimensions plus the `songplays` fact table. The join
//! step reads `songs` and `artists` back from the output store rather than
//! holding them in memory; the catalog transform's writes must be durably
//! visible before this transform runs.
//!
//! Known limitation, preserved on purpose: `users` dedup is row-level over
//! all five columns, so a user appearing with two `level` values keeps both
//! rows.

use crate::error::{Error, Result};
use crate::ingest::{filter_next_song, parse_log_events};
use crate::output::{read_table, write_table, ParquetWriterConfig, WriteSummary};
use crate::pipeline::{decompose_timestamp, schemas, LOG_DATA_DEPTH, LOG_DATA_PREFIX};
use crate::storage::StorageRoot;
use crate::table::{assign_row_ids, dedup, field_i64, field_str, project};
use crate::types::{JsonValue, TableName};
use std::collections::HashMap;

/// Result of one event-log run
#[derive(Debug)]
pub struct EventLogSummary {
    /// Input files read
    pub files_read: usize,
    /// Events decoded (all pages)
    pub events: usize,
    /// Song-play events after the page filter
    pub plays: usize,
    /// `users` write result
    pub users: WriteSummary,
    /// `time` write result
    pub time: WriteSummary,
    /// `songplays` write result
    pub songplays: WriteSummary,
}

/// The Event-Log Transform
pub struct EventLogTransform {
    input: StorageRoot,
    output: StorageRoot,
    parquet: ParquetWriterConfig,
}

impl EventLogTransform {
    /// Create a transform reading from `input` and writing to `output`
    pub fn new(input: StorageRoot, output: StorageRoot) -> Self {
        Self {
            input,
            output,
            parquet: ParquetWriterConfig::default(),
        }
    }

    /// Override the Parquet writer configuration
    #[must_use]
    pub fn with_parquet_config(mut self, parquet: ParquetWriterConfig) -> Self {
        self.parquet = parquet;
        self
    }

    /// Run the transform
    pub async fn run(&self) -> Result<EventLogSummary> {
        tracing::info!("event-log transform starting");

        let (files_read, events) = self.read_events().await?;
        let total_events = events.len();
        let mut plays = filter_next_song(events);
        tracing::info!(
            files = files_read,
            events = total_events,
            plays = plays.len(),
            "read event logs"
        );

        let users = self.write_users(&plays).await?;

        with_time_columns(&mut plays);
        let time = self.write_time(&plays).await?;

        // Materialization barrier: the catalog tables are read back from
        // storage, and a missing table is fatal here.
        let songs = read_table(&self.output, TableName::Songs).await?;
        let artists = read_table(&self.output, TableName::Artists).await?;

        let mut joined = join_plays(&plays, &songs, &artists);
        assign_row_ids(&mut joined, "songplay_id");
        tracing::info!(matched = joined.len(), "joined plays against song catalog");

        let songplays = self.write_songplays(&joined).await?;

        tracing::info!(
            users = users.rows,
            time = time.rows,
            songplays = songplays.rows,
            "event-log transform complete"
        );

        Ok(EventLogSummary {
            files_read,
            events: total_events,
            plays: plays.len(),
            users,
            time,
            songplays,
        })
    }

    /// Read every log file under the fixed glob
    async fn read_events(&self) -> Result<(usize, Vec<JsonValue>)> {
        let files = self
            .input
            .list_files(LOG_DATA_PREFIX, LOG_DATA_DEPTH, "json")
            .await?;
        if files.is_empty() {
            return Err(Error::NoInputFiles {
                pattern: format!("{}/*/*/*.json", self.input.url(LOG_DATA_PREFIX)),
            });
        }

        let mut events = Vec::new();
        for file in &files {
            let data = self.input.get(file).await?;
            let content = std::str::from_utf8(&data)
                .map_err(|e| Error::schema(file.clone(), format!("not valid UTF-8: {e}")))?;
            events.extend(parse_log_events(file, content)?);
        }
        Ok((files.len(), events))
    }

    /// Project, dedup and write the `users` dimension
    async fn write_users(&self, plays: &[JsonValue]) -> Result<WriteSummary> {
        let columns = ["userId", "firstName", "lastName", "gender", "level"];
        let rows = project(plays, &columns);
        let rows = dedup(rows, &columns);

        write_table(
            &self.output,
            TableName::Users,
            &rows,
            &schemas::users(),
            &[],
            &self.parquet,
        )
        .await
    }

    /// Project, dedup and write the `time` dimension
    async fn write_time(&self, plays: &[JsonValue]) -> Result<WriteSummary> {
        let columns = [
            "ts",
            "start_time",
            "hour",
            "day",
            "week",
            "month",
            "year",
            "weekday",
        ];
        let rows = project(plays, &columns);
        let rows = dedup(rows, &columns);

        write_table(
            &self.output,
            TableName::Time,
            &rows,
            &schemas::time(),
            &["year", "month"],
            &self.parquet,
        )
        .await
    }

    /// Project and write the `songplays` fact table
    async fn write_songplays(&self, joined: &[JsonValue]) -> Result<WriteSummary> {
        let rows = project(
            joined,
            &[
                "songplay_id",
                "start_time",
                "userId",
                "level",
                "song_id",
                "artist_id",
                "sessionId",
                "location",
                "userAgent",
                "year",
                "month",
            ],
        );

        write_table(
            &self.output,
            TableName::Songplays,
            &rows,
            &schemas::songplays(),
            &["year", "month"],
            &self.parquet,
        )
        .await
    }
}

/// Derive `start_time` and the calendar columns from `ts`, in place.
///
/// Events without a usable `ts` get nulls; null propagation, not failure, is
/// what an engine-side column expression would do.
pub(crate) fn with_time_columns(plays: &mut [JsonValue]) {
    for play in plays.iter_mut() {
        let parts = field_i64(play, "ts").and_then(decompose_timestamp);
        let JsonValue::Object(obj) = play else {
            continue;
        };
        match parts {
            Some(parts) => {
                obj.insert("start_time".into(), JsonValue::from(parts.start_time));
                obj.insert("hour".into(), JsonValue::from(parts.hour));
                obj.insert("day".into(), JsonValue::from(parts.day));
                obj.insert("week".into(), JsonValue::from(parts.week));
                obj.insert("month".into(), JsonValue::from(parts.month));
                obj.insert("year".into(), JsonValue::from(parts.year));
                obj.insert("weekday".into(), JsonValue::from(parts.weekday));
            }
            None => {
                for column in ["start_time", "hour", "day", "week", "month", "year", "weekday"] {
                    obj.insert(column.into(), JsonValue::Null);
                }
            }
        }
    }
}

/// Inner-join plays against the song catalog.
///
/// The catalog side is songs⋈artists on `artist_id`; plays match on
/// `(song.title == event.song) AND (artist.artist_name == event.artist)`.
/// Plays without a match are dropped silently; a play matching several
/// catalog rows fans out into several joined rows.
pub(crate) fn join_plays(
    plays: &[JsonValue],
    songs: &[JsonValue],
    artists: &[JsonValue],
) -> Vec<JsonValue> {
    let artist_names: HashMap<&str, &str> = artists
        .iter()
        .filter_map(|artist| {
            Some((
                field_str(artist, "artist_id")?,
                field_str(artist, "artist_name")?,
            ))
        })
        .collect();

    // (title, artist_name) -> catalog entries
    let mut catalog: HashMap<(&str, &str), Vec<(i64, &str)>> = HashMap::new();
    for song in songs {
        let (Some(title), Some(artist_id), Some(song_id)) = (
            field_str(song, "title"),
            field_str(song, "artist_id"),
            field_i64(song, "song_id"),
        ) else {
            continue;
        };
        let Some(&artist_name) = artist_names.get(artist_id) else {
            continue;
        };
        catalog
            .entry((title, artist_name))
            .or_default()
            .push((song_id, artist_id));
    }

    let mut joined = Vec::new();
    for play in plays {
        let (Some(song), Some(artist)) = (field_str(play, "song"), field_str(play, "artist"))
        else {
            continue;
        };
        let Some(matches) = catalog.get(&(song, artist)) else {
            continue;
        };
        for &(song_id, artist_id) in matches {
            let mut row = play.clone();
            if let JsonValue::Object(obj) = &mut row {
                obj.insert("song_id".into(), JsonValue::from(song_id));
                obj.insert("artist_id".into(), JsonValue::from(artist_id.to_string()));
            }
            joined.push(row);
        }
    }
    joined
}
