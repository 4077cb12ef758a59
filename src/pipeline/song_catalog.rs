//! Song-Catalog Transform
//!
//! Reads the song-metadata files and writes the `songs` and `artists`
//! dimensions. `songs` is re-keyed: the source `song_id` is dropped and a
//! synthetic id is assigned after dedup, so downstream joins must never rely
//! on it (the songplays join is on title/artist name).

use crate::error::{Error, Result};
use crate::ingest::{parse_song_records, SongRecord};
use crate::output::{write_table, ParquetWriterConfig, WriteSummary};
use crate::pipeline::{schemas, SONG_DATA_DEPTH, SONG_DATA_PREFIX};
use crate::storage::StorageRoot;
use crate::table::{assign_row_ids, dedup, project};
use crate::types::{JsonValue, TableName};

/// Result of one catalog run
#[derive(Debug)]
pub struct SongCatalogSummary {
    /// Input files read
    pub files_read: usize,
    /// Song records decoded
    pub records: usize,
    /// `songs` write result
    pub songs: WriteSummary,
    /// `artists` write result
    pub artists: WriteSummary,
}

/// The Song-Catalog Transform
pub struct SongCatalogTransform {
    input: StorageRoot,
    output: StorageRoot,
    parquet: ParquetWriterConfig,
}

impl SongCatalogTransform {
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
    pub async fn run(&self) -> Result<SongCatalogSummary> {
        tracing::info!("song-catalog transform starting");

        let (files_read, records) = self.read_song_records().await?;
        tracing::info!(files = files_read, records = records.len(), "read song metadata");

        let songs = self.write_songs(&records).await?;
        let artists = self.write_artists(&records).await?;

        tracing::info!(
            songs = songs.rows,
            artists = artists.rows,
            "song-catalog transform complete"
        );

        Ok(SongCatalogSummary {
            files_read,
            records: records.len(),
            songs,
            artists,
        })
    }

    /// Read and strictly decode every song file under the fixed glob
    async fn read_song_records(&self) -> Result<(usize, Vec<JsonValue>)> {
        let files = self
            .input
            .list_files(SONG_DATA_PREFIX, SONG_DATA_DEPTH, "json")
            .await?;
        if files.is_empty() {
            return Err(Error::NoInputFiles {
                pattern: format!("{}/*/*/*/*.json", self.input.url(SONG_DATA_PREFIX)),
            });
        }

        let mut records = Vec::new();
        for file in &files {
            let data = self.input.get(file).await?;
            let content = std::str::from_utf8(&data)
                .map_err(|e| Error::schema(file.clone(), format!("not valid UTF-8: {e}")))?;
            let songs: Vec<SongRecord> = parse_song_records(file, content)?;
            for song in songs {
                records.push(serde_json::to_value(song)?);
            }
        }
        Ok((files.len(), records))
    }

    /// Project, dedup, re-key and write the `songs` dimension
    async fn write_songs(&self, records: &[JsonValue]) -> Result<WriteSummary> {
        let rows = project(records, &["title", "artist_id", "year", "duration"]);
        let mut rows = dedup(rows, &["title", "artist_id", "year", "duration"]);
        // Ids are assigned only after dedup, independent of the source song_id.
        assign_row_ids(&mut rows, "song_id");

        write_table(
            &self.output,
            TableName::Songs,
            &rows,
            &schemas::songs(),
            &["year", "artist_id"],
            &self.parquet,
        )
        .await
    }

    /// Project, dedup and write the `artists` dimension
    async fn write_artists(&self, records: &[JsonValue]) -> Result<WriteSummary> {
        let columns = [
            "artist_id",
            "artist_name",
            "artist_location",
            "artist_latitude",
            "artist_longitude",
        ];
        let rows = project(records, &columns);
        let rows = dedup(rows, &columns);

        write_table(
            &self.output,
            TableName::Artists,
            &rows,
            &schemas::artists(),
            &[],
            &self.parquet,
        )
        .await
    }
}
