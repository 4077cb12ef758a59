//! Arrow schemas for the star-schema tables
//!
//! These are the full table schemas, partition columns included; the writer
//! strips partition columns out of the data files.

use arrow::datatypes::{DataType, Field, Schema, TimeUnit};

fn utc_timestamp() -> DataType {
    DataType::Timestamp(TimeUnit::Second, Some("UTC".into()))
}

/// `songs` dimension, partitioned by (year, artist_id)
pub fn songs() -> Schema {
    Schema::new(vec![
        Field::new("title", DataType::Utf8, true),
        Field::new("duration", DataType::Float64, true),
        Field::new("song_id", DataType::Int64, false),
        Field::new("year", DataType::Int32, true),
        Field::new("artist_id", DataType::Utf8, true),
    ])
}

/// `artists` dimension, unpartitioned
pub fn artists() -> Schema {
    Schema::new(vec![
        Field::new("artist_id", DataType::Utf8, true),
        Field::new("artist_name", DataType::Utf8, true),
        Field::new("artist_location", DataType::Utf8, true),
        Field::new("artist_latitude", DataType::Float64, true),
        Field::new("artist_longitude", DataType::Float64, true),
    ])
}

/// `users` dimension, unpartitioned
pub fn users() -> Schema {
    Schema::new(vec![
        Field::new("userId", DataType::Utf8, true),
        Field::new("firstName", DataType::Utf8, true),
        Field::new("lastName", DataType::Utf8, true),
        Field::new("gender", DataType::Utf8, true),
        Field::new("level", DataType::Utf8, true),
    ])
}

/// `time` dimension, partitioned by (year, month)
pub fn time() -> Schema {
    Schema::new(vec![
        Field::new("ts", DataType::Int64, true),
        Field::new("start_time", utc_timestamp(), true),
        Field::new("hour", DataType::Int32, true),
        Field::new("day", DataType::Int32, true),
        Field::new("week", DataType::Int32, true),
        Field::new("weekday", DataType::Int32, true),
        Field::new("year", DataType::Int32, true),
        Field::new("month", DataType::Int32, true),
    ])
}

/// `songplays` fact table, partitioned by (year, month)
pub fn songplays() -> Schema {
    Schema::new(vec![
        Field::new("songplay_id", DataType::Int64, false),
        Field::new("start_time", utc_timestamp(), true),
        Field::new("userId", DataType::Utf8, true),
        Field::new("level", DataType::Utf8, true),
        Field::new("song_id", DataType::Int64, true),
        Field::new("artist_id", DataType::Utf8, true),
        Field::new("sessionId", DataType::Int64, true),
        Field::new("location", DataType::Utf8, true),
        Field::new("userAgent", DataType::Utf8, true),
        Field::new("year", DataType::Int32, true),
        Field::new("month", DataType::Int32, true),
    ])
}
