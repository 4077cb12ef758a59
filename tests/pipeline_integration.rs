//! Integration tests for the full pipeline
//!
//! Exercises both transforms end-to-end over a local object store: JSON
//! fixtures in, Hive-partitioned Parquet star schema out.

use serde_json::Value;
use std::collections::HashSet;
use tempfile::TempDir;
use tunelake::output::read_table;
use tunelake::pipeline::{EventLogTransform, SongCatalogTransform};
use tunelake::storage::StorageRoot;
use tunelake::types::TableName;

// ============================================================================
// Fixtures
// ============================================================================

const SONG_ELENA: &str = r#"{"num_songs": 1, "artist_id": "AR5KOSW1187FB35FF4", "artist_latitude": 49.80388, "artist_longitude": 15.47491, "artist_location": "Dubai UAE", "artist_name": "Elena", "song_id": "SOZCTXZ12AB0182364", "title": "Setanta matins", "duration": 269.58363, "year": 0}"#;

const SONG_40GRIT: &str = r#"{"num_songs": 1, "artist_id": "AR558FS1187FB45658", "artist_latitude": null, "artist_longitude": null, "artist_location": "", "artist_name": "40 Grit", "song_id": "SOGDBUF12A8C140FAA", "title": "Intro", "duration": 75.67628, "year": 2003}"#;

const SONG_CASUAL: &str = r#"{"num_songs": 1, "artist_id": "ARD7TVE1187B99BFB1", "artist_latitude": null, "artist_longitude": null, "artist_location": "California - LA", "artist_name": "Casual", "song_id": "SOMZWCG12A8C13C480", "title": "I Didn't Mean To", "duration": 218.93179, "year": 1997}"#;

fn log_line(page: &str, song: &str, artist: &str, user_id: &str, ts: i64) -> String {
    format!(
        r#"{{"artist": "{artist}", "auth": "Logged In", "firstName": "Sylvie", "gender": "F", "itemInSession": 0, "lastName": "Cruz", "length": 269.58363, "level": "free", "location": "Washington-Arlington-Alexandria", "method": "PUT", "page": "{page}", "registration": 1540266185796.0, "sessionId": 9, "song": "{song}", "status": 200, "ts": {ts}, "userAgent": "Mozilla/5.0", "userId": "{user_id}"}}"#
    )
}

struct Lake {
    _input_dir: TempDir,
    _output_dir: TempDir,
    input: StorageRoot,
    output: StorageRoot,
}

fn lake() -> Lake {
    let input_dir = TempDir::new().unwrap();
    let output_dir = TempDir::new().unwrap();
    let input = StorageRoot::parse(input_dir.path().to_str().unwrap(), None).unwrap();
    let output = StorageRoot::parse(output_dir.path().to_str().unwrap(), None).unwrap();
    Lake {
        _input_dir: input_dir,
        _output_dir: output_dir,
        input,
        output,
    }
}

async fn seed_songs(lake: &Lake) {
    for (path, content) in [
        ("song_data/A/A/A/elena.json", SONG_ELENA),
        ("song_data/A/A/B/grit.json", SONG_40GRIT),
        // Duplicate record in a second file; dedup must collapse it
        ("song_data/A/B/A/grit_copy.json", SONG_40GRIT),
        ("song_data/B/A/A/casual.json", SONG_CASUAL),
    ] {
        lake.input
            .put(path, content.to_string().into())
            .await
            .unwrap();
    }
}

async fn seed_logs(lake: &Lake) {
    // 3 NextSong events (2 with catalog matches), plus non-play pages
    let lines = [
        log_line("NextSong", "Setanta matins", "Elena", "10", 1_541_121_934_796),
        log_line("NextSong", "Intro", "40 Grit", "26", 1_541_122_241_796),
        log_line("NextSong", "Unknown Tune", "Nobody", "26", 1_541_122_457_796),
        log_line("Help", "", "", "80", 1_541_122_500_796),
        log_line("Login", "", "", "81", 1_541_122_600_796),
    ]
    .join("\n");

    lake.input
        .put("log_data/2018/11/2018-11-02-events.json", lines.into())
        .await
        .unwrap();
}

async fn run_catalog(lake: &Lake) {
    SongCatalogTransform::new(lake.input.clone(), lake.output.clone())
        .run()
        .await
        .unwrap();
}

async fn run_events(lake: &Lake) {
    EventLogTransform::new(lake.input.clone(), lake.output.clone())
        .run()
        .await
        .unwrap();
}

fn song_row_key(record: &Value) -> (String, String, i64, String) {
    (
        record["title"].as_str().unwrap_or_default().to_string(),
        record["artist_id"].as_str().unwrap_or_default().to_string(),
        record["year"].as_i64().unwrap_or_default(),
        record["duration"].to_string(),
    )
}

// ============================================================================
// Full pipeline
// ============================================================================

#[tokio::test]
async fn test_full_pipeline_builds_star_schema() {
    let lake = lake();
    seed_songs(&lake).await;
    seed_logs(&lake).await;

    run_catalog(&lake).await;
    run_events(&lake).await;

    let songs = read_table(&lake.output, TableName::Songs).await.unwrap();
    assert_eq!(songs.len(), 3); // duplicate collapsed

    let artists = read_table(&lake.output, TableName::Artists).await.unwrap();
    assert_eq!(artists.len(), 3);

    let users = read_table(&lake.output, TableName::Users).await.unwrap();
    // Two distinct (userId, ..., level) rows among the NextSong events
    assert_eq!(users.len(), 2);

    let time = read_table(&lake.output, TableName::Time).await.unwrap();
    assert_eq!(time.len(), 3);

    let songplays = read_table(&lake.output, TableName::Songplays).await.unwrap();
    assert_eq!(songplays.len(), 2);
}

#[tokio::test]
async fn test_songplays_join_correctness() {
    let lake = lake();
    seed_songs(&lake).await;
    seed_logs(&lake).await;

    run_catalog(&lake).await;
    run_events(&lake).await;

    let songplays = read_table(&lake.output, TableName::Songplays).await.unwrap();
    assert_eq!(songplays.len(), 2);

    // No row may reference the unmatched event's user-session, and every row
    // carries catalog ids plus the event's own time partition columns.
    let users: HashSet<&str> = songplays
        .iter()
        .map(|row| row["userId"].as_str().unwrap())
        .collect();
    assert_eq!(users, HashSet::from(["10", "26"]));

    for row in &songplays {
        assert!(row["song_id"].is_i64());
        assert!(row["artist_id"].is_string());
        assert_eq!(row["year"], 2018);
        assert_eq!(row["month"], 11);
    }

    // songplay_id uniqueness
    let ids: HashSet<i64> = songplays
        .iter()
        .map(|row| row["songplay_id"].as_i64().unwrap())
        .collect();
    assert_eq!(ids.len(), songplays.len());
}

#[tokio::test]
async fn test_time_decomposition_reference_row() {
    let lake = lake();
    seed_songs(&lake).await;
    seed_logs(&lake).await;

    run_catalog(&lake).await;
    run_events(&lake).await;

    let time = read_table(&lake.output, TableName::Time).await.unwrap();
    let row = time
        .iter()
        .find(|row| row["ts"] == 1_541_121_934_796i64)
        .expect("reference ts present");

    assert_eq!(row["start_time"], 1_541_121_934i64);
    assert_eq!(row["hour"], 1);
    assert_eq!(row["day"], 2);
    assert_eq!(row["week"], 44);
    assert_eq!(row["month"], 11);
    assert_eq!(row["year"], 2018);
    assert_eq!(row["weekday"], 6);
}

// ============================================================================
// Dedup idempotence
// ============================================================================

#[tokio::test]
async fn test_song_catalog_idempotent_across_runs() {
    let lake = lake();
    seed_songs(&lake).await;

    run_catalog(&lake).await;
    let first: HashSet<_> = read_table(&lake.output, TableName::Songs)
        .await
        .unwrap()
        .iter()
        .map(song_row_key)
        .collect();

    run_catalog(&lake).await;
    let second: HashSet<_> = read_table(&lake.output, TableName::Songs)
        .await
        .unwrap()
        .iter()
        .map(song_row_key)
        .collect();

    // Row sets identical (synthetic ids excluded from the comparison)
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_song_ids_unique() {
    let lake = lake();
    seed_songs(&lake).await;
    run_catalog(&lake).await;

    let songs = read_table(&lake.output, TableName::Songs).await.unwrap();
    let ids: HashSet<i64> = songs
        .iter()
        .map(|row| row["song_id"].as_i64().unwrap())
        .collect();
    assert_eq!(ids.len(), songs.len());
}

// ============================================================================
// Partition layout
// ============================================================================

#[tokio::test]
async fn test_songs_partition_layout() {
    let lake = lake();
    seed_songs(&lake).await;
    run_catalog(&lake).await;

    let files = lake
        .output
        .list_with_extension("songs", "parquet")
        .await
        .unwrap();
    assert_eq!(
        files,
        vec![
            "songs/year=0/artist_id=AR5KOSW1187FB35FF4/part-00000.parquet".to_string(),
            "songs/year=1997/artist_id=ARD7TVE1187B99BFB1/part-00000.parquet".to_string(),
            "songs/year=2003/artist_id=AR558FS1187FB45658/part-00000.parquet".to_string(),
        ]
    );

    // No cross-partition duplication: total rows equals distinct input rows
    let songs = read_table(&lake.output, TableName::Songs).await.unwrap();
    assert_eq!(songs.len(), 3);
}

// ============================================================================
// Page filter
// ============================================================================

#[tokio::test]
async fn test_only_next_song_rows_reach_users() {
    let lake = lake();
    seed_songs(&lake).await;
    seed_logs(&lake).await;

    run_catalog(&lake).await;
    run_events(&lake).await;

    let users = read_table(&lake.output, TableName::Users).await.unwrap();
    let ids: HashSet<&str> = users
        .iter()
        .map(|row| row["userId"].as_str().unwrap())
        .collect();
    // Users 80 and 81 only appear on Help/Login pages
    assert_eq!(ids, HashSet::from(["10", "26"]));
}

// ============================================================================
// Failure modes
// ============================================================================

#[tokio::test]
async fn test_events_fail_without_upstream_catalog() {
    let lake = lake();
    seed_logs(&lake).await;

    let err = EventLogTransform::new(lake.input.clone(), lake.output.clone())
        .run()
        .await
        .unwrap_err();
    assert!(err.to_string().contains("not found"));
}

#[tokio::test]
async fn test_catalog_fails_on_zero_input_files() {
    let lake = lake();
    let err = SongCatalogTransform::new(lake.input.clone(), lake.output.clone())
        .run()
        .await
        .unwrap_err();
    assert!(err.to_string().contains("No input files"));
}

#[tokio::test]
async fn test_catalog_fails_on_schema_violation() {
    let lake = lake();
    // year as string: strict schema must reject, not coerce
    lake.input
        .put(
            "song_data/A/A/A/bad.json",
            r#"{"artist_id": "A1", "song_id": "S1", "title": "x", "year": "2001"}"#
                .to_string()
                .into(),
        )
        .await
        .unwrap();

    let err = SongCatalogTransform::new(lake.input.clone(), lake.output.clone())
        .run()
        .await
        .unwrap_err();
    assert!(err.to_string().contains("Schema violation"));
}

#[tokio::test]
async fn test_zero_join_matches_is_valid_empty_output() {
    let lake = lake();
    seed_songs(&lake).await;

    // Only unmatched plays
    let line = log_line("NextSong", "Nothing We Have", "No One", "55", 1_541_121_934_796);
    lake.input
        .put("log_data/2018/11/events.json", line.into())
        .await
        .unwrap();

    run_catalog(&lake).await;
    run_events(&lake).await;

    let songplays = read_table(&lake.output, TableName::Songplays).await.unwrap();
    assert!(songplays.is_empty());
}

// ============================================================================
// Known limitation: duplicate users
// ============================================================================

#[tokio::test]
async fn test_user_level_change_keeps_both_rows() {
    let lake = lake();
    seed_songs(&lake).await;

    // Same user plays twice, upgrading from free to paid in between. Dedup is
    // row-level, so both variants survive in the users table.
    let free = log_line("NextSong", "Intro", "40 Grit", "26", 1_541_122_241_796);
    let paid = log_line("NextSong", "Intro", "40 Grit", "26", 1_541_122_841_796)
        .replace("\"level\": \"free\"", "\"level\": \"paid\"");
    lake.input
        .put("log_data/2018/11/events.json", format!("{free}\n{paid}").into())
        .await
        .unwrap();

    run_catalog(&lake).await;
    run_events(&lake).await;

    let users = read_table(&lake.output, TableName::Users).await.unwrap();
    assert_eq!(users.len(), 2);
    let levels: HashSet<&str> = users
        .iter()
        .map(|row| row["level"].as_str().unwrap())
        .collect();
    assert_eq!(levels, HashSet::from(["free", "paid"]));
}
