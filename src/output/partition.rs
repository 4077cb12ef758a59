//! Hive-partitioned table layout
//!
//! A partitioned table persists as
//! `<table>/<col1>=<v1>/<col2>=<v2>/part-00000.parquet`, one file per
//! distinct partition-value tuple. Partition columns live in the path only;
//! data files carry the remaining columns. An unpartitioned table is a single
//! `<table>/part-00000.parquet`.

use crate::error::{Error, Result};
use crate::output::writer::{batch_to_parquet_bytes, parquet_bytes_to_records, ParquetWriterConfig};
use crate::storage::StorageRoot;
use crate::table::records_to_batch;
use crate::types::{JsonValue, TableName};
use arrow::datatypes::Schema;
use std::collections::BTreeMap;

/// Path segment used for a null partition value
const NULL_PARTITION: &str = "__HIVE_DEFAULT_PARTITION__";

/// Result of writing one table
#[derive(Debug)]
pub struct WriteSummary {
    /// Table written
    pub table: TableName,
    /// Rows across all files
    pub rows: usize,
    /// Parquet files written
    pub files: usize,
    /// Objects removed by the overwrite
    pub overwritten: usize,
}

/// Write a table, overwriting any previous contents at its prefix.
///
/// With an empty `partition_columns` slice the table lands as one file. An
/// empty batch still produces a schema-only file so the output location
/// exists (a zero-row `songplays` is a valid result, not an error).
pub async fn write_table(
    storage: &StorageRoot,
    table: TableName,
    records: &[JsonValue],
    schema: &Schema,
    partition_columns: &[&str],
    config: &ParquetWriterConfig,
) -> Result<WriteSummary> {
    let prefix = table.prefix();
    let overwritten = storage.delete_prefix(prefix).await?;
    if overwritten > 0 {
        tracing::debug!(table = %table, removed = overwritten, "overwrote previous table contents");
    }

    let data_schema = strip_partition_fields(schema, partition_columns)?;
    let data_columns: Vec<&str> = data_schema
        .fields()
        .iter()
        .map(|f| f.name().as_str())
        .collect();

    let mut files = 0usize;
    if records.is_empty() || partition_columns.is_empty() {
        let rows = crate::table::project(records, &data_columns);
        let batch = records_to_batch(&rows, &data_schema)?;
        let data = batch_to_parquet_bytes(&batch, config)?;
        storage
            .put(&format!("{prefix}/part-00000.parquet"), data)
            .await?;
        files += 1;
    } else {
        // Group rows by partition tuple; BTreeMap keeps file order stable.
        let mut groups: BTreeMap<String, Vec<&JsonValue>> = BTreeMap::new();
        for record in records {
            groups
                .entry(partition_dir(record, partition_columns))
                .or_default()
                .push(record);
        }

        for (dir, group) in &groups {
            let owned: Vec<JsonValue> = group.iter().map(|r| (*r).clone()).collect();
            let rows = crate::table::project(&owned, &data_columns);
            let batch = records_to_batch(&rows, &data_schema)?;
            let data = batch_to_parquet_bytes(&batch, config)?;
            storage
                .put(&format!("{prefix}/{dir}/part-00000.parquet"), data)
                .await?;
            files += 1;
        }
    }

    tracing::info!(
        table = %table,
        rows = records.len(),
        files,
        "wrote table"
    );

    Ok(WriteSummary {
        table,
        rows: records.len(),
        files,
        overwritten,
    })
}

/// Read a table back from storage, re-injecting partition columns.
///
/// Fails with a missing-upstream error when nothing exists at the table
/// prefix; this is the materialization barrier the event-log transform
/// relies on.
pub async fn read_table(storage: &StorageRoot, table: TableName) -> Result<Vec<JsonValue>> {
    let prefix = table.prefix();
    let files = storage.list_with_extension(prefix, "parquet").await?;
    if files.is_empty() {
        return Err(Error::missing_upstream(
            table.prefix(),
            storage.url(prefix),
        ));
    }

    let mut records = Vec::new();
    for file in &files {
        let partitions = partition_values_from_path(prefix, file);
        let data = storage.get(file).await?;
        for mut record in parquet_bytes_to_records(data)? {
            if let JsonValue::Object(obj) = &mut record {
                for (column, value) in &partitions {
                    obj.insert(column.clone(), value.clone());
                }
            }
            records.push(record);
        }
    }

    tracing::debug!(table = %table, rows = records.len(), files = files.len(), "read table");
    Ok(records)
}

/// Build the partition directory for one record, e.g. `year=2018/artist_id=AR1`
fn partition_dir(record: &JsonValue, partition_columns: &[&str]) -> String {
    partition_columns
        .iter()
        .map(|&column| {
            let value = record.get(column).unwrap_or(&JsonValue::Null);
            format!("{column}={}", encode_partition_value(value))
        })
        .collect::<Vec<_>>()
        .join("/")
}

/// Encode a partition value as a path segment
fn encode_partition_value(value: &JsonValue) -> String {
    match value {
        JsonValue::Null => NULL_PARTITION.to_string(),
        JsonValue::String(s) => percent_encode(s),
        other => other.to_string(),
    }
}

/// Parse `key=value` segments between the table prefix and the filename
fn partition_values_from_path(prefix: &str, file: &str) -> Vec<(String, JsonValue)> {
    let relative = file
        .strip_prefix(prefix)
        .map(|rest| rest.trim_start_matches('/'))
        .unwrap_or(file);

    let mut segments: Vec<&str> = relative.split('/').collect();
    segments.pop(); // drop the filename

    segments
        .iter()
        .filter_map(|segment| {
            let (column, raw) = segment.split_once('=')?;
            Some((column.to_string(), decode_partition_value(raw)))
        })
        .collect()
}

/// Decode a path segment back into a typed value
fn decode_partition_value(raw: &str) -> JsonValue {
    if raw == NULL_PARTITION {
        return JsonValue::Null;
    }
    let decoded = percent_decode(raw);
    if let Ok(i) = decoded.parse::<i64>() {
        return JsonValue::from(i);
    }
    if let Ok(f) = decoded.parse::<f64>() {
        return JsonValue::from(f);
    }
    JsonValue::String(decoded)
}

/// Schema of the data files: the table schema minus partition columns
fn strip_partition_fields(schema: &Schema, partition_columns: &[&str]) -> Result<Schema> {
    for &column in partition_columns {
        if schema.field_with_name(column).is_err() {
            return Err(Error::output(format!(
                "Partition column '{column}' not present in schema"
            )));
        }
    }
    let fields: Vec<_> = schema
        .fields()
        .iter()
        .filter(|f| !partition_columns.contains(&f.name().as_str()))
        .cloned()
        .collect();
    Ok(Schema::new(fields))
}

/// Percent-encode everything outside `[A-Za-z0-9._-]`
fn percent_encode(value: &str) -> String {
    let mut encoded = String::with_capacity(value.len());
    for byte in value.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'.' | b'_' | b'-' => {
                encoded.push(byte as char);
            }
            other => {
                encoded.push('%');
                encoded.push_str(&format!("{other:02X}"));
            }
        }
    }
    encoded
}

/// Reverse of [`percent_encode`]
fn percent_decode(value: &str) -> String {
    let bytes = value.as_bytes();
    let mut decoded = Vec::with_capacity(bytes.len());
    let mut index = 0;
    while index < bytes.len() {
        if bytes[index] == b'%' && index + 2 < bytes.len() {
            if let Ok(byte) = u8::from_str_radix(&value[index + 1..index + 3], 16) {
                decoded.push(byte);
                index += 3;
                continue;
            }
        }
        decoded.push(bytes[index]);
        index += 1;
    }
    String::from_utf8_lossy(&decoded).into_owned()
}
