//! Relational operations over record batches

use crate::types::{JsonObject, JsonValue};
use std::collections::HashSet;

/// Project records down to the listed columns.
///
/// Columns absent from a record come through as null, which keeps the
/// downstream Arrow conversion total.
pub fn project(records: &[JsonValue], columns: &[&str]) -> Vec<JsonValue> {
    records
        .iter()
        .map(|record| {
            let mut projected = JsonObject::new();
            for &column in columns {
                let value = record.get(column).cloned().unwrap_or(JsonValue::Null);
                projected.insert(column.to_string(), value);
            }
            JsonValue::Object(projected)
        })
        .collect()
}

/// Row-level exact-match dedup over the listed columns.
///
/// Two rows collapse only when every listed column is identical; the first
/// occurrence wins and input order is otherwise preserved. Rows that differ
/// in any column both survive, so a key column repeated with conflicting
/// attributes yields multiple rows.
pub fn dedup(records: Vec<JsonValue>, columns: &[&str]) -> Vec<JsonValue> {
    let mut seen: HashSet<String> = HashSet::with_capacity(records.len());
    records
        .into_iter()
        .filter(|record| seen.insert(row_key(record, columns)))
        .collect()
}

/// Assign a synthetic strictly-increasing i64 id to every record.
///
/// Ids are unique within the batch; nothing beyond uniqueness is guaranteed
/// across runs.
pub fn assign_row_ids(records: &mut [JsonValue], column: &str) {
    for (index, record) in records.iter_mut().enumerate() {
        if let JsonValue::Object(obj) = record {
            obj.insert(column.to_string(), JsonValue::from(index as i64));
        }
    }
}

/// String field accessor
pub fn field_str<'a>(record: &'a JsonValue, column: &str) -> Option<&'a str> {
    record.get(column).and_then(JsonValue::as_str)
}

/// Integer field accessor
pub fn field_i64(record: &JsonValue, column: &str) -> Option<i64> {
    record.get(column).and_then(JsonValue::as_i64)
}

/// Serialize the listed columns into a dedup key
fn row_key(record: &JsonValue, columns: &[&str]) -> String {
    let mut key = String::new();
    for &column in columns {
        let value = record.get(column).unwrap_or(&JsonValue::Null);
        key.push_str(&value.to_string());
        key.push('\u{1f}');
    }
    key
}
