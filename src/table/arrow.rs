//! Record batch conversion to and from Arrow
//!
//! Unlike a schema-inferring sink, every table here has an explicit star
//! schema, so conversion is driven by the target `Schema` and a type mismatch
//! is an error rather than a reason to widen.

use crate::error::{Error, Result};
use crate::types::JsonValue;
use arrow::array::{
    Array, ArrayRef, BooleanArray, Float64Array, Int32Array, Int64Array, NullArray, StringArray,
    TimestampSecondArray,
};
use arrow::datatypes::{DataType, Schema, TimeUnit};
use arrow::record_batch::RecordBatch;
use std::sync::Arc;

/// Convert records to an Arrow RecordBatch against an explicit schema.
///
/// Timestamp columns are carried as integer epoch seconds in the record
/// currency and materialize as `Timestamp(Second)` arrays here.
pub fn records_to_batch(records: &[JsonValue], schema: &Schema) -> Result<RecordBatch> {
    if records.is_empty() {
        return Ok(RecordBatch::new_empty(Arc::new(schema.clone())));
    }

    let mut columns: Vec<ArrayRef> = Vec::with_capacity(schema.fields().len());
    for field in schema.fields() {
        let values: Vec<Option<&JsonValue>> = records
            .iter()
            .map(|record| record.get(field.name()).filter(|v| !v.is_null()))
            .collect();
        columns.push(build_array(&values, field.data_type(), field.name())?);
    }

    RecordBatch::try_new(Arc::new(schema.clone()), columns)
        .map_err(|e| Error::output(format!("Failed to create RecordBatch: {e}")))
}

/// Build one Arrow array from JSON values
fn build_array(values: &[Option<&JsonValue>], data_type: &DataType, name: &str) -> Result<ArrayRef> {
    match data_type {
        DataType::Null => Ok(Arc::new(NullArray::new(values.len()))),

        DataType::Boolean => {
            let arr: BooleanArray = values.iter().map(|v| v.and_then(JsonValue::as_bool)).collect();
            Ok(Arc::new(arr))
        }

        DataType::Int32 => {
            let arr: Int32Array = values
                .iter()
                .map(|v| v.and_then(JsonValue::as_i64).map(|i| i as i32))
                .collect();
            Ok(Arc::new(arr))
        }

        DataType::Int64 => {
            let arr: Int64Array = values.iter().map(|v| v.and_then(JsonValue::as_i64)).collect();
            Ok(Arc::new(arr))
        }

        DataType::Float64 => {
            let arr: Float64Array = values
                .iter()
                .map(|v| v.and_then(|v| v.as_f64().or_else(|| v.as_i64().map(|i| i as f64))))
                .collect();
            Ok(Arc::new(arr))
        }

        DataType::Utf8 => {
            let arr: StringArray = values
                .iter()
                .map(|v| {
                    v.map(|v| match v {
                        JsonValue::String(s) => s.clone(),
                        other => other.to_string(),
                    })
                })
                .collect();
            Ok(Arc::new(arr))
        }

        DataType::Timestamp(TimeUnit::Second, tz) => {
            let arr: TimestampSecondArray =
                values.iter().map(|v| v.and_then(JsonValue::as_i64)).collect();
            let arr = match tz {
                Some(tz) => arr.with_timezone(Arc::clone(tz)),
                None => arr,
            };
            Ok(Arc::new(arr))
        }

        other => Err(Error::output(format!(
            "Unsupported Arrow type {other} for column '{name}'"
        ))),
    }
}

/// Convert an Arrow RecordBatch back into records.
///
/// The inverse of [`records_to_batch`]: timestamps come back as integer epoch
/// seconds, so a Parquet read-back round-trips through the same currency the
/// transforms operate on.
pub fn batch_to_records(batch: &RecordBatch) -> Result<Vec<JsonValue>> {
    let schema = batch.schema();
    let mut records = Vec::with_capacity(batch.num_rows());

    for row in 0..batch.num_rows() {
        let mut record = serde_json::Map::new();
        for (index, field) in schema.fields().iter().enumerate() {
            let column = batch.column(index);
            record.insert(field.name().clone(), array_value(column.as_ref(), row)?);
        }
        records.push(JsonValue::Object(record));
    }

    Ok(records)
}

/// Convert a single array element to a JSON value
fn array_value(array: &dyn Array, row: usize) -> Result<JsonValue> {
    if array.is_null(row) {
        return Ok(JsonValue::Null);
    }

    match array.data_type() {
        DataType::Null => Ok(JsonValue::Null),

        DataType::Boolean => Ok(JsonValue::Bool(downcast::<BooleanArray>(array)?.value(row))),

        DataType::Int32 => Ok(JsonValue::from(downcast::<Int32Array>(array)?.value(row))),

        DataType::Int64 => Ok(JsonValue::from(downcast::<Int64Array>(array)?.value(row))),

        DataType::Float64 => {
            let value = downcast::<Float64Array>(array)?.value(row);
            Ok(serde_json::Number::from_f64(value).map_or(JsonValue::Null, JsonValue::Number))
        }

        DataType::Utf8 => Ok(JsonValue::String(
            downcast::<StringArray>(array)?.value(row).to_string(),
        )),

        DataType::Timestamp(TimeUnit::Second, _) => Ok(JsonValue::from(
            downcast::<TimestampSecondArray>(array)?.value(row),
        )),

        other => Err(Error::output(format!(
            "Unsupported Arrow type {other} in read-back"
        ))),
    }
}

fn downcast<T: 'static>(array: &dyn Array) -> Result<&T> {
    array
        .as_any()
        .downcast_ref::<T>()
        .ok_or_else(|| Error::output("Array downcast failed"))
}
