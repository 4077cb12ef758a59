//! In-memory tabular batches
//!
//! Tables move through the pipeline as `Vec<serde_json::Value>` record
//! batches. This module provides the relational operations the transforms are
//! built from (projection, exact-row dedup, synthetic id assignment) and the
//! conversion to and from Arrow `RecordBatch`es at the Parquet boundary.

mod arrow;
mod ops;

pub use arrow::{batch_to_records, records_to_batch};
pub use ops::{assign_row_ids, dedup, field_i64, field_str, project};
