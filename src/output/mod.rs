//! Parquet output
//!
//! Serializes record batches to Parquet and lays tables out Hive-style on
//! object storage: partition columns become `key=value` path segments and are
//! stripped from the data files. Every write overwrites the whole table
//! prefix; reads reverse the layout, re-injecting partition columns parsed
//! from the path.

mod partition;
mod writer;

pub use partition::{read_table, write_table, WriteSummary};
pub use writer::{batch_to_parquet_bytes, parquet_bytes_to_records, ParquetWriterConfig};
