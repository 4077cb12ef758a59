//! Object-storage layer
//!
//! Wraps the `object_store` crate behind a [`StorageRoot`] that understands
//! S3, GCS, Azure and local filesystem roots. All pipeline reads and writes
//! go through this module; the fixed-depth input globs and the
//! overwrite-by-delete-prefix lifecycle live here.

mod store;

pub use store::StorageRoot;

#[cfg(test)]
mod tests;
