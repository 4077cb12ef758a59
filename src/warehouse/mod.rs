//! Warehouse operators
//!
//! A single operator lives here: [`FactLoadOperator`], which runs a
//! parameterized insert against a DuckDB warehouse and logs a bounded sample
//! of the destination table. Scheduling, retries and backoff belong to the
//! orchestration engine invoking it; errors propagate uncaught.

mod fact_load;

pub use fact_load::{FactLoadOperator, FactLoadSummary};
