//! Fact-load operator
//!
//! Executes `INSERT INTO <destination> (<select>)` and reads back up to ten
//! rows of the destination for verification logging. The insert is a plain
//! append: re-running the operator inserts duplicates.

use crate::error::Result;
use duckdb::types::Value;
use duckdb::Connection;

/// Rows sampled from the destination after the insert
const SAMPLE_LIMIT: usize = 10;

/// Result of one fact-load run
#[derive(Debug)]
pub struct FactLoadSummary {
    /// Destination table
    pub destination: String,
    /// Rows sampled in the read-back (at most ten)
    pub sampled: usize,
}

/// The fact-load operator
pub struct FactLoadOperator {
    /// Warehouse connection, held for the duration of one invocation
    conn: Connection,
    /// Destination table name
    destination: String,
    /// SELECT fragment producing the rows to insert
    select_sql: String,
}

impl FactLoadOperator {
    /// Open a warehouse connection for one invocation.
    ///
    /// `database` is a DuckDB file path, or `:memory:` for an in-process
    /// warehouse. The connection is released when the operator drops.
    pub fn connect(
        database: &str,
        destination: impl Into<String>,
        select_sql: impl Into<String>,
    ) -> Result<Self> {
        let conn = if database == ":memory:" {
            Connection::open_in_memory()?
        } else {
            Connection::open(database)?
        };

        Ok(Self {
            conn,
            destination: destination.into(),
            select_sql: select_sql.into(),
        })
    }

    /// Build an operator over an existing connection
    pub fn with_connection(
        conn: Connection,
        destination: impl Into<String>,
        select_sql: impl Into<String>,
    ) -> Self {
        Self {
            conn,
            destination: destination.into(),
            select_sql: select_sql.into(),
        }
    }

    /// Run the insert, then log a sample of the destination table.
    ///
    /// SQL and connection errors propagate to the caller; retry policy is the
    /// orchestration engine's responsibility.
    pub fn execute(&self) -> Result<FactLoadSummary> {
        tracing::info!(destination = %self.destination, "loading fact table");

        let insert_sql = format!("INSERT INTO {} ({})", self.destination, self.select_sql);
        self.conn.execute_batch(&insert_sql)?;

        let sample_sql = format!(
            "SELECT * FROM {} LIMIT {SAMPLE_LIMIT}",
            self.destination
        );
        let mut stmt = self.conn.prepare(&sample_sql)?;

        let rows: Vec<String> = stmt
            .query_map([], |row| {
                let column_count = row.as_ref().column_count();
                let mut rendered = Vec::with_capacity(column_count);
                for index in 0..column_count {
                    let value: Value = row.get(index)?;
                    rendered.push(render_value(&value));
                }
                Ok(rendered.join(", "))
            })?
            .collect::<std::result::Result<_, _>>()?;

        for row in &rows {
            tracing::info!(destination = %self.destination, row = %row, "sampled row");
        }

        Ok(FactLoadSummary {
            destination: self.destination.clone(),
            sampled: rows.len(),
        })
    }
}

/// Render one DuckDB value for the log sink
fn render_value(value: &Value) -> String {
    match value {
        Value::Null => "NULL".to_string(),
        Value::Boolean(b) => b.to_string(),
        Value::TinyInt(i) => i.to_string(),
        Value::SmallInt(i) => i.to_string(),
        Value::Int(i) => i.to_string(),
        Value::BigInt(i) => i.to_string(),
        Value::HugeInt(i) => i.to_string(),
        Value::UTinyInt(i) => i.to_string(),
        Value::USmallInt(i) => i.to_string(),
        Value::UInt(i) => i.to_string(),
        Value::UBigInt(i) => i.to_string(),
        Value::Float(f) => f.to_string(),
        Value::Double(f) => f.to_string(),
        Value::Text(s) => s.clone(),
        Value::Timestamp(_, micros) => {
            let seconds = micros / 1_000_000;
            let nanos = ((micros % 1_000_000) * 1000) as u32;
            chrono::DateTime::from_timestamp(seconds, nanos)
                .map_or_else(|| micros.to_string(), |dt| {
                    dt.format("%Y-%m-%dT%H:%M:%S%.6fZ").to_string()
                })
        }
        other => format!("{other:?}"),
    }
}
