//! Common types used throughout tunelake
//!
//! This module contains shared type definitions and type aliases
//! used across multiple modules.

use serde::{Deserialize, Serialize};

// ============================================================================
// Type Aliases
// ============================================================================

/// JSON value type (re-exported from serde_json)
pub type JsonValue = serde_json::Value;

/// JSON object type
pub type JsonObject = serde_json::Map<String, JsonValue>;

// ============================================================================
// Star-Schema Tables
// ============================================================================

/// The five tables of the star schema.
///
/// `Songplays` is the fact table; the rest are dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TableName {
    Songs,
    Artists,
    Users,
    Time,
    Songplays,
}

impl TableName {
    /// Storage prefix for this table under the output root.
    ///
    /// The time dimension persists under `time_table/`, everything else
    /// under its own name.
    pub fn prefix(self) -> &'static str {
        match self {
            TableName::Songs => "songs",
            TableName::Artists => "artists",
            TableName::Users => "users",
            TableName::Time => "time_table",
            TableName::Songplays => "songplays",
        }
    }
}

impl std::fmt::Display for TableName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.prefix())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_prefixes() {
        assert_eq!(TableName::Songs.prefix(), "songs");
        assert_eq!(TableName::Time.prefix(), "time_table");
        assert_eq!(TableName::Songplays.to_string(), "songplays");
    }
}
