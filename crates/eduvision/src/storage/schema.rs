//! `SQLite` schema definitions for eduvision.
//!
//! This module contains the SQL statements for creating and managing
//! the session database schema.

/// SQL statement to create the settings table.
///
/// Holds the persisted client state that survives across invocations
/// (the signed-in PRN, the API base override).
pub const CREATE_SETTINGS_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS settings (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL,
    updated_at TEXT NOT NULL
)
";

/// SQL statement to create the metadata table for storing key-value pairs.
pub const CREATE_METADATA_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS metadata (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL
)
";

/// All schema creation statements in order.
pub const SCHEMA_STATEMENTS: &[&str] = &[CREATE_SETTINGS_TABLE, CREATE_METADATA_TABLE];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_statements_not_empty() {
        assert!(!SCHEMA_STATEMENTS.is_empty());
        for stmt in SCHEMA_STATEMENTS {
            assert!(!stmt.is_empty());
        }
    }

    #[test]
    fn test_create_settings_table_contains_required_columns() {
        assert!(CREATE_SETTINGS_TABLE.contains("key TEXT PRIMARY KEY"));
        assert!(CREATE_SETTINGS_TABLE.contains("value TEXT NOT NULL"));
        assert!(CREATE_SETTINGS_TABLE.contains("updated_at TEXT NOT NULL"));
    }
}
