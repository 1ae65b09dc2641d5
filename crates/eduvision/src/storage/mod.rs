//! Storage layer for eduvision.
//!
//! This module provides `SQLite`-based persistent client state: a small
//! key/value table that survives across invocations, playing the role that
//! browser local storage plays for a page script.

pub mod migrations;
pub mod schema;

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use tracing::{debug, info, warn};

use crate::error::{Error, Result};

/// Key holding the normalized student PRN.
pub const PRN_KEY: &str = "eduvision_prn";

/// Key holding the optional API base override.
pub const API_BASE_KEY: &str = "eduvision_api_base";

/// Persistent key/value store for client state.
#[derive(Debug)]
pub struct Storage {
    /// Path to the database file.
    path: PathBuf,
    /// Database connection.
    conn: Connection,
}

/// A stored setting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Setting {
    /// Setting key.
    pub key: String,
    /// Stored value.
    pub value: String,
    /// When the value was last written.
    pub updated_at: DateTime<Utc>,
}

impl Storage {
    /// Open or create a storage database at the given path.
    ///
    /// Creates the parent directories and database file if they don't exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or schema initialization fails.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent).map_err(|source| Error::DirectoryCreate {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
        }

        debug!("Opening session database at {}", path.display());
        let conn = Connection::open(&path).map_err(|source| Error::DatabaseOpen {
            path: path.clone(),
            source,
        })?;

        migrations::initialize_schema(&conn)?;

        debug!("Session database ready at {}", path.display());
        Ok(Self { path, conn })
    }

    /// Create an in-memory storage instance for testing.
    ///
    /// # Errors
    ///
    /// Returns an error if the in-memory database cannot be created.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(|source| Error::DatabaseOpen {
            path: PathBuf::from(":memory:"),
            source,
        })?;

        migrations::initialize_schema(&conn)?;

        Ok(Self {
            path: PathBuf::from(":memory:"),
            conn,
        })
    }

    /// Get the path to the database file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read a stored value.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn get(&self, key: &str) -> Result<Option<String>> {
        let value = self
            .conn
            .query_row(
                "SELECT value FROM settings WHERE key = ?1",
                [key],
                |row| row.get(0),
            )
            .optional()?;
        Ok(value)
    }

    /// Store a value, replacing any previous one.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn set(&self, key: &str, value: &str) -> Result<()> {
        let now = Utc::now().to_rfc3339();
        self.conn.execute(
            r"
            INSERT INTO settings (key, value, updated_at) VALUES (?1, ?2, ?3)
            ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at
            ",
            params![key, value, now],
        )?;
        debug!("Stored setting {}", key);
        Ok(())
    }

    /// Remove a stored value.
    ///
    /// Returns `true` if a value was removed, `false` if none was stored.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn remove(&self, key: &str) -> Result<bool> {
        let affected = self
            .conn
            .execute("DELETE FROM settings WHERE key = ?1", [key])?;
        if affected > 0 {
            info!("Removed setting {}", key);
        }
        Ok(affected > 0)
    }

    /// List all stored settings ordered by key.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn entries(&self) -> Result<Vec<Setting>> {
        let mut stmt = self
            .conn
            .prepare("SELECT key, value, updated_at FROM settings ORDER BY key ASC")?;

        let settings = stmt
            .query_map([], Self::row_to_setting)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(settings)
    }

    fn row_to_setting(row: &rusqlite::Row) -> rusqlite::Result<Setting> {
        let key: String = row.get(0)?;
        let value: String = row.get(1)?;
        let updated_at_str: String = row.get(2)?;

        let updated_at = DateTime::parse_from_rfc3339(&updated_at_str).map_or_else(
            |_| {
                warn!("Unparseable timestamp for setting {}: {}", key, updated_at_str);
                DateTime::<Utc>::default()
            },
            |dt| dt.with_timezone(&Utc),
        );

        Ok(Setting {
            key,
            value,
            updated_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_storage() -> Storage {
        Storage::open_in_memory().expect("failed to create test storage")
    }

    #[test]
    fn test_open_in_memory() {
        assert!(Storage::open_in_memory().is_ok());
    }

    #[test]
    fn test_get_missing_key() {
        let storage = create_test_storage();
        assert_eq!(storage.get(PRN_KEY).unwrap(), None);
    }

    #[test]
    fn test_set_and_get() {
        let storage = create_test_storage();
        storage.set(PRN_KEY, "PRN2024001").unwrap();

        assert_eq!(storage.get(PRN_KEY).unwrap().as_deref(), Some("PRN2024001"));
    }

    #[test]
    fn test_set_overwrites() {
        let storage = create_test_storage();
        storage.set(API_BASE_KEY, "http://a/api").unwrap();
        storage.set(API_BASE_KEY, "http://b/api").unwrap();

        assert_eq!(
            storage.get(API_BASE_KEY).unwrap().as_deref(),
            Some("http://b/api")
        );
        assert_eq!(storage.entries().unwrap().len(), 1);
    }

    #[test]
    fn test_remove() {
        let storage = create_test_storage();
        storage.set(PRN_KEY, "X1").unwrap();

        assert!(storage.remove(PRN_KEY).unwrap());
        assert!(!storage.remove(PRN_KEY).unwrap());
        assert_eq!(storage.get(PRN_KEY).unwrap(), None);
    }

    #[test]
    fn test_entries_sorted_with_timestamps() {
        let storage = create_test_storage();
        let before = Utc::now() - chrono::Duration::seconds(5);
        storage.set(PRN_KEY, "X1").unwrap();
        storage.set(API_BASE_KEY, "http://h/api").unwrap();

        let entries = storage.entries().unwrap();
        let keys: Vec<&str> = entries.iter().map(|s| s.key.as_str()).collect();
        assert_eq!(keys, vec![API_BASE_KEY, PRN_KEY]);
        assert!(entries.iter().all(|s| s.updated_at >= before));
    }

    #[test]
    fn test_path() {
        let storage = create_test_storage();
        assert_eq!(storage.path().to_string_lossy(), ":memory:");
    }

    #[test]
    fn test_persists_across_reopen() {
        let db_path = std::env::temp_dir().join(format!(
            "eduvision_storage_test_{}.db",
            std::process::id()
        ));

        {
            let storage = Storage::open(&db_path).unwrap();
            storage.set(PRN_KEY, "PERSISTED").unwrap();
            assert_eq!(storage.path(), db_path);
        }

        let reopened = Storage::open(&db_path).unwrap();
        assert_eq!(reopened.get(PRN_KEY).unwrap().as_deref(), Some("PERSISTED"));

        drop(reopened);
        let _ = std::fs::remove_file(&db_path);
    }

    #[test]
    fn test_open_creates_parent_dirs() {
        let root = std::env::temp_dir().join(format!(
            "eduvision_storage_dirs_{}",
            std::process::id()
        ));
        let nested_path = root.join("nested").join("session.db");
        let _ = std::fs::remove_dir_all(&root);

        let storage = Storage::open(&nested_path).unwrap();
        assert!(nested_path.exists());

        drop(storage);
        let _ = std::fs::remove_dir_all(&root);
    }
}
