//! SQLite-backed key/value storage using rusqlite.

use crate::storage::kv::{KeyValueStorage, StorageError};
use crate::storage::schema::{CURRENT_VERSION, SCHEMA, SCHEMA_VERSION_TABLE};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Result as SqliteResult};
use std::path::Path;

/// Key/value storage in a SQLite database file.
pub struct SqliteStorage {
    conn: Connection,
}

impl SqliteStorage {
    /// Open the workout database at `path`, creating the file and its
    /// directory on first use.
    pub fn open(path: &Path) -> Result<Self, StorageError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| StorageError::IoError(e.to_string()))?;
        }

        let storage = Self::with_connection(Connection::open(path))?;
        tracing::debug!("Opened workout database at {}", path.display());
        Ok(storage)
    }

    /// Database that lives only as long as the returned value.
    pub fn open_in_memory() -> Result<Self, StorageError> {
        Self::with_connection(Connection::open_in_memory())
    }

    fn with_connection(conn: SqliteResult<Connection>) -> Result<Self, StorageError> {
        let conn = conn.map_err(|e| StorageError::ConnectionFailed(e.to_string()))?;
        let storage = Self { conn };
        storage.upgrade_schema()?;
        Ok(storage)
    }

    /// Bring the `kv_store` table up to [`CURRENT_VERSION`].
    fn upgrade_schema(&self) -> Result<(), StorageError> {
        self.conn
            .execute_batch(SCHEMA_VERSION_TABLE)
            .map_err(|e| StorageError::MigrationFailed(e.to_string()))?;

        let applied = self.schema_version()?;
        if applied >= CURRENT_VERSION {
            return Ok(());
        }

        self.conn
            .execute_batch(SCHEMA)
            .and_then(|_| {
                self.conn.execute(
                    "INSERT INTO schema_version (version, applied_at) VALUES (?1, datetime('now'))",
                    [CURRENT_VERSION],
                )
            })
            .map_err(|e| StorageError::MigrationFailed(e.to_string()))?;

        tracing::info!(
            "Workout database upgraded from schema {} to {}",
            applied,
            CURRENT_VERSION
        );
        Ok(())
    }

    /// Highest applied schema version, 0 for a fresh file.
    fn schema_version(&self) -> Result<i32, StorageError> {
        self.conn
            .query_row(
                "SELECT COALESCE(MAX(version), 0) FROM schema_version",
                [],
                |row| row.get(0),
            )
            .map_err(|e| StorageError::QueryFailed(e.to_string()))
    }

    /// When `key` was last written, if it exists.
    pub fn saved_at(&self, key: &str) -> Result<Option<DateTime<Utc>>, StorageError> {
        let saved_at: Option<String> = self
            .conn
            .query_row(
                "SELECT saved_at FROM kv_store WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()
            .map_err(|e| StorageError::QueryFailed(e.to_string()))?;

        Ok(saved_at.and_then(|s| {
            DateTime::parse_from_rfc3339(&s)
                .map(|t| t.with_timezone(&Utc))
                .ok()
        }))
    }
}

impl KeyValueStorage for SqliteStorage {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.conn
            .query_row(
                "SELECT value FROM kv_store WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()
            .map_err(|e| StorageError::QueryFailed(e.to_string()))
    }

    fn write(&mut self, key: &str, blob: &str) -> Result<(), StorageError> {
        self.conn
            .execute(
                "INSERT OR REPLACE INTO kv_store (key, value, saved_at) VALUES (?1, ?2, ?3)",
                params![key, blob, Utc::now().to_rfc3339()],
            )
            .map_err(|e| StorageError::QueryFailed(e.to_string()))?;

        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        self.conn
            .execute("DELETE FROM kv_store WHERE key = ?1", params![key])
            .map_err(|e| StorageError::QueryFailed(e.to_string()))?;

        Ok(())
    }
}
