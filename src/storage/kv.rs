//! Key/value persistence surface used by the workout store.

use std::collections::HashMap;
use thiserror::Error;

/// Synchronous key/value storage for serialized blobs.
pub trait KeyValueStorage {
    /// Read the blob stored under `key`, if any.
    fn read(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Store `blob` under `key`, replacing any previous value.
    fn write(&mut self, key: &str, blob: &str) -> Result<(), StorageError>;

    /// Remove `key`. Removing an absent key is not an error.
    fn remove(&mut self, key: &str) -> Result<(), StorageError>;
}

impl<T: KeyValueStorage + ?Sized> KeyValueStorage for Box<T> {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).read(key)
    }

    fn write(&mut self, key: &str, blob: &str) -> Result<(), StorageError> {
        (**self).write(key, blob)
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        (**self).remove(key)
    }
}

/// In-process storage; contents are lost when dropped.
#[derive(Debug, Default, Clone)]
pub struct MemoryStorage {
    entries: HashMap<String, String>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored keys.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl KeyValueStorage for MemoryStorage {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries.get(key).cloned())
    }

    fn write(&mut self, key: &str, blob: &str) -> Result<(), StorageError> {
        self.entries.insert(key.to_string(), blob.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        self.entries.remove(key);
        Ok(())
    }
}

/// Storage errors.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Failed to connect to storage: {0}")]
    ConnectionFailed(String),

    #[error("IO error: {0}")]
    IoError(String),

    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    #[error("Query failed: {0}")]
    QueryFailed(String),
}
