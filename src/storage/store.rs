//! In-memory workout collection with a durable, flat persisted form.

use crate::storage::flat::{EntryError, FlatWorkout};
use crate::storage::kv::{KeyValueStorage, StorageError};
use crate::workouts::types::Workout;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default storage key for the workout blob.
pub const DEFAULT_STORAGE_KEY: &str = "workouts";

/// How restore treats entries it cannot rebuild.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RestorePolicy {
    /// Skip bad entries and keep the rest
    #[default]
    BestEffort,
    /// Fail the whole restore on the first bad entry
    Strict,
}

impl std::fmt::Display for RestorePolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RestorePolicy::BestEffort => write!(f, "best effort"),
            RestorePolicy::Strict => write!(f, "strict"),
        }
    }
}

/// A persisted entry that was dropped during restore.
#[derive(Debug, Clone, PartialEq)]
pub struct SkippedEntry {
    /// Position in the persisted array
    pub index: usize,
    pub reason: EntryError,
}

/// Outcome of a restore.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RestoreReport {
    /// Number of workouts rebuilt
    pub restored: usize,
    /// Entries dropped under the best-effort policy
    pub skipped: Vec<SkippedEntry>,
    /// Key the unreadable blob was copied to before starting empty
    pub backup_key: Option<String>,
}

impl RestoreReport {
    pub fn is_clean(&self) -> bool {
        self.skipped.is_empty()
    }
}

/// Ordered workout collection backed by key/value storage.
///
/// Insertion order is kept and drives list order. `add`, `save` and `clear`
/// write through to storage; `restore` only touches memory.
///
/// When `load` finds a blob it cannot parse and could not set it aside,
/// writes are refused until `clear` so the saved history is never replaced.
pub struct WorkoutStore<S: KeyValueStorage> {
    storage: S,
    key: String,
    policy: RestorePolicy,
    workouts: Vec<Workout>,
    unreadable_blob: bool,
}

impl<S: KeyValueStorage> WorkoutStore<S> {
    /// Create an empty store writing under `key`.
    pub fn new(storage: S, key: impl Into<String>, policy: RestorePolicy) -> Self {
        Self {
            storage,
            key: key.into(),
            policy,
            workouts: Vec::new(),
            unreadable_blob: false,
        }
    }

    /// Create an empty store with the default key and best-effort restore.
    pub fn with_defaults(storage: S) -> Self {
        Self::new(storage, DEFAULT_STORAGE_KEY, RestorePolicy::default())
    }

    pub fn policy(&self) -> RestorePolicy {
        self.policy
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// All workouts in insertion order.
    pub fn workouts(&self) -> &[Workout] {
        &self.workouts
    }

    pub fn len(&self) -> usize {
        self.workouts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.workouts.is_empty()
    }

    /// Append a workout and persist the whole collection.
    ///
    /// If the write fails the workout stays in memory and the storage error
    /// is returned. Nothing changes while an unreadable blob is guarded.
    pub fn add(&mut self, workout: Workout) -> Result<&Workout, StoreError> {
        self.check_writable()?;
        tracing::debug!(
            "Adding {} workout {} ({})",
            workout.kind().as_str(),
            workout.id(),
            workout.description()
        );
        self.workouts.push(workout);

        self.persist()?;

        let index = self.workouts.len() - 1;
        Ok(&self.workouts[index])
    }

    /// Look up a workout by id.
    pub fn find_by_id(&self, id: &str) -> Option<&Workout> {
        self.workouts.iter().find(|w| w.id().as_str() == id)
    }

    /// Look up a workout and record the selection on it.
    ///
    /// Memory only; call [`WorkoutStore::save`] to persist the new count.
    pub fn select(&mut self, id: &str) -> Option<&Workout> {
        let workout = self.workouts.iter_mut().find(|w| w.id().as_str() == id)?;
        workout.mark_interacted();
        tracing::debug!(
            "Selected workout {} ({} interactions)",
            id,
            workout.interaction_count()
        );
        Some(&*workout)
    }

    /// Flat JSON form of every workout, exactly as persisted.
    pub fn serialize(&self) -> Result<String, StoreError> {
        let flat: Vec<FlatWorkout> = self.workouts.iter().map(FlatWorkout::from).collect();
        serde_json::to_string(&flat).map_err(|e| StoreError::SerializationError(e.to_string()))
    }

    /// Replace the in-memory collection with the workouts in `blob`.
    ///
    /// Under [`RestorePolicy::Strict`] a bad entry aborts the restore and the
    /// current collection is kept. Storage is never written.
    pub fn restore(&mut self, blob: &str) -> Result<RestoreReport, StoreError> {
        let entries: Option<Vec<serde_json::Value>> =
            serde_json::from_str(blob).map_err(|e| StoreError::CorruptBlob(e.to_string()))?;
        let entries = entries.unwrap_or_default();

        let mut workouts = Vec::with_capacity(entries.len());
        let mut report = RestoreReport::default();

        for (index, entry) in entries.into_iter().enumerate() {
            match rebuild_entry(entry) {
                Ok(workout) => workouts.push(workout),
                Err(reason) => match self.policy {
                    RestorePolicy::Strict => {
                        return Err(StoreError::MalformedEntry { index, reason });
                    }
                    RestorePolicy::BestEffort => {
                        tracing::warn!("Skipping stored workout #{}: {}", index, reason);
                        report.skipped.push(SkippedEntry { index, reason });
                    }
                },
            }
        }

        report.restored = workouts.len();
        self.workouts = workouts;

        Ok(report)
    }

    /// Write the current collection under this store's key.
    pub fn save(&mut self) -> Result<(), StoreError> {
        self.check_writable()?;
        self.persist()
    }

    /// Restore from the blob saved under this store's key.
    ///
    /// An absent key leaves the store empty. A blob that is not a JSON array
    /// fails under [`RestorePolicy::Strict`] and blocks writes. Under
    /// [`RestorePolicy::BestEffort`] it is copied to a backup key first and
    /// the store starts empty.
    pub fn load(&mut self) -> Result<RestoreReport, StoreError> {
        match self.storage.read(&self.key)? {
            Some(blob) => {
                let report = match self.restore(&blob) {
                    Err(StoreError::CorruptBlob(reason)) => self.set_aside(&blob, reason)?,
                    other => {
                        let report = other?;
                        self.unreadable_blob = false;
                        report
                    }
                };
                tracing::info!(
                    "Loaded {} workouts ({} skipped)",
                    report.restored,
                    report.skipped.len()
                );
                Ok(report)
            }
            None => {
                self.workouts.clear();
                self.unreadable_blob = false;
                tracing::info!("No saved workouts under key {:?}", self.key);
                Ok(RestoreReport::default())
            }
        }
    }

    /// Drop every workout and erase the persisted blob.
    pub fn clear(&mut self) -> Result<(), StoreError> {
        self.workouts.clear();
        self.unreadable_blob = false;
        self.storage.remove(&self.key).inspect_err(|e| {
            tracing::warn!("Failed to erase saved workouts: {}", e);
        })?;
        tracing::info!("Cleared all workouts");
        Ok(())
    }

    /// Whether writes are refused because the saved blob could not be read.
    pub fn is_guarding_unreadable_blob(&self) -> bool {
        self.unreadable_blob
    }

    fn set_aside(&mut self, blob: &str, reason: String) -> Result<RestoreReport, StoreError> {
        self.unreadable_blob = true;
        if self.policy == RestorePolicy::Strict {
            return Err(StoreError::CorruptBlob(reason));
        }

        let backup_key = format!(
            "{}.corrupt-{}",
            self.key,
            Utc::now().format("%Y%m%dT%H%M%S%.3f")
        );
        self.storage.write(&backup_key, blob).inspect_err(|e| {
            tracing::error!("Failed to back up unreadable workouts: {}", e);
        })?;
        tracing::warn!(
            "Saved workouts are unreadable ({}); copied to {:?} and starting empty",
            reason,
            backup_key
        );

        self.unreadable_blob = false;
        self.workouts.clear();
        Ok(RestoreReport {
            backup_key: Some(backup_key),
            ..RestoreReport::default()
        })
    }

    fn check_writable(&self) -> Result<(), StoreError> {
        if self.unreadable_blob {
            return Err(StoreError::UnreadableBlob(self.key.clone()));
        }
        Ok(())
    }

    fn persist(&mut self) -> Result<(), StoreError> {
        let blob = self.serialize()?;
        self.storage.write(&self.key, &blob).inspect_err(|e| {
            tracing::warn!("Failed to save {} workouts: {}", self.workouts.len(), e);
        })?;
        Ok(())
    }
}

fn rebuild_entry(entry: serde_json::Value) -> Result<Workout, EntryError> {
    let flat: FlatWorkout =
        serde_json::from_value(entry).map_err(|e| EntryError::Shape(e.to_string()))?;
    flat.into_workout()
}

/// Workout store errors.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Saved workouts are not a JSON array: {0}")]
    CorruptBlob(String),

    #[error("Malformed workout entry #{index}: {reason}")]
    MalformedEntry { index: usize, reason: EntryError },

    #[error("Saved workouts under {0:?} are unreadable; reset before saving new ones")]
    UnreadableBlob(String),
}
