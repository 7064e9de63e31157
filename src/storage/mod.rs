//! Storage module for workout persistence and configuration.

pub mod config;
pub mod database;
pub mod flat;
pub mod kv;
pub mod schema;
pub mod store;

pub use config::{AppConfig, DisplaySettings, StorageSettings, Units};
pub use database::SqliteStorage;
pub use flat::{EntryError, FlatWorkout};
pub use kv::{KeyValueStorage, MemoryStorage, StorageError};
pub use store::{
    RestorePolicy, RestoreReport, SkippedEntry, StoreError, WorkoutStore, DEFAULT_STORAGE_KEY,
};
