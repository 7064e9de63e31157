//! Database schema definitions for Mapty.

/// SQL schema for creating all database tables.
pub const SCHEMA: &str = r#"
-- Key/value blobs (one row per storage key)
CREATE TABLE IF NOT EXISTS kv_store (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL,
    saved_at TEXT NOT NULL
);
"#;

/// Schema version tracking table.
pub const SCHEMA_VERSION_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS schema_version (
    version INTEGER PRIMARY KEY,
    applied_at TEXT NOT NULL
);
"#;

/// Current schema version.
pub const CURRENT_VERSION: i32 = 1;
