//! Application configuration.
//!
//! Loaded from `config.toml` in the platform data directory. Missing files and
//! missing sections fall back to defaults.

use crate::storage::store::{RestorePolicy, DEFAULT_STORAGE_KEY};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const KM_TO_MI: f64 = 0.621371;
const M_TO_FT: f64 = 3.28084;

/// Unit system preference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Units {
    /// Metric units (km, km/h, min/km, m)
    #[default]
    Metric,
    /// Imperial units (mi, mph, min/mi, ft)
    Imperial,
}

impl std::fmt::Display for Units {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Units::Metric => write!(f, "Metric"),
            Units::Imperial => write!(f, "Imperial"),
        }
    }
}

impl Units {
    /// Convert a distance in km.
    pub fn convert_distance(&self, distance_km: f64) -> (f64, &'static str) {
        match self {
            Units::Metric => (distance_km, "km"),
            Units::Imperial => (distance_km * KM_TO_MI, "mi"),
        }
    }

    /// Convert a speed in km/h.
    pub fn convert_speed(&self, speed_kmh: f64) -> (f64, &'static str) {
        match self {
            Units::Metric => (speed_kmh, "km/h"),
            Units::Imperial => (speed_kmh * KM_TO_MI, "mph"),
        }
    }

    /// Convert a pace in min/km.
    pub fn convert_pace(&self, pace_min_per_km: f64) -> (f64, &'static str) {
        match self {
            Units::Metric => (pace_min_per_km, "min/km"),
            Units::Imperial => (pace_min_per_km / KM_TO_MI, "min/mi"),
        }
    }

    /// Convert an elevation in meters.
    pub fn convert_elevation(&self, meters: f64) -> (f64, &'static str) {
        match self {
            Units::Metric => (meters, "m"),
            Units::Imperial => (meters * M_TO_FT, "ft"),
        }
    }
}

/// Application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Application version
    pub version: String,
    /// Data directory path
    #[serde(skip)]
    pub data_dir: PathBuf,
    /// Storage settings
    pub storage: StorageSettings,
    /// Display settings
    pub display: DisplaySettings,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
            data_dir: PathBuf::new(),
            storage: StorageSettings::default(),
            display: DisplaySettings::default(),
        }
    }
}

impl AppConfig {
    /// Full path of the workout database.
    pub fn database_path(&self) -> PathBuf {
        self.data_dir.join(&self.storage.database_file)
    }
}

/// Storage-related settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageSettings {
    /// Database file name, relative to the data directory
    pub database_file: String,
    /// Key the workout list is saved under
    pub key: String,
    /// Handling of unreadable saved entries
    pub restore_policy: RestorePolicy,
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            database_file: "mapty.db".to_string(),
            key: DEFAULT_STORAGE_KEY.to_string(),
            restore_policy: RestorePolicy::BestEffort,
        }
    }
}

/// Display-related settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplaySettings {
    /// Unit preference
    pub units: Units,
}

/// Get the application data directory.
pub fn get_data_dir() -> PathBuf {
    directories::ProjectDirs::from("com", "mapty", "Mapty")
        .map(|dirs| dirs.data_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Get the configuration file path.
pub fn get_config_path() -> PathBuf {
    get_data_dir().join("config.toml")
}

/// Load application configuration from the default location.
pub fn load_config() -> Result<AppConfig, ConfigError> {
    load_config_from(&get_config_path())
}

/// Load application configuration from `path`.
///
/// The data directory is the directory containing the file.
pub fn load_config_from(path: &Path) -> Result<AppConfig, ConfigError> {
    let data_dir = path
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(get_data_dir);

    if !path.exists() {
        return Ok(AppConfig {
            data_dir,
            ..Default::default()
        });
    }

    let content =
        std::fs::read_to_string(path).map_err(|e| ConfigError::IoError(e.to_string()))?;

    let mut config: AppConfig =
        toml::from_str(&content).map_err(|e| ConfigError::ParseError(e.to_string()))?;

    config.data_dir = data_dir;

    Ok(config)
}

/// Save application configuration to `path`.
pub fn save_config_to(config: &AppConfig, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| ConfigError::IoError(e.to_string()))?;
    }

    let content =
        toml::to_string_pretty(config).map_err(|e| ConfigError::SerializeError(e.to_string()))?;

    std::fs::write(path, content).map_err(|e| ConfigError::IoError(e.to_string()))?;

    Ok(())
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Serialize error: {0}")]
    SerializeError(String),
}
