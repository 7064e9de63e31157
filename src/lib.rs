//! Mapty - Map-based Workout Log
//!
//! Logs running and cycling workouts at a map location, computes pace or
//! speed for each one, and keeps the whole log in local storage between
//! sessions.

pub mod presenter;
pub mod storage;
pub mod workouts;

// Re-export commonly used types
pub use presenter::{Presenter, PresenterError};
pub use storage::config::AppConfig;
pub use storage::store::{RestorePolicy, WorkoutStore};
pub use workouts::types::{Coordinates, Workout, WorkoutKind};
