//! Workout module for logged running and cycling sessions.

pub mod input;
pub mod types;

pub use input::{validate_measurements, InputError, WorkoutForm};
pub use types::{
    Coordinates, KindField, UnknownKind, Workout, WorkoutDetails, WorkoutId, WorkoutKind,
};
