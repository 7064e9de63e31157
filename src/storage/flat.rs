//! Flat, variant-erased form of a workout as persisted.
//!
//! Every workout is written as one JSON object with the kind kept as a plain
//! string tag. Reading an object back dispatches on that tag and goes through
//! the workout constructor, so the description and derived metric are always
//! recomputed rather than trusted.

use crate::workouts::input::{validate_measurements, InputError};
use crate::workouts::types::{
    Coordinates, KindField, UnknownKind, Workout, WorkoutDetails, WorkoutId, WorkoutKind,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One persisted workout.
///
/// Aliases accept the key names written by the browser version of the app.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlatWorkout {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, alias = "date", skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(alias = "coords")]
    pub coordinates: [f64; 2],
    pub distance: f64,
    pub duration: f64,
    #[serde(alias = "type")]
    pub kind: String,
    /// Present for running workouts
    #[serde(default, alias = "cedance", skip_serializing_if = "Option::is_none")]
    pub cadence: Option<f64>,
    /// Present for cycling workouts
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub elevation_gain: Option<f64>,
    /// Cached pace, ignored on read
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pace: Option<f64>,
    /// Cached speed, ignored on read
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speed: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, alias = "clicks")]
    pub interaction_count: u32,
}

impl From<&Workout> for FlatWorkout {
    fn from(workout: &Workout) -> Self {
        let (cadence, pace, elevation_gain, speed) = match *workout.details() {
            WorkoutDetails::Running { cadence, pace } => (Some(cadence), Some(pace), None, None),
            WorkoutDetails::Cycling {
                elevation_gain,
                speed,
            } => (None, None, Some(elevation_gain), Some(speed)),
        };

        Self {
            id: Some(workout.id().to_string()),
            created_at: Some(workout.created_at()),
            coordinates: workout.coordinates().to_array(),
            distance: workout.distance(),
            duration: workout.duration(),
            kind: workout.kind().as_str().to_string(),
            cadence,
            elevation_gain,
            pace,
            speed,
            description: Some(workout.description().to_string()),
            interaction_count: workout.interaction_count(),
        }
    }
}

impl FlatWorkout {
    /// Rebuild the typed workout.
    ///
    /// A missing id or timestamp is replaced with a fresh one; a missing kind
    /// field, an unknown kind or an invalid measurement rejects the entry.
    pub fn into_workout(self) -> Result<Workout, EntryError> {
        let kind: WorkoutKind = self.kind.parse()?;

        let field = match kind {
            WorkoutKind::Running => {
                KindField::Cadence(self.cadence.ok_or(EntryError::MissingField("cadence"))?)
            }
            WorkoutKind::Cycling => KindField::ElevationGain(
                self.elevation_gain
                    .ok_or(EntryError::MissingField("elevationGain"))?,
            ),
        };

        validate_measurements(self.distance, self.duration, &field)?;

        let coordinates = Coordinates::from(self.coordinates);
        if !coordinates.is_valid() {
            return Err(EntryError::Invalid(InputError::InvalidCoordinates(
                coordinates,
            )));
        }

        let id = match self.id {
            Some(id) if !id.trim().is_empty() => WorkoutId::from(id),
            _ => WorkoutId::generate(),
        };

        Ok(Workout::restored(
            id,
            self.created_at.unwrap_or_else(Utc::now),
            coordinates,
            self.distance,
            self.duration,
            field,
            self.interaction_count,
        ))
    }
}

/// Why a persisted entry could not be turned back into a workout.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EntryError {
    #[error("{0}")]
    UnknownKind(#[from] UnknownKind),

    #[error("missing field {0}")]
    MissingField(&'static str),

    #[error("invalid value: {0}")]
    Invalid(#[from] InputError),

    #[error("unreadable entry: {0}")]
    Shape(String),
}
