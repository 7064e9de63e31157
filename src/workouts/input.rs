//! Validation of user-entered workout data.
//!
//! Workouts themselves never re-check their inputs, so everything that can
//! reach a constructor from the outside goes through here first.

use super::types::{Coordinates, KindField, UnknownKind, Workout, WorkoutKind};
use thiserror::Error;

/// Raw workout form contents, as typed by the user.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorkoutForm {
    /// "running" or "cycling"
    pub kind: String,
    /// Distance in km
    pub distance: String,
    /// Duration in minutes
    pub duration: String,
    /// Steps per minute (running only)
    pub cadence: String,
    /// Meters climbed (cycling only)
    pub elevation_gain: String,
}

impl WorkoutForm {
    /// Start a form for the given kind tag.
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            ..Default::default()
        }
    }

    pub fn distance(mut self, value: impl Into<String>) -> Self {
        self.distance = value.into();
        self
    }

    pub fn duration(mut self, value: impl Into<String>) -> Self {
        self.duration = value.into();
        self
    }

    pub fn cadence(mut self, value: impl Into<String>) -> Self {
        self.cadence = value.into();
        self
    }

    pub fn elevation_gain(mut self, value: impl Into<String>) -> Self {
        self.elevation_gain = value.into();
        self
    }

    /// Parse and validate the form, then build the matching workout.
    ///
    /// Only the field belonging to the selected kind is read; the other one is
    /// ignored even if filled in.
    pub fn build(&self, coordinates: Coordinates) -> Result<Workout, InputError> {
        let kind: WorkoutKind = self.kind.trim().parse()?;

        if !coordinates.is_valid() {
            return Err(InputError::InvalidCoordinates(coordinates));
        }

        let distance = parse_field("distance", &self.distance)?;
        let duration = parse_field("duration", &self.duration)?;
        let field = match kind {
            WorkoutKind::Running => KindField::Cadence(parse_field("cadence", &self.cadence)?),
            WorkoutKind::Cycling => {
                KindField::ElevationGain(parse_field("elevation gain", &self.elevation_gain)?)
            }
        };

        validate_measurements(distance, duration, &field)?;

        Ok(Workout::new(coordinates, distance, duration, field))
    }
}

/// Check that distance, duration and the kind field are finite and non-negative.
pub fn validate_measurements(
    distance: f64,
    duration: f64,
    field: &KindField,
) -> Result<(), InputError> {
    let extra = match field {
        KindField::Cadence(_) => "cadence",
        KindField::ElevationGain(_) => "elevation gain",
    };

    for (name, value) in [
        ("distance", distance),
        ("duration", duration),
        (extra, field.value()),
    ] {
        check_value(name, value)?;
    }

    Ok(())
}

fn parse_field(field: &'static str, raw: &str) -> Result<f64, InputError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(InputError::Missing(field));
    }

    let value: f64 = raw.parse().map_err(|_| InputError::NotANumber {
        field,
        value: raw.to_string(),
    })?;

    check_value(field, value)?;
    Ok(value)
}

fn check_value(field: &'static str, value: f64) -> Result<(), InputError> {
    if !value.is_finite() {
        return Err(InputError::NotFinite(field));
    }
    if value < 0.0 {
        return Err(InputError::Negative { field, value });
    }
    Ok(())
}

/// Rejected workout input.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InputError {
    #[error("{0}")]
    UnknownKind(#[from] UnknownKind),

    #[error("Please enter a value for {0}")]
    Missing(&'static str),

    #[error("Please enter a valid number for {field} (got {value:?})")]
    NotANumber { field: &'static str, value: String },

    #[error("Please enter a finite number for {0}")]
    NotFinite(&'static str),

    #[error("Please enter a positive number for {field} (got {value})")]
    Negative { field: &'static str, value: f64 },

    #[error("Invalid coordinates: {0}")]
    InvalidCoordinates(Coordinates),
}
