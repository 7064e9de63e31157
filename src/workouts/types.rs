//! Workout types and enums.
//!
//! A workout is either a run or a ride. Both share location, distance,
//! duration and a creation timestamp; each carries one kind-specific input
//! (cadence or elevation gain) and one derived metric (pace or speed) that is
//! computed once when the workout is built.

use chrono::{DateTime, Local, Utc};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use uuid::Uuid;

/// Kind of workout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WorkoutKind {
    /// Running session (cadence in steps/min, pace in min/km)
    Running,
    /// Cycling session (elevation gain in meters, speed in km/h)
    Cycling,
}

impl WorkoutKind {
    /// Storage tag for this kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            WorkoutKind::Running => "running",
            WorkoutKind::Cycling => "cycling",
        }
    }

    /// Icon shown next to the workout on the map and in the list.
    pub fn icon(&self) -> &'static str {
        match self {
            WorkoutKind::Running => "\u{1F3C3}\u{200D}\u{2642}\u{FE0F}",
            WorkoutKind::Cycling => "\u{1F6B4}\u{200D}\u{2640}\u{FE0F}",
        }
    }
}

impl fmt::Display for WorkoutKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WorkoutKind::Running => write!(f, "Running"),
            WorkoutKind::Cycling => write!(f, "Cycling"),
        }
    }
}

impl FromStr for WorkoutKind {
    type Err = UnknownKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "running" => Ok(WorkoutKind::Running),
            "cycling" => Ok(WorkoutKind::Cycling),
            other => Err(UnknownKind(other.to_string())),
        }
    }
}

/// A workout tag that is not one of the supported kinds.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown workout kind: {0:?}")]
pub struct UnknownKind(pub String);

/// Map position of a workout.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinates {
    /// Latitude in degrees
    pub lat: f64,
    /// Longitude in degrees
    pub lng: f64,
}

impl Coordinates {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Check that both components are finite and inside the valid degree ranges.
    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lng.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lng)
    }

    /// `[lat, lng]` pair as stored.
    pub fn to_array(self) -> [f64; 2] {
        [self.lat, self.lng]
    }
}

impl From<[f64; 2]> for Coordinates {
    fn from([lat, lng]: [f64; 2]) -> Self {
        Self { lat, lng }
    }
}

impl fmt::Display for Coordinates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.5}, {:.5}", self.lat, self.lng)
    }
}

/// Opaque workout identifier.
///
/// New workouts get a random UUID. Identifiers read back from storage are
/// kept verbatim, whatever their format.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct WorkoutId(String);

impl WorkoutId {
    /// Generate a fresh identifier.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for WorkoutId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for WorkoutId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl fmt::Display for WorkoutId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The kind-specific input supplied when a workout is created.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum KindField {
    /// Running cadence in steps per minute
    Cadence(f64),
    /// Cycling elevation gain in meters
    ElevationGain(f64),
}

impl KindField {
    /// Kind implied by this field.
    pub fn kind(&self) -> WorkoutKind {
        match self {
            KindField::Cadence(_) => WorkoutKind::Running,
            KindField::ElevationGain(_) => WorkoutKind::Cycling,
        }
    }

    pub fn value(&self) -> f64 {
        match self {
            KindField::Cadence(v) | KindField::ElevationGain(v) => *v,
        }
    }
}

/// Kind-specific data of a workout, including its cached derived metric.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum WorkoutDetails {
    Running {
        /// Steps per minute
        cadence: f64,
        /// Minutes per km
        pace: f64,
    },
    Cycling {
        /// Meters climbed
        elevation_gain: f64,
        /// km/h
        speed: f64,
    },
}

impl WorkoutDetails {
    /// Compute the details for a kind field from distance (km) and duration (min).
    fn derive(field: KindField, distance: f64, duration: f64) -> Self {
        match field {
            KindField::Cadence(cadence) => WorkoutDetails::Running {
                cadence,
                pace: duration / distance,
            },
            KindField::ElevationGain(elevation_gain) => WorkoutDetails::Cycling {
                elevation_gain,
                speed: distance / (duration / 60.0),
            },
        }
    }

    pub fn kind(&self) -> WorkoutKind {
        match self {
            WorkoutDetails::Running { .. } => WorkoutKind::Running,
            WorkoutDetails::Cycling { .. } => WorkoutKind::Cycling,
        }
    }
}

/// A logged workout.
///
/// Everything except the interaction counter is fixed at construction.
#[derive(Debug, Clone, PartialEq)]
pub struct Workout {
    id: WorkoutId,
    created_at: DateTime<Utc>,
    coordinates: Coordinates,
    /// Distance in km
    distance: f64,
    /// Duration in minutes
    duration: f64,
    description: String,
    /// Number of times the workout was selected; the only mutable field
    interaction_count: u32,
    details: WorkoutDetails,
}

impl Workout {
    /// Create a new workout of the kind implied by `field`.
    ///
    /// Inputs are not validated here; see [`crate::workouts::input`].
    pub fn new(coordinates: Coordinates, distance: f64, duration: f64, field: KindField) -> Self {
        Self::assemble(
            WorkoutId::generate(),
            Utc::now(),
            coordinates,
            distance,
            duration,
            field,
            0,
        )
    }

    /// Create a running workout.
    pub fn running(coordinates: Coordinates, distance: f64, duration: f64, cadence: f64) -> Self {
        Self::new(coordinates, distance, duration, KindField::Cadence(cadence))
    }

    /// Create a cycling workout.
    pub fn cycling(
        coordinates: Coordinates,
        distance: f64,
        duration: f64,
        elevation_gain: f64,
    ) -> Self {
        Self::new(
            coordinates,
            distance,
            duration,
            KindField::ElevationGain(elevation_gain),
        )
    }

    /// Rebuild a workout read back from storage.
    ///
    /// Identity and interaction count are carried over; description and the
    /// derived metric are recomputed.
    pub(crate) fn restored(
        id: WorkoutId,
        created_at: DateTime<Utc>,
        coordinates: Coordinates,
        distance: f64,
        duration: f64,
        field: KindField,
        interaction_count: u32,
    ) -> Self {
        Self::assemble(
            id,
            created_at,
            coordinates,
            distance,
            duration,
            field,
            interaction_count,
        )
    }

    fn assemble(
        id: WorkoutId,
        created_at: DateTime<Utc>,
        coordinates: Coordinates,
        distance: f64,
        duration: f64,
        field: KindField,
        interaction_count: u32,
    ) -> Self {
        Self {
            id,
            created_at,
            coordinates,
            distance,
            duration,
            description: describe(field.kind(), created_at),
            interaction_count,
            details: WorkoutDetails::derive(field, distance, duration),
        }
    }

    pub fn id(&self) -> &WorkoutId {
        &self.id
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn coordinates(&self) -> Coordinates {
        self.coordinates
    }

    /// Distance in km.
    pub fn distance(&self) -> f64 {
        self.distance
    }

    /// Duration in minutes.
    pub fn duration(&self) -> f64 {
        self.duration
    }

    pub fn kind(&self) -> WorkoutKind {
        self.details.kind()
    }

    /// Human-readable title, e.g. "Running on October 19".
    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn interaction_count(&self) -> u32 {
        self.interaction_count
    }

    pub fn details(&self) -> &WorkoutDetails {
        &self.details
    }

    /// The kind-specific input this workout was built from.
    pub fn kind_field(&self) -> KindField {
        match self.details {
            WorkoutDetails::Running { cadence, .. } => KindField::Cadence(cadence),
            WorkoutDetails::Cycling { elevation_gain, .. } => {
                KindField::ElevationGain(elevation_gain)
            }
        }
    }

    /// Pace (min/km) for runs or speed (km/h) for rides.
    pub fn derived_metric(&self) -> f64 {
        match self.details {
            WorkoutDetails::Running { pace, .. } => pace,
            WorkoutDetails::Cycling { speed, .. } => speed,
        }
    }

    /// Pace in minutes per km, for runs only.
    pub fn pace(&self) -> Option<f64> {
        match self.details {
            WorkoutDetails::Running { pace, .. } => Some(pace),
            WorkoutDetails::Cycling { .. } => None,
        }
    }

    /// Speed in km/h, for rides only.
    pub fn speed(&self) -> Option<f64> {
        match self.details {
            WorkoutDetails::Cycling { speed, .. } => Some(speed),
            WorkoutDetails::Running { .. } => None,
        }
    }

    /// Cadence in steps per minute, for runs only.
    pub fn cadence(&self) -> Option<f64> {
        match self.details {
            WorkoutDetails::Running { cadence, .. } => Some(cadence),
            WorkoutDetails::Cycling { .. } => None,
        }
    }

    /// Elevation gain in meters, for rides only.
    pub fn elevation_gain(&self) -> Option<f64> {
        match self.details {
            WorkoutDetails::Cycling { elevation_gain, .. } => Some(elevation_gain),
            WorkoutDetails::Running { .. } => None,
        }
    }

    /// Record one more selection of this workout.
    pub fn mark_interacted(&mut self) {
        self.interaction_count = self.interaction_count.saturating_add(1);
    }
}

/// Build the "<Kind> on <Month> <Day>" title in local time.
fn describe(kind: WorkoutKind, created_at: DateTime<Utc>) -> String {
    format!(
        "{} on {}",
        kind,
        created_at.with_timezone(&Local).format("%B %-d")
    )
}
