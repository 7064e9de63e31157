//! Glue between user intents and the workout store.
//!
//! Holds the location picked on the map, turns submitted forms into
//! workouts, and renders the store for the list and the map markers.

use crate::storage::config::Units;
use crate::storage::kv::KeyValueStorage;
use crate::storage::store::{RestoreReport, StoreError, WorkoutStore};
use crate::workouts::input::{InputError, WorkoutForm};
use crate::workouts::types::{Coordinates, Workout, WorkoutDetails};
use thiserror::Error;

/// Front-end state around a [`WorkoutStore`].
pub struct Presenter<S: KeyValueStorage> {
    store: WorkoutStore<S>,
    units: Units,
    pending_location: Option<Coordinates>,
}

impl<S: KeyValueStorage> Presenter<S> {
    pub fn new(store: WorkoutStore<S>, units: Units) -> Self {
        Self {
            store,
            units,
            pending_location: None,
        }
    }

    pub fn store(&self) -> &WorkoutStore<S> {
        &self.store
    }

    pub fn pending_location(&self) -> Option<Coordinates> {
        self.pending_location
    }

    /// Restore saved workouts.
    pub fn start(&mut self) -> Result<RestoreReport, StoreError> {
        self.store.load()
    }

    /// Remember where the next workout happened.
    pub fn pick_location(&mut self, coordinates: Coordinates) {
        self.pending_location = Some(coordinates);
    }

    /// Validate the form and log a workout at the picked location.
    ///
    /// The pending location is consumed once the workout is in the store,
    /// even if saving it failed.
    pub fn submit(&mut self, form: &WorkoutForm) -> Result<&Workout, PresenterError> {
        let coordinates = self.pending_location.ok_or(PresenterError::NoLocation)?;
        let workout = form.build(coordinates)?;

        self.pending_location = None;
        Ok(self.store.add(workout)?)
    }

    /// Handle a click on a list entry. Unknown ids are ignored.
    pub fn select(&mut self, id: &str) -> Option<&Workout> {
        self.store.select(id)
    }

    /// Persist selection counts recorded since the last write.
    pub fn save(&mut self) -> Result<(), StoreError> {
        self.store.save()
    }

    /// Remove every workout, in memory and on disk.
    pub fn reset(&mut self) -> Result<(), StoreError> {
        self.pending_location = None;
        self.store.clear()
    }

    /// Popup text for a workout's map marker.
    pub fn marker_label(&self, workout: &Workout) -> String {
        format!("{} {}", workout.kind().icon(), workout.description())
    }

    /// Render one list entry.
    pub fn render_entry(&self, workout: &Workout) -> String {
        let (distance, distance_unit) = self.units.convert_distance(workout.distance());

        let (metric, metric_unit, extra) = match *workout.details() {
            WorkoutDetails::Running { cadence, pace } => {
                let (pace, unit) = self.units.convert_pace(pace);
                (pace, unit, format!("\u{1F9B6} {} spm", cadence))
            }
            WorkoutDetails::Cycling {
                elevation_gain,
                speed,
            } => {
                let (speed, unit) = self.units.convert_speed(speed);
                let (elevation, elevation_unit) = self.units.convert_elevation(elevation_gain);
                (speed, unit, format!("\u{26F0} {:.0} {}", elevation, elevation_unit))
            }
        };

        format!(
            "[{}] {}\n  {} {:.2} {}  \u{23F1} {} min  \u{26A1} {:.1} {}  {}",
            workout.id(),
            workout.description(),
            workout.kind().icon(),
            distance,
            distance_unit,
            workout.duration(),
            metric,
            metric_unit,
            extra
        )
    }

    /// Render the whole list, newest first.
    pub fn render_list(&self) -> Vec<String> {
        self.store
            .workouts()
            .iter()
            .rev()
            .map(|w| self.render_entry(w))
            .collect()
    }
}

/// Errors surfaced to the user.
#[derive(Debug, Error)]
pub enum PresenterError {
    #[error("Pick a location on the map first")]
    NoLocation,

    #[error("{0}")]
    Input(#[from] InputError),

    #[error("{0}")]
    Store(#[from] StoreError),
}
