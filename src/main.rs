//! Mapty - Map-based Workout Log
//!
//! Command-line entry point.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use mapty::storage::config::{self, AppConfig};
use mapty::storage::{SqliteStorage, WorkoutStore};
use mapty::workouts::WorkoutForm;
use mapty::{Coordinates, Presenter};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(name = "mapty")]
#[command(version, about = "Log running and cycling workouts on a map", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file (defaults to config.toml in the data directory)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Log a workout at a location
    Add {
        /// Workout kind: running or cycling
        kind: String,

        /// Latitude in degrees
        #[arg(long, allow_negative_numbers = true)]
        lat: f64,

        /// Longitude in degrees
        #[arg(long, allow_negative_numbers = true)]
        lng: f64,

        /// Distance in km
        #[arg(short, long, allow_hyphen_values = true)]
        distance: String,

        /// Duration in minutes
        #[arg(short = 't', long, allow_hyphen_values = true)]
        duration: String,

        /// Cadence in steps/min (running)
        #[arg(long, default_value = "", allow_hyphen_values = true)]
        cadence: String,

        /// Elevation gain in meters (cycling)
        #[arg(short, long, default_value = "", allow_hyphen_values = true)]
        elevation: String,
    },

    /// Show all workouts, newest first
    List,

    /// Select a workout by id and show it
    Select {
        /// Workout id
        id: String,
    },

    /// Print the saved workouts as JSON
    Export,

    /// Delete all workouts
    Reset,
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let app_config = match &cli.config {
        Some(path) => config::load_config_from(path),
        None => config::load_config(),
    }
    .context("Failed to load configuration")?;

    tracing::debug!("Starting Mapty v{}", env!("CARGO_PKG_VERSION"));

    let mut presenter = open_presenter(&app_config)?;

    match cli.command {
        Commands::Add {
            kind,
            lat,
            lng,
            distance,
            duration,
            cadence,
            elevation,
        } => {
            let form = WorkoutForm::new(kind)
                .distance(distance)
                .duration(duration)
                .cadence(cadence)
                .elevation_gain(elevation);

            presenter.pick_location(Coordinates::new(lat, lng));
            let workout = presenter.submit(&form)?.clone();
            let label = presenter.marker_label(&workout);
            let entry = presenter.render_entry(&workout);
            println!("{}", label);
            println!("{}", entry);
        }
        Commands::List => {
            let entries = presenter.render_list();
            if entries.is_empty() {
                println!("No workouts yet.");
            }
            for entry in entries {
                println!("{}", entry);
            }
        }
        Commands::Select { id } => match presenter.select(&id).cloned() {
            Some(workout) => {
                presenter.save().context("Failed to save selection")?;
                let entry = presenter.render_entry(&workout);
                println!("{}", entry);
                println!("  at {}", workout.coordinates());
            }
            None => println!("No workout with id {}", id),
        },
        Commands::Export => {
            println!("{}", presenter.store().serialize()?);
        }
        Commands::Reset => {
            presenter.reset()?;
            println!("All workouts deleted.");
        }
    }

    Ok(())
}

/// Open the configured database and restore saved workouts.
fn open_presenter(app_config: &AppConfig) -> Result<Presenter<SqliteStorage>> {
    let path = app_config.database_path();
    let storage = SqliteStorage::open(&path)
        .with_context(|| format!("Failed to open database at {}", path.display()))?;

    let store = WorkoutStore::new(
        storage,
        app_config.storage.key.clone(),
        app_config.storage.restore_policy,
    );
    let mut presenter = Presenter::new(store, app_config.display.units);

    match presenter.start() {
        Ok(report) => {
            for skipped in &report.skipped {
                eprintln!(
                    "Warning: dropped saved workout #{}: {}",
                    skipped.index, skipped.reason
                );
            }
            if let Some(backup_key) = &report.backup_key {
                eprintln!(
                    "Warning: saved workouts were unreadable and were kept under {:?}",
                    backup_key
                );
            }
        }
        Err(e) => return Err(e).context("Failed to restore saved workouts"),
    }

    Ok(presenter)
}
