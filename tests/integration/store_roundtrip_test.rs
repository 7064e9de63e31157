//! Integration tests for serializing and restoring the workout store.

use mapty::storage::{
    EntryError, KeyValueStorage, MemoryStorage, RestorePolicy, SqliteStorage, StoreError,
    WorkoutStore, DEFAULT_STORAGE_KEY,
};
use mapty::workouts::{Coordinates, Workout, WorkoutKind};
use serde_json::{json, Value};

/// Build a mixed list of valid workouts following a kind pattern.
fn mixed_workouts(pattern: &[WorkoutKind]) -> Vec<Workout> {
    pattern
        .iter()
        .enumerate()
        .map(|(i, kind)| {
            let i = i as f64;
            let coords = Coordinates::new(40.0 + i * 0.01, -3.7 - i * 0.01);
            match kind {
                WorkoutKind::Running => {
                    Workout::running(coords, 3.0 + i, 18.0 + 5.0 * i, 160.0 + i)
                }
                WorkoutKind::Cycling => {
                    Workout::cycling(coords, 15.0 + 2.0 * i, 40.0 + 3.0 * i, 100.0 * i)
                }
            }
        })
        .collect()
}

fn patterns() -> Vec<Vec<WorkoutKind>> {
    use WorkoutKind::{Cycling, Running};
    vec![
        vec![Running],
        vec![Cycling],
        vec![Running, Cycling],
        vec![Cycling, Cycling, Running],
        vec![Running, Running, Cycling, Running, Cycling, Cycling, Running],
    ]
}

#[test]
fn test_roundtrip_preserves_order_kind_and_metrics() {
    for pattern in patterns() {
        let mut source = WorkoutStore::with_defaults(MemoryStorage::new());
        for workout in mixed_workouts(&pattern) {
            source.add(workout).unwrap();
        }

        let blob = source.serialize().unwrap();
        let mut restored = WorkoutStore::with_defaults(MemoryStorage::new());
        let report = restored.restore(&blob).unwrap();

        assert!(report.is_clean());
        assert_eq!(restored.len(), source.len());

        for (original, copy) in source.workouts().iter().zip(restored.workouts()) {
            assert_eq!(copy.kind(), original.kind());
            assert_eq!(copy.derived_metric(), original.derived_metric());
            assert_eq!(copy.id(), original.id());
            assert_eq!(copy.created_at(), original.created_at());
            assert_eq!(copy.description(), original.description());
            assert_eq!(copy.coordinates(), original.coordinates());
            assert_eq!(copy.kind_field(), original.kind_field());
        }
    }
}

#[test]
fn test_roundtrip_is_bit_exact_for_inexact_decimals() {
    let mut source = WorkoutStore::with_defaults(MemoryStorage::new());
    for n in 0..500 {
        let step = n as f64;
        let coords = Coordinates::new(40.0 + step * 0.01, -3.7 - step * 0.01);
        let distance = 0.1 * step + 0.73;
        let duration = 19.11 + step * 0.37;
        let workout = if n % 2 == 0 {
            Workout::running(coords, distance, duration, 150.0 + 0.1 * step)
        } else {
            Workout::cycling(coords, distance, duration, 0.3 * step)
        };
        source.add(workout).unwrap();
    }

    let mut restored = WorkoutStore::with_defaults(MemoryStorage::new());
    restored.restore(&source.serialize().unwrap()).unwrap();

    for (original, copy) in source.workouts().iter().zip(restored.workouts()) {
        assert_eq!(
            copy.derived_metric().to_bits(),
            original.derived_metric().to_bits(),
            "metric drifted for {} km in {} min",
            original.distance(),
            original.duration()
        );
        assert_eq!(copy.distance().to_bits(), original.distance().to_bits());
        assert_eq!(copy.duration().to_bits(), original.duration().to_bits());
        assert_eq!(copy.coordinates(), original.coordinates());
        assert_eq!(copy.kind_field(), original.kind_field());
    }
}

#[test]
fn test_roundtrip_keeps_interaction_counts() {
    let mut store = WorkoutStore::with_defaults(MemoryStorage::new());
    for workout in mixed_workouts(&[WorkoutKind::Running, WorkoutKind::Cycling]) {
        store.add(workout).unwrap();
    }
    let id = store.workouts()[1].id().to_string();
    store.select(&id);
    store.select(&id);

    let mut restored = WorkoutStore::with_defaults(MemoryStorage::new());
    restored.restore(&store.serialize().unwrap()).unwrap();

    assert_eq!(restored.workouts()[0].interaction_count(), 0);
    assert_eq!(restored.find_by_id(&id).unwrap().interaction_count(), 2);
}

#[test]
fn test_restore_recomputes_tampered_metrics() {
    let mut store = WorkoutStore::with_defaults(MemoryStorage::new());
    store
        .add(Workout::running(Coordinates::new(0.0, 0.0), 5.0, 30.0, 150.0))
        .unwrap();
    store
        .add(Workout::cycling(Coordinates::new(0.0, 0.0), 20.0, 60.0, 400.0))
        .unwrap();

    let mut value: Value = serde_json::from_str(&store.serialize().unwrap()).unwrap();
    value[0]["pace"] = json!(1.0);
    value[1]["speed"] = json!(99.0);
    value[1]["description"] = json!("Rowing on Mars");

    let mut restored = WorkoutStore::with_defaults(MemoryStorage::new());
    restored.restore(&value.to_string()).unwrap();

    assert_eq!(restored.workouts()[0].pace(), Some(6.0));
    assert_eq!(restored.workouts()[1].speed(), Some(20.0));
    assert!(restored.workouts()[1].description().starts_with("Cycling on "));
}

#[test]
fn test_unknown_kind_is_skipped_in_order() {
    let mut store = WorkoutStore::with_defaults(MemoryStorage::new());
    let pattern = [
        WorkoutKind::Running,
        WorkoutKind::Cycling,
        WorkoutKind::Running,
    ];
    for workout in mixed_workouts(&pattern) {
        store.add(workout).unwrap();
    }

    let mut entries: Vec<Value> = serde_json::from_str(&store.serialize().unwrap()).unwrap();
    let swim = json!({
        "id": "swim-1",
        "coordinates": [0.0, 0.0],
        "distance": 1.5,
        "duration": 40.0,
        "kind": "swimming",
        "description": "Swimming on May 1",
        "interactionCount": 0
    });
    entries.insert(1, swim.clone());
    entries.push(swim);
    let blob = Value::Array(entries).to_string();

    let mut restored = WorkoutStore::with_defaults(MemoryStorage::new());
    let report = restored.restore(&blob).unwrap();

    assert_eq!(report.restored, 3);
    assert_eq!(
        report.skipped.iter().map(|s| s.index).collect::<Vec<_>>(),
        vec![1, 4]
    );
    assert!(report
        .skipped
        .iter()
        .all(|s| matches!(s.reason, EntryError::UnknownKind(_))));

    let restored_ids: Vec<&str> = restored.workouts().iter().map(|w| w.id().as_str()).collect();
    let original_ids: Vec<&str> = store.workouts().iter().map(|w| w.id().as_str()).collect();
    assert_eq!(restored_ids, original_ids);
}

#[test]
fn test_strict_policy_rejects_unknown_kind() {
    let blob = json!([
        {"coordinates": [0.0, 0.0], "distance": 1.5, "duration": 40.0, "kind": "swimming"}
    ])
    .to_string();

    let mut store =
        WorkoutStore::new(MemoryStorage::new(), DEFAULT_STORAGE_KEY, RestorePolicy::Strict);
    match store.restore(&blob) {
        Err(StoreError::MalformedEntry { index, reason }) => {
            assert_eq!(index, 0);
            assert!(matches!(reason, EntryError::UnknownKind(_)));
        }
        other => panic!("expected malformed entry error, got {:?}", other.map(|r| r.restored)),
    }
}

#[test]
fn test_clear_then_restore_is_empty() {
    let mut store = WorkoutStore::with_defaults(MemoryStorage::new());
    for workout in mixed_workouts(&[WorkoutKind::Cycling, WorkoutKind::Running]) {
        store.add(workout).unwrap();
    }

    store.clear().unwrap();
    let blob = store.serialize().unwrap();
    let report = store.restore(&blob).unwrap();

    assert_eq!(report.restored, 0);
    assert!(store.is_empty());
    assert_eq!(store.storage().read(DEFAULT_STORAGE_KEY).unwrap(), None);
}

#[test]
fn test_legacy_browser_blob() {
    let blob = r#"[
        {"date":"2023-05-01T07:15:00.000Z","id":"2935200123","description":"Running on May 1","clicks":3,
         "coords":[38.72,-9.14],"distance":5,"duration":27,"type":"running","cedance":178,"pace":5.4},
        {"date":"2023-05-03T17:40:00.000Z","id":"3126900456","description":"Cycling on May 3","clicks":0,
         "coords":[38.75,-9.2],"distance":27,"duration":95,"type":"cycling","elevationGain":523,"speed":17.05}
    ]"#;

    let mut store = WorkoutStore::with_defaults(MemoryStorage::new());
    let report = store.restore(blob).unwrap();

    assert!(report.is_clean());
    let run = store.find_by_id("2935200123").unwrap();
    assert_eq!(run.kind(), WorkoutKind::Running);
    assert_eq!(run.cadence(), Some(178.0));
    assert_eq!(run.interaction_count(), 3);
    assert!((run.pace().unwrap() - 5.4).abs() < 1e-9);

    let ride = store.find_by_id("3126900456").unwrap();
    assert_eq!(ride.elevation_gain(), Some(523.0));
    assert!((ride.speed().unwrap() - 27.0 / (95.0 / 60.0)).abs() < 1e-9);

    // Re-serialized with the current key names
    let value: Value = serde_json::from_str(&store.serialize().unwrap()).unwrap();
    assert_eq!(value[0]["kind"], "running");
    assert_eq!(value[0]["cadence"], 178.0);
    assert_eq!(value[0]["interactionCount"], 3);
    assert!(value[0].get("type").is_none());
}

#[test]
fn test_sqlite_persists_across_stores() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("mapty.db");

    let ids: Vec<String> = {
        let storage = SqliteStorage::open(&path).unwrap();
        let mut store = WorkoutStore::with_defaults(storage);
        for workout in mixed_workouts(&[WorkoutKind::Running, WorkoutKind::Cycling]) {
            store.add(workout).unwrap();
        }
        store.workouts().iter().map(|w| w.id().to_string()).collect()
    };

    let storage = SqliteStorage::open(&path).unwrap();
    let mut store = WorkoutStore::with_defaults(storage);
    let report = store.load().unwrap();

    assert_eq!(report.restored, 2);
    let loaded: Vec<String> = store.workouts().iter().map(|w| w.id().to_string()).collect();
    assert_eq!(loaded, ids);

    store.clear().unwrap();
    let storage = SqliteStorage::open(&path).unwrap();
    assert_eq!(storage.read(DEFAULT_STORAGE_KEY).unwrap(), None);
}
