//! Unit tests for workout form validation.

use mapty::workouts::{Coordinates, InputError, WorkoutForm, WorkoutKind};

fn here() -> Coordinates {
    Coordinates::new(-33.86, 151.21)
}

#[test]
fn test_whitespace_is_trimmed() {
    let workout = WorkoutForm::new(" cycling ")
        .distance(" 42.5 ")
        .duration("90\n")
        .elevation_gain("0")
        .build(here())
        .unwrap();

    assert_eq!(workout.kind(), WorkoutKind::Cycling);
    assert_eq!(workout.distance(), 42.5);
    assert_eq!(workout.elevation_gain(), Some(0.0));
}

#[test]
fn test_empty_fields_rejected() {
    let form = WorkoutForm::new("running").duration("30").cadence("150");
    assert_eq!(form.build(here()), Err(InputError::Missing("distance")));

    let form = WorkoutForm::new("cycling").distance("10").duration("30");
    assert_eq!(form.build(here()), Err(InputError::Missing("elevation gain")));
}

#[test]
fn test_running_rejects_negative_cadence() {
    let form = WorkoutForm::new("running")
        .distance("5")
        .duration("30")
        .cadence("-150");

    assert_eq!(
        form.build(here()),
        Err(InputError::Negative {
            field: "cadence",
            value: -150.0
        })
    );
}

#[test]
fn test_error_messages_are_user_facing() {
    let err = WorkoutForm::new("running")
        .distance("abc")
        .duration("30")
        .cadence("150")
        .build(here())
        .unwrap_err();

    assert_eq!(
        err.to_string(),
        "Please enter a valid number for distance (got \"abc\")"
    );

    let err = WorkoutForm::new("rowing").build(here()).unwrap_err();
    assert_eq!(err.to_string(), "unknown workout kind: \"rowing\"");
}
