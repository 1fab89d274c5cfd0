use super::*;

fn linear(property: &str) -> TweenSpec {
    TweenSpec::new(property, 0.0, 1.0, Ease::Linear)
}

#[test]
fn linear_tween_hits_endpoints_and_midpoint() {
    let mut track = TweenTrack::new();
    track.queue(0, 1000, [linear("alpha")]).unwrap();

    let alpha = Property::Alpha;
    assert!(track.evaluate(&alpha, 0.0).abs() < 1e-12);
    assert!((track.evaluate(&alpha, 500.0) - 0.5).abs() < 1e-12);
    assert!((track.evaluate(&alpha, 1000.0) - 1.0).abs() < 1e-12);
}

#[test]
fn outside_every_interval_returns_base_not_last_target() {
    let mut track = TweenTrack::new();
    track
        .queue(100, 100, [TweenSpec::new("brightness", 0.2, 0.9, Ease::InOutSin)])
        .unwrap();
    track.set_base(Property::Brightness, 0.2);

    for t in [0.0, 99.9, 200.1, 5000.0] {
        assert_eq!(track.evaluate(&Property::Brightness, t), 0.2);
    }
    // Untouched property falls back to its declared default.
    assert_eq!(track.evaluate(&Property::ScaleY, 150.0), 1.0);
}

#[test]
fn sequence_chains_starts_unless_overridden() {
    let mut track = TweenTrack::new();
    track
        .queue(
            0,
            100,
            [
                TweenSpec::new("brightness", 0.0, 1.0, Ease::Linear),
                TweenSpec::new("brightness", 1.0, 0.0, Ease::Linear),
                TweenSpec::new("alpha", 0.0, 1.0, Ease::Linear).starting_at(50),
            ],
        )
        .unwrap();

    let b = track.events_for(&Property::Brightness);
    assert_eq!((b[0].start_ms, b[1].start_ms), (0, 100));
    assert_eq!(track.events_for(&Property::Alpha)[0].start_ms, 50);
    // At the boundary the successor is active.
    assert_eq!(track.evaluate(&Property::Brightness, 100.0), 1.0);
    assert!((track.evaluate(&Property::Brightness, 150.0) - 0.5).abs() < 1e-12);
}

#[test]
fn overlapping_tween_is_a_scheduling_error_and_leaves_track_untouched() {
    let mut track = TweenTrack::new();
    track.queue(0, 100, [linear("scaleY")]).unwrap();

    let err = track
        .queue(200, 100, [linear("alpha"), linear("scaleY").starting_at(50)])
        .unwrap_err();
    assert!(matches!(err, ClipgridError::Scheduling(_)));
    assert!(track.events_for(&Property::Alpha).is_empty());
    assert_eq!(track.events_for(&Property::ScaleY).len(), 1);
}

#[test]
fn adjacent_tweens_do_not_overlap() {
    let mut track = TweenTrack::new();
    track.queue(100, 100, [linear("alpha")]).unwrap();
    track.queue(0, 100, [linear("alpha")]).unwrap();
    track.queue(200, 50, [linear("alpha")]).unwrap();

    let starts: Vec<u64> = track
        .events_for(&Property::Alpha)
        .iter()
        .map(|e| e.start_ms)
        .collect();
    assert_eq!(starts, vec![0, 100, 200]);
    assert_eq!(track.end_ms(), Some(250));
}

#[test]
fn zero_duration_is_rejected() {
    let mut track = TweenTrack::new();
    assert!(track.queue(0, 0, [linear("alpha")]).is_err());
    assert!(track.is_empty());
}

#[test]
fn property_names_round_trip_through_serde() {
    let json = serde_json::to_string(&Property::TranslateY).unwrap();
    assert_eq!(json, "\"translateY\"");
    let p: Property = serde_json::from_str("\"wobble\"").unwrap();
    assert_eq!(p, Property::Custom("wobble".to_owned()));
}
