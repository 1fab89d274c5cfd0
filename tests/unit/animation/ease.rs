use super::*;

fn monotonic() -> impl Iterator<Item = Ease> {
    Ease::ALL.into_iter().filter(|e| !e.is_bell())
}

#[test]
fn endpoints_are_stable() {
    for ease in monotonic() {
        assert!(ease.apply(0.0).abs() < 1e-12, "{ease:?} at 0");
        assert!((ease.apply(1.0) - 1.0).abs() < 1e-12, "{ease:?} at 1");
    }
}

#[test]
fn monotonic_on_a_fine_grid() {
    for ease in monotonic() {
        let mut prev = ease.apply(0.0);
        for i in 1..=200 {
            let v = ease.apply(f64::from(i) / 200.0);
            assert!(v >= prev, "{ease:?} decreased at step {i}");
            prev = v;
        }
    }
}

#[test]
fn bells_are_symmetric_and_peak_at_midpoint() {
    for ease in [Ease::SinBell, Ease::QuadBell] {
        assert!(ease.apply(0.0).abs() < 1e-12);
        assert!(ease.apply(1.0).abs() < 1e-12);
        assert!((ease.apply(0.5) - 1.0).abs() < 1e-12);
        for i in 0..=100 {
            let x = f64::from(i) / 100.0;
            assert!((ease.apply(x) - ease.apply(1.0 - x)).abs() < 1e-12);
        }
    }
}

#[test]
fn progress_outside_unit_interval_is_clamped() {
    assert_eq!(Ease::Linear.apply(-1.0), 0.0);
    assert_eq!(Ease::Linear.apply(2.0), 1.0);
}

#[test]
fn identifiers_round_trip() {
    for ease in Ease::ALL {
        assert_eq!(ease.name().parse::<Ease>().unwrap(), ease);
        let json = serde_json::to_string(&ease).unwrap();
        assert_eq!(json, format!("\"{}\"", ease.name()));
    }
    let err = "bouncy".parse::<Ease>().unwrap_err();
    assert!(err.to_string().contains("scheduling error:"));
}
