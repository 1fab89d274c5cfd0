use super::*;

#[test]
fn rng_is_deterministic() {
    let mut a = Rng64::new(123);
    let mut b = Rng64::new(123);
    for _ in 0..10 {
        assert_eq!(a.next_u64(), b.next_u64());
    }
    let mut c = Rng64::fork(123, 1);
    let mut d = Rng64::fork(123, 2);
    assert_ne!(c.next_u64(), d.next_u64());
}

#[test]
fn rng_f64_stays_in_unit_interval() {
    let mut rng = Rng64::new(7);
    for _ in 0..1000 {
        let v = rng.next_f64_01();
        assert!((0.0..1.0).contains(&v));
    }
}

#[test]
fn weighted_index_never_picks_zero_weight() {
    let cumulative = cumulative_weights(&[0.0, 1.0, 0.0, 3.0]);
    let mut rng = Rng64::new(99);
    for _ in 0..500 {
        let i = rng.weighted_index(&cumulative);
        assert!(i == 1 || i == 3, "picked {i}");
    }
}

#[test]
fn median_handles_odd_and_even_lengths() {
    assert_eq!(median(&[]), None);
    assert_eq!(median(&[3.0, 1.0, 2.0]), Some(2.0));
    assert_eq!(median(&[4.0, 1.0, 2.0, 3.0]), Some(2.5));
}

#[test]
fn std_dev_of_single_value_is_zero() {
    assert_eq!(std_dev(&[5.0]), 0.0);
    assert!((std_dev(&[1.0, 3.0]) - 1.0).abs() < 1e-12);
}

#[test]
fn norm_clamps_and_handles_degenerate_range() {
    assert_eq!(norm_clamped(5.0, 0.0, 10.0), 0.5);
    assert_eq!(norm_clamped(-5.0, 0.0, 10.0), 0.0);
    assert_eq!(norm_clamped(50.0, 0.0, 10.0), 1.0);
    assert_eq!(norm_clamped(3.0, 2.0, 2.0), 0.0);
}

#[test]
fn bounds_span_values_and_feed_norm_clamped() {
    assert_eq!(bounds([3.0, -1.5, 7.25, 0.0]), (-1.5, 7.25));
    assert_eq!(bounds([4.0]), (4.0, 4.0));
    let (lo, hi) = bounds(std::iter::empty());
    assert!(lo.is_infinite() && lo > 0.0 && hi.is_infinite() && hi < 0.0);
    assert_eq!(norm_clamped(4.0, lo, hi), 0.0);
}

#[test]
fn round_ms_clamps_negative_to_zero() {
    assert_eq!(round_ms(-3.0), 0);
    assert_eq!(round_ms(2.5), 3);
    assert_eq!(round_ms(f64::NAN), 0);
}
