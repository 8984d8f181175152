//! The sponsorship/salaries walkthrough
//!
//! Income 90k against 80k of salaries starts healthy; cutting sponsorship to
//! 50k drops the balance below the -5k threshold; undo restores it.

use super::fixtures::event_store;
use crate::metrics::RiskBand;
use crate::schema::Category;

#[test]
fn test_initial_metrics() {
    let mut store = event_store();
    let metrics = store.derived_metrics().unwrap();

    assert_eq!(metrics.positive_total, 90_000.0);
    assert_eq!(metrics.negative_total, 80_000.0);
    assert_eq!(metrics.balance, 10_000.0);
    assert_eq!(metrics.risk, RiskBand::Healthy);
    assert_eq!(metrics.total(Category::Income), 90_000.0);
    assert_eq!(metrics.total(Category::Expense), 80_000.0);
}

#[test]
fn test_sponsorship_cut_is_critical_and_undoable() {
    let mut store = event_store();

    store.set_parameter("sponsorship", 50_000.0).unwrap();
    let metrics = store.derived_metrics().unwrap();
    assert_eq!(metrics.balance, -30_000.0);
    assert_eq!(metrics.risk, RiskBand::Critical);

    store.undo().unwrap();
    let metrics = store.derived_metrics().unwrap();
    assert_eq!(metrics.balance, 10_000.0);
    assert_eq!(metrics.risk, RiskBand::Healthy);
}

#[test]
fn test_warning_band_between_thresholds() {
    let mut store = event_store();
    store.set_parameter("salaries", 92_000.0).unwrap();

    let metrics = store.derived_metrics().unwrap();
    assert_eq!(metrics.balance, -2_000.0);
    assert_eq!(metrics.risk, RiskBand::Warning);
}

#[test]
fn test_clamping_to_declared_range() {
    let mut store = event_store();

    let applied = store.set_parameter("sponsorship", 200_000.0 + 1_000.0).unwrap();
    assert_eq!(applied, 200_000.0);
    assert_eq!(store.current().unwrap().get("sponsorship"), Some(200_000.0));

    store.set_parameter("salaries", f64::NEG_INFINITY).unwrap();
    assert_eq!(store.get("salaries"), Ok(0.0));
}

#[test]
fn test_metrics_memoized_across_equal_sets() {
    let mut store = event_store();
    store.derived_metrics().unwrap();
    store.derived_metrics().unwrap();

    // Setting the same value produces a new but structurally equal set
    store.set_parameter("salaries", 80_000.0).unwrap();
    store.derived_metrics().unwrap();

    let stats = store.metrics_cache_stats().unwrap();
    assert_eq!(stats.misses, 1);
    assert_eq!(stats.hits, 2);

    store.set_parameter("salaries", 1.0).unwrap();
    store.derived_metrics().unwrap();
    assert_eq!(store.metrics_cache_stats().unwrap().misses, 2);
}
