//! Property tests for alignment and detection invariants.
//!
//! Uses proptest to verify:
//! 1. Alignment is an inner join: no invented dates, no gap-filling
//! 2. Alignment never outgrows either input, even with repeated dates
//! 3. Detection never fires at index 0 and matches the pair predicate exactly
//! 4. Forward returns only ever come from samples at or past the horizon

use chrono::{Duration, NaiveDate};
use fearlab_core::analysis::{ReturnCalculator, SignalDetector, SIX_MONTHS};
use fearlab_core::data::combine;
use fearlab_core::domain::{add_months_rollover, CombinedSample, Sample};
use proptest::prelude::*;
use std::collections::HashMap;

// ── Strategies (proptest) ────────────────────────────────────────────

fn base_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2000, 1, 3).unwrap()
}

fn arb_price() -> impl Strategy<Value = f64> {
    (1.0..5_000.0_f64).prop_map(|p| (p * 100.0).round() / 100.0)
}

fn arb_vix() -> impl Strategy<Value = f64> {
    (9.0..85.0_f64).prop_map(|p| (p * 100.0).round() / 100.0)
}

/// Ascending, gap-ridden daily series: each bool says whether the day traded.
fn arb_series() -> impl Strategy<Value = Vec<Sample>> {
    prop::collection::vec((any::<bool>(), arb_price()), 0..120).prop_map(|days| {
        days.into_iter()
            .enumerate()
            .filter(|(_, (traded, _))| *traded)
            .map(|(i, (_, price))| Sample::new(base_date() + Duration::days(i as i64), price))
            .collect()
    })
}

/// Ascending series where a day may be reported more than once.
fn arb_series_with_repeats() -> impl Strategy<Value = Vec<Sample>> {
    prop::collection::vec((0i64..60, arb_price()), 0..80).prop_map(|days| {
        let mut samples: Vec<_> = days
            .into_iter()
            .map(|(offset, price)| Sample::new(base_date() + Duration::days(offset), price))
            .collect();
        samples.sort_by_key(|s| s.date);
        samples
    })
}

fn arb_combined() -> impl Strategy<Value = Vec<CombinedSample>> {
    prop::collection::vec((arb_price(), arb_vix()), 0..200).prop_map(|days| {
        days.into_iter()
            .enumerate()
            .map(|(i, (p, v))| CombinedSample::new(base_date() + Duration::days(i as i64), p, v))
            .collect()
    })
}

// ── 1-2. Alignment ───────────────────────────────────────────────────

proptest! {
    /// Every combined day exists with the same price in both inputs.
    #[test]
    fn combined_dates_exist_in_both_inputs(primary in arb_series(), secondary in arb_series()) {
        let p: HashMap<_, _> = primary.iter().map(|s| (s.date, s.price)).collect();
        let s: HashMap<_, _> = secondary.iter().map(|s| (s.date, s.price)).collect();

        let combined = combine(&primary, &secondary);

        prop_assert!(combined.len() <= primary.len().min(secondary.len()));
        for c in &combined {
            prop_assert_eq!(p.get(&c.date), Some(&c.primary));
            prop_assert_eq!(s.get(&c.date), Some(&c.secondary));
        }
        // ...and every shared date made it through.
        let shared = p.keys().filter(|d| s.contains_key(d)).count();
        prop_assert_eq!(combined.len(), shared);
    }

    /// Output is strictly ascending when the inputs are.
    #[test]
    fn combined_is_ascending(primary in arb_series(), secondary in arb_series()) {
        let combined = combine(&primary, &secondary);
        for pair in combined.windows(2) {
            prop_assert!(pair[0].date < pair[1].date);
        }
    }
}

proptest! {
    /// Repeated days join once, from their first occurrence on each side.
    #[test]
    fn repeated_dates_never_grow_the_join(
        primary in arb_series_with_repeats(),
        secondary in arb_series_with_repeats(),
    ) {
        let combined = combine(&primary, &secondary);

        prop_assert!(combined.len() <= primary.len().min(secondary.len()));
        for pair in combined.windows(2) {
            prop_assert!(pair[0].date < pair[1].date);
        }
        for c in &combined {
            let first_p = primary.iter().find(|s| s.date == c.date).map(|s| s.price);
            let first_s = secondary.iter().find(|s| s.date == c.date).map(|s| s.price);
            prop_assert_eq!(first_p, Some(c.primary));
            prop_assert_eq!(first_s, Some(c.secondary));
        }
    }
}

// ── 3. Detection ─────────────────────────────────────────────────────

proptest! {
    /// Events are exactly the indices where the pair predicate holds.
    #[test]
    fn detection_matches_pair_predicate(series in arb_combined()) {
        let detector = SignalDetector::default();
        let events = detector.detect(&series);

        let expected: Vec<_> = (1..series.len())
            .filter(|&i| series[i - 1].secondary > 30.0 && series[i].secondary < series[i - 1].secondary)
            .map(|i| series[i].date)
            .collect();
        let actual: Vec<_> = events.iter().map(|e| e.date).collect();
        prop_assert_eq!(actual, expected);

        if let Some(first) = series.first() {
            prop_assert!(events.iter().all(|e| e.date != first.date));
        }
    }
}

// ── 4. Forward returns ───────────────────────────────────────────────

proptest! {
    /// The forward point is the earliest sample at or past the horizon.
    #[test]
    fn forward_point_is_earliest_at_or_past_horizon(series in arb_combined(), pick in 0usize..200) {
        prop_assume!(!series.is_empty());
        let from = series[pick % series.len()].date;
        let target = add_months_rollover(from, SIX_MONTHS).unwrap();

        let calc = ReturnCalculator::new(&series);
        let linear = series.iter().find(|s| s.date >= target);
        prop_assert_eq!(calc.forward_sample(from, SIX_MONTHS), linear);
    }
}
