//! Property tests for aggregation and histograms.
//!
//! Uses proptest to verify:
//! 1. Numeric summaries are ordered (min <= mean <= max) with non-negative stdev
//! 2. Boolean rates equal count / total and lie in [0, 1]
//! 3. Streaming and batch aggregation agree exactly
//! 4. Histograms conserve the number of values

use binsim_core::domain::{DailyRecord, TrialResult};
use binsim_runner::{aggregate, Histogram, Metric, StatisticsAccumulator};
use chrono::{NaiveDate, Weekday};
use proptest::prelude::*;

fn record(day: u32, cost: f64, outage: bool) -> DailyRecord {
    DailyRecord {
        day,
        date: NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(),
        residents: 18,
        guests: 0,
        waste_added: cost,
        peak_fill: cost,
        fill_level: 0.0,
        capacity: 80.0,
        measured_capacity: 80.0,
        overflow_rate_pct: 0.0,
        outage,
        holiday_miss: false,
        regular_collection: !outage,
        special_collection: false,
        capacity_upgraded: false,
        collection_cost: cost,
        overflow_cost: 0.0,
        special_cost: 0.0,
        total_cost: cost,
    }
}

// ── Strategies (proptest) ────────────────────────────────────────────

fn arb_trials() -> impl Strategy<Value = Vec<TrialResult>> {
    prop::collection::vec(
        prop::collection::vec((0.0..500.0_f64, any::<bool>()), 1..30),
        1..8,
    )
    .prop_map(|trials| {
        trials
            .into_iter()
            .enumerate()
            .map(|(i, days)| TrialResult {
                seed: i as u64,
                collection_weekday: Weekday::Tue,
                records: days
                    .into_iter()
                    .enumerate()
                    .map(|(d, (cost, outage))| record(d as u32, cost, outage))
                    .collect(),
            })
            .collect()
    })
}

proptest! {
    #[test]
    fn numeric_summary_is_ordered(trials in arb_trials()) {
        let stats = aggregate(&trials).unwrap();
        let cost = stats.numeric(Metric::TotalCost).unwrap();
        prop_assert!(cost.min <= cost.mean + 1e-9);
        prop_assert!(cost.mean <= cost.max + 1e-9);
        prop_assert!(cost.stdev >= 0.0);
        if cost.count == 1 {
            prop_assert_eq!(cost.stdev, 0.0);
        }
    }

    #[test]
    fn boolean_rate_matches_count(trials in arb_trials()) {
        let stats = aggregate(&trials).unwrap();
        let days: usize = trials.iter().map(|t| t.records.len()).sum();
        let outages = trials
            .iter()
            .flat_map(|t| &t.records)
            .filter(|r| r.outage)
            .count();
        let outage = stats.boolean(Metric::Outage).unwrap();
        prop_assert_eq!(outage.count as usize, outages);
        prop_assert_eq!(outage.total as usize, days);
        prop_assert!((0.0..=1.0).contains(&outage.rate));
        prop_assert!((outage.rate - outages as f64 / days as f64).abs() < 1e-12);
    }

    #[test]
    fn streaming_equals_batch(trials in arb_trials()) {
        let mut acc = StatisticsAccumulator::new();
        for t in &trials {
            acc.push_trial(t);
        }
        prop_assert_eq!(acc.finish().unwrap(), aggregate(&trials).unwrap());
    }

    #[test]
    fn histogram_conserves_values(
        values in prop::collection::vec(-1e6..1e6_f64, 1..200),
        bins in 1usize..64,
    ) {
        let h = Histogram::build(&values, bins).unwrap();
        prop_assert_eq!(h.counts.len(), bins);
        prop_assert_eq!(h.total() as usize, values.len());
    }
}
