//! Per-trial totals and equal-width histograms over them.

use binsim_core::domain::TrialResult;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HistogramError {
    #[error("cannot build a histogram of an empty set")]
    Empty,

    #[error("histogram needs at least one bin")]
    ZeroBins,

    #[error("histogram input contains a non-finite value")]
    NonFinite,
}

/// Horizon totals of one trial.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrialTotals {
    pub seed: u64,
    pub total_cost: f64,
    pub total_waste: f64,
    pub final_capacity: f64,
    pub regular_collections: usize,
    pub special_collections: usize,
    pub overflow_days: usize,
    pub missed_collections: usize,
}

impl TrialTotals {
    pub fn from_trial(trial: &TrialResult) -> Self {
        Self {
            seed: trial.seed,
            total_cost: trial.total_cost(),
            total_waste: trial.total_waste(),
            final_capacity: trial.final_capacity().unwrap_or(0.0),
            regular_collections: trial.regular_collections(),
            special_collections: trial.special_collections(),
            overflow_days: trial
                .records
                .iter()
                .filter(|r| r.overflow_cost > 0.0)
                .count(),
            missed_collections: trial
                .records
                .iter()
                .filter(|r| r.outage || r.holiday_miss)
                .count(),
        }
    }
}

/// Equal-width histogram spanning `[min, max]`.
///
/// The last bin is closed on the right so `max` is counted. A constant input
/// has zero width and puts every value in the first bin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Histogram {
    pub min: f64,
    pub max: f64,
    pub bin_width: f64,
    pub counts: Vec<u64>,
}

impl Histogram {
    pub fn build(values: &[f64], bins: usize) -> Result<Self, HistogramError> {
        if bins == 0 {
            return Err(HistogramError::ZeroBins);
        }
        if values.is_empty() {
            return Err(HistogramError::Empty);
        }
        if values.iter().any(|v| !v.is_finite()) {
            return Err(HistogramError::NonFinite);
        }

        let min = values.iter().copied().fold(f64::INFINITY, f64::min);
        let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let bin_width = (max - min) / bins as f64;

        let mut counts = vec![0u64; bins];
        for v in values {
            let idx = if bin_width > 0.0 {
                (((v - min) / bin_width).floor() as usize).min(bins - 1)
            } else {
                0
            };
            counts[idx] += 1;
        }

        Ok(Self {
            min,
            max,
            bin_width,
            counts,
        })
    }

    pub fn total(&self) -> u64 {
        self.counts.iter().sum()
    }

    /// `(lower, upper)` edge of every bin.
    pub fn edges(&self) -> Vec<(f64, f64)> {
        (0..self.counts.len())
            .map(|i| {
                let lo = self.min + i as f64 * self.bin_width;
                let hi = if i + 1 == self.counts.len() {
                    self.max
                } else {
                    lo + self.bin_width
                };
                (lo, hi)
            })
            .collect()
    }
}
