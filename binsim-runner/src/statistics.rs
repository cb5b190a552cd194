//! Per-cell statistics over all days of all trials.
//!
//! Every tracked metric is flattened across the days of every trial in a
//! (scenario, policy) cell. Numeric metrics reduce to mean/min/max/stdev,
//! boolean metrics to a true-count and a true-rate.
//!
//! [`StatisticsAccumulator`] is a streaming reducer (Welford's algorithm for
//! the variance). [`aggregate`] is a fold of the same accumulator, so batch
//! and streaming aggregation of the same trials in the same order give
//! identical numbers.

use std::collections::BTreeMap;
use std::fmt;

use binsim_core::domain::{DailyRecord, TrialResult};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AggregateError {
    #[error("cannot aggregate an empty trial set")]
    EmptyGroup,

    #[error("{trials} trials contain no simulated days")]
    NoDays { trials: usize },
}

/// A tracked per-day metric.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    Residents,
    Guests,
    WasteAdded,
    PeakFill,
    FillLevel,
    Capacity,
    OverflowRatePct,
    CollectionCost,
    OverflowCost,
    SpecialCost,
    TotalCost,
    Outage,
    HolidayMiss,
    RegularCollection,
    SpecialCollection,
    CapacityUpgraded,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricKind {
    Numeric,
    Boolean,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MetricValue {
    Numeric(f64),
    Boolean(bool),
}

impl Metric {
    pub const ALL: [Metric; 16] = [
        Metric::Residents,
        Metric::Guests,
        Metric::WasteAdded,
        Metric::PeakFill,
        Metric::FillLevel,
        Metric::Capacity,
        Metric::OverflowRatePct,
        Metric::CollectionCost,
        Metric::OverflowCost,
        Metric::SpecialCost,
        Metric::TotalCost,
        Metric::Outage,
        Metric::HolidayMiss,
        Metric::RegularCollection,
        Metric::SpecialCollection,
        Metric::CapacityUpgraded,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Metric::Residents => "residents",
            Metric::Guests => "guests",
            Metric::WasteAdded => "waste_added",
            Metric::PeakFill => "peak_fill",
            Metric::FillLevel => "fill_level",
            Metric::Capacity => "capacity",
            Metric::OverflowRatePct => "overflow_rate_pct",
            Metric::CollectionCost => "collection_cost",
            Metric::OverflowCost => "overflow_cost",
            Metric::SpecialCost => "special_cost",
            Metric::TotalCost => "total_cost",
            Metric::Outage => "outage",
            Metric::HolidayMiss => "holiday_miss",
            Metric::RegularCollection => "regular_collection",
            Metric::SpecialCollection => "special_collection",
            Metric::CapacityUpgraded => "capacity_upgraded",
        }
    }

    pub fn kind(self) -> MetricKind {
        match self {
            Metric::Outage
            | Metric::HolidayMiss
            | Metric::RegularCollection
            | Metric::SpecialCollection
            | Metric::CapacityUpgraded => MetricKind::Boolean,
            _ => MetricKind::Numeric,
        }
    }

    pub fn value(self, r: &DailyRecord) -> MetricValue {
        use MetricValue::{Boolean, Numeric};
        match self {
            Metric::Residents => Numeric(f64::from(r.residents)),
            Metric::Guests => Numeric(f64::from(r.guests)),
            Metric::WasteAdded => Numeric(r.waste_added),
            Metric::PeakFill => Numeric(r.peak_fill),
            Metric::FillLevel => Numeric(r.fill_level),
            Metric::Capacity => Numeric(r.capacity),
            Metric::OverflowRatePct => Numeric(r.overflow_rate_pct),
            Metric::CollectionCost => Numeric(r.collection_cost),
            Metric::OverflowCost => Numeric(r.overflow_cost),
            Metric::SpecialCost => Numeric(r.special_cost),
            Metric::TotalCost => Numeric(r.total_cost),
            Metric::Outage => Boolean(r.outage),
            Metric::HolidayMiss => Boolean(r.holiday_miss),
            Metric::RegularCollection => Boolean(r.regular_collection),
            Metric::SpecialCollection => Boolean(r.special_collection),
            Metric::CapacityUpgraded => Boolean(r.capacity_upgraded),
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NumericStats {
    pub count: u64,
    pub mean: f64,
    pub min: f64,
    pub max: f64,
    /// Sample standard deviation; 0 for a single observation.
    pub stdev: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BooleanStats {
    /// Days on which the flag was set.
    pub count: u64,
    pub total: u64,
    /// `count / total`, always within `[0, 1]`.
    pub rate: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MetricStats {
    Numeric(NumericStats),
    Boolean(BooleanStats),
}

impl MetricStats {
    /// `(statistic, value)` pairs in export order.
    pub fn entries(&self) -> Vec<(&'static str, f64)> {
        match self {
            MetricStats::Numeric(s) => vec![
                ("mean", s.mean),
                ("min", s.min),
                ("max", s.max),
                ("stdev", s.stdev),
            ],
            MetricStats::Boolean(s) => vec![("count", s.count as f64), ("rate", s.rate)],
        }
    }
}

/// Summary of one (scenario, policy) cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregateStatistics {
    pub trials: usize,
    pub days: u64,
    pub metrics: BTreeMap<Metric, MetricStats>,
}

impl AggregateStatistics {
    pub fn get(&self, metric: Metric) -> Option<&MetricStats> {
        self.metrics.get(&metric)
    }

    pub fn numeric(&self, metric: Metric) -> Option<&NumericStats> {
        match self.metrics.get(&metric) {
            Some(MetricStats::Numeric(s)) => Some(s),
            _ => None,
        }
    }

    pub fn boolean(&self, metric: Metric) -> Option<&BooleanStats> {
        match self.metrics.get(&metric) {
            Some(MetricStats::Boolean(s)) => Some(s),
            _ => None,
        }
    }
}

// ─── Accumulators ───────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq)]
struct Welford {
    count: u64,
    mean: f64,
    m2: f64,
    min: f64,
    max: f64,
}

impl Default for Welford {
    fn default() -> Self {
        Self {
            count: 0,
            mean: 0.0,
            m2: 0.0,
            min: f64::INFINITY,
            max: f64::NEG_INFINITY,
        }
    }
}

impl Welford {
    fn push(&mut self, x: f64) {
        self.count += 1;
        let delta = x - self.mean;
        self.mean += delta / self.count as f64;
        self.m2 += delta * (x - self.mean);
        self.min = self.min.min(x);
        self.max = self.max.max(x);
    }

    fn finish(&self) -> NumericStats {
        let stdev = if self.count < 2 {
            0.0
        } else {
            (self.m2 / (self.count - 1) as f64).max(0.0).sqrt()
        };
        NumericStats {
            count: self.count,
            mean: self.mean,
            min: self.min,
            max: self.max,
            stdev,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
struct FlagCounter {
    count: u64,
    total: u64,
}

impl FlagCounter {
    fn push(&mut self, flag: bool) {
        self.total += 1;
        if flag {
            self.count += 1;
        }
    }

    fn finish(&self) -> BooleanStats {
        BooleanStats {
            count: self.count,
            total: self.total,
            rate: self.count as f64 / self.total as f64,
        }
    }
}

/// Streaming reducer for one cell. Feed trials as they finish, then call
/// [`finish`](Self::finish).
#[derive(Debug, Clone, Default)]
pub struct StatisticsAccumulator {
    trials: usize,
    days: u64,
    numeric: BTreeMap<Metric, Welford>,
    flags: BTreeMap<Metric, FlagCounter>,
}

impl StatisticsAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_trial(&mut self, trial: &TrialResult) {
        self.trials += 1;
        for record in &trial.records {
            self.push_record(record);
        }
    }

    fn push_record(&mut self, record: &DailyRecord) {
        self.days += 1;
        for metric in Metric::ALL {
            match metric.value(record) {
                MetricValue::Numeric(x) => self.numeric.entry(metric).or_default().push(x),
                MetricValue::Boolean(b) => self.flags.entry(metric).or_default().push(b),
            }
        }
    }

    pub fn trials(&self) -> usize {
        self.trials
    }

    pub fn days(&self) -> u64 {
        self.days
    }

    pub fn finish(&self) -> Result<AggregateStatistics, AggregateError> {
        if self.trials == 0 {
            return Err(AggregateError::EmptyGroup);
        }
        if self.days == 0 {
            return Err(AggregateError::NoDays {
                trials: self.trials,
            });
        }
        let metrics = self
            .numeric
            .iter()
            .map(|(m, w)| (*m, MetricStats::Numeric(w.finish())))
            .chain(
                self.flags
                    .iter()
                    .map(|(m, c)| (*m, MetricStats::Boolean(c.finish()))),
            )
            .collect();
        Ok(AggregateStatistics {
            trials: self.trials,
            days: self.days,
            metrics,
        })
    }
}

/// Batch aggregation of one cell's trials.
pub fn aggregate(trials: &[TrialResult]) -> Result<AggregateStatistics, AggregateError> {
    trials
        .iter()
        .fold(StatisticsAccumulator::new(), |mut acc, t| {
            acc.push_trial(t);
            acc
        })
        .finish()
}
