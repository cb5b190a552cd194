//! Per-day records and the full result of one trial.

use chrono::{NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

/// Snapshot of one simulated day.
///
/// `peak_fill` is the fill level right after the day's waste was added.
/// `overflow_rate_pct` was measured against `measured_capacity` after the
/// day's collections; `fill_level` and `capacity` describe the bin at the end
/// of the day, after any escalation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyRecord {
    pub day: u32,
    pub date: NaiveDate,
    pub residents: u32,
    pub guests: u32,
    /// Liters added to the bin today.
    pub waste_added: f64,
    pub peak_fill: f64,
    pub fill_level: f64,
    pub capacity: f64,
    /// Capacity the day's overflow was measured against.
    pub measured_capacity: f64,
    pub overflow_rate_pct: f64,
    /// A scheduled collection failed.
    pub outage: bool,
    /// A scheduled collection fell on a holiday.
    pub holiday_miss: bool,
    pub regular_collection: bool,
    pub special_collection: bool,
    pub capacity_upgraded: bool,
    pub collection_cost: f64,
    pub overflow_cost: f64,
    pub special_cost: f64,
    pub total_cost: f64,
}

/// Everything one trial produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrialResult {
    pub seed: u64,
    pub collection_weekday: Weekday,
    pub records: Vec<DailyRecord>,
}

impl TrialResult {
    pub fn total_cost(&self) -> f64 {
        self.records.iter().map(|r| r.total_cost).sum()
    }

    /// Total liters of waste generated over the horizon.
    pub fn total_waste(&self) -> f64 {
        self.records.iter().map(|r| r.waste_added).sum()
    }

    pub fn final_capacity(&self) -> Option<f64> {
        self.records.last().map(|r| r.capacity)
    }

    pub fn regular_collections(&self) -> usize {
        self.records.iter().filter(|r| r.regular_collection).count()
    }

    pub fn special_collections(&self) -> usize {
        self.records.iter().filter(|r| r.special_collection).count()
    }
}
