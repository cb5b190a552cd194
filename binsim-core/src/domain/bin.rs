//! The bin: current tier, fill level and overflow streak of one trial.

use serde::{Deserialize, Serialize};

use crate::config::ConfigError;
use crate::domain::capacity::{CapacityTable, Tier};

/// Mutable per-trial bin state.
///
/// Capacity is a policy threshold, not a hard limit: `fill_level` may exceed
/// it. Capacity is always one of the table's tiers and only ever grows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bin {
    tier_index: usize,
    tier: Tier,
    fill_level: f64,
    overflow_streak: u32,
}

impl Bin {
    /// Empty bin at the given tier of `table`.
    pub fn new(table: &CapacityTable, tier_index: usize) -> Result<Self, ConfigError> {
        let tier = *table.get(tier_index).ok_or(ConfigError::TierOutOfRange {
            tier: tier_index,
            tiers: table.len(),
        })?;
        Ok(Self {
            tier_index,
            tier,
            fill_level: 0.0,
            overflow_streak: 0,
        })
    }

    pub fn add_waste(&mut self, liters: f64) {
        self.fill_level += liters;
    }

    pub fn empty(&mut self) {
        self.fill_level = 0.0;
    }

    pub fn overflow_liters(&self) -> f64 {
        (self.fill_level - self.tier.liters).max(0.0)
    }

    /// Overfill as a whole-number percentage of capacity.
    pub fn overflow_rate_pct(&self) -> f64 {
        debug_assert!(self.tier.liters > 0.0, "capacity validated positive");
        (self.overflow_liters() / self.tier.liters * 100.0).round()
    }

    /// Fill level as a percentage of capacity (unrounded).
    pub fn fill_ratio_pct(&self) -> f64 {
        debug_assert!(self.tier.liters > 0.0, "capacity validated positive");
        self.fill_level / self.tier.liters * 100.0
    }

    pub fn is_overfilled(&self) -> bool {
        self.fill_level > self.tier.liters
    }

    pub fn capacity(&self) -> f64 {
        self.tier.liters
    }

    pub fn fixed_cost(&self) -> f64 {
        self.tier.fixed_cost
    }

    pub fn tier_index(&self) -> usize {
        self.tier_index
    }

    pub fn fill_level(&self) -> f64 {
        self.fill_level
    }

    pub fn overflow_streak(&self) -> u32 {
        self.overflow_streak
    }

    /// Record one qualifying observation: extend the streak if overfilled,
    /// otherwise break it.
    pub fn observe_overflow(&mut self) {
        if self.is_overfilled() {
            self.overflow_streak += 1;
        } else {
            self.overflow_streak = 0;
        }
    }

    pub fn reset_streak(&mut self) {
        self.overflow_streak = 0;
    }

    /// Move to a larger tier. Smaller or equal tiers are ignored so capacity
    /// stays monotone.
    pub fn upgrade(&mut self, tier_index: usize, tier: Tier) -> bool {
        if tier.liters <= self.tier.liters {
            return false;
        }
        self.tier_index = tier_index;
        self.tier = tier;
        true
    }
}
