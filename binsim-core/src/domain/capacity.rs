//! Capacity tiers and the ordered capacity table.

use serde::{Deserialize, Serialize};

use crate::config::ConfigError;

/// One bin size and the fee charged for each regular collection at that size.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Tier {
    /// Capacity in liters.
    pub liters: f64,
    /// Fixed cost charged per regular collection.
    pub fixed_cost: f64,
}

impl Tier {
    pub fn new(liters: f64, fixed_cost: f64) -> Self {
        Self { liters, fixed_cost }
    }
}

/// Strictly increasing sequence of tiers, validated on construction.
///
/// Deserialization goes through the same validation, so a table read from a
/// config file can never hold a zero capacity or an out-of-order tier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Tier>", into = "Vec<Tier>")]
pub struct CapacityTable {
    tiers: Vec<Tier>,
}

impl CapacityTable {
    pub fn new(tiers: Vec<Tier>) -> Result<Self, ConfigError> {
        if tiers.is_empty() {
            return Err(ConfigError::EmptyCapacityTable);
        }
        for (index, tier) in tiers.iter().enumerate() {
            if !(tier.liters.is_finite() && tier.liters > 0.0) {
                return Err(ConfigError::NonPositiveCapacity {
                    index,
                    liters: tier.liters,
                });
            }
            if !(tier.fixed_cost.is_finite() && tier.fixed_cost >= 0.0) {
                return Err(ConfigError::InvalidFixedCost {
                    index,
                    cost: tier.fixed_cost,
                });
            }
            if index > 0 && tier.liters <= tiers[index - 1].liters {
                return Err(ConfigError::CapacityNotIncreasing {
                    index,
                    previous: tiers[index - 1].liters,
                    liters: tier.liters,
                });
            }
        }
        Ok(Self { tiers })
    }

    /// Residual-waste bin sizes and per-collection fees of the reference study
    /// (annual fee spread over 26 fortnightly collections).
    pub fn reference() -> Self {
        Self {
            tiers: vec![
                Tier::new(80.0, 177.84 / 26.0),
                Tier::new(120.0, 230.88 / 26.0),
                Tier::new(240.0, 382.20 / 26.0),
                Tier::new(770.0, 1021.80 / 26.0),
                Tier::new(1100.0, 1416.48 / 26.0),
            ],
        }
    }

    pub fn tiers(&self) -> &[Tier] {
        &self.tiers
    }

    pub fn len(&self) -> usize {
        self.tiers.len()
    }

    /// Always false for a validated table; provided for API symmetry.
    pub fn is_empty(&self) -> bool {
        self.tiers.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Tier> {
        self.tiers.get(index)
    }

    /// Smallest tier strictly larger than `liters`, with its index.
    pub fn next_larger(&self, liters: f64) -> Option<(usize, Tier)> {
        self.tiers
            .iter()
            .enumerate()
            .find(|(_, tier)| tier.liters > liters)
            .map(|(index, tier)| (index, *tier))
    }
}

impl TryFrom<Vec<Tier>> for CapacityTable {
    type Error = ConfigError;

    fn try_from(tiers: Vec<Tier>) -> Result<Self, Self::Error> {
        Self::new(tiers)
    }
}

impl From<CapacityTable> for Vec<Tier> {
    fn from(table: CapacityTable) -> Self {
        table.tiers
    }
}
