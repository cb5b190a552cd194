//! Threshold-triggered out-of-cycle collection.

use serde::{Deserialize, Serialize};

use crate::config::SimulationParameters;
use crate::domain::Policy;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpecialCollectionPolicy {
    pub enabled: bool,
    /// Fill ratio in percent of capacity at or above which the policy fires.
    pub threshold_pct: f64,
    /// Multiple of the tier's fixed cost charged for a special collection.
    pub surcharge_factor: f64,
}

impl SpecialCollectionPolicy {
    pub fn from_parts(policy: &Policy, params: &SimulationParameters) -> Self {
        Self {
            enabled: policy.special_collection,
            threshold_pct: params.special_threshold_pct,
            surcharge_factor: params.special_surcharge_factor,
        }
    }

    /// Cost of a special collection if one should happen now, `None` otherwise.
    pub fn decide(
        &self,
        fill_ratio_pct: f64,
        regular_collection_today: bool,
        fixed_cost: f64,
    ) -> Option<f64> {
        if self.enabled && !regular_collection_today && fill_ratio_pct >= self.threshold_pct {
            Some(fixed_cost * self.surcharge_factor)
        } else {
            None
        }
    }
}
