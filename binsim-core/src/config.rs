//! Simulation parameters and configuration validation.
//!
//! Every numeric knob that shapes a trial lives in [`SimulationParameters`].
//! Validation runs once, before any trial starts; nothing below this layer
//! re-checks probabilities or capacities.

use chrono::{Days, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Configuration errors. All of them are fatal and raised before a trial runs.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("capacity table is empty")]
    EmptyCapacityTable,

    #[error("capacity tier {index} has non-positive capacity {liters} L")]
    NonPositiveCapacity { index: usize, liters: f64 },

    #[error("capacity tier {index} has invalid fixed cost {cost}")]
    InvalidFixedCost { index: usize, cost: f64 },

    #[error("capacity tier {index} ({liters} L) is not larger than the previous tier ({previous} L)")]
    CapacityNotIncreasing {
        index: usize,
        previous: f64,
        liters: f64,
    },

    #[error("initial tier {tier} out of range (table has {tiers} tiers)")]
    TierOutOfRange { tier: usize, tiers: usize },

    #[error("{field} must be within [0, 1], got {value}")]
    ProbabilityOutOfRange { field: &'static str, value: f64 },

    #[error("invalid {field}: {reason}")]
    InvalidParameter { field: &'static str, reason: String },
}

/// Immutable parameters shared by every trial of a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationParameters {
    /// Number of simulated days per trial.
    pub horizon_days: u32,
    /// Calendar date of day 0.
    pub start_date: NaiveDate,
    /// Region code handed to the holiday calendar.
    pub region: String,
    /// Residents living in the building.
    pub residents: u32,
    /// Probability that residents are (partly) away on a given day.
    pub absent_probability: f64,
    /// Residual waste per person and day, in liters.
    pub waste_per_person_liters: f64,
    /// Share of the per-person rate a guest contributes.
    pub guest_waste_factor: f64,
    /// Minimum number of days between two collections.
    pub collection_interval_days: u32,
    /// Weekdays the trial's collection day is drawn from.
    pub collection_weekdays: Vec<Weekday>,
    /// Overfill is charged per started block of this many liters.
    pub overflow_block_liters: f64,
    /// Charge per started overfill block.
    pub overflow_block_cost: f64,
    /// Fill ratio (percent of capacity) at which a special collection fires.
    pub special_threshold_pct: f64,
    /// Special collection cost as a multiple of the tier's fixed cost.
    pub special_surcharge_factor: f64,
    /// Consecutive overflowing windows before capacity is escalated.
    pub escalation_threshold: u32,
    /// Length of one escalation accounting window, in days.
    pub escalation_period_days: u32,
    /// Index into the capacity table of the tier every trial starts with.
    pub initial_tier: usize,
}

impl Default for SimulationParameters {
    fn default() -> Self {
        Self {
            horizon_days: 500,
            start_date: NaiveDate::from_ymd_opt(2026, 1, 1).unwrap_or_default(),
            region: "BY".to_string(),
            residents: 18,
            absent_probability: 0.05,
            waste_per_person_liters: 30.0 / 7.0,
            guest_waste_factor: 0.15,
            collection_interval_days: 14,
            collection_weekdays: vec![
                Weekday::Mon,
                Weekday::Tue,
                Weekday::Wed,
                Weekday::Thu,
                Weekday::Fri,
            ],
            overflow_block_liters: 70.0,
            overflow_block_cost: 9.0,
            special_threshold_pct: 80.0,
            special_surcharge_factor: 1.1,
            escalation_threshold: 2,
            escalation_period_days: 7,
            initial_tier: 0,
        }
    }
}

impl SimulationParameters {
    /// Last simulated calendar date (inclusive).
    ///
    /// Only meaningful after [`validate`](Self::validate) succeeded.
    pub fn end_date(&self) -> Option<NaiveDate> {
        self.start_date
            .checked_add_days(Days::new(u64::from(self.horizon_days.saturating_sub(1))))
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.horizon_days == 0 {
            return Err(invalid("horizon_days", "must be positive"));
        }
        if self.end_date().is_none() {
            return Err(invalid("horizon_days", "horizon runs past the supported date range"));
        }
        check_probability("absent_probability", self.absent_probability)?;
        check_non_negative("waste_per_person_liters", self.waste_per_person_liters)?;
        check_non_negative("guest_waste_factor", self.guest_waste_factor)?;
        if self.collection_interval_days == 0 {
            return Err(invalid("collection_interval_days", "must be positive"));
        }
        if self.collection_weekdays.is_empty() {
            return Err(invalid("collection_weekdays", "at least one weekday is required"));
        }
        if !(self.overflow_block_liters.is_finite() && self.overflow_block_liters > 0.0) {
            return Err(invalid("overflow_block_liters", "must be positive"));
        }
        check_non_negative("overflow_block_cost", self.overflow_block_cost)?;
        check_non_negative("special_threshold_pct", self.special_threshold_pct)?;
        check_non_negative("special_surcharge_factor", self.special_surcharge_factor)?;
        if self.escalation_threshold == 0 {
            return Err(invalid("escalation_threshold", "must be at least 1"));
        }
        if self.escalation_period_days == 0 {
            return Err(invalid("escalation_period_days", "must be positive"));
        }
        Ok(())
    }
}

/// Reject anything outside `[0, 1]`, NaN included.
pub fn check_probability(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::ProbabilityOutOfRange { field, value })
    }
}

fn check_non_negative(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(invalid(field, &format!("must be a finite non-negative number, got {value}")))
    }
}

fn invalid(field: &'static str, reason: &str) -> ConfigError {
    ConfigError::InvalidParameter {
        field,
        reason: reason.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert!(SimulationParameters::default().validate().is_ok());
    }

    #[test]
    fn default_end_date() {
        let params = SimulationParameters {
            horizon_days: 31,
            ..SimulationParameters::default()
        };
        assert_eq!(params.end_date(), NaiveDate::from_ymd_opt(2026, 1, 31));
    }

    #[test]
    fn zero_horizon_rejected() {
        let params = SimulationParameters {
            horizon_days: 0,
            ..SimulationParameters::default()
        };
        assert!(matches!(
            params.validate(),
            Err(ConfigError::InvalidParameter { field: "horizon_days", .. })
        ));
    }

    #[test]
    fn probability_out_of_range_rejected() {
        let params = SimulationParameters {
            absent_probability: 1.5,
            ..SimulationParameters::default()
        };
        assert_eq!(
            params.validate(),
            Err(ConfigError::ProbabilityOutOfRange {
                field: "absent_probability",
                value: 1.5
            })
        );
    }

    #[test]
    fn nan_probability_rejected() {
        assert!(check_probability("p", f64::NAN).is_err());
    }

    #[test]
    fn empty_weekdays_rejected() {
        let params = SimulationParameters {
            collection_weekdays: vec![],
            ..SimulationParameters::default()
        };
        assert!(params.validate().is_err());
    }

    #[test]
    fn zero_escalation_period_rejected() {
        let params = SimulationParameters {
            escalation_period_days: 0,
            ..SimulationParameters::default()
        };
        assert!(params.validate().is_err());
    }

    #[test]
    fn parameters_roundtrip_json() {
        let params = SimulationParameters::default();
        let json = serde_json::to_string(&params).unwrap();
        let back: SimulationParameters = serde_json::from_str(&json).unwrap();
        assert_eq!(params, back);
    }
}
