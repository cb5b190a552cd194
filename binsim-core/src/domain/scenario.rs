//! Demand scenarios and management policies.

use serde::{Deserialize, Serialize};

use crate::config::{check_probability, ConfigError};

/// Stochastic-demand parameter set.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    /// Probability that guests add waste on a given day.
    pub visit_probability: f64,
    /// Upper bound of the uniform guest count draw.
    #[serde(default = "default_max_guests")]
    pub max_guests: u32,
    /// Probability that a scheduled, non-holiday collection fails.
    pub failure_probability: f64,
}

fn default_max_guests() -> u32 {
    10
}

impl Scenario {
    pub fn new(
        visit_probability: f64,
        max_guests: u32,
        failure_probability: f64,
    ) -> Result<Self, ConfigError> {
        let scenario = Self {
            visit_probability,
            max_guests,
            failure_probability,
        };
        scenario.validate()?;
        Ok(scenario)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        check_probability("visit_probability", self.visit_probability)?;
        check_probability("failure_probability", self.failure_probability)?;
        if self.max_guests == 0 {
            return Err(ConfigError::InvalidParameter {
                field: "max_guests",
                reason: "must be a positive integer".to_string(),
            });
        }
        Ok(())
    }
}

/// Management options switched on for a trial.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Policy {
    /// Upgrade capacity after repeated overflow.
    #[serde(default)]
    pub escalation: bool,
    /// Trigger out-of-cycle collections above the fill threshold.
    #[serde(default)]
    pub special_collection: bool,
}

impl Policy {
    pub const FIXED_INTERVAL: Policy = Policy {
        escalation: false,
        special_collection: false,
    };
    pub const CAPACITY_ESCALATION: Policy = Policy {
        escalation: true,
        special_collection: false,
    };
    pub const SPECIAL_COLLECTION: Policy = Policy {
        escalation: false,
        special_collection: true,
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_scenario() {
        let s = Scenario::new(0.07, 10, 0.008).unwrap();
        assert_eq!(s.max_guests, 10);
    }

    #[test]
    fn probabilities_must_be_in_unit_interval() {
        assert!(matches!(
            Scenario::new(-0.1, 10, 0.0),
            Err(ConfigError::ProbabilityOutOfRange { field: "visit_probability", .. })
        ));
        assert!(matches!(
            Scenario::new(0.1, 10, 1.01),
            Err(ConfigError::ProbabilityOutOfRange { field: "failure_probability", .. })
        ));
    }

    #[test]
    fn zero_guests_rejected() {
        assert!(Scenario::new(0.1, 0, 0.0).is_err());
    }

    #[test]
    fn policy_defaults_to_fixed_interval() {
        let p: Policy = serde_json::from_str("{}").unwrap();
        assert_eq!(p, Policy::FIXED_INTERVAL);
    }
}
