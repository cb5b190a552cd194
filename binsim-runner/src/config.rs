//! TOML run configuration.
//!
//! A run file has the sections `[simulation]`, `[monte_carlo]`,
//! `[[capacity_tiers]]`, `[[scenarios]]` and `[[policies]]`. Every field has
//! a default reproducing the reference study, so an empty file is a valid run.

use std::collections::HashSet;
use std::path::Path;

use binsim_core::calendar::{
    CalendarError, FixedHolidays, GermanHolidays, HolidayCalendar, NoHolidays, WithExtraHolidays,
};
use binsim_core::config::{ConfigError, SimulationParameters};
use binsim_core::domain::{CapacityTable, Policy, Scenario};
use binsim_core::fingerprint::ConfigHash;
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Region value that disables regional holidays.
pub const NO_REGION: &str = "none";

#[derive(Debug, Error)]
pub enum RunConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("failed to parse run configuration: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("failed to render run configuration: {0}")]
    Render(#[from] toml::ser::Error),

    #[error(transparent)]
    Invalid(#[from] ConfigError),

    #[error(transparent)]
    Calendar(#[from] CalendarError),

    #[error("{kind} table is empty")]
    EmptyTable { kind: &'static str },

    #[error("duplicate {kind} name '{name}'")]
    DuplicateName { kind: &'static str, name: String },
}

/// Monte Carlo settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonteCarloConfig {
    /// Trials per (scenario, policy) cell.
    pub trials: usize,
    /// Trial `i` uses seed `base_seed + i`.
    pub base_seed: u64,
    /// 0 = rayon's global pool, 1 = sequential, n > 1 = dedicated pool of n threads.
    pub threads: usize,
    /// Bins of the per-cell totals histograms.
    pub histogram_bins: usize,
}

impl Default for MonteCarloConfig {
    fn default() -> Self {
        Self {
            trials: 1000,
            base_seed: 1000,
            threads: 0,
            histogram_bins: 40,
        }
    }
}

/// A scenario with its display name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamedScenario {
    pub name: String,
    pub visit_probability: f64,
    #[serde(default = "default_max_guests")]
    pub max_guests: u32,
    pub failure_probability: f64,
}

fn default_max_guests() -> u32 {
    10
}

impl NamedScenario {
    pub fn new(name: impl Into<String>, visit: f64, max_guests: u32, failure: f64) -> Self {
        Self {
            name: name.into(),
            visit_probability: visit,
            max_guests,
            failure_probability: failure,
        }
    }

    pub fn scenario(&self) -> Scenario {
        Scenario {
            visit_probability: self.visit_probability,
            max_guests: self.max_guests,
            failure_probability: self.failure_probability,
        }
    }
}

/// A policy with its display name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamedPolicy {
    pub name: String,
    #[serde(default)]
    pub escalation: bool,
    #[serde(default)]
    pub special_collection: bool,
}

impl NamedPolicy {
    pub fn new(name: impl Into<String>, policy: Policy) -> Self {
        Self {
            name: name.into(),
            escalation: policy.escalation,
            special_collection: policy.special_collection,
        }
    }

    pub fn policy(&self) -> Policy {
        Policy {
            escalation: self.escalation,
            special_collection: self.special_collection,
        }
    }
}

/// Complete description of a study run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// Dates treated as holidays in addition to the region's calendar.
    pub extra_holidays: Vec<NaiveDate>,
    pub simulation: SimulationParameters,
    pub monte_carlo: MonteCarloConfig,
    pub capacity_tiers: CapacityTable,
    pub scenarios: Vec<NamedScenario>,
    pub policies: Vec<NamedPolicy>,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            extra_holidays: Vec::new(),
            simulation: SimulationParameters::default(),
            monte_carlo: MonteCarloConfig::default(),
            capacity_tiers: CapacityTable::reference(),
            scenarios: vec![
                NamedScenario::new("Normal", 0.07, 10, 0.008),
                NamedScenario::new("Visits", 0.13, 10, 0.008),
                NamedScenario::new("Outages", 0.07, 10, 0.014),
            ],
            policies: vec![
                NamedPolicy::new("Fixed interval", Policy::FIXED_INTERVAL),
                NamedPolicy::new("Capacity escalation", Policy::CAPACITY_ESCALATION),
                NamedPolicy::new("Special collection", Policy::SPECIAL_COLLECTION),
            ],
        }
    }
}

impl RunConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml(text: &str) -> Result<Self, RunConfigError> {
        let config: RunConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, RunConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| RunConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml(&text)
    }

    pub fn to_toml(&self) -> Result<String, RunConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Reject anything that would make a trial meaningless. Runs before any
    /// trial starts.
    pub fn validate(&self) -> Result<(), RunConfigError> {
        self.simulation.validate()?;
        if self.capacity_tiers.get(self.simulation.initial_tier).is_none() {
            return Err(ConfigError::TierOutOfRange {
                tier: self.simulation.initial_tier,
                tiers: self.capacity_tiers.len(),
            }
            .into());
        }
        if self.monte_carlo.trials == 0 {
            return Err(ConfigError::InvalidParameter {
                field: "trials",
                reason: "must be positive".to_string(),
            }
            .into());
        }
        if self.monte_carlo.histogram_bins == 0 {
            return Err(ConfigError::InvalidParameter {
                field: "histogram_bins",
                reason: "must be positive".to_string(),
            }
            .into());
        }

        if self.scenarios.is_empty() {
            return Err(RunConfigError::EmptyTable { kind: "scenario" });
        }
        if self.policies.is_empty() {
            return Err(RunConfigError::EmptyTable { kind: "policy" });
        }
        unique_names("scenario", self.scenarios.iter().map(|s| s.name.as_str()))?;
        unique_names("policy", self.policies.iter().map(|p| p.name.as_str()))?;
        for s in &self.scenarios {
            s.scenario().validate()?;
        }

        // Surface unknown regions now rather than inside every trial.
        let calendar = self.holiday_calendar();
        calendar.holidays(&self.simulation.region, self.simulation.start_date.year())?;
        Ok(())
    }

    /// Holiday source selected by `simulation.region` and `extra_holidays`.
    pub fn holiday_calendar(&self) -> Box<dyn HolidayCalendar> {
        if self.simulation.region.eq_ignore_ascii_case(NO_REGION) {
            with_extra(NoHolidays, &self.extra_holidays)
        } else {
            with_extra(GermanHolidays, &self.extra_holidays)
        }
    }

    pub fn fingerprint(&self) -> Result<ConfigHash, serde_json::Error> {
        ConfigHash::of(self)
    }

    pub fn scenario(&self, name: &str) -> Option<&NamedScenario> {
        self.scenarios.iter().find(|s| s.name == name)
    }

    pub fn policy(&self, name: &str) -> Option<&NamedPolicy> {
        self.policies.iter().find(|p| p.name == name)
    }
}

fn with_extra<C: HolidayCalendar + 'static>(
    base: C,
    extra: &[NaiveDate],
) -> Box<dyn HolidayCalendar> {
    if extra.is_empty() {
        Box::new(base)
    } else {
        Box::new(WithExtraHolidays::new(
            base,
            FixedHolidays::new(extra.iter().copied()),
        ))
    }
}

fn unique_names<'a>(
    kind: &'static str,
    names: impl Iterator<Item = &'a str>,
) -> Result<(), RunConfigError> {
    let mut seen = HashSet::new();
    for name in names {
        if !seen.insert(name) {
            return Err(RunConfigError::DuplicateName {
                kind,
                name: name.to_string(),
            });
        }
    }
    Ok(())
}
