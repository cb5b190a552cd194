//! Study orchestration: run configuration in, per-cell reports out.

use binsim_core::domain::TrialResult;
use binsim_core::engine::{TrialError, TrialRunner};
use binsim_core::fingerprint::ConfigHash;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::{RunConfig, RunConfigError};
use crate::distribution::{Histogram, HistogramError, TrialTotals};
use crate::monte_carlo::{CellResults, HarnessError, HarnessOptions, MonteCarloHarness};
use crate::statistics::{aggregate, AggregateError, AggregateStatistics};

/// Current schema version for persisted study summaries.
pub const SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Error)]
pub enum RunError {
    #[error(transparent)]
    Config(#[from] RunConfigError),

    #[error(transparent)]
    Harness(#[from] HarnessError),

    #[error(transparent)]
    Trial(#[from] TrialError),

    #[error("cell '{scenario}' / '{policy}': {source}")]
    Aggregate {
        scenario: String,
        policy: String,
        source: AggregateError,
    },

    #[error("cell '{scenario}' / '{policy}': {source}")]
    Histogram {
        scenario: String,
        policy: String,
        source: HistogramError,
    },

    #[error("failed to fingerprint configuration: {0}")]
    Fingerprint(#[from] serde_json::Error),

    #[error("unknown {kind} '{name}'")]
    UnknownName { kind: &'static str, name: String },
}

/// Everything produced for one (scenario, policy) cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CellReport {
    pub scenario: String,
    pub policy: String,
    pub failed_trials: usize,
    pub statistics: AggregateStatistics,
    pub totals: Vec<TrialTotals>,
    pub cost_histogram: Histogram,
    pub waste_histogram: Histogram,
    /// Trial with the lowest seed, kept for daily-record export.
    #[serde(skip)]
    pub sample_trial: Option<TrialResult>,
}

/// A finished study.
#[derive(Debug, Clone, PartialEq)]
pub struct StudyRun {
    pub config: RunConfig,
    pub fingerprint: ConfigHash,
    pub cells: Vec<CellReport>,
}

impl StudyRun {
    pub fn cell(&self, scenario: &str, policy: &str) -> Option<&CellReport> {
        self.cells
            .iter()
            .find(|c| c.scenario == scenario && c.policy == policy)
    }
}

/// Run the full scenario x policy grid of `config`.
pub fn run_study(config: &RunConfig) -> Result<StudyRun, RunError> {
    config.validate()?;
    let fingerprint = config.fingerprint()?;
    let holidays = config.holiday_calendar();
    let runner = TrialRunner::new(&config.simulation, &config.capacity_tiers, &*holidays)?;
    let mc = &config.monte_carlo;
    let harness = MonteCarloHarness::new(
        runner,
        HarnessOptions {
            trials: mc.trials,
            base_seed: mc.base_seed,
            threads: mc.threads,
        },
    )?;

    log::info!(
        "study {}: {} scenarios x {} policies x {} trials, {} days each",
        fingerprint.short(),
        config.scenarios.len(),
        config.policies.len(),
        mc.trials,
        config.simulation.horizon_days
    );

    let cells = harness
        .run(&config.scenarios, &config.policies)?
        .into_iter()
        .map(|cell| cell_report(cell, mc.histogram_bins))
        .collect::<Result<Vec<_>, RunError>>()?;

    Ok(StudyRun {
        config: config.clone(),
        fingerprint,
        cells,
    })
}

/// Reduce one cell's trials to its report. A cell without a single
/// successful trial is an error, never an all-zero summary.
fn cell_report(cell: CellResults, histogram_bins: usize) -> Result<CellReport, RunError> {
    let statistics = aggregate(&cell.trials).map_err(|source| RunError::Aggregate {
        scenario: cell.scenario.clone(),
        policy: cell.policy.clone(),
        source,
    })?;
    let totals: Vec<TrialTotals> = cell.trials.iter().map(TrialTotals::from_trial).collect();
    let histogram = |values: Vec<f64>| {
        Histogram::build(&values, histogram_bins).map_err(|source| RunError::Histogram {
            scenario: cell.scenario.clone(),
            policy: cell.policy.clone(),
            source,
        })
    };
    let cost_histogram = histogram(totals.iter().map(|t| t.total_cost).collect())?;
    let waste_histogram = histogram(totals.iter().map(|t| t.total_waste).collect())?;
    Ok(CellReport {
        failed_trials: cell.failures.len(),
        statistics,
        totals,
        cost_histogram,
        waste_histogram,
        sample_trial: cell.trials.into_iter().next(),
        scenario: cell.scenario,
        policy: cell.policy,
    })
}

/// Run one trial of a named scenario and policy.
pub fn run_single_trial(
    config: &RunConfig,
    scenario: &str,
    policy: &str,
    seed: u64,
) -> Result<TrialResult, RunError> {
    config.validate()?;
    let scenario = config
        .scenario(scenario)
        .ok_or_else(|| RunError::UnknownName {
            kind: "scenario",
            name: scenario.to_string(),
        })?;
    let policy = config.policy(policy).ok_or_else(|| RunError::UnknownName {
        kind: "policy",
        name: policy.to_string(),
    })?;
    let holidays = config.holiday_calendar();
    let runner = TrialRunner::new(&config.simulation, &config.capacity_tiers, &*holidays)?;
    Ok(runner.run(&scenario.scenario(), &policy.policy(), seed)?)
}
