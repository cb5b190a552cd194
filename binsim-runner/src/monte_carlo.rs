//! Monte Carlo harness: N seeded trials per (scenario, policy) cell.
//!
//! Trial `i` of every cell uses seed `base_seed + i`, so cells are compared on
//! identical random streams. Trials share nothing mutable and may run on a
//! rayon pool; results are always ordered by trial index.

use std::collections::HashSet;

use binsim_core::domain::TrialResult;
use binsim_core::engine::{TrialError, TrialRunner};
use binsim_core::rng::SeedSequence;
use rayon::prelude::*;
use thiserror::Error;

use crate::config::{NamedPolicy, NamedScenario};

#[derive(Debug, Error)]
pub enum HarnessError {
    #[error("no scenarios to run")]
    NoScenarios,

    #[error("no policies to run")]
    NoPolicies,

    #[error("repetition count must be positive")]
    ZeroTrials,

    #[error("duplicate {kind} name '{name}'")]
    DuplicateName { kind: &'static str, name: String },

    #[error("scenario '{name}': {source}")]
    InvalidScenario { name: String, source: TrialError },

    #[error("failed to build thread pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

/// Harness settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HarnessOptions {
    pub trials: usize,
    pub base_seed: u64,
    /// 0 = rayon's global pool, 1 = sequential, n > 1 = dedicated pool.
    pub threads: usize,
}

/// A trial that ended in an error. Never merged into statistics.
#[derive(Debug, Clone, PartialEq)]
pub struct TrialFailure {
    pub index: usize,
    pub seed: u64,
    pub error: TrialError,
}

/// All trials of one (scenario, policy) cell, ordered by trial index.
#[derive(Debug, Clone, PartialEq)]
pub struct CellResults {
    pub scenario: String,
    pub policy: String,
    pub trials: Vec<TrialResult>,
    pub failures: Vec<TrialFailure>,
}

/// Runs every (scenario, policy) cell of a study.
pub struct MonteCarloHarness<'a> {
    runner: TrialRunner<'a>,
    options: HarnessOptions,
    pool: Option<rayon::ThreadPool>,
}

impl<'a> MonteCarloHarness<'a> {
    pub fn new(runner: TrialRunner<'a>, options: HarnessOptions) -> Result<Self, HarnessError> {
        if options.trials == 0 {
            return Err(HarnessError::ZeroTrials);
        }
        let pool = if options.threads > 1 {
            Some(
                rayon::ThreadPoolBuilder::new()
                    .num_threads(options.threads)
                    .build()?,
            )
        } else {
            None
        };
        Ok(Self {
            runner,
            options,
            pool,
        })
    }

    pub fn options(&self) -> HarnessOptions {
        self.options
    }

    /// Run every cell, scenarios in the outer loop.
    ///
    /// Configuration problems abort before the first trial. A trial that fails
    /// while running is recorded in its cell's `failures` and logged.
    pub fn run(
        &self,
        scenarios: &[NamedScenario],
        policies: &[NamedPolicy],
    ) -> Result<Vec<CellResults>, HarnessError> {
        self.check_tables(scenarios, policies)?;

        let mut cells = Vec::with_capacity(scenarios.len() * policies.len());
        for scenario in scenarios {
            for policy in policies {
                cells.push(self.run_cell(scenario, policy));
            }
        }
        Ok(cells)
    }

    /// Run the N trials of one cell.
    pub fn run_cell(&self, scenario: &NamedScenario, policy: &NamedPolicy) -> CellResults {
        log::info!(
            "cell '{}' / '{}': {} trials from seed {}",
            scenario.name,
            policy.name,
            self.options.trials,
            self.options.base_seed
        );

        let seeds = SeedSequence::new(self.options.base_seed);
        let demand = scenario.scenario();
        let rules = policy.policy();
        let run_one = |index: usize| {
            let seed = seeds.seed_for(index as u64);
            (index, seed, self.runner.run(&demand, &rules, seed))
        };

        let outcomes: Vec<(usize, u64, Result<TrialResult, TrialError>)> =
            match (&self.pool, self.options.threads) {
                (Some(pool), _) => {
                    pool.install(|| (0..self.options.trials).into_par_iter().map(run_one).collect())
                }
                (None, 1) => (0..self.options.trials).map(run_one).collect(),
                (None, _) => (0..self.options.trials).into_par_iter().map(run_one).collect(),
            };

        let mut trials = Vec::with_capacity(outcomes.len());
        let mut failures = Vec::new();
        for (index, seed, outcome) in outcomes {
            match outcome {
                Ok(trial) => trials.push(trial),
                Err(error) => {
                    log::warn!("trial {index} (seed {seed}) failed: {error}");
                    failures.push(TrialFailure { index, seed, error });
                }
            }
        }

        log::info!(
            "cell '{}' / '{}': {} ok, {} failed",
            scenario.name,
            policy.name,
            trials.len(),
            failures.len()
        );

        CellResults {
            scenario: scenario.name.clone(),
            policy: policy.name.clone(),
            trials,
            failures,
        }
    }

    fn check_tables(
        &self,
        scenarios: &[NamedScenario],
        policies: &[NamedPolicy],
    ) -> Result<(), HarnessError> {
        if scenarios.is_empty() {
            return Err(HarnessError::NoScenarios);
        }
        if policies.is_empty() {
            return Err(HarnessError::NoPolicies);
        }
        check_unique("scenario", scenarios.iter().map(|s| s.name.as_str()))?;
        check_unique("policy", policies.iter().map(|p| p.name.as_str()))?;
        for s in scenarios {
            s.scenario()
                .validate()
                .map_err(|e| HarnessError::InvalidScenario {
                    name: s.name.clone(),
                    source: e.into(),
                })?;
        }
        Ok(())
    }
}

fn check_unique<'n>(
    kind: &'static str,
    names: impl Iterator<Item = &'n str>,
) -> Result<(), HarnessError> {
    let mut seen = HashSet::new();
    for name in names {
        if !seen.insert(name) {
            return Err(HarnessError::DuplicateName {
                kind,
                name: name.to_string(),
            });
        }
    }
    Ok(())
}
