//! BinSim Runner — Monte Carlo orchestration, statistics, run configuration and export.
//!
//! This crate builds on `binsim-core` to provide:
//! - TOML run configuration with reference-study defaults
//! - Monte Carlo harness over every (scenario, policy) cell, optionally parallel
//! - Streaming and batch statistics per cell
//! - Per-trial totals and histograms
//! - CSV, JSON and Markdown artifacts

pub mod config;
pub mod distribution;
pub mod export;
pub mod monte_carlo;
pub mod runner;
pub mod statistics;

pub use config::{MonteCarloConfig, NamedPolicy, NamedScenario, RunConfig, RunConfigError};
pub use distribution::{Histogram, HistogramError, TrialTotals};
pub use export::{save_artifacts, StudySummary};
pub use monte_carlo::{CellResults, HarnessError, HarnessOptions, MonteCarloHarness, TrialFailure};
pub use runner::{run_single_trial, run_study, CellReport, RunError, StudyRun, SCHEMA_VERSION};
pub use statistics::{
    aggregate, AggregateError, AggregateStatistics, BooleanStats, Metric, MetricStats,
    NumericStats, StatisticsAccumulator,
};
