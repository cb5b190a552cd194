//! BinSim CLI — Monte Carlo study, single trials, and configuration scaffolding.
//!
//! Commands:
//! - `run` — run every scenario x policy cell, print a summary, save artifacts
//! - `trial` — run one trial and emit its daily records as CSV
//! - `init-config` — print the reference configuration as TOML

use std::path::PathBuf;

use anyhow::{Context, Result};
use binsim_core::domain::TrialResult;
use binsim_runner::export::export_daily_csv;
use binsim_runner::{run_single_trial, run_study, save_artifacts, Metric, RunConfig, StudyRun};
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "binsim",
    about = "BinSim CLI — Monte Carlo simulation of residual-waste collection"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the full study: every scenario under every policy.
    Run {
        /// Path to a TOML run configuration. Defaults to the reference study.
        #[arg(long)]
        config: Option<PathBuf>,

        /// Override the number of trials per cell.
        #[arg(long)]
        trials: Option<usize>,

        /// Override the base seed.
        #[arg(long)]
        seed: Option<u64>,

        /// Worker threads (0 = all cores, 1 = sequential).
        #[arg(long)]
        threads: Option<usize>,

        /// Output directory for artifacts.
        #[arg(long, default_value = "results")]
        output_dir: PathBuf,
    },
    /// Run one trial and write its daily records as CSV.
    Trial {
        /// Scenario name from the configuration.
        #[arg(long)]
        scenario: String,

        /// Policy name from the configuration.
        #[arg(long)]
        policy: String,

        /// Trial seed. Defaults to the configured base seed.
        #[arg(long)]
        seed: Option<u64>,

        /// Path to a TOML run configuration. Defaults to the reference study.
        #[arg(long)]
        config: Option<PathBuf>,

        /// Write CSV to this file instead of stdout.
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Print the reference configuration as TOML.
    InitConfig,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            config,
            trials,
            seed,
            threads,
            output_dir,
        } => run_study_cmd(config, trials, seed, threads, output_dir),
        Commands::Trial {
            scenario,
            policy,
            seed,
            config,
            output,
        } => run_trial_cmd(&scenario, &policy, seed, config, output),
        Commands::InitConfig => {
            print!("{}", RunConfig::default().to_toml()?);
            Ok(())
        }
    }
}

fn load_config(path: Option<PathBuf>) -> Result<RunConfig> {
    match path {
        Some(path) => RunConfig::from_file(&path)
            .with_context(|| format!("failed to load configuration {}", path.display())),
        None => Ok(RunConfig::default()),
    }
}

fn run_study_cmd(
    config_path: Option<PathBuf>,
    trials: Option<usize>,
    seed: Option<u64>,
    threads: Option<usize>,
    output_dir: PathBuf,
) -> Result<()> {
    let mut config = load_config(config_path)?;
    if let Some(trials) = trials {
        config.monte_carlo.trials = trials;
    }
    if let Some(seed) = seed {
        config.monte_carlo.base_seed = seed;
    }
    if let Some(threads) = threads {
        config.monte_carlo.threads = threads;
    }
    log::info!(
        "running {} scenarios x {} policies, {} trials each",
        config.scenarios.len(),
        config.policies.len(),
        config.monte_carlo.trials
    );

    let run = run_study(&config)?;
    print_summary(&run);

    let run_dir = save_artifacts(&run, &output_dir)?;
    println!("Artifacts saved to: {}", run_dir.display());
    Ok(())
}

fn run_trial_cmd(
    scenario: &str,
    policy: &str,
    seed: Option<u64>,
    config_path: Option<PathBuf>,
    output: Option<PathBuf>,
) -> Result<()> {
    let config = load_config(config_path)?;
    let seed = seed.unwrap_or(config.monte_carlo.base_seed);
    let trial = run_single_trial(&config, scenario, policy, seed)?;
    let csv = export_daily_csv(&trial)?;

    match output {
        Some(path) => {
            std::fs::write(&path, csv)
                .with_context(|| format!("failed to write {}", path.display()))?;
            print_trial(&trial);
            println!("Daily records saved to: {}", path.display());
        }
        None => print!("{csv}"),
    }
    Ok(())
}

fn print_summary(run: &StudyRun) {
    let sim = &run.config.simulation;
    println!();
    println!("=== Study Result ===");
    println!("Fingerprint:    {}", run.fingerprint.short());
    println!(
        "Horizon:        {} days from {} ({})",
        sim.horizon_days, sim.start_date, sim.region
    );
    println!(
        "Trials:         {} per cell, base seed {}",
        run.config.monte_carlo.trials, run.config.monte_carlo.base_seed
    );
    println!();
    println!(
        "{:<12} {:<22} {:>12} {:>12} {:>10} {:>10} {:>10}",
        "Scenario", "Policy", "Total cost", "Daily cost", "Overflow%", "Outages", "Specials"
    );
    for cell in &run.cells {
        let s = &cell.statistics;
        let mean_total = cell.totals.iter().map(|t| t.total_cost).sum::<f64>()
            / cell.totals.len().max(1) as f64;
        println!(
            "{:<12} {:<22} {:>12.2} {:>12.2} {:>10.2} {:>10.4} {:>10.4}",
            cell.scenario,
            cell.policy,
            mean_total,
            s.numeric(Metric::TotalCost).map_or(0.0, |n| n.mean),
            s.numeric(Metric::OverflowRatePct).map_or(0.0, |n| n.mean),
            s.boolean(Metric::Outage).map_or(0.0, |b| b.rate),
            s.boolean(Metric::SpecialCollection).map_or(0.0, |b| b.rate),
        );
        if cell.failed_trials > 0 {
            println!("WARNING: {} trials failed in this cell", cell.failed_trials);
        }
    }
}

fn print_trial(trial: &TrialResult) {
    println!();
    println!("=== Trial Result ===");
    println!("Seed:           {}", trial.seed);
    println!("Weekday:        {:?}", trial.collection_weekday);
    println!("Days:           {}", trial.records.len());
    println!("Total cost:     {:.2}", trial.total_cost());
    println!("Total waste:    {:.1} L", trial.total_waste());
    println!("Collections:    {}", trial.regular_collections());
    println!("Specials:       {}", trial.special_collections());
    if let Some(capacity) = trial.final_capacity() {
        println!("Final capacity: {capacity:.0} L");
    }
}
