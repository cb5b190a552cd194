//! Reporting and export: CSV, JSON and Markdown artifacts of a study.
//!
//! - **CSV**: long-format summary, daily records of one trial, per-cell
//!   totals and histograms
//! - **JSON**: `summary.json` with schema version, fingerprint, configuration
//!   and every cell's statistics
//! - **Markdown**: a per-cell cost table for quick reading
//!
//! Unknown schema versions are rejected on load.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use binsim_core::domain::TrialResult;
use binsim_core::fingerprint::ConfigHash;
use serde::{Deserialize, Serialize};

use crate::config::RunConfig;
use crate::distribution::{Histogram, TrialTotals};
use crate::runner::{StudyRun, SCHEMA_VERSION};
use crate::statistics::{AggregateStatistics, Metric};

// ─── JSON export ────────────────────────────────────────────────────

/// Persisted form of a study: configuration plus per-cell statistics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudySummary {
    pub schema_version: u32,
    pub fingerprint: ConfigHash,
    pub config: RunConfig,
    pub cells: Vec<CellSummary>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CellSummary {
    pub scenario: String,
    pub policy: String,
    pub failed_trials: usize,
    pub statistics: AggregateStatistics,
}

impl StudySummary {
    pub fn from_run(run: &StudyRun) -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            fingerprint: run.fingerprint.clone(),
            config: run.config.clone(),
            cells: run
                .cells
                .iter()
                .map(|c| CellSummary {
                    scenario: c.scenario.clone(),
                    policy: c.policy.clone(),
                    failed_trials: c.failed_trials,
                    statistics: c.statistics.clone(),
                })
                .collect(),
        }
    }
}

pub fn export_summary_json(run: &StudyRun) -> Result<String> {
    serde_json::to_string_pretty(&StudySummary::from_run(run))
        .context("failed to serialize study summary to JSON")
}

/// Parse a `summary.json`, rejecting unknown schema versions.
pub fn import_summary_json(json: &str) -> Result<StudySummary> {
    let summary: StudySummary =
        serde_json::from_str(json).context("failed to deserialize study summary from JSON")?;
    if summary.schema_version > SCHEMA_VERSION {
        bail!(
            "unsupported schema version {} (max supported: {})",
            summary.schema_version,
            SCHEMA_VERSION
        );
    }
    Ok(summary)
}

// ─── CSV export ─────────────────────────────────────────────────────

/// Long-format summary of every cell.
///
/// Columns: scenario, policy, metric, statistic, value
pub fn export_summary_csv(run: &StudyRun) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record(["scenario", "policy", "metric", "statistic", "value"])?;

    for cell in &run.cells {
        for (metric, stats) in &cell.statistics.metrics {
            for (statistic, value) in stats.entries() {
                let value = format!("{value:.6}");
                wtr.write_record([
                    cell.scenario.as_str(),
                    cell.policy.as_str(),
                    metric.name(),
                    statistic,
                    value.as_str(),
                ])?;
            }
        }
    }

    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}

/// Daily records of one trial.
pub fn export_daily_csv(trial: &TrialResult) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record([
        "day",
        "date",
        "residents",
        "guests",
        "waste_added",
        "peak_fill",
        "fill_level",
        "capacity",
        "measured_capacity",
        "overflow_rate_pct",
        "outage",
        "holiday_miss",
        "regular_collection",
        "special_collection",
        "capacity_upgraded",
        "collection_cost",
        "overflow_cost",
        "special_cost",
        "total_cost",
    ])?;

    for r in &trial.records {
        wtr.write_record([
            &r.day.to_string(),
            &r.date.to_string(),
            &r.residents.to_string(),
            &r.guests.to_string(),
            &format!("{:.4}", r.waste_added),
            &format!("{:.4}", r.peak_fill),
            &format!("{:.4}", r.fill_level),
            &format!("{:.1}", r.capacity),
            &format!("{:.1}", r.measured_capacity),
            &format!("{:.0}", r.overflow_rate_pct),
            &r.outage.to_string(),
            &r.holiday_miss.to_string(),
            &r.regular_collection.to_string(),
            &r.special_collection.to_string(),
            &r.capacity_upgraded.to_string(),
            &format!("{:.2}", r.collection_cost),
            &format!("{:.2}", r.overflow_cost),
            &format!("{:.2}", r.special_cost),
            &format!("{:.2}", r.total_cost),
        ])?;
    }

    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}

/// One row per trial of a cell.
pub fn export_totals_csv(totals: &[TrialTotals]) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record([
        "seed",
        "total_cost",
        "total_waste",
        "final_capacity",
        "regular_collections",
        "special_collections",
        "overflow_days",
        "missed_collections",
    ])?;
    for t in totals {
        wtr.write_record([
            &t.seed.to_string(),
            &format!("{:.2}", t.total_cost),
            &format!("{:.2}", t.total_waste),
            &format!("{:.1}", t.final_capacity),
            &t.regular_collections.to_string(),
            &t.special_collections.to_string(),
            &t.overflow_days.to_string(),
            &t.missed_collections.to_string(),
        ])?;
    }
    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}

pub fn export_histogram_csv(histogram: &Histogram) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record(["bin", "lower", "upper", "count"])?;
    for (i, ((lo, hi), count)) in histogram
        .edges()
        .into_iter()
        .zip(&histogram.counts)
        .enumerate()
    {
        wtr.write_record([
            &i.to_string(),
            &format!("{lo:.4}"),
            &format!("{hi:.4}"),
            &count.to_string(),
        ])?;
    }
    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}

// ─── Markdown report ────────────────────────────────────────────────

/// Cost and reliability table, one row per cell.
pub fn generate_report(run: &StudyRun) -> String {
    let mut md = String::with_capacity(1024);
    md.push_str("# Waste Collection Study\n\n");
    md.push_str(&format!(
        "Fingerprint `{}`, {} trials per cell, {} days from {}.\n\n",
        run.fingerprint.short(),
        run.config.monte_carlo.trials,
        run.config.simulation.horizon_days,
        run.config.simulation.start_date
    ));
    md.push_str(
        "| Scenario | Policy | Mean daily cost | Mean total cost | Overflow rate % | Outage rate | Special rate |\n",
    );
    md.push_str("| --- | --- | --- | --- | --- | --- | --- |\n");

    for cell in &run.cells {
        let s = &cell.statistics;
        let mean = |m| s.numeric(m).map_or(0.0, |n| n.mean);
        let rate = |m| s.boolean(m).map_or(0.0, |b| b.rate);
        let mean_total = if cell.totals.is_empty() {
            0.0
        } else {
            cell.totals.iter().map(|t| t.total_cost).sum::<f64>() / cell.totals.len() as f64
        };
        md.push_str(&format!(
            "| {} | {} | {:.2} | {:.2} | {:.2} | {:.4} | {:.4} |\n",
            cell.scenario,
            cell.policy,
            mean(Metric::TotalCost),
            mean_total,
            mean(Metric::OverflowRatePct),
            rate(Metric::Outage),
            rate(Metric::SpecialCollection),
        ));
    }
    md
}

// ─── Artifact bundle ────────────────────────────────────────────────

/// Lowercase, filesystem-safe form of a cell name.
fn slug(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_lowercase()
            } else {
                '_'
            }
        })
        .collect()
}

/// Save the full artifact set for a study.
///
/// Creates `run_{fingerprint}/` under `output_dir` containing:
/// - `summary.json`, `summary.csv`, `report.md`
/// - one `{scenario}__{policy}/` directory per cell with `totals.csv`,
///   `cost_histogram.csv`, `waste_histogram.csv` and `daily_sample.csv`
///
/// Returns the path to the created directory.
pub fn save_artifacts(run: &StudyRun, output_dir: &Path) -> Result<PathBuf> {
    let run_dir = output_dir.join(format!("run_{}", run.fingerprint.short()));
    std::fs::create_dir_all(&run_dir)
        .with_context(|| format!("failed to create artifact dir: {}", run_dir.display()))?;

    write(&run_dir.join("summary.json"), &export_summary_json(run)?)?;
    write(&run_dir.join("summary.csv"), &export_summary_csv(run)?)?;
    write(&run_dir.join("report.md"), &generate_report(run))?;

    for cell in &run.cells {
        let cell_dir = run_dir.join(format!("{}__{}", slug(&cell.scenario), slug(&cell.policy)));
        std::fs::create_dir_all(&cell_dir)
            .with_context(|| format!("failed to create cell dir: {}", cell_dir.display()))?;
        write(&cell_dir.join("totals.csv"), &export_totals_csv(&cell.totals)?)?;
        write(
            &cell_dir.join("cost_histogram.csv"),
            &export_histogram_csv(&cell.cost_histogram)?,
        )?;
        write(
            &cell_dir.join("waste_histogram.csv"),
            &export_histogram_csv(&cell.waste_histogram)?,
        )?;
        if let Some(trial) = &cell.sample_trial {
            write(&cell_dir.join("daily_sample.csv"), &export_daily_csv(trial)?)?;
        }
    }

    log::info!("artifacts written to {}", run_dir.display());
    Ok(run_dir)
}

/// Load the summary from an artifact directory.
pub fn load_summary(dir: &Path) -> Result<StudySummary> {
    let path = dir.join("summary.json");
    let json = std::fs::read_to_string(&path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    import_summary_json(&json)
}

fn write(path: &Path, contents: &str) -> Result<()> {
    std::fs::write(path, contents).with_context(|| format!("failed to write {}", path.display()))
}
