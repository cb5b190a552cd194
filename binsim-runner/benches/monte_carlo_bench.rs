//! Criterion benchmarks for the Monte Carlo layer.
//!
//! Benchmarks:
//! 1. One cell of 50 trials, sequential vs rayon pool
//! 2. Batch aggregation of 50 full-horizon trials

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use binsim_core::engine::TrialRunner;
use binsim_runner::{aggregate, HarnessOptions, MonteCarloHarness, RunConfig};

fn bench_cell(c: &mut Criterion) {
    let config = RunConfig::default();
    let holidays = config.holiday_calendar();
    let runner = TrialRunner::new(&config.simulation, &config.capacity_tiers, &*holidays).unwrap();
    let scenario = &config.scenarios[0];
    let policy = &config.policies[1];

    let mut group = c.benchmark_group("cell_50_trials");
    group.sample_size(10);
    for threads in [1usize, 0] {
        let harness = MonteCarloHarness::new(
            runner,
            HarnessOptions {
                trials: 50,
                base_seed: 1000,
                threads,
            },
        )
        .unwrap();
        group.bench_with_input(BenchmarkId::new("threads", threads), &harness, |b, h| {
            b.iter(|| black_box(h.run_cell(scenario, policy)));
        });
    }
    group.finish();
}

fn bench_aggregate(c: &mut Criterion) {
    let config = RunConfig::default();
    let holidays = config.holiday_calendar();
    let runner = TrialRunner::new(&config.simulation, &config.capacity_tiers, &*holidays).unwrap();
    let harness = MonteCarloHarness::new(
        runner,
        HarnessOptions {
            trials: 50,
            base_seed: 1000,
            threads: 0,
        },
    )
    .unwrap();
    let cell = harness.run_cell(&config.scenarios[0], &config.policies[0]);

    c.bench_function("aggregate_50_trials", |b| {
        b.iter(|| black_box(aggregate(&cell.trials).unwrap()));
    });
}

criterion_group!(benches, bench_cell, bench_aggregate);
criterion_main!(benches);
