//! Deterministic per-trial random streams.
//!
//! Trial `i` of every Monte Carlo cell uses seed `base_seed + i`, so all
//! (scenario, policy) cells see the same sequence of seeds. Each trial owns an
//! isolated `StdRng` built from its seed; nothing is shared between trials.

use rand::rngs::StdRng;
use rand::SeedableRng;

/// Maps trial indices to seeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeedSequence {
    base_seed: u64,
}

impl SeedSequence {
    pub fn new(base_seed: u64) -> Self {
        Self { base_seed }
    }

    pub fn base_seed(&self) -> u64 {
        self.base_seed
    }

    /// Seed of trial `index`. Wraps at `u64::MAX`.
    pub fn seed_for(&self, index: u64) -> u64 {
        self.base_seed.wrapping_add(index)
    }

    /// Seeded stream for trial `index`.
    pub fn stream_for(&self, index: u64) -> StdRng {
        trial_stream(self.seed_for(index))
    }
}

/// Isolated random stream for one trial.
pub fn trial_stream(seed: u64) -> StdRng {
    StdRng::seed_from_u64(seed)
}
