//! Capacity escalation after repeated overflow.

use serde::{Deserialize, Serialize};

use crate::config::SimulationParameters;
use crate::domain::{CapacityTable, Policy, Tier};

/// Outcome of an escalation check.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EscalationDecision {
    /// Streak below threshold or escalation disabled.
    Hold,
    /// Move to this tier and reset the streak.
    Upgrade { tier_index: usize, tier: Tier },
    /// Threshold reached but no larger tier exists; only the streak resets.
    Exhausted,
}

/// Upgrades capacity once the overflow streak reaches `threshold`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EscalationPolicy {
    pub enabled: bool,
    /// Consecutive overflowing windows required.
    pub threshold: u32,
    /// Window length in days; the streak is updated on the last day of each window.
    pub period_days: u32,
}

impl EscalationPolicy {
    pub fn from_parts(policy: &Policy, params: &SimulationParameters) -> Self {
        Self {
            enabled: policy.escalation,
            threshold: params.escalation_threshold,
            period_days: params.escalation_period_days,
        }
    }

    /// True on the last day of an accounting window.
    pub fn is_window_end(&self, day: u32) -> bool {
        self.period_days > 0 && (day + 1) % self.period_days == 0
    }

    pub fn decide(&self, streak: u32, capacity: f64, table: &CapacityTable) -> EscalationDecision {
        if !self.enabled || streak < self.threshold {
            return EscalationDecision::Hold;
        }
        match table.next_larger(capacity) {
            Some((tier_index, tier)) => EscalationDecision::Upgrade { tier_index, tier },
            None => EscalationDecision::Exhausted,
        }
    }
}
