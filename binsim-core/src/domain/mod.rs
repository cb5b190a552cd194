//! Domain types: capacity tiers, the bin, scenarios, policies, and per-day records.

pub mod bin;
pub mod capacity;
pub mod record;
pub mod scenario;

pub use bin::Bin;
pub use capacity::{CapacityTable, Tier};
pub use record::{DailyRecord, TrialResult};
pub use scenario::{Policy, Scenario};
