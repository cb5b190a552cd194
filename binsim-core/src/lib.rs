//! BinSim Core — domain types, holiday calendars, policies and the daily step engine.
//!
//! This crate contains the single-trial simulation:
//! - Value objects (scenario, policy, capacity table, simulation parameters)
//! - Bin state with overflow accounting and an escalation streak
//! - Holiday sources and the per-trial collection calendar
//! - Capacity escalation and special collection policies
//! - Day-by-day step engine with seven ordered sub-steps
//! - Trial runner with an isolated seeded random stream per trial

pub mod calendar;
pub mod config;
pub mod domain;
pub mod engine;
pub mod fingerprint;
pub mod policy;
pub mod rng;

pub use config::{ConfigError, SimulationParameters};
pub use engine::{TrialError, TrialRunner};
