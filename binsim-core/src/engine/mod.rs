//! Simulation engine: the daily step state machine and the trial runner.
//!
//! Each simulated day runs these sub-steps in a fixed order:
//!
//! 1. Demand: residents and guests add waste to the bin
//! 2. Collection-day test: collection weekday and interval elapsed
//! 3. Regular collection, unless the day is a holiday or the collection fails
//! 4. Special collection check (only if no regular collection happened)
//! 5. Overflow cost on the bin as it stands after steps 1-4
//! 6. Escalation streak update and capacity upgrade
//! 7. Record assembly

pub mod demand;
pub mod state;
pub mod step;
pub mod trial;

pub use demand::{draw_demand, Demand};
pub use state::{StepContext, TrialState};
pub use step::{advance_one_day, overflow_cost};
pub use trial::{TrialError, TrialRunner};
