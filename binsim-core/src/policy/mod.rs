//! Management policies applied by the daily step.
//!
//! Both policies are pure deciders: they look at bin state and return what
//! should happen. The engine applies the decision, so ordering stays in one
//! place.

pub mod escalation;
pub mod special;

pub use escalation::{EscalationDecision, EscalationPolicy};
pub use special::SpecialCollectionPolicy;
