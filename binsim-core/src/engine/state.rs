//! Read-only step context and mutable per-trial state.

use crate::calendar::CollectionCalendar;
use crate::config::{ConfigError, SimulationParameters};
use crate::domain::{Bin, CapacityTable, Policy, Scenario};
use crate::policy::{EscalationPolicy, SpecialCollectionPolicy};

/// Everything the daily step reads but never changes.
#[derive(Debug, Clone)]
pub struct StepContext<'a> {
    pub params: &'a SimulationParameters,
    pub scenario: &'a Scenario,
    pub table: &'a CapacityTable,
    pub calendar: &'a CollectionCalendar,
    pub escalation: EscalationPolicy,
    pub special: SpecialCollectionPolicy,
}

impl<'a> StepContext<'a> {
    /// Rejects parameters or a scenario the daily draws cannot sample from.
    pub fn new(
        params: &'a SimulationParameters,
        scenario: &'a Scenario,
        policy: &Policy,
        table: &'a CapacityTable,
        calendar: &'a CollectionCalendar,
    ) -> Result<Self, ConfigError> {
        params.validate()?;
        scenario.validate()?;
        Ok(Self {
            params,
            scenario,
            table,
            calendar,
            escalation: EscalationPolicy::from_parts(policy, params),
            special: SpecialCollectionPolicy::from_parts(policy, params),
        })
    }
}

/// Mutable state threaded through successive days of one trial.
#[derive(Debug, Clone, PartialEq)]
pub struct TrialState {
    pub bin: Bin,
    /// Day of the last successful regular or special collection.
    pub last_collection_day: Option<u32>,
    /// Day of the last collection attempt: every scheduled day, whether it
    /// succeeded, hit a holiday or failed, plus every special collection.
    pub last_attempt_day: Option<u32>,
}

impl TrialState {
    pub fn new(table: &CapacityTable, initial_tier: usize) -> Result<Self, ConfigError> {
        Ok(Self {
            bin: Bin::new(table, initial_tier)?,
            last_collection_day: None,
            last_attempt_day: None,
        })
    }

    /// True once at least `interval` days have passed since the last
    /// collection attempt. Before the first attempt the interval counts as
    /// elapsed.
    pub fn interval_elapsed(&self, day: u32, interval: u32) -> bool {
        self.last_attempt_day
            .map_or(true, |last| day.saturating_sub(last) >= interval)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::NoHolidays;

    #[test]
    fn interval_elapsed_before_first_collection() {
        let state = TrialState::new(&CapacityTable::reference(), 0).unwrap();
        assert!(state.interval_elapsed(0, 14));
    }

    #[test]
    fn interval_counts_from_last_attempt() {
        let mut state = TrialState::new(&CapacityTable::reference(), 0).unwrap();
        state.last_attempt_day = Some(3);
        assert!(!state.interval_elapsed(10, 14));
        assert!(!state.interval_elapsed(16, 14));
        assert!(state.interval_elapsed(17, 14));
    }

    #[test]
    fn failed_attempt_restarts_interval_without_a_collection() {
        let mut state = TrialState::new(&CapacityTable::reference(), 0).unwrap();
        state.last_collection_day = Some(0);
        state.last_attempt_day = Some(14);
        assert!(!state.interval_elapsed(21, 14));
        assert!(state.interval_elapsed(28, 14));
    }

    fn ctx_parts() -> (SimulationParameters, CapacityTable, CollectionCalendar) {
        let params = SimulationParameters::default();
        let end = params.end_date().unwrap();
        let calendar = CollectionCalendar::build(
            &NoHolidays,
            "",
            params.start_date,
            end,
            chrono::Weekday::Mon,
        )
        .unwrap();
        (params, CapacityTable::reference(), calendar)
    }

    #[test]
    fn context_rejects_scenario_without_guests() {
        let (params, table, calendar) = ctx_parts();
        // Bypasses Scenario::new, as a deserialized value could.
        let scenario = Scenario {
            visit_probability: 0.5,
            max_guests: 0,
            failure_probability: 0.0,
        };
        let result =
            StepContext::new(&params, &scenario, &Policy::FIXED_INTERVAL, &table, &calendar);
        assert!(matches!(
            result,
            Err(ConfigError::InvalidParameter {
                field: "max_guests",
                ..
            })
        ));
    }

    #[test]
    fn context_rejects_invalid_parameters() {
        let (mut params, table, calendar) = ctx_parts();
        params.absent_probability = 1.5;
        let scenario = Scenario::new(0.1, 10, 0.0).unwrap();
        let result =
            StepContext::new(&params, &scenario, &Policy::FIXED_INTERVAL, &table, &calendar);
        assert!(matches!(result, Err(ConfigError::ProbabilityOutOfRange { .. })));
    }
}
