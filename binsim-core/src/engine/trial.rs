//! One trial: a seeded random stream driven through the full horizon.

use rand::Rng;
use thiserror::Error;

use crate::calendar::{CalendarError, CollectionCalendar, HolidayCalendar};
use crate::config::{ConfigError, SimulationParameters};
use crate::domain::{CapacityTable, DailyRecord, Policy, Scenario, TrialResult};
use crate::rng::trial_stream;

use super::state::{StepContext, TrialState};
use super::step::advance_one_day;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum TrialError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("holiday calendar: {0}")]
    Calendar(#[from] CalendarError),
}

/// Runs single trials against a fixed parameter set and capacity table.
///
/// Construction validates everything that does not depend on the scenario;
/// `run` validates the scenario and then cannot fail except through the
/// holiday source.
#[derive(Clone, Copy)]
pub struct TrialRunner<'a> {
    params: &'a SimulationParameters,
    table: &'a CapacityTable,
    holidays: &'a dyn HolidayCalendar,
}

impl<'a> TrialRunner<'a> {
    pub fn new(
        params: &'a SimulationParameters,
        table: &'a CapacityTable,
        holidays: &'a dyn HolidayCalendar,
    ) -> Result<Self, TrialError> {
        params.validate()?;
        if table.get(params.initial_tier).is_none() {
            return Err(ConfigError::TierOutOfRange {
                tier: params.initial_tier,
                tiers: table.len(),
            }
            .into());
        }
        Ok(Self {
            params,
            table,
            holidays,
        })
    }

    pub fn params(&self) -> &SimulationParameters {
        self.params
    }

    pub fn table(&self) -> &CapacityTable {
        self.table
    }

    /// Run one trial. Identical `(scenario, policy, seed)` always yields an
    /// identical result.
    pub fn run(
        &self,
        scenario: &Scenario,
        policy: &Policy,
        seed: u64,
    ) -> Result<TrialResult, TrialError> {
        scenario.validate()?;
        let params = self.params;
        let mut rng = trial_stream(seed);

        // Weekday first, so it depends on the seed alone.
        let weekdays = &params.collection_weekdays;
        let collection_weekday = weekdays[rng.gen_range(0..weekdays.len())];

        let end = params.end_date().ok_or(ConfigError::InvalidParameter {
            field: "horizon_days",
            reason: "horizon runs past the supported date range".to_string(),
        })?;
        let calendar = CollectionCalendar::build(
            self.holidays,
            &params.region,
            params.start_date,
            end,
            collection_weekday,
        )?;

        let ctx = StepContext::new(params, scenario, policy, self.table, &calendar)?;
        let mut state = TrialState::new(self.table, params.initial_tier)?;
        let records: Vec<DailyRecord> = (0..params.horizon_days)
            .map(|day| advance_one_day(day, &ctx, &mut state, &mut rng))
            .collect();

        log::debug!(
            "trial seed={seed} weekday={collection_weekday:?} holidays={} cost={:.2} capacity={}",
            calendar.holidays().len(),
            records.iter().map(|r| r.total_cost).sum::<f64>(),
            state.bin.capacity()
        );

        Ok(TrialResult {
            seed,
            collection_weekday,
            records,
        })
    }
}
