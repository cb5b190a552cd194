//! The daily step: one call advances a trial by exactly one day.

use chrono::Datelike;
use rand::Rng;

use crate::domain::DailyRecord;
use crate::policy::EscalationDecision;

use super::demand::draw_demand;
use super::state::{StepContext, TrialState};

/// Charge for `overflow_liters` of overfill: a flat cost per started block.
pub fn overflow_cost(overflow_liters: f64, block_liters: f64, block_cost: f64) -> f64 {
    if overflow_liters <= 0.0 {
        return 0.0;
    }
    (overflow_liters / block_liters).ceil() * block_cost
}

/// Advance `state` by one day and return the day's record.
///
/// The only randomness comes from `rng`; identical inputs produce identical
/// records.
pub fn advance_one_day<R: Rng + ?Sized>(
    day: u32,
    ctx: &StepContext<'_>,
    state: &mut TrialState,
    rng: &mut R,
) -> DailyRecord {
    let params = ctx.params;
    let date = ctx.calendar.date_of(day);

    // ─── 1. Demand ───
    let demand = draw_demand(params, ctx.scenario, rng);
    state.bin.add_waste(demand.liters);
    let peak_fill = state.bin.fill_level();

    // ─── 2. Collection-day test ───
    let scheduled = date.weekday() == ctx.calendar.weekday()
        && state.interval_elapsed(day, params.collection_interval_days);

    // ─── 3. Regular collection ───
    let mut holiday_miss = false;
    let mut outage = false;
    let mut regular_collection = false;
    let mut collection_cost = 0.0;
    if scheduled {
        // A failed attempt restarts the interval just like a successful one.
        state.last_attempt_day = Some(day);
        if ctx.calendar.is_holiday(date) {
            holiday_miss = true;
        } else if rng.gen_bool(ctx.scenario.failure_probability) {
            outage = true;
        } else {
            collection_cost = state.bin.fixed_cost();
            state.bin.empty();
            state.last_collection_day = Some(day);
            regular_collection = true;
        }
    }

    // ─── 4. Special collection ───
    let mut special_collection = false;
    let mut special_cost = 0.0;
    if !regular_collection {
        if let Some(cost) = ctx.special.decide(
            state.bin.fill_ratio_pct(),
            regular_collection,
            state.bin.fixed_cost(),
        ) {
            state.bin.empty();
            state.last_collection_day = Some(day);
            state.last_attempt_day = Some(day);
            special_collection = true;
            special_cost = cost;
        }
    }

    // ─── 5. Overflow cost ───
    let measured_capacity = state.bin.capacity();
    let overflow_liters = state.bin.overflow_liters();
    let overflow_rate_pct = state.bin.overflow_rate_pct();
    let overflow_charge = overflow_cost(
        overflow_liters,
        params.overflow_block_liters,
        params.overflow_block_cost,
    );

    // ─── 6. Escalation ───
    let mut capacity_upgraded = false;
    if ctx.escalation.is_window_end(day) {
        state.bin.observe_overflow();
        match ctx.escalation.decide(
            state.bin.overflow_streak(),
            state.bin.capacity(),
            ctx.table,
        ) {
            EscalationDecision::Hold => {}
            EscalationDecision::Upgrade { tier_index, tier } => {
                log::debug!(
                    "day {day}: escalating capacity {} L -> {} L",
                    state.bin.capacity(),
                    tier.liters
                );
                capacity_upgraded = state.bin.upgrade(tier_index, tier);
                state.bin.reset_streak();
            }
            EscalationDecision::Exhausted => state.bin.reset_streak(),
        }
    }

    // ─── 7. Record ───
    DailyRecord {
        day,
        date,
        residents: demand.residents,
        guests: demand.guests,
        waste_added: demand.liters,
        peak_fill,
        fill_level: state.bin.fill_level(),
        capacity: state.bin.capacity(),
        measured_capacity,
        overflow_rate_pct,
        outage,
        holiday_miss,
        regular_collection,
        special_collection,
        capacity_upgraded,
        collection_cost,
        overflow_cost: overflow_charge,
        special_cost,
        total_cost: collection_cost + overflow_charge + special_cost,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::{CollectionCalendar, FixedHolidays, NoHolidays};
    use crate::config::SimulationParameters;
    use crate::domain::{CapacityTable, Policy, Scenario, Tier};
    use crate::rng::trial_stream;
    use chrono::{NaiveDate, Weekday};

    fn table() -> CapacityTable {
        CapacityTable::new(vec![Tier::new(80.0, 10.0), Tier::new(120.0, 15.0)]).unwrap()
    }

    /// One resident producing exactly `liters` per day, no guests, no absence.
    fn params(liters: f64) -> SimulationParameters {
        SimulationParameters {
            horizon_days: 60,
            start_date: NaiveDate::from_ymd_opt(2026, 1, 5).unwrap(), // Monday
            residents: 1,
            absent_probability: 0.0,
            waste_per_person_liters: liters,
            collection_interval_days: 7,
            special_threshold_pct: 80.0,
            special_surcharge_factor: 1.1,
            escalation_threshold: 2,
            escalation_period_days: 7,
            ..SimulationParameters::default()
        }
    }

    fn calendar(p: &SimulationParameters, weekday: Weekday) -> CollectionCalendar {
        CollectionCalendar::build(&NoHolidays, "", p.start_date, p.end_date().unwrap(), weekday)
            .unwrap()
    }

    #[test]
    fn overflow_cost_per_started_block() {
        assert_eq!(overflow_cost(0.0, 70.0, 9.0), 0.0);
        assert_eq!(overflow_cost(0.5, 70.0, 9.0), 9.0);
        assert_eq!(overflow_cost(70.0, 70.0, 9.0), 9.0);
        assert_eq!(overflow_cost(70.1, 70.0, 9.0), 18.0);
    }

    #[test]
    fn regular_collection_on_weekday_empties_and_charges() {
        let p = params(20.0);
        let scenario = Scenario::new(0.0, 1, 0.0).unwrap();
        let cal = calendar(&p, Weekday::Mon);
        let t = table();
        let ctx = StepContext::new(&p, &scenario, &Policy::FIXED_INTERVAL, &t, &cal).unwrap();
        let mut state = TrialState::new(&t, 0).unwrap();
        let mut rng = trial_stream(1);

        let rec = advance_one_day(0, &ctx, &mut state, &mut rng);
        assert!(rec.regular_collection);
        assert_eq!(rec.peak_fill, 20.0);
        assert_eq!(rec.fill_level, 0.0);
        assert_eq!(rec.collection_cost, 10.0);
        assert_eq!(rec.total_cost, 10.0);
        assert_eq!(state.last_collection_day, Some(0));

        let rec = advance_one_day(1, &ctx, &mut state, &mut rng);
        assert!(!rec.regular_collection);
        assert_eq!(rec.fill_level, 20.0);
        assert_eq!(rec.total_cost, 0.0);
    }

    #[test]
    fn interval_blocks_weekly_match() {
        let p = SimulationParameters {
            collection_interval_days: 14,
            ..params(1.0)
        };
        let scenario = Scenario::new(0.0, 1, 0.0).unwrap();
        let cal = calendar(&p, Weekday::Mon);
        let t = table();
        let ctx = StepContext::new(&p, &scenario, &Policy::FIXED_INTERVAL, &t, &cal).unwrap();
        let mut state = TrialState::new(&t, 0).unwrap();
        let mut rng = trial_stream(1);

        let collected: Vec<u32> = (0..29)
            .map(|day| advance_one_day(day, &ctx, &mut state, &mut rng))
            .filter(|r| r.regular_collection)
            .map(|r| r.day)
            .collect();
        assert_eq!(collected, vec![0, 14, 28]);
    }

    #[test]
    fn holiday_blocks_collection_without_charge() {
        let p = params(20.0);
        let scenario = Scenario::new(0.0, 1, 0.0).unwrap();
        let holidays = FixedHolidays::new([p.start_date]);
        let cal = CollectionCalendar::build(
            &holidays,
            "",
            p.start_date,
            p.end_date().unwrap(),
            Weekday::Mon,
        )
        .unwrap();
        let t = table();
        let ctx = StepContext::new(&p, &scenario, &Policy::FIXED_INTERVAL, &t, &cal).unwrap();
        let mut state = TrialState::new(&t, 0).unwrap();
        let mut rng = trial_stream(1);

        let rec = advance_one_day(0, &ctx, &mut state, &mut rng);
        assert!(rec.holiday_miss);
        assert!(!rec.outage);
        assert!(!rec.regular_collection);
        assert_eq!(rec.collection_cost, 0.0);
        assert_eq!(rec.fill_level, 20.0);
        assert_eq!(state.last_collection_day, None);
        assert_eq!(state.last_attempt_day, Some(0));
    }

    #[test]
    fn missed_collection_waits_a_full_interval() {
        // Mondays, every 14 days, with a holiday on day 14 (2026-01-19).
        let p = SimulationParameters {
            collection_interval_days: 14,
            ..params(1.0)
        };
        let scenario = Scenario::new(0.0, 1, 0.0).unwrap();
        let holidays = FixedHolidays::new([NaiveDate::from_ymd_opt(2026, 1, 19).unwrap()]);
        let cal = CollectionCalendar::build(
            &holidays,
            "",
            p.start_date,
            p.end_date().unwrap(),
            Weekday::Mon,
        )
        .unwrap();
        let t = table();
        let ctx = StepContext::new(&p, &scenario, &Policy::FIXED_INTERVAL, &t, &cal).unwrap();
        let mut state = TrialState::new(&t, 0).unwrap();
        let mut rng = trial_stream(1);

        let records: Vec<_> = (0..50)
            .map(|day| advance_one_day(day, &ctx, &mut state, &mut rng))
            .collect();
        let collected: Vec<u32> = records
            .iter()
            .filter(|r| r.regular_collection)
            .map(|r| r.day)
            .collect();
        let missed: Vec<u32> = records
            .iter()
            .filter(|r| r.holiday_miss)
            .map(|r| r.day)
            .collect();
        assert_eq!(collected, vec![0, 28, 42]);
        assert_eq!(missed, vec![14]);
    }

    #[test]
    fn outages_keep_the_fixed_cadence() {
        let p = SimulationParameters {
            collection_interval_days: 14,
            ..params(1.0)
        };
        let scenario = Scenario::new(0.0, 1, 1.0).unwrap();
        let cal = calendar(&p, Weekday::Mon);
        let t = table();
        let ctx = StepContext::new(&p, &scenario, &Policy::FIXED_INTERVAL, &t, &cal).unwrap();
        let mut state = TrialState::new(&t, 0).unwrap();
        let mut rng = trial_stream(1);

        let outages: Vec<u32> = (0..50)
            .map(|day| advance_one_day(day, &ctx, &mut state, &mut rng))
            .filter(|r| r.outage)
            .map(|r| r.day)
            .collect();
        assert_eq!(outages, vec![0, 14, 28, 42]);
        assert_eq!(state.last_collection_day, None);
    }

    #[test]
    fn certain_failure_is_an_outage() {
        let p = params(20.0);
        let scenario = Scenario::new(0.0, 1, 1.0).unwrap();
        let cal = calendar(&p, Weekday::Mon);
        let t = table();
        let ctx = StepContext::new(&p, &scenario, &Policy::FIXED_INTERVAL, &t, &cal).unwrap();
        let mut state = TrialState::new(&t, 0).unwrap();
        let mut rng = trial_stream(1);

        let rec = advance_one_day(0, &ctx, &mut state, &mut rng);
        assert!(rec.outage);
        assert!(!rec.regular_collection);
        assert_eq!(rec.total_cost, 0.0);
        assert_eq!(state.last_collection_day, None);
        assert_eq!(state.last_attempt_day, Some(0));
    }

    #[test]
    fn special_collection_at_85_percent() {
        // 68 L in an 80 L bin is 85 %.
        let p = params(68.0);
        let scenario = Scenario::new(0.0, 1, 1.0).unwrap();
        let cal = calendar(&p, Weekday::Wed);
        let t = table();
        let ctx = StepContext::new(&p, &scenario, &Policy::SPECIAL_COLLECTION, &t, &cal).unwrap();
        let mut state = TrialState::new(&t, 0).unwrap();
        let mut rng = trial_stream(1);

        let rec = advance_one_day(0, &ctx, &mut state, &mut rng);
        assert!(!rec.regular_collection);
        assert!(rec.special_collection);
        assert_eq!(rec.peak_fill, 68.0);
        assert_eq!(rec.fill_level, 0.0);
        assert_eq!(state.bin.fill_level(), 0.0);
        assert!((rec.special_cost - 11.0).abs() < 1e-12);
        assert!((rec.total_cost - 11.0).abs() < 1e-12);
        assert_eq!(state.last_collection_day, Some(0));
    }

    #[test]
    fn overflow_charged_after_missed_collection() {
        let p = params(50.0);
        let scenario = Scenario::new(0.0, 1, 1.0).unwrap();
        let cal = calendar(&p, Weekday::Mon);
        let t = table();
        let ctx = StepContext::new(&p, &scenario, &Policy::FIXED_INTERVAL, &t, &cal).unwrap();
        let mut state = TrialState::new(&t, 0).unwrap();
        let mut rng = trial_stream(1);

        advance_one_day(0, &ctx, &mut state, &mut rng);
        let rec = advance_one_day(1, &ctx, &mut state, &mut rng);
        // 100 L in 80 L: 20 L over -> one block.
        assert_eq!(rec.overflow_cost, 9.0);
        assert_eq!(rec.overflow_rate_pct, 25.0);
        assert_eq!(rec.total_cost, 9.0);
    }

    #[test]
    fn escalation_after_two_overflowing_windows() {
        let p = params(20.0);
        let scenario = Scenario::new(0.0, 1, 1.0).unwrap();
        let cal = calendar(&p, Weekday::Mon);
        let t = table();
        let ctx = StepContext::new(&p, &scenario, &Policy::CAPACITY_ESCALATION, &t, &cal).unwrap();
        let mut state = TrialState::new(&t, 0).unwrap();
        let mut rng = trial_stream(1);

        let records: Vec<_> = (0..15)
            .map(|day| advance_one_day(day, &ctx, &mut state, &mut rng))
            .collect();
        assert_eq!(records[6].capacity, 80.0);
        assert_eq!(state.bin.capacity(), 120.0);
        assert!(records[13].capacity_upgraded);
        assert_eq!(records[13].capacity, 120.0);
        // 280 L measured against the 80 L the day started with.
        assert_eq!(records[13].measured_capacity, 80.0);
        assert_eq!(records[13].overflow_rate_pct, 250.0);
        assert_eq!(records[14].measured_capacity, 120.0);
        assert_eq!(records.iter().filter(|r| r.capacity_upgraded).count(), 1);
        assert_eq!(state.bin.overflow_streak(), 0);
    }

    #[test]
    fn cost_identity_holds() {
        let p = SimulationParameters {
            residents: 18,
            absent_probability: 0.05,
            waste_per_person_liters: 30.0 / 7.0,
            ..params(0.0)
        };
        let scenario = Scenario::new(0.3, 10, 0.05).unwrap();
        let cal = calendar(&p, Weekday::Thu);
        let t = CapacityTable::reference();
        let policy = Policy {
            escalation: true,
            special_collection: true,
        };
        let ctx = StepContext::new(&p, &scenario, &policy, &t, &cal).unwrap();
        let mut state = TrialState::new(&t, 0).unwrap();
        let mut rng = trial_stream(99);

        for day in 0..p.horizon_days {
            let r = advance_one_day(day, &ctx, &mut state, &mut rng);
            assert_eq!(r.total_cost, r.collection_cost + r.overflow_cost + r.special_cost);
            assert!(!(r.regular_collection && r.special_collection));
        }
    }
}
