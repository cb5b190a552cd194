//! Daily waste demand of residents and guests.

use rand::Rng;

use crate::config::SimulationParameters;
use crate::domain::Scenario;

/// One day's demand draw.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Demand {
    pub residents: u32,
    pub guests: u32,
    pub liters: f64,
}

/// Draw today's residents and guests and the waste they produce.
///
/// Draw order is fixed (absence, absent count, visit, guest count) so a seed
/// always yields the same demand sequence.
pub fn draw_demand<R: Rng + ?Sized>(
    params: &SimulationParameters,
    scenario: &Scenario,
    rng: &mut R,
) -> Demand {
    let mut residents = params.residents;
    if rng.gen_bool(params.absent_probability) {
        residents = rng.gen_range(0..=params.residents);
    }

    let guests = if rng.gen_bool(scenario.visit_probability) {
        rng.gen_range(1..=scenario.max_guests)
    } else {
        0
    };

    let rate = params.waste_per_person_liters;
    let liters = f64::from(residents) * rate + f64::from(guests) * rate * params.guest_waste_factor;

    Demand {
        residents,
        guests,
        liters,
    }
}
