//! Stochastic plague model attached to an afflicted team.
//!
//! The sub-model is consulted by actions (remedies, feeding, army boost,
//! attribute acquisition) and advanced once per turn by the `next_turn`
//! action. Randomness comes only from the seed passed in.

use std::collections::BTreeSet;

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;

use crate::config::{PlagueConfig, RemedySpec};
use crate::rng::{RngOracle, compute_seed};

/// Epidemic state of one team. Present only while the team is afflicted.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PlagueStats {
    pub sick: u32,
    pub immune: u32,
    pub recovery: Decimal,
    pub mortality: Decimal,
    pub infectiousness: Decimal,
    #[cfg_attr(feature = "serde", serde(default))]
    pub remedies: BTreeSet<String>,
}

impl PlagueStats {
    pub fn onset(config: &PlagueConfig, population: u32) -> Self {
        Self {
            sick: config.initial_sick.min(population),
            immune: 0,
            recovery: config.recovery,
            mortality: config.mortality,
            infectiousness: config.infectiousness,
            remedies: BTreeSet::new(),
        }
    }

    /// Shifts the rates by the remedy's deltas, keeping them in `[0, 1]`.
    pub fn apply_remedy(&mut self, name: &str, remedy: &RemedySpec) {
        self.recovery = clamp_rate(self.recovery + remedy.recovery);
        self.mortality = clamp_rate(self.mortality + remedy.mortality);
        self.infectiousness = clamp_rate(self.infectiousness + remedy.infectiousness);
        self.remedies.insert(name.to_owned());
    }

    pub fn is_over(&self) -> bool {
        self.sick == 0
    }
}

fn clamp_rate(rate: Decimal) -> Decimal {
    rate.clamp(Decimal::ZERO, Decimal::ONE)
}

/// Expected deaths of the next step: `floor(sick * mortality)`, never more
/// than the population. Used to report before committing a step.
pub fn death_toll(stats: &PlagueStats, population: u32) -> u32 {
    let sick = Decimal::from(stats.sick.min(population));
    (sick * stats.mortality).floor().to_u32().unwrap_or(0)
}

/// Advances the epidemic by one step.
///
/// Every sick resident recovers with `recovery` (becoming immune), otherwise
/// dies with `mortality`. Every healthy resident falls ill with probability
/// `infectiousness * sick / population`. Returns the next stats and the
/// number of deaths; the caller removes the dead from the population.
pub fn simulate(
    stats: &PlagueStats,
    population: u32,
    rng: &dyn RngOracle,
    seed: u64,
) -> (PlagueStats, u32) {
    let sick = stats.sick.min(population);
    let immune = stats.immune.min(population - sick);
    let healthy = population - sick - immune;

    let mut draw = 0u64;
    let mut next_draw = || {
        draw += 1;
        compute_seed(seed, draw, 0, 0)
    };

    let mut recovered = 0u32;
    let mut died = 0u32;
    for _ in 0..sick {
        if rng.chance(next_draw(), stats.recovery) {
            recovered += 1;
        } else if rng.chance(next_draw(), stats.mortality) {
            died += 1;
        }
    }

    let infection = if population == 0 {
        Decimal::ZERO
    } else {
        clamp_rate(stats.infectiousness * Decimal::from(sick) / Decimal::from(population))
    };
    let mut infected = 0u32;
    for _ in 0..healthy {
        if rng.chance(next_draw(), infection) {
            infected += 1;
        }
    }

    let next = PlagueStats {
        sick: sick - recovered - died + infected,
        immune: immune + recovered,
        ..stats.clone()
    };
    (next, died)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::PcgRng;

    fn stats(sick: u32) -> PlagueStats {
        PlagueStats {
            sick,
            immune: 0,
            recovery: Decimal::new(2, 1),
            mortality: Decimal::new(5, 2),
            infectiousness: Decimal::new(3, 1),
            remedies: BTreeSet::new(),
        }
    }

    #[test]
    fn simulation_is_deterministic_per_seed() {
        let rng = PcgRng;
        let first = simulate(&stats(10), 100, &rng, 77);
        let second = simulate(&stats(10), 100, &rng, 77);
        assert_eq!(first, second);
    }

    #[test]
    fn residents_are_conserved() {
        let rng = PcgRng;
        for seed in 0..32 {
            let (next, deaths) = simulate(&stats(20), 60, &rng, seed);
            assert!(next.sick + next.immune + deaths <= 60);
            assert!(next.immune <= 20);
        }
    }

    #[test]
    fn certain_recovery_clears_the_sick() {
        let mut certain = stats(8);
        certain.recovery = Decimal::ONE;
        certain.infectiousness = Decimal::ZERO;
        let (next, deaths) = simulate(&certain, 50, &PcgRng, 1);
        assert_eq!(deaths, 0);
        assert!(next.is_over());
        assert_eq!(next.immune, 8);
    }

    #[test]
    fn death_toll_is_floor_of_expected_deaths() {
        let mut grim = stats(30);
        grim.mortality = Decimal::new(25, 2);
        assert_eq!(death_toll(&grim, 100), 7);
        // capped by population
        assert_eq!(death_toll(&grim, 4), 1);
    }

    #[test]
    fn remedies_clamp_rates() {
        let mut afflicted = stats(3);
        let remedy = RemedySpec {
            mortality: Decimal::new(-5, 1),
            recovery: Decimal::new(9, 1),
            ..RemedySpec::default()
        };
        afflicted.apply_remedy("herbs", &remedy);
        assert_eq!(afflicted.mortality, Decimal::ZERO);
        assert_eq!(afflicted.recovery, Decimal::ONE);
        assert!(afflicted.remedies.contains("herbs"));
    }
}
