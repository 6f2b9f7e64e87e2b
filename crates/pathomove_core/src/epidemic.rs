//! Pathogen seeding and spread along the proximity network.

use crate::config::PathogenConfig;
use crate::error::{ConfigError, Result};
use crate::network::ProximityNetwork;
use crate::population::Population;
use crate::scenario::PostForageHook;
use crate::SimRng;
use rand::Rng;

/// Probability that `weight` independent contacts, each transmitting with
/// probability `p`, pass the infection on at least once.
#[inline]
pub fn transmission_probability(p: f64, weight: u32) -> f64 {
    if weight == 0 {
        return 0.0;
    }
    (1.0 - (1.0 - p).powf(f64::from(weight))).clamp(0.0, 1.0)
}

/// Infects `n_infected` distinct agents chosen uniformly at random.
///
/// Returns the seeded indices in ascending order.
pub fn seed_infections<R: Rng + ?Sized>(
    population: &mut Population,
    n_infected: usize,
    rng: &mut R,
) -> Result<Vec<usize>> {
    if n_infected > population.len() {
        return Err(ConfigError::TooManyInfected {
            requested: n_infected,
            population: population.len(),
        });
    }
    let mut chosen = rand::seq::index::sample(rng, population.len(), n_infected).into_vec();
    chosen.sort_unstable();
    for &idx in &chosen {
        population.agents_mut()[idx].infection.infect(0);
    }
    Ok(chosen)
}

/// One synchronous transmission check.
///
/// Infection status is read as it stood before the check, so agents infected
/// here do not pass it on until the next call. Only edges with exactly one
/// infected endpoint draw from `rng`. Returns the number of new infections.
pub fn spread<R, I>(
    population: &mut Population,
    edges: I,
    p_transmit: f64,
    timestep: usize,
    rng: &mut R,
) -> usize
where
    R: Rng + ?Sized,
    I: IntoIterator<Item = (usize, usize, u32)>,
{
    let was_infected: Vec<bool> = population.agents().iter().map(|a| a.is_infected()).collect();
    let agents = population.agents_mut();
    let mut new_infections = 0;

    for (i, j, weight) in edges {
        let target = match (was_infected[i], was_infected[j]) {
            (true, false) => j,
            (false, true) => i,
            _ => continue,
        };
        if agents[target].is_infected() {
            continue;
        }
        if rng.gen_bool(transmission_probability(p_transmit, weight)) {
            agents[target].infection.infect(timestep);
            new_infections += 1;
        }
    }
    new_infections
}

/// Charges every infected agent `cost` energy, flooring at zero.
pub fn apply_infection_cost(population: &mut Population, cost: f64) {
    for agent in population.agents_mut().iter_mut().filter(|a| a.is_infected()) {
        agent.add_energy(-cost);
    }
}

/// Post-foraging hook for the pathogen scenario.
#[derive(Debug, Clone)]
pub struct Epidemic {
    config: PathogenConfig,
    active: bool,
}

impl Epidemic {
    pub fn new(config: PathogenConfig) -> Self {
        Self {
            config,
            active: false,
        }
    }

    /// Whether the pathogen is present in the current generation.
    pub fn is_active(&self) -> bool {
        self.active
    }
}

impl PostForageHook for Epidemic {
    fn on_generation_start(
        &mut self,
        gen: usize,
        population: &mut Population,
        rng: &mut SimRng,
    ) -> Result<()> {
        self.active = gen >= self.config.introduction_gen;
        if self.active {
            let seeded = seed_infections(population, self.config.n_infected, rng)?;
            tracing::debug!(gen, seeded = seeded.len(), "Seeded infections");
        }
        Ok(())
    }

    fn after_forage(
        &mut self,
        timestep: usize,
        population: &mut Population,
        network: &ProximityNetwork,
        rng: &mut SimRng,
    ) -> usize {
        if !self.active {
            return 0;
        }
        let contacts = network.step_contacts().iter().map(|&(i, j)| (i, j, 1));
        let new_infections = spread(population, contacts, self.config.p_transmit, timestep, rng);
        apply_infection_cost(population, self.config.cost_infect);
        new_infections
    }
}
