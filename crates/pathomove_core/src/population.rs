//! The agent cohort of one generation: movement, foraging and reproduction.

use crate::config::{EvolutionConfig, ForagingConfig, PopulationConfig};
use crate::error::{ConfigError, Result};
use crate::landscape::{reflect, ResourceField};
use crate::network::ProximityNetwork;
use crate::spatial_hash::SpatialHash;
use pathomove_data::{Agent, TraitRecord};
use rand::distributions::WeightedIndex;
use rand::Rng;
use rand_distr::{Distribution, Normal};
use rayon::prelude::*;
use std::f64::consts::TAU;

const DIRECTION_EPSILON: f64 = 1e-12;

#[derive(Clone, Debug, Default)]
pub struct Population {
    agents: Vec<Agent>,
    index: SpatialHash,
}

impl Population {
    /// Generation-zero cohort with traits uniform over the trait range.
    pub fn random<R: Rng + ?Sized>(config: &PopulationConfig, rng: &mut R) -> Self {
        let traits = (0..config.size)
            .map(|_| {
                if config.trait_max > config.trait_min {
                    rng.gen_range(config.trait_min..=config.trait_max)
                } else {
                    config.trait_min
                }
            })
            .collect();
        Self::from_traits(traits)
    }

    /// Cohort with the given traits and no recorded parentage.
    pub fn from_traits(traits: Vec<f64>) -> Self {
        let agents = traits
            .into_iter()
            .enumerate()
            .map(|(id, t)| Agent::new(id, t))
            .collect();
        Self::from_agents(agents)
    }

    /// Wraps existing agents. Ids are reassigned to match their index.
    pub fn from_agents(mut agents: Vec<Agent>) -> Self {
        for (id, agent) in agents.iter_mut().enumerate() {
            agent.id = id;
        }
        Self {
            agents,
            index: SpatialHash::default(),
        }
    }

    pub fn len(&self) -> usize {
        self.agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }

    pub fn agents(&self) -> &[Agent] {
        &self.agents
    }

    pub fn agents_mut(&mut self) -> &mut [Agent] {
        &mut self.agents
    }

    pub fn positions(&self) -> Vec<(f64, f64)> {
        self.agents.iter().map(|a| (a.x, a.y)).collect()
    }

    pub fn traits(&self) -> Vec<f64> {
        self.agents.iter().map(|a| a.trait_value).collect()
    }

    pub fn total_energy(&self) -> f64 {
        self.agents.iter().map(|a| a.energy).sum()
    }

    pub fn infected_count(&self) -> usize {
        self.agents.iter().filter(|a| a.is_infected()).count()
    }

    pub fn trait_records(&self, gen: usize) -> Vec<TraitRecord> {
        self.agents
            .iter()
            .map(|a| TraitRecord::from_agent(gen, a))
            .collect()
    }

    fn reindex(&mut self, extent: f64, radius: f64) -> Vec<(f64, f64)> {
        let positions = self.positions();
        self.index.reshape(extent, radius);
        self.index.build(&positions);
        positions
    }

    /// Scatters agents uniformly over the landscape and clears all
    /// per-generation state.
    pub fn init_positions<R: Rng + ?Sized>(&mut self, field: &ResourceField, rng: &mut R) {
        let size = field.land_size();
        for agent in &mut self.agents {
            agent.x = rng.gen::<f64>() * size;
            agent.y = rng.gen::<f64>() * size;
            agent.reset_generation_state();
        }
    }

    /// Moves every agent one step.
    ///
    /// Each agent draws a uniform heading. If other agents are within
    /// `sensing_range`, the heading is biased towards their centroid by the
    /// agent's trait (away from it when the trait is negative). Agents
    /// reflect off the landscape edges. All agents move from the same
    /// snapshot of positions.
    pub fn move_agents<R: Rng + ?Sized>(
        &mut self,
        field: &ResourceField,
        step_size: f64,
        sensing_range: f64,
        rng: &mut R,
    ) {
        let size = field.land_size();
        let headings: Vec<f64> = (0..self.agents.len())
            .map(|_| rng.gen_range(0.0..TAU))
            .collect();
        let positions = self.reindex(size, sensing_range);
        let index = &self.index;

        let moved: Vec<(f64, f64)> = self
            .agents
            .par_iter()
            .zip(headings.par_iter())
            .enumerate()
            .map(|(i, (agent, &theta))| {
                let (mut dx, mut dy) = (theta.cos(), theta.sin());
                if agent.trait_value != 0.0 {
                    if let Some((ux, uy)) = neighbour_direction(i, &positions, index, sensing_range)
                    {
                        dx += agent.trait_value * ux;
                        dy += agent.trait_value * uy;
                    }
                }
                let norm = dx.hypot(dy);
                if norm > DIRECTION_EPSILON {
                    dx /= norm;
                    dy /= norm;
                } else {
                    dx = theta.cos();
                    dy = theta.sin();
                }
                (
                    reflect(agent.x + step_size * dx, size),
                    reflect(agent.y + step_size * dy, size),
                )
            })
            .collect();

        for (agent, (x, y)) in self.agents.iter_mut().zip(moved) {
            agent.x = x;
            agent.y = y;
        }
    }

    /// Adds this timestep's proximity contacts to `network`.
    pub fn update_network(&mut self, network: &mut ProximityNetwork, extent: f64, range: f64) {
        let positions = self.reindex(extent, range);
        network.accumulate(&positions, &self.index, range);
    }

    /// One foraging round for the whole cohort; returns items eaten.
    ///
    /// Candidate items are looked up for all agents in parallel; claims are
    /// then settled in agent order, so an item taken by a lower-indexed agent
    /// is skipped by later ones.
    pub fn forage(&mut self, field: &mut ResourceField, foraging: &ForagingConfig) -> u64 {
        if field.is_empty() {
            for agent in &mut self.agents {
                agent.handling = agent.handling.saturating_sub(1);
            }
            return 0;
        }

        let candidates: Vec<Vec<usize>> = {
            let field: &ResourceField = field;
            self.agents
                .par_iter()
                .map(|agent| {
                    if agent.can_forage() {
                        field.available_within(agent.x, agent.y, foraging.range)
                    } else {
                        Vec::new()
                    }
                })
                .collect()
        };

        let mut eaten = 0;
        for (agent, items) in self.agents.iter_mut().zip(candidates) {
            if feed(agent, &items, field, foraging) {
                eaten += 1;
            }
        }
        eaten
    }

    /// Foraging attempt for a single agent; returns whether it ate.
    pub fn forage_agent(
        &mut self,
        idx: usize,
        field: &mut ResourceField,
        foraging: &ForagingConfig,
    ) -> bool {
        let Some(agent) = self.agents.get_mut(idx) else {
            return false;
        };
        let items = if agent.can_forage() {
            field.available_within(agent.x, agent.y, foraging.range)
        } else {
            Vec::new()
        };
        feed(agent, &items, field, foraging)
    }

    /// Draws `n` parent indices with probability proportional to energy.
    ///
    /// If no agent has positive energy, parents are drawn uniformly.
    pub fn select_parents<R: Rng + ?Sized>(&self, n: usize, rng: &mut R) -> Vec<usize> {
        if self.agents.is_empty() {
            return Vec::new();
        }
        match WeightedIndex::new(self.agents.iter().map(|a| a.energy)) {
            Ok(wheel) => (0..n).map(|_| wheel.sample(rng)).collect(),
            Err(err) => {
                tracing::debug!(%err, "No usable fitness, selecting parents uniformly");
                (0..n).map(|_| rng.gen_range(0..self.agents.len())).collect()
            }
        }
    }

    /// Next generation of the same size.
    ///
    /// Offspring inherit their parent's trait; with probability
    /// `mutation_prob` it is shifted by Gaussian noise and clamped to the
    /// trait range.
    pub fn reproduce<R: Rng + ?Sized>(
        &self,
        config: &PopulationConfig,
        evolution: &EvolutionConfig,
        rng: &mut R,
    ) -> Result<Population> {
        let jitter = Normal::new(0.0, evolution.mutation_size)
            .map_err(|e| ConfigError::range("mutation_size", e.to_string()))?;
        let parents = self.select_parents(self.agents.len(), rng);

        let offspring = parents
            .into_iter()
            .enumerate()
            .map(|(id, parent)| {
                let mut value = self.agents[parent].trait_value;
                if rng.gen_bool(evolution.mutation_prob) {
                    value = (value + jitter.sample(rng)).clamp(config.trait_min, config.trait_max);
                }
                let mut child = Agent::new(id, value);
                child.parent = Some(parent);
                child
            })
            .collect();

        Ok(Population::from_agents(offspring))
    }
}

/// Unit vector from agent `i` towards the centroid of other agents within
/// `range`, or `None` if there are none or they sit on top of it.
fn neighbour_direction(
    i: usize,
    positions: &[(f64, f64)],
    index: &SpatialHash,
    range: f64,
) -> Option<(f64, f64)> {
    let (x, y) = positions[i];
    let r2 = range * range;
    let (mut sx, mut sy, mut count) = (0.0, 0.0, 0usize);
    index.query_callback(x, y, range, |j| {
        if j != i {
            let (xj, yj) = positions[j];
            let dx = xj - x;
            let dy = yj - y;
            if dx * dx + dy * dy <= r2 {
                sx += xj;
                sy += yj;
                count += 1;
            }
        }
    });
    if count == 0 {
        return None;
    }
    let dx = sx / count as f64 - x;
    let dy = sy / count as f64 - y;
    let norm = dx.hypot(dy);
    (norm > DIRECTION_EPSILON).then(|| (dx / norm, dy / norm))
}

/// Handling countdown and item claim for one agent.
fn feed(
    agent: &mut Agent,
    candidates: &[usize],
    field: &mut ResourceField,
    foraging: &ForagingConfig,
) -> bool {
    if !agent.can_forage() {
        agent.handling -= 1;
        return false;
    }
    match candidates.iter().copied().find(|&k| field.is_available(k)) {
        Some(item) => {
            field.consume(item, foraging.regen_time);
            agent.add_energy(foraging.food_value);
            agent.items_eaten += 1;
            agent.handling = foraging.handling_time;
            true
        }
        None => false,
    }
}
