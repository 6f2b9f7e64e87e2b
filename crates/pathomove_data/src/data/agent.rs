use serde::{Deserialize, Serialize};

/// Infection status of an agent for the current generation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InfectionState {
    pub infected: bool,
    /// Timestep at which the agent became infected. `Some(0)` is also used
    /// for agents seeded at generation start.
    pub infected_at: Option<usize>,
}

impl InfectionState {
    pub fn infect(&mut self, timestep: usize) {
        if !self.infected {
            self.infected = true;
            self.infected_at = Some(timestep);
        }
    }
}

/// A single forager.
///
/// `id` is the agent's index in its cohort and is only stable within one
/// generation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Agent {
    pub id: usize,
    pub x: f64,
    pub y: f64,
    /// Accumulated intake this generation. Never negative.
    pub energy: f64,
    /// Heritable social movement bias.
    pub trait_value: f64,
    /// Remaining timesteps during which the agent cannot forage.
    pub handling: u32,
    pub items_eaten: u32,
    pub infection: InfectionState,
    /// Index of the parent in the previous cohort.
    pub parent: Option<usize>,
}

impl Agent {
    pub fn new(id: usize, trait_value: f64) -> Self {
        Self {
            id,
            x: 0.0,
            y: 0.0,
            energy: 0.0,
            trait_value,
            handling: 0,
            items_eaten: 0,
            infection: InfectionState::default(),
            parent: None,
        }
    }

    #[inline]
    pub fn is_infected(&self) -> bool {
        self.infection.infected
    }

    #[inline]
    pub fn can_forage(&self) -> bool {
        self.handling == 0
    }

    /// Adds `delta` to the energy store, flooring the result at zero.
    #[inline]
    pub fn add_energy(&mut self, delta: f64) {
        self.energy = (self.energy + delta).max(0.0);
    }

    /// Clears all per-generation state, keeping identity, trait and parentage.
    pub fn reset_generation_state(&mut self) {
        self.energy = 0.0;
        self.handling = 0;
        self.items_eaten = 0;
        self.infection = InfectionState::default();
    }
}
