//! Scenario selection and the per-timestep post-foraging hook.

use crate::config::PathogenConfig;
use crate::epidemic::Epidemic;
use crate::error::{ConfigError, Result};
use crate::network::ProximityNetwork;
use crate::population::Population;
use crate::SimRng;
use serde::{Deserialize, Serialize};

/// Behavioural mode of a run.
///
/// Host callers pass the scenario as an integer code: `0` for the
/// pathogen-free baseline, `1` for pathogen spread on the network.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Scenario {
    #[default]
    NoPathogen,
    Pathogen,
}

impl Scenario {
    pub fn code(self) -> i32 {
        match self {
            Scenario::NoPathogen => 0,
            Scenario::Pathogen => 1,
        }
    }

    pub fn has_pathogen(self) -> bool {
        matches!(self, Scenario::Pathogen)
    }

    /// Strategy object run after foraging each timestep.
    pub fn hook(self, config: &PathogenConfig) -> Box<dyn PostForageHook> {
        match self {
            Scenario::NoPathogen => Box::new(NoOpHook),
            Scenario::Pathogen => Box::new(Epidemic::new(config.clone())),
        }
    }
}

impl TryFrom<i32> for Scenario {
    type Error = ConfigError;

    fn try_from(code: i32) -> Result<Self> {
        match code {
            0 => Ok(Scenario::NoPathogen),
            1 => Ok(Scenario::Pathogen),
            other => Err(ConfigError::UnknownScenario(other)),
        }
    }
}

/// Scenario-specific behaviour plugged into the generation loop.
pub trait PostForageHook: Send {
    /// Called once per generation after agents are placed.
    fn on_generation_start(
        &mut self,
        gen: usize,
        population: &mut Population,
        rng: &mut SimRng,
    ) -> Result<()>;

    /// Called every timestep after foraging and before resources regenerate.
    /// Returns the number of new infections or other hook events.
    fn after_forage(
        &mut self,
        timestep: usize,
        population: &mut Population,
        network: &ProximityNetwork,
        rng: &mut SimRng,
    ) -> usize;
}

/// Baseline scenario: nothing happens after foraging.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpHook;

impl PostForageHook for NoOpHook {
    fn on_generation_start(&mut self, _: usize, _: &mut Population, _: &mut SimRng) -> Result<()> {
        Ok(())
    }

    fn after_forage(
        &mut self,
        _: usize,
        _: &mut Population,
        _: &ProximityNetwork,
        _: &mut SimRng,
    ) -> usize {
        0
    }
}
