use super::agent::Agent;
use serde::{Deserialize, Serialize};

/// One row of the trait trajectory table (`id,gen,x,y,energy,trait`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraitRecord {
    pub id: usize,
    pub gen: usize,
    pub x: f64,
    pub y: f64,
    pub energy: f64,
    #[serde(rename = "trait")]
    pub trait_value: f64,
    pub infected: bool,
}

impl TraitRecord {
    pub fn from_agent(gen: usize, agent: &Agent) -> Self {
        Self {
            id: agent.id,
            gen,
            x: agent.x,
            y: agent.y,
            energy: agent.energy,
            trait_value: agent.trait_value,
            infected: agent.is_infected(),
        }
    }
}

/// A non-zero association in the proximity network.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EdgeRecord {
    pub gen: usize,
    pub id1: usize,
    pub id2: usize,
    pub weight: u32,
}

/// Population-level statistics for one completed generation.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct GenerationSummary {
    pub gen: usize,
    pub mean_energy: f64,
    pub mean_trait: f64,
    pub sd_trait: f64,
    pub n_infected: usize,
    pub items_consumed: u64,
    pub total_contact_weight: u64,
    pub n_components: usize,
}
