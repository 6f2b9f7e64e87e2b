pub mod macros;

use pathomove_core::{Population, SimConfig, Simulation};

#[allow(dead_code)]
pub struct SimBuilder {
    config: SimConfig,
    traits: Option<Vec<f64>>,
}

#[allow(dead_code)]
impl SimBuilder {
    /// Small, fast configuration: 20 agents, 60 items, 30 timesteps, 2
    /// generations.
    pub fn new() -> Self {
        let mut config = SimConfig::default();
        config.landscape.item_count = 60;
        config.landscape.land_size = 12.0;
        config.landscape.cluster_count = 6;
        config.population.size = 20;
        config.run.tmax = 30;
        config.run.genmax = 2;
        Self {
            config,
            traits: None,
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.config.run.seed = seed;
        self
    }

    pub fn with_config<F>(mut self, modifier: F) -> Self
    where
        F: FnOnce(&mut SimConfig),
    {
        modifier(&mut self.config);
        self
    }

    /// Fixes the generation-zero traits; also sets the population size.
    pub fn with_traits(mut self, traits: Vec<f64>) -> Self {
        self.config.population.size = traits.len();
        self.traits = Some(traits);
        self
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn build(self) -> Simulation {
        match self.traits {
            Some(traits) => {
                Simulation::with_population(self.config, Population::from_traits(traits))
                    .expect("valid test config")
            }
            None => Simulation::new(self.config).expect("valid test config"),
        }
    }
}
