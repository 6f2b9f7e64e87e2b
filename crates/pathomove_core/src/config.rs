//! Configuration management for simulation parameters.
//!
//! Strongly-typed configuration structures mapping to a `config.toml` file.
//! Every field has a default; a file only needs to name what it changes.
//!
//! ## Example `config.toml`
//!
//! ```toml
//! [landscape]
//! item_count = 1800
//! land_size = 60.0
//! cluster_count = 60
//! cluster_spread = 1.0
//!
//! [population]
//! size = 500
//!
//! [pathogen]
//! scenario = "pathogen"
//! p_transmit = 0.05
//! n_infected = 4
//!
//! [run]
//! tmax = 100
//! genmax = 1000
//! seed = 42
//! ```

use crate::error::{ConfigError, Result};
use crate::scenario::Scenario;
use serde::{Deserialize, Serialize};

/// Spatial layout of the resource landscape.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct LandscapeConfig {
    pub item_count: usize,
    pub land_size: f64,
    pub cluster_count: usize,
    pub cluster_spread: f64,
    /// Draw a new field each generation instead of resetting the counters
    /// of the existing one.
    pub regenerate_each_generation: bool,
}

impl Default for LandscapeConfig {
    fn default() -> Self {
        Self {
            item_count: 450,
            land_size: 60.0,
            cluster_count: 60,
            cluster_spread: 1.0,
            regenerate_each_generation: false,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct PopulationConfig {
    pub size: usize,
    /// Distance moved per timestep.
    pub step_size: f64,
    pub trait_min: f64,
    pub trait_max: f64,
}

impl Default for PopulationConfig {
    fn default() -> Self {
        Self {
            size: 500,
            step_size: 1.0,
            trait_min: -1.0,
            trait_max: 1.0,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct ForagingConfig {
    /// Radius within which an agent can eat an item.
    pub range: f64,
    /// Timesteps an agent skips foraging after eating.
    pub handling_time: u32,
    /// Timesteps before an eaten item is available again.
    pub regen_time: u32,
    pub food_value: f64,
}

impl Default for ForagingConfig {
    fn default() -> Self {
        Self {
            range: 1.0,
            handling_time: 5,
            regen_time: 50,
            food_value: 1.0,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct SocialConfig {
    /// Distance within which two agents count as associated.
    pub association_range: f64,
}

impl Default for SocialConfig {
    fn default() -> Self {
        Self {
            association_range: 1.0,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct EvolutionConfig {
    pub mutation_prob: f64,
    /// Standard deviation of the Gaussian mutation step.
    pub mutation_size: f64,
}

impl Default for EvolutionConfig {
    fn default() -> Self {
        Self {
            mutation_prob: 0.01,
            mutation_size: 0.01,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct PathogenConfig {
    pub scenario: Scenario,
    /// Per-contact transmission probability.
    pub p_transmit: f64,
    /// Agents infected at the start of each generation.
    pub n_infected: usize,
    /// Energy lost per timestep while infected.
    pub cost_infect: f64,
    /// First generation in which seed infections are introduced.
    pub introduction_gen: usize,
}

impl Default for PathogenConfig {
    fn default() -> Self {
        Self {
            scenario: Scenario::NoPathogen,
            p_transmit: 0.05,
            n_infected: 4,
            cost_infect: 0.25,
            introduction_gen: 0,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct RunConfig {
    pub tmax: usize,
    pub genmax: usize,
    pub seed: u64,
    /// Keep per-agent trait records every this many generations. The final
    /// generation is always kept.
    pub record_interval: usize,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            tmax: 100,
            genmax: 100,
            seed: 0,
            record_interval: 1,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct SimConfig {
    pub landscape: LandscapeConfig,
    pub population: PopulationConfig,
    pub foraging: ForagingConfig,
    pub social: SocialConfig,
    pub evolution: EvolutionConfig,
    pub pathogen: PathogenConfig,
    pub run: RunConfig,
}

fn ensure_positive(name: &'static str, value: f64) -> Result<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::NotPositive { name, value })
    }
}

fn ensure_non_negative(name: &'static str, value: f64) -> Result<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::range(name, format!("must be a finite non-negative number, got {value}")))
    }
}

fn ensure_probability(name: &'static str, value: f64) -> Result<()> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::Probability { name, value })
    }
}

impl LandscapeConfig {
    pub fn validate(&self) -> Result<()> {
        ensure_positive("land_size", self.land_size)?;
        ensure_non_negative("cluster_spread", self.cluster_spread)?;
        Ok(())
    }
}

impl SimConfig {
    /// Validates all configuration parameters.
    ///
    /// Returns the first failure found.
    ///
    /// # Validation Rules
    /// - Landscape size, population size, `tmax` and `genmax` must be positive
    /// - Ranges, step size, food value and infection cost must be non-negative
    /// - Probabilities must be in `[0.0, 1.0]`
    /// - The trait range must be ordered
    /// - Seed infections cannot exceed the population
    pub fn validate(&self) -> Result<()> {
        self.landscape.validate()?;

        if self.population.size == 0 {
            return Err(ConfigError::NotPositive {
                name: "population size",
                value: 0.0,
            });
        }
        ensure_non_negative("step_size", self.population.step_size)?;
        if !(self.population.trait_min.is_finite()
            && self.population.trait_max.is_finite()
            && self.population.trait_min <= self.population.trait_max)
        {
            return Err(ConfigError::range(
                "trait range",
                format!(
                    "[{}, {}] is not an ordered finite interval",
                    self.population.trait_min, self.population.trait_max
                ),
            ));
        }

        ensure_non_negative("food range", self.foraging.range)?;
        ensure_non_negative("food_value", self.foraging.food_value)?;
        ensure_non_negative("association_range", self.social.association_range)?;

        ensure_probability("mutation_prob", self.evolution.mutation_prob)?;
        ensure_non_negative("mutation_size", self.evolution.mutation_size)?;

        ensure_probability("p_transmit", self.pathogen.p_transmit)?;
        ensure_non_negative("cost_infect", self.pathogen.cost_infect)?;
        if self.pathogen.scenario.has_pathogen() && self.pathogen.n_infected > self.population.size
        {
            return Err(ConfigError::TooManyInfected {
                requested: self.pathogen.n_infected,
                population: self.population.size,
            });
        }

        if self.run.tmax == 0 {
            return Err(ConfigError::NotPositive {
                name: "tmax",
                value: 0.0,
            });
        }
        if self.run.genmax == 0 {
            return Err(ConfigError::NotPositive {
                name: "genmax",
                value: 0.0,
            });
        }
        if self.run.record_interval == 0 {
            return Err(ConfigError::NotPositive {
                name: "record_interval",
                value: 0.0,
            });
        }

        Ok(())
    }

    /// Parses and validates configuration from TOML text.
    pub fn from_toml(content: &str) -> Result<Self> {
        let config =
            toml::from_str::<Self>(content).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Hash of every parameter that affects simulation outcomes.
    #[must_use]
    pub fn fingerprint(&self) -> String {
        use sha2::{Digest, Sha256};
        let mut hasher = Sha256::new();
        hasher.update(format!("{:?}", self.landscape).as_bytes());
        hasher.update(format!("{:?}", self.population).as_bytes());
        hasher.update(format!("{:?}", self.foraging).as_bytes());
        hasher.update(format!("{:?}", self.social).as_bytes());
        hasher.update(format!("{:?}", self.evolution).as_bytes());
        hasher.update(format!("{:?}", self.pathogen).as_bytes());
        hasher.update(format!("{:?}", self.run).as_bytes());
        hex::encode(hasher.finalize())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_validates() {
        let config = SimConfig::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_invalid_land_size() {
        let config = SimConfig {
            landscape: LandscapeConfig {
                land_size: 0.0,
                ..Default::default()
            },
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::NotPositive { .. })
        ));
    }

    #[test]
    fn test_empty_population_rejected() {
        let config = SimConfig {
            population: PopulationConfig {
                size: 0,
                ..Default::default()
            },
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_transmission_probability() {
        let config = SimConfig {
            pathogen: PathogenConfig {
                p_transmit: 1.5,
                ..Default::default()
            },
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Probability { .. })
        ));
    }

    #[test]
    fn test_negative_mutation_size() {
        let config = SimConfig {
            evolution: EvolutionConfig {
                mutation_size: -0.1,
                ..Default::default()
            },
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_too_many_infected_only_with_pathogen() {
        let mut config = SimConfig::default();
        config.population.size = 3;
        config.pathogen.n_infected = 5;
        assert!(config.validate().is_ok());

        config.pathogen.scenario = Scenario::Pathogen;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::TooManyInfected { .. })
        ));
    }

    #[test]
    fn test_inverted_trait_range() {
        let mut config = SimConfig::default();
        config.population.trait_min = 1.0;
        config.population.trait_max = -1.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_empty_landscape_is_valid() {
        let mut config = SimConfig::default();
        config.landscape.item_count = 0;
        config.landscape.cluster_count = 0;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_from_toml_partial() {
        let config = SimConfig::from_toml(
            r#"
            [landscape]
            item_count = 10

            [pathogen]
            scenario = "pathogen"
            n_infected = 2

            [run]
            seed = 7
            "#,
        )
        .expect("valid toml");
        assert_eq!(config.landscape.item_count, 10);
        assert_eq!(config.pathogen.scenario, Scenario::Pathogen);
        assert_eq!(config.run.seed, 7);
        assert_eq!(config.run.tmax, RunConfig::default().tmax);
    }

    #[test]
    fn test_from_toml_rejects_negative_count() {
        let result = SimConfig::from_toml("[landscape]\nitem_count = -3\n");
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_fingerprint_consistency() {
        let config1 = SimConfig::default();
        let config2 = SimConfig::default();
        assert_eq!(config1.fingerprint(), config2.fingerprint());

        let mut config3 = SimConfig::default();
        config3.run.seed = 1;
        assert_ne!(config1.fingerprint(), config3.fingerprint());
    }
}
