//! # Pathomove Core
//!
//! Simulation engine for the evolution of social movement under pathogen
//! risk. Agents forage on a clustered resource landscape, build a proximity
//! network from their encounters and reproduce according to the energy they
//! gathered.
//!
//! This crate contains:
//! - The resource field and its regeneration rules
//! - The proximity network accumulated over a generation
//! - Agent movement, foraging and fitness-proportional reproduction
//! - Pathogen seeding and spread along the network
//! - The generation orchestrator, metrics and structured logging
//!
//! All randomness is drawn from one seeded [`SimRng`] stream, so a
//! configuration and seed reproduce a run exactly.
//!
//! ## Example
//!
//! ```
//! use pathomove_core::{SimConfig, Simulation};
//!
//! let mut config = SimConfig::default();
//! config.population.size = 20;
//! config.run.tmax = 5;
//! config.run.genmax = 2;
//!
//! let mut sim = Simulation::new(config).unwrap();
//! let output = sim.run().unwrap();
//! assert_eq!(output.summaries.len(), 2);
//! ```

/// Configuration sections and validation
pub mod config;
/// Pathogen seeding, transmission and infection cost
pub mod epidemic;
pub mod error;
/// Clustered resource landscape
pub mod landscape;
/// Run counters and tracing setup
pub mod metrics;
/// Pairwise association counts
pub mod network;
/// Agent cohort: movement, foraging, reproduction
pub mod population;
pub mod scenario;
pub mod simulation;
/// Uniform grid index for radius queries
pub mod spatial_hash;

/// Random stream shared by every stochastic step of a run.
pub type SimRng = rand_chacha::ChaCha8Rng;

pub use config::SimConfig;
pub use error::ConfigError;
pub use landscape::ResourceField;
pub use network::ProximityNetwork;
pub use population::Population;
pub use scenario::{PostForageHook, Scenario};
pub use simulation::{GenerationObserver, GenerationView, NoopObserver, RunOutput, Simulation};
