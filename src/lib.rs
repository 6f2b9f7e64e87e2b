//! Host-facing entry points for pathomove.
//!
//! Hosts pass parameters with signed integer and single-precision types.
//! They are checked and widened here before reaching the engine, so a
//! negative count becomes a [`ConfigError`] instead of a huge `usize`.

use pathomove_core::config::LandscapeConfig;
use pathomove_core::error::non_negative;
use pathomove_core::{ConfigError, ResourceField, Scenario, SimConfig, SimRng, Simulation};
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

pub use pathomove_core::{GenerationObserver, RunOutput};
pub use pathomove_data::{GenerationSummary, ItemRecord, TraitRecord};

/// Full parameter set of a run as supplied by a host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathomoveParams {
    /// `0` for no pathogen, `1` for pathogen spread.
    pub scenario: i32,
    pub popsize: i32,
    pub n_items: i32,
    pub landsize: f32,
    pub n_clusters: i32,
    pub cluster_spread: f32,
    pub tmax: i32,
    pub genmax: i32,
    pub range_food: f32,
    pub range_agents: f32,
    pub handling_time: i32,
    pub regen_time: i32,
    pub p_transmit: f32,
    pub n_infected: i32,
    pub cost_infect: f32,
    #[serde(default)]
    pub seed: u64,
}

impl Default for PathomoveParams {
    fn default() -> Self {
        Self {
            scenario: 0,
            popsize: 500,
            n_items: 450,
            landsize: 60.0,
            n_clusters: 60,
            cluster_spread: 1.0,
            tmax: 100,
            genmax: 100,
            range_food: 1.0,
            range_agents: 1.0,
            handling_time: 5,
            regen_time: 50,
            p_transmit: 0.05,
            n_infected: 4,
            cost_infect: 0.25,
            seed: 0,
        }
    }
}

/// Widens a host `f32` through its shortest decimal form, so `0.1f32`
/// becomes `0.1` rather than `0.10000000149011612`.
pub fn widen(value: f32) -> f64 {
    value
        .to_string()
        .parse()
        .unwrap_or_else(|_| f64::from(value))
}

fn duration(name: &'static str, value: i32) -> Result<u32, ConfigError> {
    u32::try_from(value).map_err(|_| ConfigError::Negative {
        name,
        value: i64::from(value),
    })
}

impl TryFrom<&PathomoveParams> for SimConfig {
    type Error = ConfigError;

    /// Maps host parameters onto a validated configuration. Parameters the
    /// host does not supply keep their defaults.
    fn try_from(p: &PathomoveParams) -> Result<Self, ConfigError> {
        let mut config = SimConfig::default();

        config.landscape = landscape_config(p.n_items, p.landsize, p.n_clusters, p.cluster_spread)?;

        config.population.size = non_negative("popsize", i64::from(p.popsize))?;

        config.foraging.range = widen(p.range_food);
        config.foraging.handling_time = duration("handling_time", p.handling_time)?;
        config.foraging.regen_time = duration("regen_time", p.regen_time)?;

        config.social.association_range = widen(p.range_agents);

        config.pathogen.scenario = Scenario::try_from(p.scenario)?;
        config.pathogen.p_transmit = widen(p.p_transmit);
        config.pathogen.n_infected = non_negative("n_infected", i64::from(p.n_infected))?;
        config.pathogen.cost_infect = widen(p.cost_infect);

        config.run.tmax = non_negative("tmax", i64::from(p.tmax))?;
        config.run.genmax = non_negative("genmax", i64::from(p.genmax))?;
        config.run.seed = p.seed;

        config.validate()?;
        Ok(config)
    }
}

fn landscape_config(
    n_items: i32,
    land_size: f32,
    n_clusters: i32,
    cluster_spread: f32,
) -> Result<LandscapeConfig, ConfigError> {
    Ok(LandscapeConfig {
        item_count: non_negative("n_items", i64::from(n_items))?,
        land_size: widen(land_size),
        cluster_count: non_negative("n_clusters", i64::from(n_clusters))?,
        cluster_spread: widen(cluster_spread),
        ..Default::default()
    })
}

/// Generates a landscape alone and returns its item coordinates.
pub fn get_test_landscape(
    n_items: i32,
    land_size: f32,
    n_clusters: i32,
    cluster_spread: f32,
    seed: u64,
) -> Result<Vec<ItemRecord>, ConfigError> {
    let config = landscape_config(n_items, land_size, n_clusters, cluster_spread)?;
    let mut rng = SimRng::seed_from_u64(seed);
    Ok(ResourceField::generate(&config, &mut rng)?.records())
}

/// Runs a full simulation and returns per-generation summaries and the
/// recorded per-agent traits.
pub fn run_pathomove(params: &PathomoveParams) -> anyhow::Result<RunOutput> {
    run_pathomove_with(params, &mut pathomove_core::NoopObserver)
}

/// Like [`run_pathomove`], with `observer` called at every generation end.
pub fn run_pathomove_with(
    params: &PathomoveParams,
    observer: &mut dyn GenerationObserver,
) -> anyhow::Result<RunOutput> {
    let config = SimConfig::try_from(params)?;
    Simulation::new(config)?.run_with(observer)
}
