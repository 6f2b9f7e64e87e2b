//! Generation and timestep orchestration.
//!
//! Per generation: place agents, then `tmax` rounds of
//! move -> network update -> forage -> scenario hook -> regeneration,
//! then observers see the final state and the cohort reproduces.

use crate::config::SimConfig;
use crate::error::{ConfigError, Result};
use crate::landscape::ResourceField;
use crate::metrics::RunMetrics;
use crate::network::ProximityNetwork;
use crate::population::Population;
use crate::scenario::PostForageHook;
use crate::SimRng;
use pathomove_data::{GenerationSummary, TraitRecord};
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use std::time::Instant;

/// Read-only state of a generation that has finished its timesteps but has
/// not yet reproduced.
pub struct GenerationView<'a> {
    pub gen: usize,
    pub is_final: bool,
    pub population: &'a Population,
    pub network: &'a ProximityNetwork,
    pub field: &'a ResourceField,
    pub summary: &'a GenerationSummary,
}

/// Receives every generation boundary, e.g. to export data.
pub trait GenerationObserver {
    fn on_generation_end(&mut self, view: &GenerationView<'_>) -> anyhow::Result<()>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl GenerationObserver for NoopObserver {
    fn on_generation_end(&mut self, _view: &GenerationView<'_>) -> anyhow::Result<()> {
        Ok(())
    }
}

impl<F> GenerationObserver for F
where
    F: FnMut(&GenerationView<'_>) -> anyhow::Result<()>,
{
    fn on_generation_end(&mut self, view: &GenerationView<'_>) -> anyhow::Result<()> {
        self(view)
    }
}

/// Result of a full run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunOutput {
    pub summaries: Vec<GenerationSummary>,
    pub traits: Vec<TraitRecord>,
}

pub struct Simulation {
    config: SimConfig,
    rng: SimRng,
    field: ResourceField,
    population: Population,
    network: ProximityNetwork,
    hook: Box<dyn PostForageHook>,
    generation: usize,
    metrics: RunMetrics,
    summaries: Vec<GenerationSummary>,
    records: Vec<TraitRecord>,
}

impl Simulation {
    /// Validates `config`, seeds the random stream and builds the landscape
    /// and generation-zero cohort.
    pub fn new(config: SimConfig) -> Result<Self> {
        config.validate()?;
        let mut rng = SimRng::seed_from_u64(config.run.seed);
        let field = ResourceField::generate(&config.landscape, &mut rng)?;
        let population = Population::random(&config.population, &mut rng);
        Ok(Self::assemble(config, rng, field, population))
    }

    /// Like [`new`](Self::new) but starting from a given cohort, whose size
    /// must match `config.population.size`.
    pub fn with_population(config: SimConfig, population: Population) -> Result<Self> {
        config.validate()?;
        if population.len() != config.population.size {
            return Err(ConfigError::range(
                "population",
                format!(
                    "cohort has {} agents but population size is {}",
                    population.len(),
                    config.population.size
                ),
            ));
        }
        let mut rng = SimRng::seed_from_u64(config.run.seed);
        let field = ResourceField::generate(&config.landscape, &mut rng)?;
        Ok(Self::assemble(config, rng, field, population))
    }

    fn assemble(
        config: SimConfig,
        rng: SimRng,
        field: ResourceField,
        population: Population,
    ) -> Self {
        tracing::info!(
            fingerprint = %config.fingerprint(),
            items = field.len(),
            agents = population.len(),
            scenario = ?config.pathogen.scenario,
            "Simulation initialised"
        );
        let network = ProximityNetwork::new(population.len());
        let hook = config.pathogen.scenario.hook(&config.pathogen);
        Self {
            config,
            rng,
            field,
            population,
            network,
            hook,
            generation: 0,
            metrics: RunMetrics::new(),
            summaries: Vec::new(),
            records: Vec::new(),
        }
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    /// Index of the next generation to run.
    pub fn generation(&self) -> usize {
        self.generation
    }

    pub fn population(&self) -> &Population {
        &self.population
    }

    pub fn field(&self) -> &ResourceField {
        &self.field
    }

    pub fn network(&self) -> &ProximityNetwork {
        &self.network
    }

    pub fn metrics(&self) -> &RunMetrics {
        &self.metrics
    }

    pub fn is_finished(&self) -> bool {
        self.generation >= self.config.run.genmax
    }

    fn begin_generation(&mut self) -> Result<()> {
        if self.config.landscape.regenerate_each_generation && self.generation > 0 {
            self.field = ResourceField::generate(&self.config.landscape, &mut self.rng)?;
        } else {
            self.field.reset_counters();
        }
        self.population.init_positions(&self.field, &mut self.rng);
        self.network.reset();
        self.hook
            .on_generation_start(self.generation, &mut self.population, &mut self.rng)
    }

    fn step_timestep(&mut self, t: usize) -> u64 {
        let range = self.config.social.association_range;
        self.population.move_agents(
            &self.field,
            self.config.population.step_size,
            range,
            &mut self.rng,
        );
        self.population
            .update_network(&mut self.network, self.field.land_size(), range);
        let eaten = self.population.forage(&mut self.field, &self.config.foraging);
        let infections =
            self.hook
                .after_forage(t, &mut self.population, &self.network, &mut self.rng);
        // Regeneration only after every agent has foraged this timestep.
        self.field.tick_regeneration();
        self.metrics.record_timestep(eaten, infections as u64);
        eaten
    }

    /// Runs one full generation, including reproduction. Fails once all
    /// `genmax` generations have run.
    pub fn step_generation(
        &mut self,
        observer: &mut dyn GenerationObserver,
    ) -> anyhow::Result<GenerationSummary> {
        anyhow::ensure!(
            !self.is_finished(),
            "all {} generations already ran",
            self.config.run.genmax
        );
        let started = Instant::now();
        let gen = self.generation;
        self.begin_generation()?;

        let mut items = 0;
        for t in 0..self.config.run.tmax {
            items += self.step_timestep(t);
        }

        let summary = summarise(gen, &self.population, &self.network, items);
        let is_final = gen + 1 >= self.config.run.genmax;
        if gen % self.config.run.record_interval == 0 || is_final {
            self.records.extend(self.population.trait_records(gen));
        }

        observer.on_generation_end(&GenerationView {
            gen,
            is_final,
            population: &self.population,
            network: &self.network,
            field: &self.field,
            summary: &summary,
        })?;
        self.metrics.record_generation(&summary, started.elapsed());
        self.summaries.push(summary.clone());

        self.population = self.population.reproduce(
            &self.config.population,
            &self.config.evolution,
            &mut self.rng,
        )?;
        self.generation += 1;
        Ok(summary)
    }

    /// Runs all remaining generations.
    pub fn run(&mut self) -> anyhow::Result<RunOutput> {
        self.run_with(&mut NoopObserver)
    }

    pub fn run_with(&mut self, observer: &mut dyn GenerationObserver) -> anyhow::Result<RunOutput> {
        while !self.is_finished() {
            self.step_generation(observer)?;
        }
        tracing::info!(
            generations = self.metrics.generations(),
            items = self.metrics.items_consumed(),
            infections = self.metrics.infections(),
            elapsed_ms = self.metrics.elapsed().as_millis() as u64,
            "Run finished"
        );
        Ok(RunOutput {
            summaries: std::mem::take(&mut self.summaries),
            traits: std::mem::take(&mut self.records),
        })
    }
}

fn summarise(
    gen: usize,
    population: &Population,
    network: &ProximityNetwork,
    items_consumed: u64,
) -> GenerationSummary {
    let n = population.len().max(1) as f64;
    let traits = population.traits();
    let mean_trait = traits.iter().sum::<f64>() / n;
    let variance = traits.iter().map(|t| (t - mean_trait).powi(2)).sum::<f64>() / n;
    GenerationSummary {
        gen,
        mean_energy: population.total_energy() / n,
        mean_trait,
        sd_trait: variance.sqrt(),
        n_infected: population.infected_count(),
        items_consumed,
        total_contact_weight: network.total_weight(),
        n_components: network.component_count(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scenario::Scenario;

    fn small_config() -> SimConfig {
        let mut config = SimConfig::default();
        config.landscape.item_count = 40;
        config.landscape.land_size = 10.0;
        config.landscape.cluster_count = 4;
        config.population.size = 12;
        config.run.tmax = 10;
        config.run.genmax = 3;
        config.run.seed = 11;
        config
    }

    #[test]
    fn test_run_produces_one_summary_per_generation() {
        let mut sim = Simulation::new(small_config()).unwrap();
        let output = sim.run().unwrap();
        assert_eq!(output.summaries.len(), 3);
        assert_eq!(output.traits.len(), 3 * 12);
        assert!(sim.is_finished());
        assert_eq!(sim.population().len(), 12);
        assert_eq!(sim.metrics().timesteps(), 30);
    }

    #[test]
    fn test_record_interval_keeps_final_generation() {
        let mut config = small_config();
        config.run.genmax = 5;
        config.run.record_interval = 3;
        let output = Simulation::new(config).unwrap().run().unwrap();
        let gens: std::collections::BTreeSet<usize> =
            output.traits.iter().map(|r| r.gen).collect();
        assert_eq!(gens.into_iter().collect::<Vec<_>>(), vec![0, 3, 4]);
    }

    #[test]
    fn test_observer_sees_every_generation_before_reproduction() {
        let mut sim = Simulation::new(small_config()).unwrap();
        let mut seen = Vec::new();
        let mut observer = |view: &GenerationView<'_>| {
            assert_eq!(view.population.len(), view.network.len());
            seen.push((view.gen, view.is_final, view.population.total_energy()));
            Ok(())
        };
        let output = sim.run_with(&mut observer).unwrap();
        assert_eq!(seen.len(), 3);
        assert!(seen[2].1);
        for ((gen, _, energy), summary) in seen.iter().zip(&output.summaries) {
            assert_eq!(*gen, summary.gen);
            assert!((energy / 12.0 - summary.mean_energy).abs() < 1e-9);
        }
    }

    #[test]
    fn test_observer_error_stops_run() {
        let mut sim = Simulation::new(small_config()).unwrap();
        let mut observer = |_: &GenerationView<'_>| -> anyhow::Result<()> {
            anyhow::bail!("disk full")
        };
        assert!(sim.run_with(&mut observer).is_err());
        assert_eq!(sim.generation(), 0);
    }

    #[test]
    fn test_with_population_checks_size() {
        let config = small_config();
        assert!(Simulation::with_population(config.clone(), Population::from_traits(vec![0.0; 3]))
            .is_err());
        assert!(Simulation::with_population(config, Population::from_traits(vec![0.0; 12])).is_ok());
    }

    #[test]
    fn test_invalid_config_rejected_before_work() {
        let mut config = small_config();
        config.pathogen.scenario = Scenario::Pathogen;
        config.pathogen.n_infected = 13;
        assert!(matches!(
            Simulation::new(config),
            Err(ConfigError::TooManyInfected { .. })
        ));
    }

    #[test]
    fn test_pathogen_scenario_reports_infections() {
        let mut config = small_config();
        config.pathogen.scenario = Scenario::Pathogen;
        config.pathogen.n_infected = 2;
        let output = Simulation::new(config).unwrap().run().unwrap();
        assert!(output.summaries.iter().all(|s| s.n_infected >= 2));
    }

    #[test]
    fn test_regenerated_landscape_changes_between_generations() {
        let mut config = small_config();
        config.landscape.regenerate_each_generation = true;
        let mut sim = Simulation::new(config).unwrap();
        let first = sim.field().records();
        sim.step_generation(&mut NoopObserver).unwrap();
        sim.step_generation(&mut NoopObserver).unwrap();
        assert_ne!(first, sim.field().records());
    }

    #[test]
    fn test_step_after_last_generation_fails() {
        let mut sim = Simulation::new(small_config()).unwrap();
        sim.run().unwrap();
        let mut calls = 0;
        let mut observer = |_: &GenerationView<'_>| -> anyhow::Result<()> {
            calls += 1;
            Ok(())
        };
        assert!(sim.step_generation(&mut observer).is_err());
        assert_eq!(calls, 0);
        assert_eq!(sim.generation(), 3);
        assert_eq!(sim.metrics().generations(), 3);
        assert!(sim.run().unwrap().summaries.is_empty());
    }

    #[test]
    fn test_run_output_serializes_trait_column() {
        let mut config = small_config();
        config.run.genmax = 1;
        let output = Simulation::new(config).unwrap().run().unwrap();
        let json = serde_json::to_value(&output).unwrap();
        assert_eq!(json["traits"].as_array().unwrap().len(), 12);
        assert!(json["traits"][0].get("trait").is_some());
        let back: RunOutput = serde_json::from_value(json).unwrap();
        assert_eq!(back, output);
    }
}
