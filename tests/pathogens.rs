mod common;

use common::SimBuilder;
use pathomove_core::{GenerationView, Scenario};

/// Everyone within contact range of everyone else at every timestep.
fn crowded(seed: u64) -> SimBuilder {
    SimBuilder::new().with_seed(seed).with_config(|c| {
        c.landscape.land_size = 1.0;
        c.landscape.item_count = 200;
        c.landscape.cluster_count = 1;
        c.foraging.range = 10.0;
        c.social.association_range = 10.0;
        c.pathogen.scenario = Scenario::Pathogen;
        c.pathogen.n_infected = 2;
        c.run.tmax = 5;
        c.run.genmax = 1;
    })
}

#[test]
fn test_certain_transmission_reaches_everyone() {
    let output = crowded(1)
        .with_config(|c| c.pathogen.p_transmit = 1.0)
        .build()
        .run()
        .unwrap();
    assert_eq!(output.summaries[0].n_infected, 20);
}

#[test]
fn test_zero_transmission_keeps_only_seeds() {
    let mut sim = crowded(2)
        .with_config(|c| {
            c.pathogen.p_transmit = 0.0;
            c.run.genmax = 3;
        })
        .build();
    let output = sim.run().unwrap();
    assert!(output.summaries.iter().all(|s| s.n_infected == 2));
    assert_eq!(sim.metrics().infections(), 0);
}

#[test]
fn test_no_pathogen_scenario_never_infects() {
    let output = crowded(3)
        .with_config(|c| {
            c.pathogen.scenario = Scenario::NoPathogen;
            c.pathogen.p_transmit = 1.0;
        })
        .build()
        .run()
        .unwrap();
    assert_eq!(output.summaries[0].n_infected, 0);
    assert!(output.traits.iter().all(|r| !r.infected));
}

#[test]
fn test_infection_cost_drains_energy() {
    let heavy = crowded(4)
        .with_config(|c| {
            c.pathogen.p_transmit = 1.0;
            c.pathogen.cost_infect = 100.0;
        })
        .build()
        .run()
        .unwrap();
    assert_eq!(heavy.summaries[0].mean_energy, 0.0);

    let free = crowded(4)
        .with_config(|c| {
            c.pathogen.p_transmit = 1.0;
            c.pathogen.cost_infect = 0.0;
        })
        .build()
        .run()
        .unwrap();
    assert!(free.summaries[0].mean_energy > 0.0);
}

#[test]
fn test_introduction_generation_delays_pathogen() {
    let mut sim = crowded(5)
        .with_config(|c| {
            c.pathogen.p_transmit = 1.0;
            c.pathogen.introduction_gen = 2;
            c.run.genmax = 3;
        })
        .build();
    let mut infected_per_gen = Vec::new();
    let mut observer = |view: &GenerationView<'_>| {
        infected_per_gen.push(view.population.infected_count());
        Ok(())
    };
    sim.run_with(&mut observer).unwrap();
    assert_eq!(infected_per_gen, vec![0, 0, 20]);
}

#[test]
fn test_infection_times_within_generation() {
    let output = crowded(6)
        .with_config(|c| c.pathogen.p_transmit = 0.5)
        .build()
        .run()
        .unwrap();
    let mut sim = crowded(6)
        .with_config(|c| c.pathogen.p_transmit = 0.5)
        .build();
    let mut times = Vec::new();
    let mut observer = |view: &GenerationView<'_>| {
        times.extend(
            view.population
                .agents()
                .iter()
                .filter_map(|a| a.infection.infected_at),
        );
        Ok(())
    };
    sim.run_with(&mut observer).unwrap();
    assert_eq!(times.len(), output.summaries[0].n_infected);
    assert!(times.iter().all(|&t| t < 5));
}
