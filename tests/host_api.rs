use pathomove_core::SimConfig;
use pathomove_io::{CsvExporter, OutputLayout};
use pathomove_lib::{get_test_landscape, run_pathomove, run_pathomove_with, PathomoveParams};

fn small_params() -> PathomoveParams {
    PathomoveParams {
        popsize: 15,
        n_items: 40,
        landsize: 10.0,
        n_clusters: 4,
        tmax: 10,
        genmax: 3,
        seed: 17,
        ..Default::default()
    }
}

#[test]
fn test_run_pathomove_returns_every_generation() {
    let output = run_pathomove(&small_params()).unwrap();
    assert_eq!(output.summaries.len(), 3);
    assert_eq!(output.traits.len(), 3 * 15);
    let gens: Vec<usize> = output.summaries.iter().map(|s| s.gen).collect();
    assert_eq!(gens, vec![0, 1, 2]);
}

#[test]
fn test_run_pathomove_pathogen_code() {
    let params = PathomoveParams {
        scenario: 1,
        n_infected: 3,
        ..small_params()
    };
    let output = run_pathomove(&params).unwrap();
    assert!(output.summaries.iter().all(|s| s.n_infected >= 3));
}

#[test]
fn test_invalid_params_fail_before_running() {
    for params in [
        PathomoveParams {
            genmax: -1,
            ..small_params()
        },
        PathomoveParams {
            scenario: 9,
            ..small_params()
        },
        PathomoveParams {
            p_transmit: 1.5,
            ..small_params()
        },
        PathomoveParams {
            scenario: 1,
            n_infected: 16,
            ..small_params()
        },
    ] {
        assert!(run_pathomove(&params).is_err(), "{params:?}");
    }
}

#[test]
fn test_params_from_json_default_seed() {
    let json = r#"{
        "scenario": 0, "popsize": 10, "n_items": 20, "landsize": 8.0,
        "n_clusters": 2, "cluster_spread": 0.5, "tmax": 5, "genmax": 1,
        "range_food": 1.0, "range_agents": 1.0, "handling_time": 5,
        "regen_time": 50, "p_transmit": 0.05, "n_infected": 4,
        "cost_infect": 0.25
    }"#;
    let params: PathomoveParams = serde_json::from_str(json).unwrap();
    assert_eq!(params.seed, 0);
    assert_eq!(run_pathomove(&params).unwrap(), run_pathomove(&params).unwrap());
}

#[test]
fn test_landscape_query_clusters_items() {
    let tight = get_test_landscape(300, 50.0, 3, 0.1, 4).unwrap();
    assert_eq!(tight.len(), 300);
    let near_other = |i: usize| {
        tight
            .iter()
            .enumerate()
            .any(|(j, o)| j != i && (o.x - tight[i].x).hypot(o.y - tight[i].y) < 1.0)
    };
    assert!((0..tight.len()).all(near_other));
    assert!(get_test_landscape(10, 0.0, 1, 0.1, 4).is_err());
}

#[test]
fn test_run_with_exporter_writes_tables() {
    let dir = tempfile::tempdir().unwrap();
    let params = small_params();
    let config = SimConfig::try_from(&params).unwrap();
    let layout = OutputLayout::new(dir.path().join("data"));
    let mut exporter = CsvExporter::with_run_id(layout.clone(), &config, "7".into()).unwrap();

    let output = run_pathomove_with(&params, &mut exporter).unwrap();

    let traits = std::fs::read_to_string(layout.trait_path("7")).unwrap();
    assert_eq!(traits.lines().count(), output.traits.len() + 1);
    assert!(layout.network_path("7").exists());
    assert!(layout.landscape_path("7").exists());
    assert_eq!(output, run_pathomove(&params).unwrap());
}

#[test]
fn test_lookup_records_dispersal_as_passed() {
    let dir = tempfile::tempdir().unwrap();
    let params = PathomoveParams {
        cluster_spread: 0.1,
        genmax: 1,
        ..small_params()
    };
    let config = SimConfig::try_from(&params).unwrap();
    let layout = OutputLayout::new(dir.path().join("data"));
    let mut exporter = CsvExporter::with_run_id(layout.clone(), &config, "9".into()).unwrap();
    run_pathomove_with(&params, &mut exporter).unwrap();

    let lookup = std::fs::read_to_string(layout.lookup_path()).unwrap();
    assert_eq!(lookup.lines().nth(1), Some("9,4,0.1"));
}
