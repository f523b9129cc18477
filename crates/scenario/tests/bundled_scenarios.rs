//! The scenario scripts shipped in `scenarios/` load to their literal values.

use ghostlab_scenario::{
    load_path, Controller, MoveSelection, ScenarioError, SelectionPolicy, SimulationConfig,
};
use std::path::PathBuf;

fn scenario_path(file: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("../../scenarios")
        .join(file)
}

const LEARNING: &str = "learning-roulette-5-pretrained-legacy-10.js";
const NON_LEARNING: &str = "nonlearning-legacy-nrt.js";

#[test]
fn learning_scenario_values() {
    let scenario = load_path(scenario_path(LEARNING)).unwrap();
    let config = &scenario.config;

    assert_eq!(scenario.name, "learning-roulette-5-pretrained-legacy-10");
    assert!(scenario
        .description
        .as_deref()
        .unwrap()
        .starts_with("Learning ghost model against the Legacy controller"));

    assert_eq!(config.node_expansion_threshold, 10);
    assert_eq!(config.maximum_simulation_length, 100000);
    assert_eq!(config.simulation_count, None);
    assert_eq!(config.pac_man_model, Controller::RandomNonRevPacMan);

    let neural = Controller::NeuralNetworkGhost {
        move_selection: MoveSelection::Roulette,
        iterations: 5,
        use_pretrained_weights: true,
    };
    assert_eq!(config.ghost_model, neural);
    assert_eq!(config.tasks, vec![neural]);
    assert_eq!(
        config.selection_policy,
        SelectionPolicy::LevineUcb {
            exploration_constant: 4000.0
        }
    );
    assert_eq!(config.opponent, Controller::Legacy);
}

#[test]
fn non_learning_scenario_values() {
    let config = load_path(scenario_path(NON_LEARNING)).unwrap().config;

    assert_eq!(config.node_expansion_threshold, 30);
    assert_eq!(config.maximum_simulation_length, 250);
    assert_eq!(config.simulation_count, Some(1000));
    assert_eq!(config.pac_man_model, Controller::RandomNonRevPacMan);
    assert_eq!(config.ghost_model, Controller::Legacy);
    assert!(config.tasks.is_empty());
    assert!((config.selection_policy.exploration_constant() - 4000.0).abs() < 1e-9);
    assert_eq!(config.opponent, Controller::Legacy);
}

#[test]
fn loading_twice_is_idempotent() {
    for file in [LEARNING, NON_LEARNING] {
        let first = load_path(scenario_path(file)).unwrap();
        let second = load_path(scenario_path(file)).unwrap();
        assert_eq!(first, second);
    }
}

#[test]
fn json_export_loads_back() {
    let dir = tempfile::tempdir().unwrap();

    for file in [LEARNING, NON_LEARNING] {
        let scenario = load_path(scenario_path(file)).unwrap();
        let json_path = dir.path().join(format!("{}.json", scenario.name));
        std::fs::write(&json_path, scenario.config.to_json().unwrap()).unwrap();

        let reloaded = load_path(&json_path).unwrap();
        assert_eq!(reloaded.name, scenario.name);
        assert_eq!(reloaded.config, scenario.config);
    }
}

#[test]
fn invalid_json_scenario_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bad.json");
    let mut config: serde_json::Value =
        serde_json::to_value(SimulationConfig::default()).unwrap();
    config["nodeExpansionThreshold"] = serde_json::json!(0);
    std::fs::write(&path, config.to_string()).unwrap();

    assert!(matches!(
        load_path(&path),
        Err(ScenarioError::InvalidParameter { .. })
    ));
}

#[test]
fn malformed_json_is_a_json_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.json");
    std::fs::write(&path, "{ not json").unwrap();

    assert!(matches!(load_path(&path), Err(ScenarioError::Json(_))));
}

#[test]
fn missing_file_reports_path() {
    let err = load_path(scenario_path("does-not-exist.js")).unwrap_err();
    assert!(err.to_string().contains("does-not-exist.js"), "{err}");
}
