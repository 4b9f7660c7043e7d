#![cfg(feature = "serialize")]

extern crate ising2d;
extern crate serde_json;
use ising2d::*;

#[test]
fn config_roundtrip() {
    let config = SimulationConfig::default()
        .with_size(12)
        .with_schedule(EquilibrationSchedule::EquilibrationOnly);
    let v = serde_json::to_vec(&config).unwrap();
    let back: SimulationConfig = serde_json::from_slice(&v).unwrap();
    assert_eq!(config, back);
}

#[test]
fn partial_config_uses_defaults() {
    let config: SimulationConfig =
        serde_json::from_str(r#"{"n": 10, "field": 0.5, "schedule": "equilibration_only"}"#)
            .unwrap();
    assert_eq!(config.n, 10);
    assert_eq!(config.field, 0.5);
    assert_eq!(config.schedule, EquilibrationSchedule::EquilibrationOnly);
    assert_eq!(config.n_points, SimulationConfig::default().n_points);
}

#[test]
fn file_size_scales_steps_like_builder() {
    let from_file: SimulationConfig = serde_json::from_str(r#"{"n": 32}"#).unwrap();
    let built = SimulationConfig::default().with_size(32);
    assert_eq!(from_file.mc_changes(), 1024);
    assert_eq!(from_file, built);

    let explicit: SimulationConfig =
        serde_json::from_str(r#"{"n": 32, "mc_changes": 100}"#).unwrap();
    assert_eq!(explicit.mc_changes(), 100);
    let v = serde_json::to_value(SimulationConfig::default()).unwrap();
    assert!(v.get("mc_changes").is_none());
}

#[test]
fn table_serializes_records() {
    let config = SimulationConfig::default()
        .with_size(4)
        .with_sweeps(2, 2)
        .with_temperatures(1.0, 2.0, 2);
    let table = Simulation::new(config).unwrap().run().unwrap();
    let value = serde_json::to_value(&table).unwrap();
    let records = value["records"].as_array().unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[1]["temperature"], 1.5);
    assert!(records[0]["susceptibility_mean_sq"].is_number());
}
