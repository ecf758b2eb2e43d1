//! Scenario replay and configuration loading through the library API.

use std::io::Write;
use std::path::Path;

use assert_matches::assert_matches;
use surety_core::{AccountId, Amount, EngineConfig, ErrorKind, FlightStatus, SuretyEvent};
use surety_engine::{Receipt, SuretyEngine};
use surety_cli::config::load_config;
use surety_cli::{replay, ScenarioFile, StepResult};

fn bundled_scenario() -> ScenarioFile {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("scenarios/delayed_flight.toml");
    ScenarioFile::load(&path).unwrap()
}

#[test]
fn bundled_scenario_pays_passenger() {
    let scenario = bundled_scenario();
    let config = scenario.config.clone().unwrap();
    assert_eq!(config.owner, AccountId::from_label("owner"));
    let mut engine = SuretyEngine::new(config).unwrap();

    let report = replay(&mut engine, &scenario, true).unwrap();

    // Only the three holders of index 0 may answer; the rest are rejected.
    assert_eq!(report.rejected, 7);
    assert!(report.steps.iter().all(|step| match &step.result {
        StepResult::Rejected { kind, .. } => *kind == ErrorKind::InvalidState,
        StepResult::Applied { .. } => true,
    }));
    assert_matches!(
        report.steps.last().map(|s| &s.result),
        Some(StepResult::Applied {
            receipt: Receipt::Withdrawn { amount }
        }) if *amount == "1.5".parse::<Amount>().unwrap()
    );
    assert!(report.events.iter().any(|e| matches!(
        e,
        SuretyEvent::FlightStatusFinalized {
            status: FlightStatus::LateAirline,
            ..
        }
    )));
    assert!(engine.is_airline_registered(&AccountId::from_label("airline-5")));
}

#[test]
fn replay_stops_at_first_rejection() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(
        file,
        r#"
        [scenario]
        name = "unfunded flight"

        [[transactions]]
        op = "register_flight"
        caller = "@airline-1"
        designator = "1"
        from = "A"
        to = "B"
        timestamp = 1

        [[transactions]]
        op = "fund_airline"
        caller = "@airline-1"
        value = "10"
        "#
    )
    .unwrap();

    let scenario = ScenarioFile::load(file.path()).unwrap();
    let mut engine = SuretyEngine::new(EngineConfig::default()).unwrap();
    let err = replay(&mut engine, &scenario, false).unwrap_err();
    assert!(err.to_string().contains("register_flight"), "{err}");
    assert!(!engine.is_airline_funded(&AccountId::from_label("airline-1")));
}

#[test]
fn missing_config_file_falls_back_to_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let config = load_config(&dir.path().join("absent.toml")).unwrap();
    assert_eq!(config.params, EngineConfig::default().params);
}

#[test]
fn config_file_is_loaded() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("surety.toml");
    let mut config = EngineConfig::default();
    config.oracle.request_ttl_secs = 90;
    std::fs::write(&path, config.to_toml_string().unwrap()).unwrap();

    let loaded = load_config(&path).unwrap();
    assert_eq!(loaded.oracle.request_ttl_secs, 90);
}
