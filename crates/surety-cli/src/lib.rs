//! Surety CLI Library
//!
//! Operator tooling around the engine: TOML scenario replay, a simulated oracle fleet
//! and configuration loading shared by the `surety` binary and its tests.

pub mod config;
pub mod fleet;
pub mod scenario;
pub mod simulate;

pub use fleet::{FleetResponse, OracleFleet};
pub use scenario::{replay, ScenarioFile, ScenarioReport, StepResult};
pub use simulate::{SimulationParams, SimulationSummary};
