//! Command-line interface for the Surety engine
//!
//! Replays transaction logs, runs a simulated oracle fleet and prints the effective
//! configuration.

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use surety_core::FlightStatus;
use surety_engine::SuretyEngine;

use surety_cli::config::load_config;
use surety_cli::{replay, simulate, ScenarioFile, SimulationParams};

#[derive(Parser)]
#[command(name = "surety")]
#[command(about = "Surety - flight-delay insurance engine tooling", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Config file path (defaults apply when the file is absent)
    #[arg(short, long, global = true, default_value = "surety.toml")]
    config: PathBuf,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the effective configuration as TOML
    Config,

    /// Apply a TOML transaction log to a fresh engine
    Replay(ReplayCommand),

    /// Run airlines, passengers and an oracle fleet end to end
    Simulate(SimulateCommand),
}

#[derive(Args)]
struct ReplayCommand {
    /// Scenario file
    scenario: PathBuf,

    /// Keep going after a rejected transaction
    #[arg(long)]
    continue_on_error: bool,
}

#[derive(Args)]
struct SimulateCommand {
    /// Oracle nodes to register
    #[arg(long, default_value = "30")]
    oracles: usize,

    /// Flights registered by the founding airline
    #[arg(long, default_value = "3")]
    flights: usize,

    /// Passengers buying one policy each
    #[arg(long, default_value = "5")]
    passengers: usize,

    /// Seed for the fleet's status draws
    #[arg(long, default_value = "0")]
    seed: u64,

    /// Report this status for every flight instead of drawing one
    #[arg(long, value_parser = parse_status)]
    status: Option<FlightStatus>,
}

fn parse_status(value: &str) -> Result<FlightStatus, String> {
    if let Ok(code) = value.parse::<u8>() {
        return FlightStatus::from_code(code).map_err(|e| e.to_string());
    }
    FlightStatus::ALL
        .into_iter()
        .find(|status| status.to_string() == value)
        .ok_or_else(|| format!("unknown flight status '{value}'"))
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(log_level)
        .with_writer(std::io::stderr)
        .init();

    let config = load_config(&cli.config)?;

    match cli.command {
        Commands::Config => {
            print!("{}", config.to_toml_string()?);
        }

        Commands::Replay(cmd) => {
            let scenario = ScenarioFile::load(&cmd.scenario)?;
            let config = scenario.config.clone().unwrap_or(config);
            let mut engine = SuretyEngine::new(config)?;
            let report = replay(&mut engine, &scenario, cmd.continue_on_error)?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }

        Commands::Simulate(cmd) => {
            let params = SimulationParams {
                oracles: cmd.oracles,
                flights: cmd.flights,
                passengers: cmd.passengers,
                seed: cmd.seed,
                fixed_status: cmd.status,
            };
            let summary = simulate::run(config, &params)?;
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
    }

    Ok(())
}
