//! End-to-end simulation: airlines register flights, passengers insure them, the oracle
//! fleet reports statuses and passengers withdraw whatever was credited.

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::info;

use surety_core::{AccountId, Amount, EngineConfig, FlightKey, FlightStatus};
use surety_engine::{SuretyEngine, Treasury};

use crate::fleet::OracleFleet;

/// Knobs for a simulation run.
#[derive(Debug, Clone)]
pub struct SimulationParams {
    pub oracles: usize,
    pub flights: usize,
    pub passengers: usize,
    pub seed: u64,
    pub fixed_status: Option<FlightStatus>,
}

impl Default for SimulationParams {
    fn default() -> Self {
        Self {
            oracles: 30,
            flights: 3,
            passengers: 5,
            seed: 0,
            fixed_status: None,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct FlightSummary {
    pub flight: FlightKey,
    pub status: FlightStatus,
    pub policies: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct SimulationSummary {
    pub oracles: usize,
    pub responses: usize,
    pub flights: Vec<FlightSummary>,
    pub withdrawals: Vec<(AccountId, Amount)>,
    pub treasury: Treasury,
}

pub fn run(config: EngineConfig, params: &SimulationParams) -> Result<SimulationSummary> {
    let mut engine = SuretyEngine::new(config)?;
    let founder = engine.config().founding_airline.key;
    let fee = engine.config().params.airline_fee;
    let premium = engine.config().params.max_premium;
    engine
        .fund_airline(founder, fee)
        .context("funding founding airline")?;

    let mut fleet = OracleFleet::register(&mut engine, params.oracles, params.seed)?;
    if let Some(status) = params.fixed_status {
        fleet = fleet.with_fixed_status(status);
    }

    let mut flights = Vec::with_capacity(params.flights);
    for n in 0..params.flights {
        let key = engine
            .register_flight(founder, &format!("SIM{n:03}"), "ZRH", "JFK", 1_000 + n as u64)
            .with_context(|| format!("registering flight SIM{n:03}"))?;
        flights.push(key);
    }

    let passengers: Vec<AccountId> = (0..params.passengers)
        .map(|n| AccountId::from_label(&format!("passenger-{n}")))
        .collect();
    if !flights.is_empty() {
        for (n, passenger) in passengers.iter().enumerate() {
            let flight = &flights[n % flights.len()];
            engine.purchase_insurance(*passenger, flight, premium)?;
        }
    }

    let mut responses = 0;
    for flight in &flights {
        engine.request_flight_status(founder, flight, flight.timestamp + 3_600)?;
        let events = engine.drain_events();
        responses += fleet.respond(&mut engine, &events).len();
    }

    let mut withdrawals = Vec::new();
    for passenger in &passengers {
        if !engine.balance_of(passenger).is_zero() {
            withdrawals.push((*passenger, engine.withdraw(*passenger)?));
        }
    }

    let flights = flights
        .into_iter()
        .map(|key| FlightSummary {
            status: engine
                .flight(&key)
                .map(|f| f.status)
                .unwrap_or(FlightStatus::Unknown),
            policies: engine.ledger().policies_on(&key).len(),
            flight: key,
        })
        .collect();
    info!(
        oracles = fleet.len(),
        responses,
        withdrawals = withdrawals.len(),
        "Simulation complete"
    );
    Ok(SimulationSummary {
        oracles: fleet.len(),
        responses,
        flights,
        withdrawals,
        treasury: engine.treasury(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_late_airline_pays_every_passenger() {
        let params = SimulationParams {
            fixed_status: Some(FlightStatus::LateAirline),
            ..SimulationParams::default()
        };
        let summary = run(EngineConfig::default(), &params).unwrap();
        assert_eq!(summary.flights.len(), 3);
        assert!(summary
            .flights
            .iter()
            .all(|f| f.status == FlightStatus::LateAirline));
        assert_eq!(summary.withdrawals.len(), 5);
        assert_eq!(summary.treasury.credited, summary.treasury.withdrawn);
        assert_eq!(summary.treasury.credited, "7.5".parse().unwrap());
        assert_eq!(summary.treasury.subsidy_paid, "2.5".parse().unwrap());
    }

    #[test]
    fn test_simulation_is_reproducible() {
        let params = SimulationParams {
            seed: 11,
            ..SimulationParams::default()
        };
        let a = run(EngineConfig::default(), &params).unwrap();
        let b = run(EngineConfig::default(), &params).unwrap();
        let statuses = |s: &SimulationSummary| s.flights.iter().map(|f| f.status).collect::<Vec<_>>();
        assert_eq!(statuses(&a), statuses(&b));
        assert_eq!(a.treasury, b.treasury);
    }
}
