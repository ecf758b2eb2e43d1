//! Shared fixtures for unit and integration tests.
//!
//! Identities are derived from readable labels so failing assertions print stable keys.

use surety_core::{AccountId, Amount, EngineConfig, FlightKey, FlightStatus};

use crate::engine::SuretyEngine;

/// Scheduled departure used by fixture flights.
pub const FLIGHT_TIMESTAMP: u64 = 1_700_000_000;

pub fn airline(n: usize) -> AccountId {
    AccountId::from_label(&format!("airline-{n}"))
}

pub fn passenger(n: usize) -> AccountId {
    AccountId::from_label(&format!("passenger-{n}"))
}

pub fn oracle(n: usize) -> AccountId {
    AccountId::from_label(&format!("oracle-{n}"))
}

/// Default configuration with `airline(1)` as the founder.
pub fn test_config() -> EngineConfig {
    EngineConfig::new(AccountId::from_label("owner"), airline(1), "Airline 1")
}

pub fn test_engine() -> SuretyEngine {
    match SuretyEngine::new(test_config()) {
        Ok(engine) => engine,
        Err(e) => panic!("fixture config rejected: {e}"),
    }
}

/// Engine with the founder funded and airlines 2..=4 admitted directly and funded.
pub fn engine_with_funded_airlines() -> SuretyEngine {
    let mut engine = test_engine();
    let fee = engine.config().params.airline_fee;
    fund(&mut engine, airline(1), fee);
    for n in 2..=4 {
        if let Err(e) = engine.nominate_airline(airline(1), &format!("Airline {n}"), airline(n), 0) {
            panic!("fixture nomination failed: {e}");
        }
        fund(&mut engine, airline(n), fee);
    }
    engine.drain_events();
    engine
}

fn fund(engine: &mut SuretyEngine, key: AccountId, fee: Amount) {
    if let Err(e) = engine.fund_airline(key, fee) {
        panic!("fixture funding failed: {e}");
    }
}

/// Register oracles `0..count`, each paying the configured fee.
pub fn register_oracles(engine: &mut SuretyEngine, count: usize) -> Vec<AccountId> {
    let fee = engine.config().params.oracle_registration_fee;
    (0..count)
        .map(|n| {
            let key = oracle(n);
            if let Err(e) = engine.register_oracle(key, fee) {
                panic!("fixture oracle registration failed: {e}");
            }
            key
        })
        .collect()
}

/// Register flight "5678" operated by `airline(2)`.
pub fn register_fixture_flight(engine: &mut SuretyEngine) -> FlightKey {
    match engine.register_flight(airline(2), "5678", "ZRH", "JFK", FLIGHT_TIMESTAMP) {
        Ok(key) => key,
        Err(e) => panic!("fixture flight registration failed: {e}"),
    }
}

/// Oracles holding `index`, in registration order.
pub fn holders(engine: &SuretyEngine, index: u8) -> Vec<AccountId> {
    let holders = engine.oracles().holders_of(index);
    (0..engine.oracles().oracle_count())
        .map(oracle)
        .filter(|key| holders.contains(key))
        .collect()
}

/// Open a request on `flight` and have `reporters` of its holders report `status`.
pub fn report_status(
    engine: &mut SuretyEngine,
    flight: &FlightKey,
    status: FlightStatus,
    reporters: usize,
) -> u8 {
    let index = match engine.request_flight_status(passenger(0), flight, FLIGHT_TIMESTAMP) {
        Ok(index) => index,
        Err(e) => panic!("fixture status request failed: {e}"),
    };
    for key in holders(engine, index).into_iter().take(reporters) {
        if let Err(e) = engine.submit_oracle_response(key, flight, index, status) {
            panic!("fixture oracle response failed: {e}");
        }
    }
    index
}
