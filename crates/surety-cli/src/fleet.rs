//! Simulated oracle fleet
//!
//! Registers a set of oracle nodes and answers every `OracleRequestOpened` notification:
//! one status is drawn per request and every node holding the request's index reports it.
//! Status draws come from a seeded ChaCha stream so simulations are reproducible.

use anyhow::{Context, Result};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::Serialize;
use tracing::{debug, warn};

use surety_core::{AccountId, FlightKey, FlightStatus, SuretyEvent};
use surety_engine::{ResponseOutcome, SuretyEngine};

/// One oracle submission and what the engine made of it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FleetResponse {
    pub oracle: AccountId,
    pub flight: FlightKey,
    pub index: u8,
    pub status: FlightStatus,
    pub outcome: Option<ResponseOutcome>,
}

#[derive(Debug)]
pub struct OracleFleet {
    nodes: Vec<(AccountId, Vec<u8>)>,
    rng: ChaCha8Rng,
    /// Report this status instead of drawing one
    fixed_status: Option<FlightStatus>,
}

impl OracleFleet {
    /// Register `count` oracles labelled `oracle-0..count`, each paying the configured fee.
    pub fn register(engine: &mut SuretyEngine, count: usize, seed: u64) -> Result<Self> {
        let fee = engine.config().params.oracle_registration_fee;
        let mut nodes = Vec::with_capacity(count);
        for n in 0..count {
            let key = AccountId::from_label(&format!("oracle-{n}"));
            let indexes = engine
                .register_oracle(key, fee)
                .with_context(|| format!("registering oracle-{n}"))?;
            nodes.push((key, indexes));
        }
        Ok(Self {
            nodes,
            rng: ChaCha8Rng::seed_from_u64(seed),
            fixed_status: None,
        })
    }

    /// Always report `status`.
    pub fn with_fixed_status(mut self, status: FlightStatus) -> Self {
        self.fixed_status = Some(status);
        self
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    fn draw_status(&mut self) -> FlightStatus {
        match self.fixed_status {
            Some(status) => status,
            None => FlightStatus::ALL[self.rng.gen_range(0..FlightStatus::ALL.len())],
        }
    }

    /// Answer every request-opened notification in `events`.
    ///
    /// Rejected submissions are logged and recorded with no outcome; they never abort
    /// the fleet.
    pub fn respond(
        &mut self,
        engine: &mut SuretyEngine,
        events: &[SuretyEvent],
    ) -> Vec<FleetResponse> {
        let mut responses = Vec::new();
        for event in events {
            let SuretyEvent::OracleRequestOpened { flight, index, .. } = event else {
                continue;
            };
            let status = self.draw_status();
            for (oracle, indexes) in &self.nodes {
                if !indexes.contains(index) {
                    continue;
                }
                let outcome = match engine.submit_oracle_response(*oracle, flight, *index, status)
                {
                    Ok(outcome) => {
                        debug!(oracle = %oracle, flight = %flight, status = %status, "Oracle responded");
                        Some(outcome)
                    }
                    Err(e) => {
                        warn!(oracle = %oracle, flight = %flight, error = %e, "Oracle response rejected");
                        None
                    }
                };
                responses.push(FleetResponse {
                    oracle: *oracle,
                    flight: flight.clone(),
                    index: *index,
                    status,
                    outcome,
                });
            }
        }
        responses
    }
}
