//! Oracle Consensus
//!
//! Registered oracle nodes, their assigned indexes and the per-flight status
//! requests. Response handling is split into a pure evaluation step
//! ([`OracleConsensus::evaluate_response`]) and a commit step so the engine can apply
//! payout crediting between the two and keep the whole transaction atomic.

pub mod indexes;
pub mod state;
pub mod transitions;

pub use indexes::IndexAllocator;
pub use state::{OracleNode, RequestPhase, StatusRequest};
pub use transitions::{apply_response, expire_request, ResponseOutcome, ResponseTransition};

use indexmap::IndexMap;
use std::collections::{BTreeMap, BTreeSet};

use surety_core::{
    AccountId, Amount, EconomicParams, FlightKey, FlightStatus, OracleConfig, Result,
    SuretyError,
};

use crate::flights::FlightRegistry;

/// Oracle registry and status requests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OracleConsensus {
    /// Registered nodes in registration order
    oracles: IndexMap<AccountId, OracleNode>,
    /// Latest request per flight
    requests: BTreeMap<FlightKey, StatusRequest>,
    allocator: IndexAllocator,
    registration_fee: Amount,
    quorum: usize,
    request_ttl_secs: u64,
}

impl OracleConsensus {
    /// Empty oracle registry using the fee and quorum from `params`.
    pub fn new(params: &EconomicParams, config: &OracleConfig) -> Self {
        Self {
            oracles: IndexMap::new(),
            requests: BTreeMap::new(),
            allocator: IndexAllocator::new(
                params.oracle_index_range,
                params.oracle_index_set_size,
                config.seed,
                config.request_index,
            ),
            registration_fee: params.oracle_registration_fee,
            quorum: params.response_quorum,
            request_ttl_secs: config.request_ttl_secs,
        }
    }

    /// Check that `oracle` may register with `fee`, without changing anything.
    pub fn check_registration(&self, oracle: &AccountId, fee: Amount) -> Result<()> {
        if self.oracles.contains_key(oracle) {
            return Err(SuretyError::AlreadyRegistered { account: *oracle });
        }
        if fee != self.registration_fee {
            return Err(SuretyError::IncorrectFee {
                expected: self.registration_fee,
                actual: fee,
            });
        }
        Ok(())
    }

    /// Register `oracle` and allocate its index set.
    pub fn register_oracle(&mut self, oracle: AccountId, fee: Amount) -> Result<&OracleNode> {
        self.check_registration(&oracle, fee)?;
        let indexes = self.allocator.allocate(&oracle);
        let node = OracleNode {
            key: oracle,
            indexes,
        };
        Ok(self.oracles.entry(oracle).or_insert(node))
    }

    /// Open a status request for a registered, not yet finalized flight.
    ///
    /// A flight has at most one open request. Expired requests are replaced.
    pub fn request_status(
        &mut self,
        flights: &FlightRegistry,
        requester: AccountId,
        flight: &FlightKey,
        now: u64,
    ) -> Result<&StatusRequest> {
        let registered = flights.require(flight)?;
        if self.requests.get(flight).is_some_and(StatusRequest::is_open) {
            return Err(SuretyError::RequestAlreadyOpen {
                flight: flight.clone(),
            });
        }
        if registered.is_finalized() {
            return Err(SuretyError::FlightStatusFinalized {
                flight: flight.clone(),
            });
        }

        let index = self.allocator.select_request_index(flight);
        let request = StatusRequest::new(flight.clone(), index, requester, now);
        self.requests.insert(flight.clone(), request);
        self.requests
            .get(flight)
            .ok_or_else(|| SuretyError::NoOpenRequest {
                flight: flight.clone(),
            })
    }

    /// Evaluate a response without applying it.
    pub fn evaluate_response(
        &self,
        oracle: &AccountId,
        flight: &FlightKey,
        index: u8,
        status: FlightStatus,
    ) -> Result<ResponseTransition> {
        let node = self
            .oracles
            .get(oracle)
            .ok_or(SuretyError::NotRegisteredOracle { oracle: *oracle })?;
        let request = self
            .requests
            .get(flight)
            .ok_or_else(|| SuretyError::NoOpenRequest {
                flight: flight.clone(),
            })?;
        apply_response(request, node, index, status, self.quorum)
    }

    /// Store the successor state of an evaluated response.
    pub fn commit(&mut self, transition: ResponseTransition) {
        if transition.is_mutation() {
            self.requests
                .insert(transition.state.flight.clone(), transition.state);
        }
    }

    /// Expire the open request on `flight` once its TTL has passed.
    pub fn expire(&mut self, flight: &FlightKey, now: u64) -> Result<&StatusRequest> {
        let request = self
            .requests
            .get(flight)
            .ok_or_else(|| SuretyError::NoOpenRequest {
                flight: flight.clone(),
            })?;
        let expired = expire_request(request, now, self.request_ttl_secs)?;
        self.requests.insert(flight.clone(), expired);
        self.requests
            .get(flight)
            .ok_or_else(|| SuretyError::NoOpenRequest {
                flight: flight.clone(),
            })
    }

    /// Indexes assigned to `oracle`, ascending.
    pub fn oracle_indexes(&self, oracle: &AccountId) -> Result<Vec<u8>> {
        self.oracles
            .get(oracle)
            .map(|node| node.indexes.iter().copied().collect())
            .ok_or(SuretyError::NotRegisteredOracle { oracle: *oracle })
    }

    /// Whether `oracle` has registered.
    pub fn is_registered_oracle(&self, oracle: &AccountId) -> bool {
        self.oracles.contains_key(oracle)
    }

    /// Registered node for `oracle`.
    pub fn oracle(&self, oracle: &AccountId) -> Option<&OracleNode> {
        self.oracles.get(oracle)
    }

    /// Registered oracles holding `index`.
    pub fn holders_of(&self, index: u8) -> BTreeSet<AccountId> {
        self.oracles
            .values()
            .filter(|node| node.holds(index))
            .map(|node| node.key)
            .collect()
    }

    /// Latest status request for `flight`, in any phase.
    pub fn request(&self, flight: &FlightKey) -> Option<&StatusRequest> {
        self.requests.get(flight)
    }

    /// Number of registered oracles.
    pub fn oracle_count(&self) -> usize {
        self.oracles.len()
    }

    /// Fee an oracle must attach to register.
    pub fn registration_fee(&self) -> Amount {
        self.registration_fee
    }

    /// Seconds after which an open request may be expired.
    pub fn request_ttl_secs(&self) -> u64 {
        self.request_ttl_secs
    }

    /// Index allocator, for coverage inspection.
    pub fn allocator(&self) -> &IndexAllocator {
        &self.allocator
    }
}
