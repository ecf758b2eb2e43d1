//! Engine facade
//!
//! [`SuretyEngine`] owns every registry and applies transactions one at a time through
//! `&mut self`. Each operation takes the caller identity explicitly, validates fully
//! before writing, and appends notifications to the outbound [`EventQueue`]. A failed
//! operation leaves the engine exactly as it was.

use tracing::{debug, info, warn};

use surety_core::{
    AccountId, Amount, ConfigError, EngineConfig, EventQueue, FlightKey, FlightStatus, Result,
    SuretyError, SuretyEvent,
};

use crate::flights::{Flight, FlightRegistry};
use crate::governance::{AirlineRegistry, NominationOutcome};
use crate::insurance::{InsuranceLedger, Policy, Treasury};
use crate::oracle::{OracleConsensus, ResponseOutcome, StatusRequest};

/// Sequential flight-delay insurance engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuretyEngine {
    config: EngineConfig,
    operational: bool,
    governance: AirlineRegistry,
    flights: FlightRegistry,
    ledger: InsuranceLedger,
    oracles: OracleConsensus,
    events: EventQueue,
}

impl SuretyEngine {
    /// Build an engine from a validated configuration.
    ///
    /// The founding airline is registered but not funded.
    pub fn new(config: EngineConfig) -> std::result::Result<Self, ConfigError> {
        config.validate()?;
        let params = &config.params;
        let governance = AirlineRegistry::with_founder(
            config.founding_airline.key,
            config.founding_airline.name.clone(),
            params.airline_fee,
            params.min_airlines_for_consensus,
        );
        let ledger = InsuranceLedger::new(params.max_premium, params.payout_ratio);
        let oracles = OracleConsensus::new(params, &config.oracle);
        info!(
            owner = %config.owner,
            founder = %config.founding_airline.key,
            "Surety engine initialized"
        );
        Ok(Self {
            operational: true,
            governance,
            flights: FlightRegistry::new(),
            ledger,
            oracles,
            events: EventQueue::new(),
            config,
        })
    }

    fn ensure_operational(&self) -> Result<()> {
        if self.operational {
            Ok(())
        } else {
            warn!("Rejected mutation while paused");
            Err(SuretyError::NotOperational)
        }
    }

    // ========================================================================
    // Operational switch
    // ========================================================================

    /// Pause or resume the engine. Owner only.
    pub fn set_operational(&mut self, caller: AccountId, operational: bool) -> Result<()> {
        if caller != self.config.owner {
            warn!(caller = %caller, "Non-owner attempted to change operational status");
            return Err(SuretyError::NotOwner { caller });
        }
        if self.operational != operational {
            self.operational = operational;
            self.events
                .push(SuretyEvent::OperationalStatusChanged { operational });
            info!(operational, "Operational status changed");
        }
        Ok(())
    }

    /// Whether mutating operations are currently accepted.
    pub fn is_operational(&self) -> bool {
        self.operational
    }

    // ========================================================================
    // Airline governance
    // ========================================================================

    /// Pay the airline participation fee.
    pub fn fund_airline(&mut self, caller: AccountId, value: Amount) -> Result<()> {
        self.ensure_operational()?;
        let treasury = self.ledger.treasury().with_airline_fee(value)?;
        self.governance
            .fund(caller, value)
            .inspect_err(|e| debug!(airline = %caller, error = %e, "Funding rejected"))?;
        self.ledger.replace_treasury(treasury);
        self.events.push(SuretyEvent::AirlineFunded {
            airline: caller,
            amount: value,
        });
        info!(airline = %caller, amount = %value, "Airline funded");
        Ok(())
    }

    /// Nominate `candidate`, or vote for an open nomination.
    pub fn nominate_airline(
        &mut self,
        caller: AccountId,
        name: &str,
        candidate: AccountId,
        now: u64,
    ) -> Result<NominationOutcome> {
        self.ensure_operational()?;
        let registered = self.governance.registered_count();
        let outcome = self
            .governance
            .nominate(caller, name, candidate, now)
            .inspect_err(|e| debug!(caller = %caller, candidate = %candidate, error = %e, "Nomination rejected"))?;

        match &outcome {
            NominationOutcome::Registered { airline, votes } => {
                let name = self
                    .governance
                    .airline_name(airline)
                    .unwrap_or(name)
                    .to_string();
                info!(airline = %airline, votes, "Airline registered");
                self.events.push(SuretyEvent::AirlineRegistered {
                    airline: *airline,
                    name,
                    votes: *votes,
                });
            }
            NominationOutcome::VoteRecorded {
                candidate,
                votes,
                required,
            } => {
                debug!(candidate = %candidate, voter = %caller, votes, required, "Vote recorded");
                self.events.push(SuretyEvent::NominationVoteRecorded {
                    candidate: *candidate,
                    voter: caller,
                    votes: *votes,
                    registered,
                });
            }
            NominationOutcome::DuplicateVote { candidate, .. } => {
                debug!(candidate = %candidate, voter = %caller, "Duplicate vote ignored");
            }
        }
        Ok(outcome)
    }

    /// Whether `airline` has been admitted.
    pub fn is_airline_registered(&self, airline: &AccountId) -> bool {
        self.governance.is_registered(airline)
    }

    /// Whether `airline` is registered and funded.
    pub fn is_airline_funded(&self, airline: &AccountId) -> bool {
        self.governance.is_funded(airline)
    }

    /// Registered airlines in admission order.
    pub fn list_registered_airlines(&self) -> Vec<AccountId> {
        self.governance.list_registered()
    }

    /// Name of a registered airline.
    pub fn airline_name(&self, airline: &AccountId) -> Option<&str> {
        self.governance.airline_name(airline)
    }

    /// Votes collected by an open nomination.
    pub fn nomination_votes(&self, candidate: &AccountId) -> usize {
        self.governance.nomination_votes(candidate)
    }

    // ========================================================================
    // Flights
    // ========================================================================

    /// Register a flight operated by the calling airline.
    pub fn register_flight(
        &mut self,
        caller: AccountId,
        designator: &str,
        from: &str,
        to: &str,
        timestamp: u64,
    ) -> Result<FlightKey> {
        self.ensure_operational()?;
        let key = self
            .flights
            .register(&self.governance, caller, designator, from, to, timestamp)
            .inspect_err(|e| debug!(airline = %caller, designator, error = %e, "Flight registration rejected"))?
            .key
            .clone();
        info!(flight = %key, "Flight registered");
        self.events
            .push(SuretyEvent::FlightRegistered { flight: key.clone() });
        Ok(key)
    }

    /// Whether `flight` is registered.
    pub fn is_flight_registered(&self, flight: &FlightKey) -> bool {
        self.flights.is_registered(flight)
    }

    /// Registered flight, including its status.
    pub fn flight(&self, flight: &FlightKey) -> Option<&Flight> {
        self.flights.get(flight)
    }

    /// Flights registered by `airline`.
    pub fn flights_of(&self, airline: &AccountId) -> Vec<&Flight> {
        self.flights.flights_of(airline)
    }

    // ========================================================================
    // Insurance
    // ========================================================================

    /// Buy insurance on `flight` with the attached premium.
    pub fn purchase_insurance(
        &mut self,
        caller: AccountId,
        flight: &FlightKey,
        premium: Amount,
    ) -> Result<Policy> {
        self.ensure_operational()?;
        let policy = self
            .ledger
            .purchase(&self.flights, caller, flight, premium)
            .inspect_err(|e| debug!(passenger = %caller, flight = %flight, error = %e, "Purchase rejected"))?
            .clone();
        info!(passenger = %caller, flight = %flight, premium = %premium, "Insurance purchased");
        self.events.push(SuretyEvent::InsurancePurchased {
            passenger: caller,
            flight: flight.clone(),
            premium,
        });
        Ok(policy)
    }

    /// Withdraw the caller's entire credited balance.
    pub fn withdraw(&mut self, caller: AccountId) -> Result<Amount> {
        self.ensure_operational()?;
        let amount = self
            .ledger
            .withdraw(caller)
            .inspect_err(|e| debug!(passenger = %caller, error = %e, "Withdrawal rejected"))?;
        info!(passenger = %caller, amount = %amount, "Balance withdrawn");
        self.events.push(SuretyEvent::Withdrawn {
            passenger: caller,
            amount,
        });
        Ok(amount)
    }

    /// Credited balance of `passenger`.
    pub fn balance_of(&self, passenger: &AccountId) -> Amount {
        self.ledger.balance_of(passenger)
    }

    /// Amount the next `withdraw` by `passenger` would pay.
    pub fn pending_amount(&self, passenger: &AccountId) -> Amount {
        self.ledger.pending_amount(passenger)
    }

    /// Whether `passenger` holds a policy on `flight`.
    pub fn is_insured(&self, passenger: &AccountId, flight: &FlightKey) -> bool {
        self.ledger.is_insured(passenger, flight)
    }

    /// Policy held by `passenger` on `flight`.
    pub fn policy(&self, passenger: &AccountId, flight: &FlightKey) -> Option<&Policy> {
        self.ledger.policy(passenger, flight)
    }

    /// Running value totals.
    pub fn treasury(&self) -> Treasury {
        self.ledger.treasury()
    }

    // ========================================================================
    // Oracle consensus
    // ========================================================================

    /// Register the caller as an oracle node, returning its assigned indexes.
    pub fn register_oracle(&mut self, caller: AccountId, fee: Amount) -> Result<Vec<u8>> {
        self.ensure_operational()?;
        let treasury = self
            .oracles
            .check_registration(&caller, fee)
            .and_then(|()| self.ledger.treasury().with_oracle_fee(fee))
            .inspect_err(|e| debug!(oracle = %caller, error = %e, "Oracle registration rejected"))?;
        let indexes: Vec<u8> = self
            .oracles
            .register_oracle(caller, fee)?
            .indexes
            .iter()
            .copied()
            .collect();
        self.ledger.replace_treasury(treasury);
        info!(oracle = %caller, indexes = ?indexes, "Oracle registered");
        self.events.push(SuretyEvent::OracleRegistered {
            oracle: caller,
            indexes: indexes.clone(),
        });
        Ok(indexes)
    }

    /// Open a status request for `flight`, returning the selected index.
    pub fn request_flight_status(
        &mut self,
        caller: AccountId,
        flight: &FlightKey,
        now: u64,
    ) -> Result<u8> {
        self.ensure_operational()?;
        let index = self
            .oracles
            .request_status(&self.flights, caller, flight, now)
            .inspect_err(|e| debug!(flight = %flight, error = %e, "Status request rejected"))?
            .index;
        info!(flight = %flight, index, requester = %caller, "Oracle request opened");
        self.events.push(SuretyEvent::OracleRequestOpened {
            flight: flight.clone(),
            index,
            opened_at: now,
        });
        Ok(index)
    }

    /// Count an oracle's status report.
    ///
    /// When the report completes a quorum the status is written to the flight and, for
    /// `LateAirline`, every uncredited policy is credited before the request is closed.
    pub fn submit_oracle_response(
        &mut self,
        caller: AccountId,
        flight: &FlightKey,
        index: u8,
        status: FlightStatus,
    ) -> Result<ResponseOutcome> {
        self.ensure_operational()?;
        let transition = self
            .oracles
            .evaluate_response(&caller, flight, index, status)
            .inspect_err(|e| debug!(oracle = %caller, flight = %flight, index, error = %e, "Oracle response rejected"))?;
        let outcome = transition.outcome;

        let mut credits = Vec::new();
        if let ResponseOutcome::Finalized { status } = outcome {
            self.flights.require(flight)?;
            if status.pays_out() {
                credits = self.ledger.credit_payout(flight)?;
            }
            self.flights.set_status(flight, status)?;
        }
        self.oracles.commit(transition);

        match outcome {
            ResponseOutcome::Recorded { status, tally } => {
                debug!(oracle = %caller, flight = %flight, status = %status, tally, "Oracle report accepted");
                self.events.push(SuretyEvent::OracleReportAccepted {
                    flight: flight.clone(),
                    oracle: caller,
                    status,
                    tally,
                });
            }
            ResponseOutcome::Finalized { status } => {
                let tally = self
                    .oracles
                    .request(flight)
                    .map(|r| r.tally_for(status))
                    .unwrap_or_default();
                self.events.push(SuretyEvent::OracleReportAccepted {
                    flight: flight.clone(),
                    oracle: caller,
                    status,
                    tally,
                });
                for credit in &credits {
                    self.events.push(SuretyEvent::PayoutCredited {
                        passenger: credit.passenger,
                        flight: credit.flight.clone(),
                        amount: credit.amount,
                    });
                }
                self.events.push(SuretyEvent::FlightStatusFinalized {
                    flight: flight.clone(),
                    status,
                });
                info!(flight = %flight, status = %status, credited = credits.len(), "Flight status finalized");
            }
            ResponseOutcome::Duplicate => {
                debug!(oracle = %caller, flight = %flight, "Duplicate oracle response ignored");
            }
            ResponseOutcome::Ignored { final_status } => {
                debug!(oracle = %caller, flight = %flight, final_status = %final_status, "Response to finalized request ignored");
            }
        }
        Ok(outcome)
    }

    /// Close an open request whose TTL has elapsed.
    pub fn expire_status_request(
        &mut self,
        caller: AccountId,
        flight: &FlightKey,
        now: u64,
    ) -> Result<()> {
        self.ensure_operational()?;
        self.oracles
            .expire(flight, now)
            .inspect_err(|e| debug!(flight = %flight, error = %e, "Expiry rejected"))?;
        info!(flight = %flight, caller = %caller, "Status request expired");
        self.events.push(SuretyEvent::StatusRequestExpired {
            flight: flight.clone(),
        });
        Ok(())
    }

    /// Indexes assigned to a registered oracle.
    pub fn oracle_indexes(&self, oracle: &AccountId) -> Result<Vec<u8>> {
        self.oracles.oracle_indexes(oracle)
    }

    /// Whether `oracle` has registered.
    pub fn is_registered_oracle(&self, oracle: &AccountId) -> bool {
        self.oracles.is_registered_oracle(oracle)
    }

    /// Latest status request for `flight`.
    pub fn status_request(&self, flight: &FlightKey) -> Option<&StatusRequest> {
        self.oracles.request(flight)
    }

    // ========================================================================
    // Component access
    // ========================================================================

    /// Configuration the engine was built with.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Account allowed to toggle the operational switch.
    pub fn owner(&self) -> AccountId {
        self.config.owner
    }

    /// Airline governance state.
    pub fn governance(&self) -> &AirlineRegistry {
        &self.governance
    }

    /// Flight registry.
    pub fn flights(&self) -> &FlightRegistry {
        &self.flights
    }

    /// Insurance ledger.
    pub fn ledger(&self) -> &InsuranceLedger {
        &self.ledger
    }

    /// Oracle consensus state.
    pub fn oracles(&self) -> &OracleConsensus {
        &self.oracles
    }

    /// Events not yet handed to the relaying layer.
    pub fn pending_events(&self) -> &EventQueue {
        &self.events
    }

    /// Hand every queued event to the relaying layer.
    pub fn drain_events(&mut self) -> Vec<SuretyEvent> {
        self.events.drain()
    }
}
