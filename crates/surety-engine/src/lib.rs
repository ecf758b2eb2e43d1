//! # Surety Engine
//!
//! Sequential state machine for flight-delay insurance: airline governance, the
//! flight registry, the insurance ledger and oracle consensus, composed behind the
//! [`SuretyEngine`] facade.
//!
//! ## Architecture
//!
//! - **governance**: airline admission by direct registration or majority vote
//! - **flights**: flights registered by funded airlines
//! - **insurance**: policies, credited balances and pull-based withdrawal
//! - **oracle**: oracle nodes, status requests and quorum (pure state + transitions)
//! - **engine**: the facade applying one operation at a time with atomic effects
//! - **transaction**: tagged wire shape of a call and its receipt
//!
//! Transactions arrive in an external total order; the engine never blocks and never
//! spawns work. Notifications are appended to an outbound queue drained by the caller.

#![forbid(unsafe_code)]

pub mod engine;
pub mod flights;
pub mod governance;
pub mod insurance;
pub mod oracle;
pub mod transaction;

/// Fixtures shared by unit and integration tests
#[doc(hidden)]
pub mod test_utils;

pub use engine::SuretyEngine;
pub use flights::{Flight, FlightRegistry};
pub use governance::{
    required_votes, vote_threshold_met, Airline, AirlineRegistry, Nomination, NominationOutcome,
};
pub use insurance::{InsuranceLedger, PayoutCredit, Policy, Treasury};
pub use oracle::{
    IndexAllocator, OracleConsensus, OracleNode, RequestPhase, ResponseOutcome,
    ResponseTransition, StatusRequest,
};
pub use transaction::{Receipt, Transaction};
