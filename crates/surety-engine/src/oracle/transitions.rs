//! Pure Status Request Transitions
//!
//! Effect-free transition functions over [`StatusRequest`].
//!
//! ## Design Principles
//! 1. Pure functions: `fn(&state, params) -> Result<new state>`
//! 2. No side effects: crediting and flight updates happen in the calling layer
//! 3. Deterministic: same inputs always produce same outputs
//!
//! The caller commits the returned state only after every dependent effect of the
//! same transaction has succeeded.

use serde::{Deserialize, Serialize};

use surety_core::{FlightStatus, Result, SuretyError};

use super::state::{OracleNode, RequestPhase, StatusRequest};

/// Effect of a single oracle response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ResponseOutcome {
    /// Counted; quorum not reached
    Recorded { status: FlightStatus, tally: usize },
    /// Counted and reached quorum; the request is now finalized
    Finalized { status: FlightStatus },
    /// This oracle already responded to the request
    Duplicate,
    /// Request was already finalized; accepted without effect
    Ignored { final_status: FlightStatus },
}

/// Successor state and outcome of [`apply_response`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseTransition {
    /// Request state to commit
    pub state: StatusRequest,
    /// What the response did
    pub outcome: ResponseOutcome,
}

impl ResponseTransition {
    fn unchanged(state: &StatusRequest, outcome: ResponseOutcome) -> Self {
        Self {
            state: state.clone(),
            outcome,
        }
    }

    /// Whether committing `state` changes anything.
    pub fn is_mutation(&self) -> bool {
        matches!(
            self.outcome,
            ResponseOutcome::Recorded { .. } | ResponseOutcome::Finalized { .. }
        )
    }
}

/// Apply an oracle's status report to a request.
///
/// Preconditions:
/// - `index` is one of the oracle's assigned indexes
/// - the request has not expired
/// - `index` equals the request's selected index (unless already finalized)
///
/// Effects:
/// - records the oracle as a responder and increments the tally for `status`
/// - finalizes the request when that tally reaches `quorum`
pub fn apply_response(
    state: &StatusRequest,
    oracle: &OracleNode,
    index: u8,
    status: FlightStatus,
    quorum: usize,
) -> Result<ResponseTransition> {
    if !oracle.holds(index) {
        return Err(SuretyError::index_mismatch(
            index,
            format!("not assigned to oracle {}", oracle.key),
        ));
    }

    match state.phase {
        RequestPhase::Expired => {
            return Err(SuretyError::NoOpenRequest {
                flight: state.flight.clone(),
            })
        }
        RequestPhase::Finalized => {
            let final_status = state.final_status.unwrap_or(FlightStatus::Unknown);
            return Ok(ResponseTransition::unchanged(
                state,
                ResponseOutcome::Ignored { final_status },
            ));
        }
        RequestPhase::Open => {}
    }

    if index != state.index {
        return Err(SuretyError::index_mismatch(
            index,
            format!("request for {} expects index {}", state.flight, state.index),
        ));
    }

    if state.has_responded(&oracle.key) {
        return Ok(ResponseTransition::unchanged(
            state,
            ResponseOutcome::Duplicate,
        ));
    }

    let mut next = state.clone();
    next.responders.insert(oracle.key);
    let tally = next.tallies.entry(status).or_insert(0);
    *tally += 1;
    let tally = *tally;

    // An open request has no status at quorum, so only `status` can qualify here.
    let outcome = match next.quorum_status(quorum) {
        Some(agreed) => {
            next.phase = RequestPhase::Finalized;
            next.final_status = Some(agreed);
            ResponseOutcome::Finalized { status: agreed }
        }
        None => ResponseOutcome::Recorded { status, tally },
    };

    Ok(ResponseTransition {
        state: next,
        outcome,
    })
}

/// Close an open request that has outlived its TTL.
///
/// Preconditions:
/// - request is `Open`
/// - `now >= opened_at + ttl_secs`
pub fn expire_request(state: &StatusRequest, now: u64, ttl_secs: u64) -> Result<StatusRequest> {
    if !state.is_open() {
        return Err(SuretyError::NoOpenRequest {
            flight: state.flight.clone(),
        });
    }
    let expires_at = state.expires_at(ttl_secs);
    if now < expires_at {
        return Err(SuretyError::RequestNotExpired {
            flight: state.flight.clone(),
            expires_at,
        });
    }
    let mut next = state.clone();
    next.phase = RequestPhase::Expired;
    Ok(next)
}
