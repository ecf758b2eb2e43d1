//! Oracle Consensus State Definitions
//!
//! Effect-free structures for registered oracle nodes and per-flight status requests.
//! A request moves `Open → Finalized` or `Open → Expired`; both are terminal.

// BTree collections keep tallies and responder sets in a deterministic order so two
// replicas applying the same transaction log hold identical state.
use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use surety_core::{AccountId, FlightKey, FlightStatus};

/// Request lifecycle phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestPhase {
    /// Accepting responses
    Open,
    /// A status reached quorum and was written to the flight
    Finalized,
    /// Closed by an explicit expiry transaction without quorum
    Expired,
}

/// Registered oracle node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OracleNode {
    /// Oracle account
    pub key: AccountId,
    /// Indexes this node answers for
    pub indexes: BTreeSet<u8>,
}

impl OracleNode {
    /// Whether `index` is in this node's set.
    pub fn holds(&self, index: u8) -> bool {
        self.indexes.contains(&index)
    }
}

/// Open solicitation for a flight's status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusRequest {
    /// Flight whose status is requested
    pub flight: FlightKey,
    /// Only oracles holding this index may respond
    pub index: u8,
    /// Account that opened the request
    pub requester: AccountId,
    /// Transaction timestamp at which the request was opened
    pub opened_at: u64,
    /// Lifecycle position
    pub phase: RequestPhase,
    /// Oracles whose response has been counted
    pub responders: BTreeSet<AccountId>,
    /// Reported status → number of distinct matching responses
    pub tallies: BTreeMap<FlightStatus, usize>,
    /// Set once the request finalizes
    pub final_status: Option<FlightStatus>,
}

impl StatusRequest {
    /// Create a new open request with empty tallies.
    pub fn new(flight: FlightKey, index: u8, requester: AccountId, opened_at: u64) -> Self {
        Self {
            flight,
            index,
            requester,
            opened_at,
            phase: RequestPhase::Open,
            responders: BTreeSet::new(),
            tallies: BTreeMap::new(),
            final_status: None,
        }
    }

    /// Whether `oracle` has already been counted.
    pub fn has_responded(&self, oracle: &AccountId) -> bool {
        self.responders.contains(oracle)
    }

    /// Responses reporting `status`.
    pub fn tally_for(&self, status: FlightStatus) -> usize {
        self.tallies.get(&status).copied().unwrap_or(0)
    }

    /// First status (in code order) whose tally has reached `quorum`.
    pub fn quorum_status(&self, quorum: usize) -> Option<FlightStatus> {
        self.tallies
            .iter()
            .find(|(_, &count)| count >= quorum)
            .map(|(status, _)| *status)
    }

    /// Whether responses are still being counted.
    pub fn is_open(&self) -> bool {
        self.phase == RequestPhase::Open
    }

    /// Finalized or expired.
    pub fn is_terminal(&self) -> bool {
        matches!(self.phase, RequestPhase::Finalized | RequestPhase::Expired)
    }

    /// Earliest timestamp at which the request may be expired.
    pub fn expires_at(&self, ttl_secs: u64) -> u64 {
        self.opened_at.saturating_add(ttl_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> StatusRequest {
        let airline = AccountId::new([2u8; 20]);
        StatusRequest::new(
            FlightKey::new(airline, "5678", 1_000),
            4,
            AccountId::new([9u8; 20]),
            50,
        )
    }

    #[test]
    fn test_new_request_is_open_and_empty() {
        let req = request();
        assert!(req.is_open());
        assert!(!req.is_terminal());
        assert!(req.tallies.is_empty());
        assert_eq!(req.final_status, None);
        assert_eq!(req.expires_at(60), 110);
    }

    #[test]
    fn test_quorum_status() {
        let mut req = request();
        req.tallies.insert(FlightStatus::OnTime, 2);
        req.tallies.insert(FlightStatus::LateAirline, 1);
        assert_eq!(req.quorum_status(3), None);

        req.tallies.insert(FlightStatus::LateAirline, 3);
        assert_eq!(req.quorum_status(3), Some(FlightStatus::LateAirline));
        assert_eq!(req.tally_for(FlightStatus::OnTime), 2);
        assert_eq!(req.tally_for(FlightStatus::LateOther), 0);
    }

    #[test]
    fn test_terminal_phases() {
        let mut req = request();
        req.phase = RequestPhase::Finalized;
        assert!(req.is_terminal());
        req.phase = RequestPhase::Expired;
        assert!(req.is_terminal());
        assert!(!req.is_open());
    }
}
