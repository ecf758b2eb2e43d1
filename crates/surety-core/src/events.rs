//! Outbound notifications
//!
//! The engine appends one event per accepted state change to an [`EventQueue`]. The
//! relaying layer drains the queue out-of-band; the engine never waits on a consumer.
//! `OracleRequestOpened` and `FlightStatusFinalized` are the two notifications oracle
//! servers and clients subscribe to; the rest form an audit trail.

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

use crate::amount::Amount;
use crate::flight::{FlightKey, FlightStatus};
use crate::identifiers::AccountId;

/// State-change notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum SuretyEvent {
    // ========================================================================
    // Consensus notifications
    // ========================================================================
    /// A status request was opened; oracles holding `index` should respond
    OracleRequestOpened {
        flight: FlightKey,
        index: u8,
        opened_at: u64,
    },

    /// A status request reached quorum
    FlightStatusFinalized {
        flight: FlightKey,
        status: FlightStatus,
    },

    /// A status request was closed without quorum
    StatusRequestExpired { flight: FlightKey },

    /// An oracle report was counted
    OracleReportAccepted {
        flight: FlightKey,
        oracle: AccountId,
        status: FlightStatus,
        tally: usize,
    },

    OracleRegistered { oracle: AccountId, indexes: Vec<u8> },

    // ========================================================================
    // Governance
    // ========================================================================
    AirlineRegistered {
        airline: AccountId,
        name: String,
        votes: usize,
    },

    AirlineFunded { airline: AccountId, amount: Amount },

    NominationVoteRecorded {
        candidate: AccountId,
        voter: AccountId,
        votes: usize,
        registered: usize,
    },

    FlightRegistered { flight: FlightKey },

    // ========================================================================
    // Insurance
    // ========================================================================
    InsurancePurchased {
        passenger: AccountId,
        flight: FlightKey,
        premium: Amount,
    },

    PayoutCredited {
        passenger: AccountId,
        flight: FlightKey,
        amount: Amount,
    },

    Withdrawn { passenger: AccountId, amount: Amount },

    OperationalStatusChanged { operational: bool },
}

impl SuretyEvent {
    /// Short name for logging.
    pub fn name(&self) -> &'static str {
        match self {
            SuretyEvent::OracleRequestOpened { .. } => "oracle_request_opened",
            SuretyEvent::FlightStatusFinalized { .. } => "flight_status_finalized",
            SuretyEvent::StatusRequestExpired { .. } => "status_request_expired",
            SuretyEvent::OracleReportAccepted { .. } => "oracle_report_accepted",
            SuretyEvent::OracleRegistered { .. } => "oracle_registered",
            SuretyEvent::AirlineRegistered { .. } => "airline_registered",
            SuretyEvent::AirlineFunded { .. } => "airline_funded",
            SuretyEvent::NominationVoteRecorded { .. } => "nomination_vote_recorded",
            SuretyEvent::FlightRegistered { .. } => "flight_registered",
            SuretyEvent::InsurancePurchased { .. } => "insurance_purchased",
            SuretyEvent::PayoutCredited { .. } => "payout_credited",
            SuretyEvent::Withdrawn { .. } => "withdrawn",
            SuretyEvent::OperationalStatusChanged { .. } => "operational_status_changed",
        }
    }
}

/// FIFO of events awaiting the relaying layer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventQueue {
    pending: VecDeque<SuretyEvent>,
}

impl EventQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, event: SuretyEvent) {
        self.pending.push_back(event);
    }

    /// Remove and return every pending event, oldest first.
    pub fn drain(&mut self) -> Vec<SuretyEvent> {
        self.pending.drain(..).collect()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}
