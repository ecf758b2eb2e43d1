//! Transaction adapter
//!
//! The wire shape of a call: one tagged variant per mutating operation carrying the
//! caller, the attached value and the transaction timestamp where relevant.
//! [`SuretyEngine::apply`] dispatches a transaction and reports a [`Receipt`].

use serde::{Deserialize, Serialize};

use surety_core::{AccountId, Amount, FlightKey, FlightStatus, Result};

use crate::engine::SuretyEngine;
use crate::governance::NominationOutcome;
use crate::insurance::Policy;
use crate::oracle::ResponseOutcome;

/// A single externally ordered call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Transaction {
    /// Owner toggles the operational switch
    SetOperational {
        caller: AccountId,
        operational: bool,
    },
    /// Airline pays its participation fee
    FundAirline {
        caller: AccountId,
        value: Amount,
    },
    /// Funded airline nominates or votes for a candidate
    NominateAirline {
        caller: AccountId,
        name: String,
        candidate: AccountId,
        #[serde(default)]
        timestamp: u64,
    },
    /// Funded airline registers a flight
    RegisterFlight {
        caller: AccountId,
        designator: String,
        from: String,
        to: String,
        timestamp: u64,
    },
    /// Passenger insures a registered flight
    PurchaseInsurance {
        caller: AccountId,
        flight: FlightKey,
        premium: Amount,
    },
    /// Passenger withdraws its credited balance
    Withdraw {
        caller: AccountId,
    },
    /// Oracle registers with the registration fee attached
    RegisterOracle {
        caller: AccountId,
        fee: Amount,
    },
    /// Ask the oracles holding the selected index for a status
    RequestFlightStatus {
        caller: AccountId,
        flight: FlightKey,
        timestamp: u64,
    },
    /// Oracle reports a status for an open request
    SubmitOracleResponse {
        caller: AccountId,
        flight: FlightKey,
        index: u8,
        status: FlightStatus,
    },
    /// Close an open request past its TTL
    ExpireStatusRequest {
        caller: AccountId,
        flight: FlightKey,
        timestamp: u64,
    },
}

impl Transaction {
    /// Account submitting the transaction.
    pub fn caller(&self) -> AccountId {
        match self {
            Transaction::SetOperational { caller, .. }
            | Transaction::FundAirline { caller, .. }
            | Transaction::NominateAirline { caller, .. }
            | Transaction::RegisterFlight { caller, .. }
            | Transaction::PurchaseInsurance { caller, .. }
            | Transaction::Withdraw { caller }
            | Transaction::RegisterOracle { caller, .. }
            | Transaction::RequestFlightStatus { caller, .. }
            | Transaction::SubmitOracleResponse { caller, .. }
            | Transaction::ExpireStatusRequest { caller, .. } => *caller,
        }
    }

    /// Operation name for logging.
    pub fn name(&self) -> &'static str {
        match self {
            Transaction::SetOperational { .. } => "set_operational",
            Transaction::FundAirline { .. } => "fund_airline",
            Transaction::NominateAirline { .. } => "nominate_airline",
            Transaction::RegisterFlight { .. } => "register_flight",
            Transaction::PurchaseInsurance { .. } => "purchase_insurance",
            Transaction::Withdraw { .. } => "withdraw",
            Transaction::RegisterOracle { .. } => "register_oracle",
            Transaction::RequestFlightStatus { .. } => "request_flight_status",
            Transaction::SubmitOracleResponse { .. } => "submit_oracle_response",
            Transaction::ExpireStatusRequest { .. } => "expire_status_request",
        }
    }
}

/// Success value of an applied transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "receipt", rename_all = "snake_case")]
pub enum Receipt {
    /// New value of the operational switch
    OperationalSet { operational: bool },
    AirlineFunded { airline: AccountId },
    Nomination { outcome: NominationOutcome },
    FlightRegistered { flight: FlightKey },
    PolicyPurchased { policy: Policy },
    /// Amount paid out to the caller
    Withdrawn { amount: Amount },
    /// Indexes assigned to the new oracle
    OracleRegistered { indexes: Vec<u8> },
    /// Index selected for the new request
    RequestOpened { flight: FlightKey, index: u8 },
    OracleResponse { outcome: ResponseOutcome },
    RequestExpired { flight: FlightKey },
}

impl SuretyEngine {
    /// Dispatch a transaction to the matching operation.
    pub fn apply(&mut self, tx: Transaction) -> Result<Receipt> {
        tracing::trace!(op = tx.name(), caller = %tx.caller(), "Applying transaction");
        match tx {
            Transaction::SetOperational {
                caller,
                operational,
            } => {
                self.set_operational(caller, operational)?;
                Ok(Receipt::OperationalSet { operational })
            }
            Transaction::FundAirline { caller, value } => {
                self.fund_airline(caller, value)?;
                Ok(Receipt::AirlineFunded { airline: caller })
            }
            Transaction::NominateAirline {
                caller,
                name,
                candidate,
                timestamp,
            } => {
                let outcome = self.nominate_airline(caller, &name, candidate, timestamp)?;
                Ok(Receipt::Nomination { outcome })
            }
            Transaction::RegisterFlight {
                caller,
                designator,
                from,
                to,
                timestamp,
            } => {
                let flight = self.register_flight(caller, &designator, &from, &to, timestamp)?;
                Ok(Receipt::FlightRegistered { flight })
            }
            Transaction::PurchaseInsurance {
                caller,
                flight,
                premium,
            } => {
                let policy = self.purchase_insurance(caller, &flight, premium)?;
                Ok(Receipt::PolicyPurchased { policy })
            }
            Transaction::Withdraw { caller } => {
                let amount = self.withdraw(caller)?;
                Ok(Receipt::Withdrawn { amount })
            }
            Transaction::RegisterOracle { caller, fee } => {
                let indexes = self.register_oracle(caller, fee)?;
                Ok(Receipt::OracleRegistered { indexes })
            }
            Transaction::RequestFlightStatus {
                caller,
                flight,
                timestamp,
            } => {
                let index = self.request_flight_status(caller, &flight, timestamp)?;
                Ok(Receipt::RequestOpened { flight, index })
            }
            Transaction::SubmitOracleResponse {
                caller,
                flight,
                index,
                status,
            } => {
                let outcome = self.submit_oracle_response(caller, &flight, index, status)?;
                Ok(Receipt::OracleResponse { outcome })
            }
            Transaction::ExpireStatusRequest {
                caller,
                flight,
                timestamp,
            } => {
                self.expire_status_request(caller, &flight, timestamp)?;
                Ok(Receipt::RequestExpired { flight })
            }
        }
    }
}
