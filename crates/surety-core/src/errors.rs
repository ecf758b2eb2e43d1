//! Unified error type for engine operations
//!
//! Every rejected transaction returns exactly one `SuretyError`. Variants are grouped
//! into five kinds so the relaying layer can map failures without matching every
//! variant; `code()` gives a stable identifier for logs and the wire.

use serde::{Deserialize, Serialize};

use crate::amount::Amount;
use crate::flight::FlightKey;
use crate::identifiers::AccountId;

/// Coarse failure classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Caller lacks the funded/registered/owner capability
    Unauthorized,
    /// Referenced airline, flight, policy, request or oracle does not exist
    NotFound,
    /// Duplicate registration, duplicate policy, already funded
    Conflict,
    /// Wrong fee, premium over cap or zero, arithmetic overflow
    InvalidAmount,
    /// Entity not in the lifecycle state the operation requires
    InvalidState,
}

/// Rejection reasons for engine operations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
pub enum SuretyError {
    // Unauthorized
    #[error("{caller} is not authorized: {reason}")]
    NotAuthorized { caller: AccountId, reason: String },

    #[error("airline {airline} has not paid the participation fee")]
    NotFunded { airline: AccountId },

    #[error("{caller} is not the contract owner")]
    NotOwner { caller: AccountId },

    #[error("oracle {oracle} is not registered")]
    NotRegisteredOracle { oracle: AccountId },

    // NotFound
    #[error("airline {airline} is not registered")]
    AirlineNotRegistered { airline: AccountId },

    #[error("flight {flight} is not registered")]
    FlightNotRegistered { flight: FlightKey },

    #[error("no open status request for flight {flight}")]
    NoOpenRequest { flight: FlightKey },

    // Conflict
    #[error("airline {airline} has already paid the participation fee")]
    AlreadyFunded { airline: AccountId },

    #[error("{account} is already registered")]
    AlreadyRegistered { account: AccountId },

    #[error("flight {flight} is already registered")]
    DuplicateFlight { flight: FlightKey },

    #[error("passenger {passenger} already holds a policy on flight {flight}")]
    AlreadyInsured {
        passenger: AccountId,
        flight: FlightKey,
    },

    #[error("a status request for flight {flight} is already open")]
    RequestAlreadyOpen { flight: FlightKey },

    // InvalidAmount
    #[error("incorrect fee: expected {expected}, got {actual}")]
    IncorrectFee { expected: Amount, actual: Amount },

    #[error("premium {premium} exceeds the cap of {cap}")]
    PremiumExceedsCap { premium: Amount, cap: Amount },

    #[error("a non-zero premium is required")]
    PremiumRequired,

    #[error("amount overflow while {context}")]
    AmountOverflow { context: String },

    #[error("unknown flight status code {code}")]
    InvalidStatusCode { code: u8 },

    // InvalidState
    #[error("passenger {passenger} has nothing to withdraw")]
    NothingToWithdraw { passenger: AccountId },

    #[error("index {index} does not match: {reason}")]
    IndexMismatch { index: u8, reason: String },

    #[error("contract is not operational")]
    NotOperational,

    #[error("flight {flight} already has a finalized status")]
    FlightStatusFinalized { flight: FlightKey },

    #[error("status request for flight {flight} cannot expire before {expires_at}")]
    RequestNotExpired { flight: FlightKey, expires_at: u64 },
}

impl SuretyError {
    /// Create a not-authorized error
    pub fn not_authorized(caller: AccountId, reason: impl Into<String>) -> Self {
        Self::NotAuthorized {
            caller,
            reason: reason.into(),
        }
    }

    /// Create an overflow error
    pub fn overflow(context: impl Into<String>) -> Self {
        Self::AmountOverflow {
            context: context.into(),
        }
    }

    /// Create an index mismatch error
    pub fn index_mismatch(index: u8, reason: impl Into<String>) -> Self {
        Self::IndexMismatch {
            index,
            reason: reason.into(),
        }
    }

    /// Taxonomy class of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            SuretyError::NotAuthorized { .. }
            | SuretyError::NotFunded { .. }
            | SuretyError::NotOwner { .. }
            | SuretyError::NotRegisteredOracle { .. } => ErrorKind::Unauthorized,
            SuretyError::AirlineNotRegistered { .. }
            | SuretyError::FlightNotRegistered { .. }
            | SuretyError::NoOpenRequest { .. } => ErrorKind::NotFound,
            SuretyError::AlreadyFunded { .. }
            | SuretyError::AlreadyRegistered { .. }
            | SuretyError::DuplicateFlight { .. }
            | SuretyError::AlreadyInsured { .. }
            | SuretyError::RequestAlreadyOpen { .. } => ErrorKind::Conflict,
            SuretyError::IncorrectFee { .. }
            | SuretyError::PremiumExceedsCap { .. }
            | SuretyError::PremiumRequired
            | SuretyError::AmountOverflow { .. }
            | SuretyError::InvalidStatusCode { .. } => ErrorKind::InvalidAmount,
            SuretyError::NothingToWithdraw { .. }
            | SuretyError::IndexMismatch { .. }
            | SuretyError::NotOperational
            | SuretyError::FlightStatusFinalized { .. }
            | SuretyError::RequestNotExpired { .. } => ErrorKind::InvalidState,
        }
    }

    /// Stable identifier for logs and the relaying layer.
    pub fn code(&self) -> &'static str {
        match self {
            SuretyError::NotAuthorized { .. } => "surety_not_authorized",
            SuretyError::NotFunded { .. } => "surety_not_funded",
            SuretyError::NotOwner { .. } => "surety_not_owner",
            SuretyError::NotRegisteredOracle { .. } => "surety_not_registered_oracle",
            SuretyError::AirlineNotRegistered { .. } => "surety_airline_not_registered",
            SuretyError::FlightNotRegistered { .. } => "surety_flight_not_registered",
            SuretyError::NoOpenRequest { .. } => "surety_no_open_request",
            SuretyError::AlreadyFunded { .. } => "surety_already_funded",
            SuretyError::AlreadyRegistered { .. } => "surety_already_registered",
            SuretyError::DuplicateFlight { .. } => "surety_duplicate_flight",
            SuretyError::AlreadyInsured { .. } => "surety_already_insured",
            SuretyError::RequestAlreadyOpen { .. } => "surety_request_already_open",
            SuretyError::IncorrectFee { .. } => "surety_incorrect_fee",
            SuretyError::PremiumExceedsCap { .. } => "surety_premium_exceeds_cap",
            SuretyError::PremiumRequired => "surety_premium_required",
            SuretyError::AmountOverflow { .. } => "surety_amount_overflow",
            SuretyError::InvalidStatusCode { .. } => "surety_invalid_status_code",
            SuretyError::NothingToWithdraw { .. } => "surety_nothing_to_withdraw",
            SuretyError::IndexMismatch { .. } => "surety_index_mismatch",
            SuretyError::NotOperational => "surety_not_operational",
            SuretyError::FlightStatusFinalized { .. } => "surety_flight_status_finalized",
            SuretyError::RequestNotExpired { .. } => "surety_request_not_expired",
        }
    }
}

/// Standard Result type for engine operations
pub type Result<T> = std::result::Result<T, SuretyError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_mapping() {
        let airline = AccountId::new([7u8; 20]);
        let flight = FlightKey::new(airline, "1234", 1);

        assert_eq!(
            SuretyError::NotFunded { airline }.kind(),
            ErrorKind::Unauthorized
        );
        assert_eq!(
            SuretyError::FlightNotRegistered {
                flight: flight.clone()
            }
            .kind(),
            ErrorKind::NotFound
        );
        assert_eq!(
            SuretyError::DuplicateFlight { flight }.kind(),
            ErrorKind::Conflict
        );
        assert_eq!(SuretyError::PremiumRequired.kind(), ErrorKind::InvalidAmount);
        assert_eq!(SuretyError::NotOperational.kind(), ErrorKind::InvalidState);
    }

    #[test]
    fn test_codes_are_prefixed() {
        let err = SuretyError::IncorrectFee {
            expected: Amount::units(10),
            actual: Amount::units(3),
        };
        assert_eq!(err.code(), "surety_incorrect_fee");
        assert_eq!(err.to_string(), "incorrect fee: expected 10, got 3");
    }
}
