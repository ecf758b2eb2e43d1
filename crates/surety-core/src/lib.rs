//! # Surety Core - Foundation Types
//!
//! Shared vocabulary for the flight-delay insurance engine. This crate holds only
//! data: identifiers, fixed-point amounts, flight keys and statuses, the economic
//! parameters, engine configuration, outbound events and the unified error type.
//! State transitions live in `surety-engine`.
//!
//! ## Architecture
//!
//! - **identifiers**: opaque 20-byte account keys (`AccountId`)
//! - **amount**: 18-decimal fixed-point currency amounts (`Amount`)
//! - **flight**: composite flight keys and the status code table
//! - **params**: fixed economic parameters (fees, caps, quorum)
//! - **config**: TOML-backed engine configuration with validation
//! - **events**: notifications appended to the outbound queue
//! - **errors**: `SuretyError` and its five-way `ErrorKind` taxonomy

#![forbid(unsafe_code)]

pub mod amount;
pub mod config;
pub mod errors;
pub mod events;
pub mod flight;
pub mod identifiers;
pub mod params;

pub use amount::{Amount, AmountParseError, BASE_UNITS_PER_UNIT, DECIMALS};
pub use config::{
    ConfigError, EngineConfig, FoundingAirline, OracleConfig, RequestIndexSelection,
};
pub use errors::{ErrorKind, Result, SuretyError};
pub use events::{EventQueue, SuretyEvent};
pub use flight::{FlightKey, FlightStatus};
pub use identifiers::{AccountId, IdentifierParseError, ACCOUNT_ID_LEN};
pub use params::{EconomicParams, PayoutRatio};
