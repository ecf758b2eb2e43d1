//! Flight identity and status codes.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::errors::SuretyError;
use crate::identifiers::AccountId;

/// Composite flight key: operating airline, designator and scheduled departure.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct FlightKey {
    /// Airline operating the flight
    pub airline: AccountId,
    /// Flight designator ("5678")
    pub designator: String,
    /// Scheduled departure, seconds since the Unix epoch
    pub timestamp: u64,
}

impl FlightKey {
    pub fn new(airline: AccountId, designator: impl Into<String>, timestamp: u64) -> Self {
        Self {
            airline,
            designator: designator.into(),
            timestamp,
        }
    }
}

impl fmt::Display for FlightKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}@{}", self.airline, self.designator, self.timestamp)
    }
}

/// Observed flight status.
///
/// Each status has a fixed numeric code used by the relaying layer on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlightStatus {
    /// No consensus reached yet
    Unknown,
    OnTime,
    /// Delay attributable to the airline; the only status that pays out
    LateAirline,
    LateWeather,
    LateTechnical,
    LateOther,
}

impl FlightStatus {
    /// Every status, in code order.
    pub const ALL: [FlightStatus; 6] = [
        FlightStatus::Unknown,
        FlightStatus::OnTime,
        FlightStatus::LateAirline,
        FlightStatus::LateWeather,
        FlightStatus::LateTechnical,
        FlightStatus::LateOther,
    ];

    /// Wire code for this status.
    pub const fn code(self) -> u8 {
        match self {
            FlightStatus::Unknown => 0,
            FlightStatus::OnTime => 10,
            FlightStatus::LateAirline => 20,
            FlightStatus::LateWeather => 30,
            FlightStatus::LateTechnical => 40,
            FlightStatus::LateOther => 50,
        }
    }

    /// Parse a wire code.
    pub fn from_code(code: u8) -> Result<Self, SuretyError> {
        Self::ALL
            .into_iter()
            .find(|status| status.code() == code)
            .ok_or(SuretyError::InvalidStatusCode { code })
    }

    /// Whether crediting should run when this status is finalized.
    pub const fn pays_out(self) -> bool {
        matches!(self, FlightStatus::LateAirline)
    }
}

impl fmt::Display for FlightStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            FlightStatus::Unknown => "unknown",
            FlightStatus::OnTime => "on_time",
            FlightStatus::LateAirline => "late_airline",
            FlightStatus::LateWeather => "late_weather",
            FlightStatus::LateTechnical => "late_technical",
            FlightStatus::LateOther => "late_other",
        };
        write!(f, "{label}")
    }
}
