//! Flight Registry
//!
//! Flights registered by funded airlines, keyed by (airline, designator, timestamp).

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use surety_core::{AccountId, FlightKey, FlightStatus, Result, SuretyError};

use crate::governance::AirlineRegistry;

/// Registered flight.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flight {
    /// Operating airline, designator and departure timestamp
    pub key: FlightKey,
    /// Origin
    pub from: String,
    /// Destination
    pub to: String,
    /// `Unknown` until a status request finalizes
    pub status: FlightStatus,
}

impl Flight {
    /// Whether oracle consensus has written a status.
    pub fn is_finalized(&self) -> bool {
        self.status != FlightStatus::Unknown
    }
}

/// Flights in registration order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FlightRegistry {
    flights: IndexMap<FlightKey, Flight>,
}

impl FlightRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a flight operated by `airline`.
    pub fn register(
        &mut self,
        governance: &AirlineRegistry,
        airline: AccountId,
        designator: &str,
        from: &str,
        to: &str,
        timestamp: u64,
    ) -> Result<&Flight> {
        if !governance.is_funded(&airline) {
            return Err(SuretyError::NotFunded { airline });
        }
        let key = FlightKey::new(airline, designator, timestamp);
        if self.flights.contains_key(&key) {
            return Err(SuretyError::DuplicateFlight { flight: key });
        }
        let flight = Flight {
            key: key.clone(),
            from: from.to_string(),
            to: to.to_string(),
            status: FlightStatus::Unknown,
        };
        Ok(self.flights.entry(key).or_insert(flight))
    }

    /// Whether a flight with this key exists.
    pub fn is_registered(&self, key: &FlightKey) -> bool {
        self.flights.contains_key(key)
    }

    /// Look up a registered flight.
    pub fn get(&self, key: &FlightKey) -> Option<&Flight> {
        self.flights.get(key)
    }

    /// Look up a flight or fail with `FlightNotRegistered`.
    pub fn require(&self, key: &FlightKey) -> Result<&Flight> {
        self.flights
            .get(key)
            .ok_or_else(|| SuretyError::FlightNotRegistered {
                flight: key.clone(),
            })
    }

    /// Flights operated by `airline`, in registration order.
    pub fn flights_of(&self, airline: &AccountId) -> Vec<&Flight> {
        self.flights
            .values()
            .filter(|f| &f.key.airline == airline)
            .collect()
    }

    /// Number of registered flights.
    pub fn len(&self) -> usize {
        self.flights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.flights.is_empty()
    }

    pub(crate) fn set_status(&mut self, key: &FlightKey, status: FlightStatus) -> Result<()> {
        let flight = self
            .flights
            .get_mut(key)
            .ok_or_else(|| SuretyError::FlightNotRegistered {
                flight: key.clone(),
            })?;
        flight.status = status;
        Ok(())
    }
}
