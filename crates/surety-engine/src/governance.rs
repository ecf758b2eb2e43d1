//! Airline Governance
//!
//! Admission of airlines. While fewer than `min_airlines_for_consensus` airlines are
//! registered, any funded airline admits a candidate directly. From then on a candidate
//! needs votes from strictly more than half of the registered airlines.
//!
//! The threshold is evaluated against the registered count *at the moment each vote is
//! cast*. Registrations interleaved with voting therefore move the target for open
//! nominations; a nomination that was one vote short can become two votes short.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use surety_core::{AccountId, Amount, Result, SuretyError};

/// Registered airline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Airline {
    /// Airline account
    pub key: AccountId,
    /// Display name given at nomination
    pub name: String,
    /// Admitted to the consortium
    pub registered: bool,
    /// Participation fee paid; required to nominate, vote and register flights
    pub funded: bool,
}

/// Pending admission vote for a candidate airline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Nomination {
    /// Airline under vote
    pub candidate: AccountId,
    /// Name supplied by the first nominator
    pub name: String,
    /// Distinct funded airlines that voted for the candidate
    pub voters: BTreeSet<AccountId>,
    /// Timestamp of the first nomination
    pub created_at: u64,
}

impl Nomination {
    /// Number of distinct voters so far.
    pub fn votes(&self) -> usize {
        self.voters.len()
    }
}

/// Result of a `nominate` call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum NominationOutcome {
    /// Candidate is now registered
    Registered { airline: AccountId, votes: usize },
    /// Vote counted, threshold not yet crossed
    VoteRecorded {
        candidate: AccountId,
        votes: usize,
        required: usize,
    },
    /// Nominator had already voted; nothing changed
    DuplicateVote { candidate: AccountId, votes: usize },
}

/// Whether `votes` is strictly more than half of `registered`.
pub fn vote_threshold_met(votes: usize, registered: usize) -> bool {
    votes.saturating_mul(2) > registered
}

/// Smallest vote count satisfying [`vote_threshold_met`].
pub fn required_votes(registered: usize) -> usize {
    registered / 2 + 1
}

/// Registered airlines and open nominations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AirlineRegistry {
    /// Registered airlines in admission order
    airlines: IndexMap<AccountId, Airline>,
    nominations: BTreeMap<AccountId, Nomination>,
    airline_fee: Amount,
    min_airlines_for_consensus: usize,
}

impl AirlineRegistry {
    /// Registry seeded with the founding airline (registered, not funded).
    pub fn with_founder(
        founder: AccountId,
        name: impl Into<String>,
        airline_fee: Amount,
        min_airlines_for_consensus: usize,
    ) -> Self {
        let mut airlines = IndexMap::new();
        airlines.insert(
            founder,
            Airline {
                key: founder,
                name: name.into(),
                registered: true,
                funded: false,
            },
        );
        Self {
            airlines,
            nominations: BTreeMap::new(),
            airline_fee,
            min_airlines_for_consensus,
        }
    }

    /// Pay the participation fee.
    ///
    /// The amount must equal the fee exactly.
    pub fn fund(&mut self, airline: AccountId, amount: Amount) -> Result<&Airline> {
        let fee = self.airline_fee;
        let entry = self
            .airlines
            .get_mut(&airline)
            .ok_or(SuretyError::AirlineNotRegistered { airline })?;
        if entry.funded {
            return Err(SuretyError::AlreadyFunded { airline });
        }
        if amount != fee {
            return Err(SuretyError::IncorrectFee {
                expected: fee,
                actual: amount,
            });
        }
        entry.funded = true;
        Ok(entry)
    }

    /// Nominate `candidate`, or vote for it if a nomination is open.
    pub fn nominate(
        &mut self,
        nominator: AccountId,
        name: &str,
        candidate: AccountId,
        now: u64,
    ) -> Result<NominationOutcome> {
        if !self.is_funded(&nominator) {
            return Err(SuretyError::not_authorized(
                nominator,
                "only funded airlines may nominate",
            ));
        }
        if self.airlines.contains_key(&candidate) {
            return Err(SuretyError::AlreadyRegistered { account: candidate });
        }

        let registered = self.airlines.len();
        if registered < self.min_airlines_for_consensus {
            self.register(candidate, name.to_string());
            return Ok(NominationOutcome::Registered {
                airline: candidate,
                votes: 0,
            });
        }

        if let Some(open) = self.nominations.get(&candidate) {
            if open.voters.contains(&nominator) {
                return Ok(NominationOutcome::DuplicateVote {
                    candidate,
                    votes: open.votes(),
                });
            }
        }

        let nomination = self
            .nominations
            .entry(candidate)
            .or_insert_with(|| Nomination {
                candidate,
                name: name.to_string(),
                voters: BTreeSet::new(),
                created_at: now,
            });
        nomination.voters.insert(nominator);
        let votes = nomination.votes();

        if vote_threshold_met(votes, registered) {
            if let Some(accepted) = self.nominations.remove(&candidate) {
                self.register(candidate, accepted.name);
            }
            Ok(NominationOutcome::Registered {
                airline: candidate,
                votes,
            })
        } else {
            Ok(NominationOutcome::VoteRecorded {
                candidate,
                votes,
                required: required_votes(registered),
            })
        }
    }

    fn register(&mut self, key: AccountId, name: String) {
        self.airlines.insert(
            key,
            Airline {
                key,
                name,
                registered: true,
                funded: false,
            },
        );
    }

    /// Whether `key` has been admitted.
    pub fn is_registered(&self, key: &AccountId) -> bool {
        self.airlines.contains_key(key)
    }

    /// Whether `key` is registered and has paid the participation fee.
    pub fn is_funded(&self, key: &AccountId) -> bool {
        self.airlines.get(key).is_some_and(|a| a.funded)
    }

    /// Registered airline keys in admission order.
    pub fn list_registered(&self) -> Vec<AccountId> {
        self.airlines.keys().copied().collect()
    }

    /// Registered airlines, funded or not.
    pub fn registered_count(&self) -> usize {
        self.airlines.len()
    }

    /// Name of a registered airline.
    pub fn airline_name(&self, key: &AccountId) -> Option<&str> {
        self.airlines.get(key).map(|a| a.name.as_str())
    }

    /// Open nomination for `candidate`, if any.
    pub fn nomination(&self, candidate: &AccountId) -> Option<&Nomination> {
        self.nominations.get(candidate)
    }

    /// Votes collected by an open nomination (zero if none).
    pub fn nomination_votes(&self, candidate: &AccountId) -> usize {
        self.nominations.get(candidate).map_or(0, Nomination::votes)
    }
}
