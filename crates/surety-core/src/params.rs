//! Economic parameters
//!
//! The defaults are the fixed values every deployment must use to stay compatible
//! with the relaying layer and client. They are carried as data so tests and the
//! simulator can inspect them; `EngineConfig::validate` rejects any value that differs
//! from the default.

use serde::{Deserialize, Serialize};

use crate::amount::Amount;

/// Participation fee an airline pays once, in whole units.
pub const AIRLINE_FEE_UNITS: u64 = 10;
/// Highest premium accepted for a single policy, in whole units.
pub const MAX_PREMIUM_UNITS: u64 = 1;
/// Oracle registration fee, in whole units.
pub const ORACLE_FEE_UNITS: u64 = 1;
/// Registered airlines required before admission goes to a vote.
pub const MIN_AIRLINES_FOR_CONSENSUS: usize = 4;
/// Indexes assigned to each oracle node.
pub const ORACLE_INDEX_SET_SIZE: usize = 3;
/// Indexes are drawn from `0..ORACLE_INDEX_RANGE`.
pub const ORACLE_INDEX_RANGE: u8 = 10;
/// Matching responses needed to finalize a status request.
pub const RESPONSE_QUORUM: usize = 3;

/// Exact payout multiplier, `numerator / denominator`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayoutRatio {
    pub numerator: u32,
    pub denominator: u32,
}

impl PayoutRatio {
    pub const fn new(numerator: u32, denominator: u32) -> Self {
        Self {
            numerator,
            denominator,
        }
    }
}

impl Default for PayoutRatio {
    /// 1.5× the premium.
    fn default() -> Self {
        Self::new(3, 2)
    }
}

/// Fees, caps and thresholds applied by the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EconomicParams {
    pub airline_fee: Amount,
    pub max_premium: Amount,
    pub min_airlines_for_consensus: usize,
    pub oracle_registration_fee: Amount,
    pub oracle_index_set_size: usize,
    pub oracle_index_range: u8,
    pub response_quorum: usize,
    // Last: TOML emits tables after plain values.
    pub payout_ratio: PayoutRatio,
}

impl Default for EconomicParams {
    fn default() -> Self {
        Self {
            airline_fee: Amount::units(AIRLINE_FEE_UNITS),
            max_premium: Amount::units(MAX_PREMIUM_UNITS),
            min_airlines_for_consensus: MIN_AIRLINES_FOR_CONSENSUS,
            oracle_registration_fee: Amount::units(ORACLE_FEE_UNITS),
            oracle_index_set_size: ORACLE_INDEX_SET_SIZE,
            oracle_index_range: ORACLE_INDEX_RANGE,
            response_quorum: RESPONSE_QUORUM,
            payout_ratio: PayoutRatio::default(),
        }
    }
}

impl EconomicParams {
    /// Name of the first field that differs from `other`, in declaration order.
    pub fn first_deviation(&self, other: &Self) -> Option<&'static str> {
        let fields = [
            ("airline_fee", self.airline_fee == other.airline_fee),
            ("max_premium", self.max_premium == other.max_premium),
            (
                "min_airlines_for_consensus",
                self.min_airlines_for_consensus == other.min_airlines_for_consensus,
            ),
            (
                "oracle_registration_fee",
                self.oracle_registration_fee == other.oracle_registration_fee,
            ),
            (
                "oracle_index_set_size",
                self.oracle_index_set_size == other.oracle_index_set_size,
            ),
            (
                "oracle_index_range",
                self.oracle_index_range == other.oracle_index_range,
            ),
            ("response_quorum", self.response_quorum == other.response_quorum),
            ("payout_ratio", self.payout_ratio == other.payout_ratio),
        ];
        fields
            .into_iter()
            .find(|(_, same)| !same)
            .map(|(name, _)| name)
    }
}
