//! Fixed-point currency amounts
//!
//! One currency unit is `10^18` base units, matching the ledger's smallest
//! denomination. All arithmetic is checked; callers map `None` to
//! `SuretyError::AmountOverflow`.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::params::PayoutRatio;

/// Decimal places carried by an [`Amount`].
pub const DECIMALS: u32 = 18;

/// Base units in one currency unit.
pub const BASE_UNITS_PER_UNIT: u128 = 10u128.pow(DECIMALS);

/// Non-negative currency amount in base units.
#[derive(Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Amount(u128);

impl Amount {
    /// The zero amount.
    pub const ZERO: Self = Self(0);

    /// Amount from raw base units.
    pub const fn from_base_units(base_units: u128) -> Self {
        Self(base_units)
    }

    /// Amount from whole currency units.
    pub const fn units(units: u64) -> Self {
        Self(units as u128 * BASE_UNITS_PER_UNIT)
    }

    /// Raw base units.
    pub const fn base_units(self) -> u128 {
        self.0
    }

    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    pub fn checked_add(self, other: Self) -> Option<Self> {
        self.0.checked_add(other.0).map(Self)
    }

    pub fn checked_sub(self, other: Self) -> Option<Self> {
        self.0.checked_sub(other.0).map(Self)
    }

    /// Scale by `numerator / denominator`, rounding down.
    pub fn checked_mul_ratio(self, ratio: PayoutRatio) -> Option<Self> {
        if ratio.denominator == 0 {
            return None;
        }
        self.0
            .checked_mul(u128::from(ratio.numerator))
            .map(|scaled| Self(scaled / u128::from(ratio.denominator)))
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let whole = self.0 / BASE_UNITS_PER_UNIT;
        let frac = self.0 % BASE_UNITS_PER_UNIT;
        if frac == 0 {
            return write!(f, "{whole}");
        }
        let digits = format!("{frac:018}");
        write!(f, "{whole}.{}", digits.trim_end_matches('0'))
    }
}

impl fmt::Debug for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Amount({self})")
    }
}

/// Failure to parse a decimal amount.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AmountParseError {
    #[error("amount is empty")]
    Empty,
    #[error("amount contains a non-digit: {0:?}")]
    InvalidDigit(String),
    #[error("amount has more than {DECIMALS} decimal places")]
    TooPrecise,
    #[error("amount does not fit in 128 bits")]
    Overflow,
}

impl FromStr for Amount {
    type Err = AmountParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(AmountParseError::Empty);
        }
        let (whole, frac) = s.split_once('.').unwrap_or((s, ""));
        if whole.is_empty() || !whole.bytes().all(|b| b.is_ascii_digit()) {
            return Err(AmountParseError::InvalidDigit(s.to_string()));
        }
        if !frac.bytes().all(|b| b.is_ascii_digit()) {
            return Err(AmountParseError::InvalidDigit(s.to_string()));
        }
        if frac.len() > DECIMALS as usize {
            return Err(AmountParseError::TooPrecise);
        }

        let whole: u128 = whole.parse().map_err(|_| AmountParseError::Overflow)?;
        let frac: u128 = if frac.is_empty() {
            0
        } else {
            let padded = format!("{frac:0<18}");
            padded.parse().map_err(|_| AmountParseError::Overflow)?
        };

        whole
            .checked_mul(BASE_UNITS_PER_UNIT)
            .and_then(|base| base.checked_add(frac))
            .map(Self)
            .ok_or(AmountParseError::Overflow)
    }
}

impl Serialize for Amount {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use proptest::prelude::*;

    #[test]
    fn test_display_trims_fraction() {
        assert_eq!(Amount::units(10).to_string(), "10");
        assert_eq!(Amount::from_base_units(1_500_000_000_000_000_000).to_string(), "1.5");
        assert_eq!(Amount::from_base_units(1).to_string(), "0.000000000000000001");
        assert_eq!(Amount::ZERO.to_string(), "0");
    }

    #[test]
    fn test_parse_decimal() {
        assert_eq!("1.5".parse::<Amount>().unwrap(), Amount::from_base_units(15 * 10u128.pow(17)));
        assert_eq!("10".parse::<Amount>().unwrap(), Amount::units(10));
        assert_eq!("0.5".parse::<Amount>().unwrap(), Amount::from_base_units(5 * 10u128.pow(17)));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert_matches!("".parse::<Amount>(), Err(AmountParseError::Empty));
        assert_matches!("-1".parse::<Amount>(), Err(AmountParseError::InvalidDigit(_)));
        assert_matches!(".5".parse::<Amount>(), Err(AmountParseError::InvalidDigit(_)));
        assert_matches!(
            "0.0000000000000000001".parse::<Amount>(),
            Err(AmountParseError::TooPrecise)
        );
    }

    #[test]
    fn test_payout_ratio_rounds_down() {
        let ratio = PayoutRatio::new(3, 2);
        assert_eq!(
            Amount::units(1).checked_mul_ratio(ratio),
            Some(Amount::from_base_units(15 * 10u128.pow(17)))
        );
        assert_eq!(
            Amount::from_base_units(1).checked_mul_ratio(ratio),
            Some(Amount::from_base_units(1))
        );
        assert_eq!(Amount::units(1).checked_mul_ratio(PayoutRatio::new(3, 0)), None);
    }

    #[test]
    fn test_checked_overflow() {
        let max = Amount::from_base_units(u128::MAX);
        assert_eq!(max.checked_add(Amount::from_base_units(1)), None);
        assert_eq!(Amount::ZERO.checked_sub(Amount::from_base_units(1)), None);
    }

    proptest! {
        #[test]
        fn display_parses_back(raw in 0u128..(1u128 << 100)) {
            let amount = Amount::from_base_units(raw);
            prop_assert_eq!(amount.to_string().parse::<Amount>().unwrap(), amount);
        }
    }
}
