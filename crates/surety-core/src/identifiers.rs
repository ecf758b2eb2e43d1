//! Account identifiers
//!
//! The engine treats every participant (owner, airline, passenger, oracle node) as an
//! opaque, comparable 20-byte key. Keys render as `0x`-prefixed lowercase hex.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Length in bytes of an account key.
pub const ACCOUNT_ID_LEN: usize = 20;

/// Opaque account key.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AccountId([u8; ACCOUNT_ID_LEN]);

impl AccountId {
    /// Wrap raw key bytes.
    pub const fn new(bytes: [u8; ACCOUNT_ID_LEN]) -> Self {
        Self(bytes)
    }

    /// Derive a stable key from a human label ("airline-2", "oracle-7").
    ///
    /// Used by scenario files, the oracle fleet simulator and test fixtures.
    pub fn from_label(label: &str) -> Self {
        let mut hasher = blake3::Hasher::new();
        hasher.update(b"SURETY_ACCOUNT_LABEL");
        hasher.update(label.as_bytes());
        let digest = hasher.finalize();
        let mut bytes = [0u8; ACCOUNT_ID_LEN];
        bytes.copy_from_slice(&digest.as_bytes()[..ACCOUNT_ID_LEN]);
        Self(bytes)
    }

    /// Raw key bytes.
    pub fn as_bytes(&self) -> &[u8; ACCOUNT_ID_LEN] {
        &self.0
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl fmt::Debug for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AccountId({self})")
    }
}

/// Failure to parse an account key from text.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IdentifierParseError {
    /// Not valid hex
    #[error("account id is not valid hex: {0}")]
    InvalidHex(String),
    /// Wrong number of bytes
    #[error("account id must be {expected} bytes, got {actual}")]
    InvalidLength {
        /// Required length
        expected: usize,
        /// Decoded length
        actual: usize,
    },
}

impl FromStr for AccountId {
    type Err = IdentifierParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s
            .strip_prefix("0x")
            .or_else(|| s.strip_prefix("0X"))
            .unwrap_or(s);
        let decoded =
            hex::decode(digits).map_err(|e| IdentifierParseError::InvalidHex(e.to_string()))?;
        let bytes: [u8; ACCOUNT_ID_LEN] =
            decoded
                .as_slice()
                .try_into()
                .map_err(|_| IdentifierParseError::InvalidLength {
                    expected: ACCOUNT_ID_LEN,
                    actual: decoded.len(),
                })?;
        Ok(Self(bytes))
    }
}

impl Serialize for AccountId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for AccountId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn test_display_parse_roundtrip() {
        let id = AccountId::from_label("airline-2");
        let text = id.to_string();
        assert!(text.starts_with("0x"));
        assert_eq!(text.len(), 2 + ACCOUNT_ID_LEN * 2);
        assert_eq!(text.parse::<AccountId>().unwrap(), id);
    }

    #[test]
    fn test_labels_are_stable_and_distinct() {
        assert_eq!(
            AccountId::from_label("oracle-1"),
            AccountId::from_label("oracle-1")
        );
        assert_ne!(
            AccountId::from_label("oracle-1"),
            AccountId::from_label("oracle-2")
        );
    }

    #[test]
    fn test_parse_rejects_bad_input() {
        assert_matches!(
            "0xzz".parse::<AccountId>(),
            Err(IdentifierParseError::InvalidHex(_))
        );
        assert_matches!(
            "0x0102".parse::<AccountId>(),
            Err(IdentifierParseError::InvalidLength {
                expected: 20,
                actual: 2
            })
        );
    }

    #[test]
    fn test_serde_uses_hex_string() {
        let id = AccountId::new([0xab; ACCOUNT_ID_LEN]);
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, format!("\"0x{}\"", "ab".repeat(ACCOUNT_ID_LEN)));
        let back: AccountId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }
}
