//! Engine configuration
//!
//! Loaded from TOML, optionally overridden by `SURETY_*` environment variables, and
//! validated before an engine is built. `EngineConfig::default()` reproduces the fixed
//! economic parameters with deterministic development identities.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::identifiers::AccountId;
use crate::params::EconomicParams;

/// Environment prefix for overrides.
pub const ENV_PREFIX: &str = "SURETY_";

/// Configuration loading and validation failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {message}")]
    Io { path: String, message: String },

    #[error("invalid config syntax: {0}")]
    Parse(String),

    #[error("invalid configuration: {0}")]
    Invalid(String),

    #[error("invalid value for {var}: {message}")]
    Env { var: String, message: String },
}

/// The single airline registered at genesis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FoundingAirline {
    pub key: AccountId,
    pub name: String,
}

impl Default for FoundingAirline {
    fn default() -> Self {
        Self {
            key: AccountId::from_label("airline-1"),
            name: "Swiss International Airlines".to_string(),
        }
    }
}

/// How a new status request picks its index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestIndexSelection {
    /// Walk the index range in order
    #[default]
    RoundRobin,
    /// Seeded pseudo-random pick per request
    Random,
}

/// Oracle consensus settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OracleConfig {
    pub request_index: RequestIndexSelection,
    /// Seconds after opening before a request may be expired
    pub request_ttl_secs: u64,
    /// Seed for index allocation and random request selection
    pub seed: u64,
}

impl Default for OracleConfig {
    fn default() -> Self {
        Self {
            request_index: RequestIndexSelection::RoundRobin,
            request_ttl_secs: 3_600,
            seed: 0,
        }
    }
}

/// Complete engine configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Account allowed to pause and resume the engine
    pub owner: AccountId,
    pub founding_airline: FoundingAirline,
    pub params: EconomicParams,
    pub oracle: OracleConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            owner: AccountId::from_label("owner"),
            founding_airline: FoundingAirline::default(),
            params: EconomicParams::default(),
            oracle: OracleConfig::default(),
        }
    }
}

impl EngineConfig {
    /// Default configuration with explicit owner and founding airline.
    pub fn new(owner: AccountId, founder: AccountId, founder_name: impl Into<String>) -> Self {
        Self {
            owner,
            founding_airline: FoundingAirline {
                key: founder,
                name: founder_name.into(),
            },
            ..Self::default()
        }
    }

    /// Load and validate configuration from a TOML file.
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        Self::from_toml_str(&content)
    }

    /// Parse and validate configuration from TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Render as TOML.
    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Merge `SURETY_*` overrides from the process environment.
    pub fn merge_with_env(&mut self) -> Result<(), ConfigError> {
        self.merge_with_vars(std::env::vars())
    }

    /// Merge overrides from `(name, value)` pairs.
    ///
    /// Recognised: `SURETY_OWNER`, `SURETY_ORACLE_SEED`, `SURETY_REQUEST_TTL_SECS`.
    /// Other names are ignored.
    pub fn merge_with_vars<I>(&mut self, vars: I) -> Result<(), ConfigError>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        for (var, value) in vars {
            let Some(key) = var.strip_prefix(ENV_PREFIX) else {
                continue;
            };
            let env_err = |message: String| ConfigError::Env {
                var: var.clone(),
                message,
            };
            match key {
                "OWNER" => {
                    self.owner = value.parse().map_err(|e| env_err(format!("{e}")))?;
                }
                "ORACLE_SEED" => {
                    self.oracle.seed = value.parse().map_err(|e| env_err(format!("{e}")))?;
                }
                "REQUEST_TTL_SECS" => {
                    self.oracle.request_ttl_secs =
                        value.parse().map_err(|e| env_err(format!("{e}")))?;
                }
                _ => {}
            }
        }
        self.validate()
    }

    /// Reject settings the engine cannot run with.
    ///
    /// Economic parameters are fixed: a `[params]` table may restate them but any
    /// value that differs from [`EconomicParams::default`] is rejected.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.founding_airline.name.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "founding airline name must not be empty".to_string(),
            ));
        }
        if let Some(field) = self.params.first_deviation(&EconomicParams::default()) {
            return Err(ConfigError::Invalid(format!(
                "params.{field} is a fixed economic parameter and cannot be overridden"
            )));
        }
        Ok(())
    }
}
