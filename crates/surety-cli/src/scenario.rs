//! Scenario replay
//!
//! A scenario is a TOML transaction log applied in order to a fresh engine:
//!
//! ```toml
//! [scenario]
//! name = "founder funds"
//!
//! [[transactions]]
//! op = "fund_airline"
//! caller = "@airline-1"
//! value = "10"
//! ```
//!
//! An optional `[config]` table replaces the CLI configuration for the run. Account
//! fields (`caller`, `candidate`, `airline`, `owner`, `key`) may be written as
//! `"@label"` and are replaced by the account derived from that label, so scenarios can
//! write `caller = "@airline-1"` instead of a hex key. Other strings are left as written.

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::{info, warn};

use surety_core::{AccountId, EngineConfig, ErrorKind, SuretyError, SuretyEvent};
use surety_engine::{Receipt, SuretyEngine, Transaction};

/// Scenario metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioMetadata {
    pub name: String,
    pub description: Option<String>,
}

/// TOML file structure for a scenario
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioFile {
    pub scenario: ScenarioMetadata,
    /// Engine configuration override
    pub config: Option<EngineConfig>,
    #[serde(default)]
    pub transactions: Vec<Transaction>,
}

impl ScenarioFile {
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("failed to read scenario {}", path.display()))?;
        Self::parse(&content).with_context(|| format!("invalid scenario {}", path.display()))
    }

    pub fn parse(content: &str) -> Result<Self> {
        let mut value: toml::Value = toml::from_str(content)?;
        resolve_labels(&mut value);
        let file: Self = value.try_into()?;
        if let Some(config) = &file.config {
            config.validate()?;
        }
        Ok(file)
    }
}

/// Table keys whose string values name an account.
const ACCOUNT_FIELDS: [&str; 5] = ["caller", "candidate", "airline", "owner", "key"];

fn resolve_labels(value: &mut toml::Value) {
    match value {
        toml::Value::Array(items) => items.iter_mut().for_each(resolve_labels),
        toml::Value::Table(table) => {
            for (field, value) in table.iter_mut() {
                match value {
                    toml::Value::String(text) if ACCOUNT_FIELDS.contains(&field.as_str()) => {
                        if let Some(label) = text.strip_prefix('@') {
                            *text = AccountId::from_label(label).to_string();
                        }
                    }
                    _ => resolve_labels(value),
                }
            }
        }
        _ => {}
    }
}

/// Result of one replayed transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum StepResult {
    Applied {
        receipt: Receipt,
    },
    Rejected {
        code: &'static str,
        kind: ErrorKind,
        message: String,
    },
}

impl From<&SuretyError> for StepResult {
    fn from(error: &SuretyError) -> Self {
        StepResult::Rejected {
            code: error.code(),
            kind: error.kind(),
            message: error.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepRecord {
    pub step: usize,
    pub op: &'static str,
    #[serde(flatten)]
    pub result: StepResult,
}

/// Everything a replay produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScenarioReport {
    pub name: String,
    pub applied: usize,
    pub rejected: usize,
    pub steps: Vec<StepRecord>,
    pub events: Vec<SuretyEvent>,
}

/// Apply every transaction of `scenario` to `engine`.
///
/// Stops at the first rejected transaction unless `continue_on_error` is set.
pub fn replay(
    engine: &mut SuretyEngine,
    scenario: &ScenarioFile,
    continue_on_error: bool,
) -> Result<ScenarioReport> {
    info!(
        scenario = %scenario.scenario.name,
        transactions = scenario.transactions.len(),
        "Replaying scenario"
    );
    let mut report = ScenarioReport {
        name: scenario.scenario.name.clone(),
        applied: 0,
        rejected: 0,
        steps: Vec::with_capacity(scenario.transactions.len()),
        events: Vec::new(),
    };

    for (step, tx) in scenario.transactions.iter().enumerate() {
        let op = tx.name();
        let result = match engine.apply(tx.clone()) {
            Ok(receipt) => {
                report.applied += 1;
                StepResult::Applied { receipt }
            }
            Err(e) => {
                warn!(step, op, code = e.code(), "Transaction rejected: {}", e);
                if !continue_on_error {
                    bail!("step {step} ({op}) rejected: {e}");
                }
                report.rejected += 1;
                StepResult::from(&e)
            }
        };
        report.steps.push(StepRecord { step, op, result });
        report.events.extend(engine.drain_events());
    }
    Ok(report)
}
