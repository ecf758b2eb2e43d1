//! Configuration loading for the binary.

use anyhow::{Context, Result};
use std::path::Path;
use tracing::debug;

use surety_core::EngineConfig;

/// Load `path` if it exists, otherwise start from defaults; then apply `SURETY_*`
/// environment overrides.
pub fn load_config(path: &Path) -> Result<EngineConfig> {
    let mut config = if path.exists() {
        EngineConfig::load_from_file(path)
            .with_context(|| format!("loading {}", path.display()))?
    } else {
        debug!(path = %path.display(), "Config file not found, using defaults");
        EngineConfig::default()
    };
    config
        .merge_with_env()
        .context("applying environment overrides")?;
    Ok(config)
}
