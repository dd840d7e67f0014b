//! # Configuration Loading
//!
//! Reads `TraderConfig` from disk and the environment.
//!
//! ```text
//! defaults ──► trader.toml (if present) ──► TRADER_* variables ──► validate
//! ```

use std::env;
use std::fs;
use std::path::Path;

use tracing::{debug, info};
use trader_core::TraderConfig;

use crate::error::{StoreError, StoreResult};

/// Loads the configuration from `path` (optional file) and the process
/// environment.
///
/// ## Errors
/// - `Config` when the file exists but cannot be read or parsed, or the
///   final configuration is invalid
pub fn load_config(path: impl AsRef<Path>) -> StoreResult<TraderConfig> {
    load_config_with(path, |name| env::var(name).ok())
}

/// [`load_config`] with an explicit variable lookup.
pub fn load_config_with<F>(path: impl AsRef<Path>, lookup: F) -> StoreResult<TraderConfig>
where
    F: Fn(&str) -> Option<String>,
{
    let path = path.as_ref();
    let mut config = if path.exists() {
        let contents = fs::read_to_string(path)
            .map_err(|e| StoreError::Config(format!("{}: {}", path.display(), e)))?;
        toml::from_str(&contents)
            .map_err(|e| StoreError::Config(format!("{}: {}", path.display(), e)))?
    } else {
        debug!(path = %path.display(), "No config file, using defaults");
        TraderConfig::default()
    };

    config.apply_overrides(lookup);
    config
        .validate()
        .map_err(|e| StoreError::Config(e.to_string()))?;

    info!(
        currency = %config.currency,
        primary_vat_country = %config.primary_vat_country,
        prices_include_vat = config.prices_include_vat,
        "Configuration loaded"
    );
    Ok(config)
}
