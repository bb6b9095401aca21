//! Monitor configuration — upstream source, relay chain, deadlines.
//!
//! Stored as a TOML file. Every field has a default, so an empty file (or no
//! file at all) gives the deployment the monitor originally ran against.
//!
//! ```toml
//! timeout_secs = 20
//!
//! [source]
//! primary_symbol = "^GSPC"
//! secondary_symbol = "^VIX"
//!
//! [[relays]]
//! id = "codetabs"
//! prefix = "https://api.codetabs.com/v1/proxy/?quest="
//! encoding = "percent"
//! ```

use crate::analysis::{SignalDetector, FEAR_THRESHOLD};
use crate::data::relay::{default_relays, RelayChain, RelayDescriptor};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Upstream chart endpoint and the two symbols it is queried for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    pub base_url: String,
    /// Equity index symbol.
    pub primary_symbol: String,
    /// Volatility index symbol.
    pub secondary_symbol: String,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            base_url: "https://query1.finance.yahoo.com/v8/finance/chart".into(),
            primary_symbol: "^GSPC".into(),
            secondary_symbol: "^VIX".into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FearlabConfig {
    pub source: SourceConfig,
    pub relays: Vec<RelayDescriptor>,
    /// Per-relay-attempt deadline.
    pub timeout_secs: u64,
    pub fear_threshold: f64,
}

impl Default for FearlabConfig {
    fn default() -> Self {
        Self {
            source: SourceConfig::default(),
            relays: default_relays(),
            timeout_secs: 30,
            fear_threshold: FEAR_THRESHOLD,
        }
    }
}

impl FearlabConfig {
    /// Load and validate a config from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    /// Parse and validate a config from a TOML string.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.relays.is_empty() {
            return Err(ConfigError::Invalid("at least one relay is required".into()));
        }
        if let Some(dup) = self
            .relays
            .iter()
            .enumerate()
            .find(|(i, r)| self.relays[..*i].iter().any(|o| o.id == r.id))
        {
            return Err(ConfigError::Invalid(format!(
                "duplicate relay id '{}'",
                dup.1.id
            )));
        }
        if self.timeout_secs == 0 {
            return Err(ConfigError::Invalid("timeout_secs must be > 0".into()));
        }
        if !self.fear_threshold.is_finite() || self.fear_threshold <= 0.0 {
            return Err(ConfigError::Invalid(format!(
                "fear_threshold must be a positive number, got {}",
                self.fear_threshold
            )));
        }
        if self.source.primary_symbol.trim().is_empty()
            || self.source.secondary_symbol.trim().is_empty()
        {
            return Err(ConfigError::Invalid("symbols must not be empty".into()));
        }
        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn relay_chain(&self) -> RelayChain {
        RelayChain::new(self.relays.clone(), self.timeout())
    }

    pub fn detector(&self) -> SignalDetector {
        SignalDetector::new(self.fear_threshold)
    }
}
