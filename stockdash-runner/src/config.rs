//! Dashboard configuration: provider endpoints, timeouts, fetch mode.
//!
//! Stored as TOML; every field has a default so an empty file is valid.
//! The fundamentals credential is never part of the file: the config names
//! the environment variable that holds it.

use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

use stockdash_core::data::{alpha_vantage, yahoo};

/// Errors from loading or validating a [`DashboardConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("read config file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// How the orchestrator schedules its five section fetches.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FetchMode {
    /// One section after another on the calling thread.
    #[default]
    Sequential,
    /// Independent tasks on a private thread pool, joined before assembly.
    Concurrent,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderSettings {
    pub yahoo_base_url: String,
    pub alpha_vantage_base_url: String,
    /// Per-request HTTP timeout in seconds.
    pub timeout_secs: u64,
    /// Environment variable holding the Alpha Vantage API key.
    pub api_key_env: String,
}

impl Default for ProviderSettings {
    fn default() -> Self {
        Self {
            yahoo_base_url: yahoo::DEFAULT_BASE_URL.to_string(),
            alpha_vantage_base_url: alpha_vantage::DEFAULT_BASE_URL.to_string(),
            timeout_secs: 30,
            api_key_env: "ALPHAVANTAGE_API_KEY".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchSettings {
    pub mode: FetchMode,
}

/// Complete dashboard configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    pub providers: ProviderSettings,
    pub fetch: FetchSettings,
}

impl DashboardConfig {
    /// Load and validate a config from a TOML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    /// Parse and validate a config from a TOML string.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let p = &self.providers;
        if p.timeout_secs == 0 {
            return Err(ConfigError::Invalid("providers.timeout_secs must be > 0".into()));
        }
        if p.yahoo_base_url.trim().is_empty() {
            return Err(ConfigError::Invalid("providers.yahoo_base_url is empty".into()));
        }
        if p.alpha_vantage_base_url.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "providers.alpha_vantage_base_url is empty".into(),
            ));
        }
        if p.api_key_env.trim().is_empty() {
            return Err(ConfigError::Invalid("providers.api_key_env is empty".into()));
        }
        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.providers.timeout_secs)
    }

    /// Read the fundamentals API key from the configured environment variable.
    ///
    /// Returns `None` when the variable is unset or blank; fundamentals and
    /// news sections then fail with a credential error at fetch time.
    pub fn api_key(&self) -> Option<SecretString> {
        std::env::var(&self.providers.api_key_env)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .map(SecretString::from)
    }
}
