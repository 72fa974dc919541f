//! Client configuration.
//!
//! Values resolve in layers: built-in defaults, then an optional TOML file,
//! then `KABUSCORE_*` environment variables. Command-line flags are applied
//! last by the CLI.
//!
//! ```toml
//! base_url = "http://localhost:5000"
//! source = "stock_api"
//! timeout_ms = 5000
//! max_retries = 2
//! failure_threshold = 3
//! open_timeout_secs = 30
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::circuit_breaker::CircuitBreakerConfig;
use crate::retry::RetryConfig;
use crate::SourceId;

pub const ENV_BASE_URL: &str = "KABUSCORE_BASE_URL";
pub const ENV_TIMEOUT_MS: &str = "KABUSCORE_TIMEOUT_MS";
pub const ENV_SOURCE: &str = "KABUSCORE_SOURCE";

/// Configuration load and validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("environment variable {var} has invalid value '{value}'")]
    InvalidEnv { var: &'static str, value: String },

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Settings for the retrieval adapter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ClientConfig {
    /// Root of the stock API, without trailing slash.
    pub base_url: String,
    pub source: SourceId,
    pub timeout_ms: u64,
    pub max_retries: u32,
    pub failure_threshold: u32,
    pub open_timeout_secs: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: String::from("http://localhost:5000"),
            source: SourceId::StockApi,
            timeout_ms: 5_000,
            max_retries: 2,
            failure_threshold: 3,
            open_timeout_secs: 30,
        }
    }
}

impl ClientConfig {
    /// Defaults, overlaid with `path` when given, overlaid with the process environment.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let base = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        base.with_env_overrides(|var| std::env::var(var).ok())
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::debug!(path = %path.display(), "loaded config file");
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validated()
    }

    /// Apply `KABUSCORE_*` overrides using `lookup` to read variables.
    pub fn with_env_overrides(
        mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        if let Some(value) = lookup(ENV_BASE_URL) {
            self.base_url = value;
        }
        if let Some(value) = lookup(ENV_TIMEOUT_MS) {
            self.timeout_ms = value.trim().parse().map_err(|_| ConfigError::InvalidEnv {
                var: ENV_TIMEOUT_MS,
                value,
            })?;
        }
        if let Some(value) = lookup(ENV_SOURCE) {
            self.source = value.parse().map_err(|_| ConfigError::InvalidEnv {
                var: ENV_SOURCE,
                value,
            })?;
        }
        self.validated()
    }

    /// Check invariants and normalize the base URL.
    pub fn validated(mut self) -> Result<Self, ConfigError> {
        let trimmed = self.base_url.trim().trim_end_matches('/');
        if !(trimmed.starts_with("http://") || trimmed.starts_with("https://")) {
            return Err(ConfigError::Invalid(format!(
                "base_url must start with http:// or https://: '{}'",
                self.base_url
            )));
        }
        self.base_url = trimmed.to_owned();

        if self.timeout_ms == 0 {
            return Err(ConfigError::Invalid(String::from(
                "timeout_ms must be greater than zero",
            )));
        }
        if self.failure_threshold == 0 {
            return Err(ConfigError::Invalid(String::from(
                "failure_threshold must be greater than zero",
            )));
        }
        Ok(self)
    }

    pub fn retry_config(&self) -> RetryConfig {
        if self.max_retries == 0 {
            RetryConfig::no_retry()
        } else {
            RetryConfig::exponential(self.max_retries)
        }
    }

    pub fn circuit_breaker_config(&self) -> CircuitBreakerConfig {
        CircuitBreakerConfig {
            failure_threshold: self.failure_threshold,
            open_timeout: Duration::from_secs(self.open_timeout_secs),
        }
    }
}
