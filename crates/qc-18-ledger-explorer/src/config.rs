//! # Ledger Explorer Configuration
//!
//! Configuration for the explorer service and its reference adapters.

use serde::{Deserialize, Serialize};
use std::env;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

use crate::domain::{ExplorerError, DEFAULT_LIST_LIMIT};

/// Configuration validation errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("rpc_url is required")]
    MissingRpcUrl,

    #[error("rpc_url must be an http(s) URL: {0}")]
    InvalidRpcUrl(String),

    #[error("Invalid timeout: {0}")]
    InvalidTimeout(String),

    #[error("Invalid limit: {0}")]
    InvalidLimit(String),

    #[error("{name} is not a valid number: {value:?}")]
    InvalidEnvVar { name: &'static str, value: String },
}

impl From<ConfigError> for ExplorerError {
    fn from(err: ConfigError) -> Self {
        ExplorerError::Misconfiguration(err.to_string())
    }
}

/// Ledger explorer configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExplorerConfig {
    /// JSON-RPC endpoint of the node answering `eth_getBalance`.
    pub rpc_url: String,

    /// Per-request timeout for the balance oracle, in seconds.
    pub rpc_timeout_secs: u64,

    /// Capacity of the in-memory result cache (composites).
    pub cache_capacity: usize,

    /// Records returned by list lookups when no limit is given.
    pub default_list_limit: usize,

    /// Upper bound on a caller-supplied limit.
    pub max_list_limit: usize,
}

impl Default for ExplorerConfig {
    fn default() -> Self {
        Self {
            rpc_url: "http://localhost:8545".to_string(),
            rpc_timeout_secs: 10,
            cache_capacity: 10_000,
            default_list_limit: DEFAULT_LIST_LIMIT,
            max_list_limit: 100,
        }
    }
}

impl ExplorerConfig {
    /// Create a config for testing (smaller values).
    pub fn for_testing() -> Self {
        Self {
            rpc_url: "http://127.0.0.1:8545".to_string(),
            rpc_timeout_secs: 1,
            cache_capacity: 16,
            default_list_limit: DEFAULT_LIST_LIMIT,
            max_list_limit: 25,
        }
    }

    /// Create configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `QC_EXPLORER_RPC_URL`: node endpoint (default: http://localhost:8545)
    /// - `QC_EXPLORER_RPC_TIMEOUT_SECS`: oracle timeout (default: 10)
    /// - `QC_EXPLORER_CACHE_CAPACITY`: result cache entries (default: 10000)
    /// - `QC_EXPLORER_LIST_LIMIT`: default list limit (default: 10)
    ///
    /// Unset variables take the default. A variable that is set but does not
    /// parse is an error; call [`validate`] to reject unusable values.
    ///
    /// [`validate`]: ExplorerConfig::validate
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        Ok(Self {
            rpc_url: env::var("QC_EXPLORER_RPC_URL").unwrap_or(defaults.rpc_url),
            rpc_timeout_secs: env_number("QC_EXPLORER_RPC_TIMEOUT_SECS", defaults.rpc_timeout_secs)?,
            cache_capacity: env_number("QC_EXPLORER_CACHE_CAPACITY", defaults.cache_capacity)?,
            default_list_limit: env_number("QC_EXPLORER_LIST_LIMIT", defaults.default_list_limit)?,
            max_list_limit: defaults.max_list_limit,
        })
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        let url = self.rpc_url.trim();
        if url.is_empty() {
            return Err(ConfigError::MissingRpcUrl);
        }
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(ConfigError::InvalidRpcUrl(url.to_string()));
        }

        if self.rpc_timeout_secs == 0 {
            return Err(ConfigError::InvalidTimeout(
                "rpc_timeout_secs cannot be 0".into(),
            ));
        }

        if self.cache_capacity == 0 {
            return Err(ConfigError::InvalidLimit("cache_capacity cannot be 0".into()));
        }

        if self.default_list_limit == 0 {
            return Err(ConfigError::InvalidLimit(
                "default_list_limit cannot be 0".into(),
            ));
        }

        if self.max_list_limit < self.default_list_limit {
            return Err(ConfigError::InvalidLimit(format!(
                "max_list_limit {} is below default_list_limit {}",
                self.max_list_limit, self.default_list_limit
            )));
        }

        Ok(())
    }

    /// Oracle request timeout.
    pub fn rpc_timeout(&self) -> Duration {
        Duration::from_secs(self.rpc_timeout_secs)
    }

    /// Clamp a caller-supplied list limit; `None` means the default.
    pub fn list_limit(&self, requested: Option<usize>) -> usize {
        requested
            .unwrap_or(self.default_list_limit)
            .min(self.max_list_limit)
    }
}

fn env_number<T: FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    parse_number(name, env::var(name).ok(), default)
}

fn parse_number<T: FromStr>(
    name: &'static str,
    raw: Option<String>,
    default: T,
) -> Result<T, ConfigError> {
    match raw {
        None => Ok(default),
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidEnvVar { name, value }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ExplorerConfig::default();
        assert_eq!(config.default_list_limit, 10);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_testing_config() {
        let config = ExplorerConfig::for_testing();
        assert_eq!(config.rpc_timeout(), Duration::from_secs(1));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_missing_rpc_url() {
        let config = ExplorerConfig {
            rpc_url: "  ".into(),
            ..ExplorerConfig::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::MissingRpcUrl));
    }

    #[test]
    fn test_non_http_rpc_url() {
        let config = ExplorerConfig {
            rpc_url: "ws://localhost:8546".into(),
            ..ExplorerConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidRpcUrl(_))
        ));
    }

    #[test]
    fn test_zero_values_rejected() {
        let config = ExplorerConfig {
            rpc_timeout_secs: 0,
            ..ExplorerConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidTimeout(_))
        ));

        let config = ExplorerConfig {
            cache_capacity: 0,
            ..ExplorerConfig::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::InvalidLimit(_))));
    }

    #[test]
    fn test_config_error_is_misconfiguration() {
        let err: ExplorerError = ConfigError::MissingRpcUrl.into();
        assert!(matches!(err, ExplorerError::Misconfiguration(_)));
    }

    #[test]
    fn test_unset_number_takes_default() {
        assert_eq!(parse_number("QC_EXPLORER_LIST_LIMIT", None, 10usize), Ok(10));
        assert_eq!(
            parse_number("QC_EXPLORER_LIST_LIMIT", Some(" 25 ".into()), 10usize),
            Ok(25)
        );
    }

    #[test]
    fn test_unparseable_number_is_rejected() {
        let err = parse_number("QC_EXPLORER_RPC_TIMEOUT_SECS", Some("ten".into()), 10u64)
            .unwrap_err();
        assert_eq!(
            err,
            ConfigError::InvalidEnvVar {
                name: "QC_EXPLORER_RPC_TIMEOUT_SECS",
                value: "ten".into(),
            }
        );

        let err: ExplorerError = err.into();
        assert!(matches!(err, ExplorerError::Misconfiguration(_)));
    }

    #[test]
    fn test_list_limit_clamped() {
        let config = ExplorerConfig::for_testing();
        assert_eq!(config.list_limit(None), 10);
        assert_eq!(config.list_limit(Some(3)), 3);
        assert_eq!(config.list_limit(Some(1_000)), 25);
    }

    #[test]
    fn test_partial_config_deserializes_with_defaults() {
        let config: ExplorerConfig =
            serde_json::from_str(r#"{"rpc_url":"https://node.example"}"#).unwrap();
        assert_eq!(config.rpc_url, "https://node.example");
        assert_eq!(config.cache_capacity, 10_000);
    }
}
