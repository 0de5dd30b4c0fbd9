//! Configuration for market data access

use crate::error::{MarketError, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Environment variable holding the Alpha Vantage key
pub const ALPHA_VANTAGE_API_KEY_VAR: &str = "ALPHA_VANTAGE_API_KEY";

/// Configuration for the market-data accessor
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketConfig {
    /// Cache TTL for price history
    pub history_cache_ttl: Duration,

    /// Cache TTL for company info
    pub info_cache_ttl: Duration,

    /// Per-request timeout
    pub request_timeout: Duration,

    /// Alpha Vantage requests per minute
    pub alpha_vantage_rate_limit: u32,

    /// Alpha Vantage API key; company info is unavailable without it
    pub alpha_vantage_api_key: Option<String>,
}

impl Default for MarketConfig {
    fn default() -> Self {
        Self {
            history_cache_ttl: Duration::from_secs(300),
            info_cache_ttl: Duration::from_secs(3600),
            request_timeout: Duration::from_secs(30),
            alpha_vantage_rate_limit: 5,
            alpha_vantage_api_key: None,
        }
    }
}

impl MarketConfig {
    /// Create a new configuration builder
    pub fn builder() -> MarketConfigBuilder {
        MarketConfigBuilder::default()
    }

    /// Defaults plus the API key from the environment
    pub fn from_env() -> Self {
        Self {
            alpha_vantage_api_key: read_api_key(),
            ..Self::default()
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.alpha_vantage_rate_limit == 0 {
            return Err(MarketError::ConfigError(
                "alpha_vantage_rate_limit must be greater than 0".to_string(),
            ));
        }

        if self.request_timeout.is_zero() {
            return Err(MarketError::ConfigError(
                "request_timeout must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}

fn read_api_key() -> Option<String> {
    std::env::var(ALPHA_VANTAGE_API_KEY_VAR)
        .ok()
        .filter(|key| !key.trim().is_empty())
}

/// Builder for MarketConfig
#[derive(Debug, Default)]
pub struct MarketConfigBuilder {
    history_cache_ttl: Option<Duration>,
    info_cache_ttl: Option<Duration>,
    request_timeout: Option<Duration>,
    alpha_vantage_rate_limit: Option<u32>,
    alpha_vantage_api_key: Option<String>,
}

impl MarketConfigBuilder {
    pub fn history_cache_ttl(mut self, duration: Duration) -> Self {
        self.history_cache_ttl = Some(duration);
        self
    }

    pub fn info_cache_ttl(mut self, duration: Duration) -> Self {
        self.info_cache_ttl = Some(duration);
        self
    }

    pub fn request_timeout(mut self, duration: Duration) -> Self {
        self.request_timeout = Some(duration);
        self
    }

    pub fn alpha_vantage_rate_limit(mut self, per_minute: u32) -> Self {
        self.alpha_vantage_rate_limit = Some(per_minute);
        self
    }

    pub fn alpha_vantage_api_key(mut self, key: impl Into<String>) -> Self {
        self.alpha_vantage_api_key = Some(key.into());
        self
    }

    /// Load the Alpha Vantage API key from the environment
    pub fn with_env_api_key(mut self) -> Self {
        if let Some(key) = read_api_key() {
            self.alpha_vantage_api_key = Some(key);
        }
        self
    }

    /// Build the configuration
    pub fn build(self) -> Result<MarketConfig> {
        let defaults = MarketConfig::default();

        let config = MarketConfig {
            history_cache_ttl: self.history_cache_ttl.unwrap_or(defaults.history_cache_ttl),
            info_cache_ttl: self.info_cache_ttl.unwrap_or(defaults.info_cache_ttl),
            request_timeout: self.request_timeout.unwrap_or(defaults.request_timeout),
            alpha_vantage_rate_limit: self
                .alpha_vantage_rate_limit
                .unwrap_or(defaults.alpha_vantage_rate_limit),
            alpha_vantage_api_key: self.alpha_vantage_api_key,
        };

        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = MarketConfig::default();
        assert_eq!(config.alpha_vantage_rate_limit, 5);
        assert_eq!(config.info_cache_ttl, Duration::from_secs(3600));
        assert!(config.alpha_vantage_api_key.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_builder() {
        let config = MarketConfig::builder()
            .alpha_vantage_api_key("demo")
            .request_timeout(Duration::from_secs(10))
            .build()
            .unwrap();

        assert_eq!(config.alpha_vantage_api_key.as_deref(), Some("demo"));
        assert_eq!(config.request_timeout, Duration::from_secs(10));
        assert_eq!(config.history_cache_ttl, Duration::from_secs(300));
    }

    #[test]
    fn test_validation_zero_rate_limit() {
        let result = MarketConfig::builder().alpha_vantage_rate_limit(0).build();
        assert!(matches!(result, Err(MarketError::ConfigError(_))));
    }
}
