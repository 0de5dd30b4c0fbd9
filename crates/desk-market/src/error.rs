//! Error types for market data operations

use thiserror::Error;

/// Market data specific errors
#[derive(Debug, Error)]
pub enum MarketError {
    /// Invalid stock symbol provided
    #[error("Invalid symbol: {0}")]
    InvalidSymbol(String),

    /// Rate limit exceeded for API
    #[error("Rate limit exceeded for {provider}")]
    RateLimitExceeded {
        provider: String,
    },

    /// Network or HTTP error
    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    /// JSON parsing error
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Yahoo Finance API error
    #[error("Yahoo Finance error: {0}")]
    YahooFinanceError(String),

    /// Alpha Vantage API error
    #[error("Alpha Vantage error: {0}")]
    AlphaVantageError(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Result type alias for market data operations
pub type Result<T> = std::result::Result<T, MarketError>;

/// Market data failures surface as `DataFetchFailed` for the given symbol
pub fn into_core(symbol: &str, err: MarketError) -> desk_core::Error {
    desk_core::Error::DataFetchFailed {
        symbol: symbol.to_string(),
        reason: err.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = MarketError::InvalidSymbol("INVALID".to_string());
        assert_eq!(err.to_string(), "Invalid symbol: INVALID");

        let err = MarketError::RateLimitExceeded {
            provider: "Alpha Vantage".to_string(),
        };
        assert_eq!(err.to_string(), "Rate limit exceeded for Alpha Vantage");
    }

    #[test]
    fn test_error_conversion() {
        let err = into_core("NVDA", MarketError::YahooFinanceError("timeout".to_string()));

        match err {
            desk_core::Error::DataFetchFailed { symbol, reason } => {
                assert_eq!(symbol, "NVDA");
                assert!(reason.contains("timeout"));
            }
            _ => panic!("Expected DataFetchFailed variant"),
        }
    }
}
