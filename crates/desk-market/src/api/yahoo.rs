//! Yahoo Finance price history client

use crate::error::{MarketError, Result};
use crate::types::PriceBar;
use chrono::{DateTime, Utc};
use std::time::Duration;
use time::OffsetDateTime;
use yahoo_finance_api as yahoo;

/// Yahoo Finance API client
#[derive(Debug, Clone)]
pub struct YahooFinanceClient {
    timeout: Duration,
}

impl YahooFinanceClient {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    /// Daily bars for `symbol` between `start` and `end`, oldest first
    pub async fn get_price_history(
        &self,
        symbol: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<PriceBar>> {
        let provider = yahoo::YahooConnector::new()
            .map_err(|e| MarketError::YahooFinanceError(e.to_string()))?;

        let start_odt = OffsetDateTime::from_unix_timestamp(start.timestamp()).map_err(|e| {
            MarketError::YahooFinanceError(format!("Invalid start timestamp: {}", e))
        })?;
        let end_odt = OffsetDateTime::from_unix_timestamp(end.timestamp())
            .map_err(|e| MarketError::YahooFinanceError(format!("Invalid end timestamp: {}", e)))?;

        let response = tokio::time::timeout(
            self.timeout,
            provider.get_quote_history(symbol, start_odt, end_odt),
        )
        .await
        .map_err(|_| {
            MarketError::YahooFinanceError(format!(
                "Request timed out after {}s",
                self.timeout.as_secs()
            ))
        })?
        .map_err(|e| MarketError::YahooFinanceError(e.to_string()))?;

        let quotes = response
            .quotes()
            .map_err(|e| MarketError::YahooFinanceError(e.to_string()))?;

        let mut bars: Vec<PriceBar> = quotes
            .iter()
            .filter_map(|q| {
                let date = DateTime::from_timestamp(q.timestamp as i64, 0)?;
                Some(PriceBar {
                    date,
                    open: q.open,
                    high: q.high,
                    low: q.low,
                    close: q.close,
                    volume: q.volume,
                })
            })
            .collect();
        bars.sort_by_key(|bar| bar.date);

        Ok(bars)
    }
}

impl Default for YahooFinanceClient {
    fn default() -> Self {
        Self::new(Duration::from_secs(30))
    }
}
