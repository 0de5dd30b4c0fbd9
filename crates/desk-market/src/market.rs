//! Cached market-data accessor used by the dashboard and the chat demo

use crate::cache::{CacheKey, MarketCache};
use crate::config::MarketConfig;
use crate::error::{MarketError, Result, into_core};
use crate::source::{LiveMarketSource, MarketDataSource};
use crate::types::{PriceBar, StockInfo};
use chrono::Utc;
use std::sync::Arc;

/// Read-only access to price history and company info
#[derive(Clone)]
pub struct MarketData {
    source: Arc<dyn MarketDataSource>,
    history_cache: MarketCache,
    info_cache: MarketCache,
}

impl MarketData {
    pub fn new(source: Arc<dyn MarketDataSource>, config: &MarketConfig) -> Self {
        Self {
            source,
            history_cache: MarketCache::new(config.history_cache_ttl),
            info_cache: MarketCache::new(config.info_cache_ttl),
        }
    }

    /// Accessor over the live Yahoo Finance and Alpha Vantage providers
    pub fn live(config: &MarketConfig) -> Result<Self> {
        config.validate()?;
        let source = LiveMarketSource::new(config)?;
        Ok(Self::new(Arc::new(source), config))
    }

    /// Bars for the last `lookback_days` days, oldest first
    ///
    /// An empty vector means the provider had no data to draw; an error means
    /// the lookup itself failed.
    pub async fn fetch_price_history(
        &self,
        ticker: &str,
        lookback_days: u32,
    ) -> desk_core::Result<Vec<PriceBar>> {
        let symbol = normalise(ticker).map_err(|e| into_core(ticker, e))?;
        let key = CacheKey::new(&symbol, "history", lookback_days);

        let value = self
            .history_cache
            .get_or_fetch(key, || async {
                let end = Utc::now();
                let start = end - chrono::Duration::days(i64::from(lookback_days));
                let bars = self.source.price_history(&symbol, start, end).await?;
                tracing::debug!("Fetched {} bars for {}", bars.len(), symbol);
                Ok::<_, MarketError>(serde_json::to_value(bars)?)
            })
            .await
            .map_err(|e| into_core(&symbol, e))?;

        Ok(serde_json::from_value(value)?)
    }

    /// Company info, or the error explaining why there is none
    pub async fn try_fetch_stock_info(&self, ticker: &str) -> desk_core::Result<StockInfo> {
        let symbol = normalise(ticker).map_err(|e| into_core(ticker, e))?;
        let key = CacheKey::new(&symbol, "info", "");

        let value = self
            .info_cache
            .get_or_fetch(key, || async {
                let info = self.source.stock_info(&symbol).await?;
                Ok::<_, MarketError>(serde_json::to_value(info)?)
            })
            .await
            .map_err(|e| into_core(&symbol, e))?;

        Ok(serde_json::from_value(value)?)
    }

    /// Company info; `None` when it could not be fetched
    pub async fn fetch_stock_info(&self, ticker: &str) -> Option<StockInfo> {
        match self.try_fetch_stock_info(ticker).await {
            Ok(info) => Some(info),
            Err(e) => {
                tracing::warn!("No stock info for {}: {}", ticker, e);
                None
            }
        }
    }
}

fn normalise(ticker: &str) -> Result<String> {
    let symbol = ticker.trim().to_uppercase();
    if symbol.is_empty() {
        return Err(MarketError::InvalidSymbol(ticker.to_string()));
    }
    Ok(symbol)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::MockMarketDataSource;
    use chrono::TimeZone;
    use desk_core::Error;

    fn bar(day: u32, close: f64) -> PriceBar {
        PriceBar {
            date: Utc.with_ymd_and_hms(2024, 11, day, 0, 0, 0).unwrap(),
            open: close - 1.0,
            high: close + 1.0,
            low: close - 2.0,
            close,
            volume: 1_000,
        }
    }

    fn market(source: MockMarketDataSource) -> MarketData {
        MarketData::new(Arc::new(source), &MarketConfig::default())
    }

    #[tokio::test]
    async fn test_price_history_is_cached() {
        let mut source = MockMarketDataSource::new();
        source
            .expect_price_history()
            .times(1)
            .returning(|symbol, _, _| {
                assert_eq!(symbol, "NVDA");
                Ok(vec![bar(14, 140.0), bar(15, 141.5)])
            });

        let market = market(source);
        let bars = market.fetch_price_history(" nvda ", 30).await.unwrap();
        assert_eq!(bars.len(), 2);
        assert_eq!(bars[1].close, 141.5);

        let again = market.fetch_price_history("NVDA", 30).await.unwrap();
        assert_eq!(again, bars);
    }

    #[tokio::test]
    async fn test_empty_history_is_not_an_error() {
        let mut source = MockMarketDataSource::new();
        source
            .expect_price_history()
            .returning(|_, _, _| Ok(Vec::new()));

        let bars = market(source).fetch_price_history("AAPL", 7).await.unwrap();
        assert!(bars.is_empty());
    }

    #[tokio::test]
    async fn test_history_failure_is_data_fetch_failed() {
        let mut source = MockMarketDataSource::new();
        source
            .expect_price_history()
            .returning(|_, _, _| Err(MarketError::YahooFinanceError("404".to_string())));

        let err = market(source).fetch_price_history("ZZZZ", 30).await.unwrap_err();
        assert!(matches!(err, Error::DataFetchFailed { ref symbol, .. } if symbol == "ZZZZ"));
    }

    #[tokio::test]
    async fn test_blank_ticker_is_rejected_without_fetching() {
        let source = MockMarketDataSource::new();
        let err = market(source).fetch_price_history("   ", 30).await.unwrap_err();
        assert!(matches!(err, Error::DataFetchFailed { .. }));
    }

    #[tokio::test]
    async fn test_stock_info_degrades_to_none() {
        let mut source = MockMarketDataSource::new();
        source
            .expect_stock_info()
            .returning(|_| Err(MarketError::ConfigError("no key".to_string())));

        assert!(market(source).fetch_stock_info("AAPL").await.is_none());
    }

    #[tokio::test]
    async fn test_stock_info() {
        let mut source = MockMarketDataSource::new();
        source.expect_stock_info().times(1).returning(|symbol| {
            Ok(StockInfo {
                name: "Apple Inc".to_string(),
                ..StockInfo::placeholder(symbol)
            })
        });

        let market = market(source);
        let info = market.fetch_stock_info("aapl").await.unwrap();
        assert_eq!(info.symbol, "AAPL");
        assert_eq!(info.name, "Apple Inc");
        assert!(market.fetch_stock_info("AAPL").await.is_some());
    }
}
