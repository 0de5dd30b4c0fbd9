//! Where market data comes from

use crate::api::alpha_vantage::{non_empty_text, parse_number};
use crate::api::{AlphaVantageClient, CompanyOverview, GlobalQuote, YahooFinanceClient};
use crate::config::MarketConfig;
use crate::error::{MarketError, Result};
use crate::types::{PriceBar, StockInfo};
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Provider seam behind [`crate::MarketData`]
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MarketDataSource: Send + Sync {
    /// Daily bars in `[start, end]`, oldest first; empty when the provider has none
    async fn price_history(
        &self,
        symbol: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<PriceBar>>;

    /// Descriptive fields for `symbol`
    async fn stock_info(&self, symbol: &str) -> Result<StockInfo>;
}

/// Yahoo Finance for history, Alpha Vantage for company info
pub struct LiveMarketSource {
    yahoo: YahooFinanceClient,
    alpha_vantage: Option<AlphaVantageClient>,
}

impl LiveMarketSource {
    pub fn new(config: &MarketConfig) -> Result<Self> {
        let alpha_vantage = match &config.alpha_vantage_api_key {
            Some(key) => Some(AlphaVantageClient::new(
                key.clone(),
                config.alpha_vantage_rate_limit,
                config.request_timeout,
            )?),
            None => {
                tracing::warn!("ALPHA_VANTAGE_API_KEY not set; stock info will be unavailable");
                None
            }
        };

        Ok(Self {
            yahoo: YahooFinanceClient::new(config.request_timeout),
            alpha_vantage,
        })
    }
}

#[async_trait]
impl MarketDataSource for LiveMarketSource {
    async fn price_history(
        &self,
        symbol: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<PriceBar>> {
        self.yahoo.get_price_history(symbol, start, end).await
    }

    async fn stock_info(&self, symbol: &str) -> Result<StockInfo> {
        let client = self.alpha_vantage.as_ref().ok_or_else(|| {
            MarketError::ConfigError("ALPHA_VANTAGE_API_KEY not set".to_string())
        })?;

        let overview = client.get_company_overview(symbol).await?;
        // The overview alone is still worth showing
        let quote = match client.get_quote(symbol).await {
            Ok(quote) => quote,
            Err(e) => {
                tracing::warn!("Global quote for {} unavailable: {}", symbol, e);
                GlobalQuote::default()
            }
        };

        Ok(merge_info(symbol, &overview, &quote))
    }
}

/// Combine the overview and quote payloads into one [`StockInfo`]
pub(crate) fn merge_info(symbol: &str, overview: &CompanyOverview, quote: &GlobalQuote) -> StockInfo {
    let defaults = StockInfo::placeholder(symbol);
    StockInfo {
        name: non_empty_text(overview.name.as_deref()).unwrap_or(defaults.name),
        sector: non_empty_text(overview.sector.as_deref()).unwrap_or(defaults.sector),
        industry: non_empty_text(overview.industry.as_deref()).unwrap_or(defaults.industry),
        market_cap: parse_number(overview.market_cap.as_deref()),
        pe_ratio: parse_number(overview.forward_pe.as_deref()),
        dividend_yield: parse_number(overview.dividend_yield.as_deref()),
        beta: parse_number(overview.beta.as_deref()),
        current_price: parse_number(quote.price.as_deref()),
        previous_close: parse_number(quote.previous_close.as_deref()),
        day_high: parse_number(quote.high.as_deref()),
        day_low: parse_number(quote.low.as_deref()),
        fifty_two_week_high: parse_number(overview.week_52_high.as_deref()),
        fifty_two_week_low: parse_number(overview.week_52_low.as_deref()),
        symbol: defaults.symbol,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_info() {
        let overview = CompanyOverview {
            symbol: "NVDA".to_string(),
            name: Some("NVIDIA Corporation".to_string()),
            sector: Some("TECHNOLOGY".to_string()),
            industry: Some("None".to_string()),
            market_cap: Some("3400000000000".to_string()),
            forward_pe: Some("32.1".to_string()),
            dividend_yield: Some("None".to_string()),
            ..CompanyOverview::default()
        };
        let quote = GlobalQuote {
            price: Some("141.98".to_string()),
            previous_close: Some("146.76".to_string()),
            ..GlobalQuote::default()
        };

        let info = merge_info("NVDA", &overview, &quote);
        assert_eq!(info.name, "NVIDIA Corporation");
        assert_eq!(info.industry, "N/A");
        assert_eq!(info.market_cap, 3.4e12);
        assert_eq!(info.dividend_yield, 0.0);
        assert_eq!(info.current_price, 141.98);
        assert_eq!(info.day_high, 0.0);
    }

    #[test]
    fn test_merge_info_defaults_name_to_symbol() {
        let info = merge_info("XYZ", &CompanyOverview::default(), &GlobalQuote::default());
        assert_eq!(info, StockInfo::placeholder("XYZ"));
    }

    #[tokio::test]
    async fn test_stock_info_without_key() {
        let source = LiveMarketSource::new(&MarketConfig::default()).unwrap();
        let err = source.stock_info("AAPL").await.unwrap_err();
        assert!(matches!(err, MarketError::ConfigError(_)));
    }
}
