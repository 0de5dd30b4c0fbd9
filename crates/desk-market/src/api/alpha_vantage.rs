//! Alpha Vantage API client: company overview and global quote

use crate::error::{MarketError, Result};
use governor::clock::DefaultClock;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;

const BASE_URL: &str = "https://www.alphavantage.co/query";

const FREE_TIER_PER_MINUTE: NonZeroU32 = match NonZeroU32::new(5) {
    Some(n) => n,
    None => unreachable!(),
};

type SharedRateLimiter = Arc<RateLimiter<NotKeyed, InMemoryState, DefaultClock>>;

/// Alpha Vantage API client
#[derive(Debug, Clone)]
pub struct AlphaVantageClient {
    client: Client,
    api_key: String,
    rate_limiter: SharedRateLimiter,
}

/// `OVERVIEW` payload; every value arrives as a string, `"None"` when unknown
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct CompanyOverview {
    pub symbol: String,
    pub name: Option<String>,
    pub sector: Option<String>,
    pub industry: Option<String>,
    #[serde(rename = "MarketCapitalization")]
    pub market_cap: Option<String>,
    #[serde(rename = "ForwardPE")]
    pub forward_pe: Option<String>,
    pub dividend_yield: Option<String>,
    pub beta: Option<String>,
    #[serde(rename = "52WeekHigh")]
    pub week_52_high: Option<String>,
    #[serde(rename = "52WeekLow")]
    pub week_52_low: Option<String>,
}

/// `GLOBAL_QUOTE` payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GlobalQuote {
    #[serde(rename = "01. symbol")]
    pub symbol: String,
    #[serde(rename = "03. high")]
    pub high: Option<String>,
    #[serde(rename = "04. low")]
    pub low: Option<String>,
    #[serde(rename = "05. price")]
    pub price: Option<String>,
    #[serde(rename = "08. previous close")]
    pub previous_close: Option<String>,
}

/// Parse one of Alpha Vantage's stringly numbers, zero when absent or `"None"`
pub fn parse_number(value: Option<&str>) -> f64 {
    value
        .and_then(|v| v.trim().parse::<f64>().ok())
        .filter(|v| v.is_finite())
        .unwrap_or(0.0)
}

/// Keep a text field unless it is blank or `"None"`
pub fn non_empty_text(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty() && *v != "None")
        .map(str::to_string)
}

impl AlphaVantageClient {
    /// Create a client allowing `rate_limit` requests per minute
    pub fn new(api_key: impl Into<String>, rate_limit: u32, timeout: Duration) -> Result<Self> {
        let quota = Quota::per_minute(NonZeroU32::new(rate_limit).unwrap_or(FREE_TIER_PER_MINUTE));
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            api_key: api_key.into(),
            rate_limiter: Arc::new(RateLimiter::direct(quota)),
        })
    }

    async fn query(&self, function: &str, symbol: &str) -> Result<Value> {
        self.rate_limiter.until_ready().await;

        let params = [
            ("function", function),
            ("symbol", symbol),
            ("apikey", self.api_key.as_str()),
        ];
        let response = self.client.get(BASE_URL).query(&params).send().await?;

        if !response.status().is_success() {
            return Err(MarketError::AlphaVantageError(format!(
                "HTTP error: {}",
                response.status()
            )));
        }

        let data: Value = response.json().await?;
        check_response(data)
    }

    /// Company overview and fundamentals
    pub async fn get_company_overview(&self, symbol: &str) -> Result<CompanyOverview> {
        let data = self.query("OVERVIEW", symbol).await?;

        // Unknown symbols come back as `{}`
        if data.as_object().is_none_or(|o| o.is_empty()) {
            return Err(MarketError::InvalidSymbol(symbol.to_string()));
        }

        Ok(serde_json::from_value(data)?)
    }

    /// Current price data
    pub async fn get_quote(&self, symbol: &str) -> Result<GlobalQuote> {
        let mut data = self.query("GLOBAL_QUOTE", symbol).await?;

        let quote = data
            .get_mut("Global Quote")
            .map(Value::take)
            .filter(|q| q.as_object().is_some_and(|o| !o.is_empty()))
            .ok_or_else(|| MarketError::InvalidSymbol(symbol.to_string()))?;

        Ok(serde_json::from_value(quote)?)
    }
}

/// Map Alpha Vantage's in-band error payloads to errors
fn check_response(data: Value) -> Result<Value> {
    if let Some(error) = data.get("Error Message") {
        return Err(MarketError::AlphaVantageError(error.to_string()));
    }

    if data.get("Note").is_some() || data.get("Information").is_some() {
        return Err(MarketError::RateLimitExceeded {
            provider: "Alpha Vantage".to_string(),
        });
    }

    Ok(data)
}
