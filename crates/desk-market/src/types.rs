//! Market data values shared by the accessor and the formatter

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One OHLCV bar of price history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceBar {
    pub date: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
}

/// Descriptive fields for a ticker
///
/// Text fields default to `"N/A"` (the name to the ticker itself) and numeric
/// fields to zero when the provider does not report them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockInfo {
    pub symbol: String,
    pub name: String,
    pub sector: String,
    pub industry: String,
    pub market_cap: f64,
    /// Forward P/E
    pub pe_ratio: f64,
    /// Fraction, e.g. `0.0044` for 0.44%
    pub dividend_yield: f64,
    pub beta: f64,
    pub current_price: f64,
    pub previous_close: f64,
    pub day_high: f64,
    pub day_low: f64,
    pub fifty_two_week_high: f64,
    pub fifty_two_week_low: f64,
}

impl StockInfo {
    /// Info with every field at its default
    pub fn placeholder(symbol: impl Into<String>) -> Self {
        let symbol = symbol.into();
        Self {
            name: symbol.clone(),
            symbol,
            sector: "N/A".to_string(),
            industry: "N/A".to_string(),
            market_cap: 0.0,
            pe_ratio: 0.0,
            dividend_yield: 0.0,
            beta: 0.0,
            current_price: 0.0,
            previous_close: 0.0,
            day_high: 0.0,
            day_low: 0.0,
            fifty_two_week_high: 0.0,
            fifty_two_week_low: 0.0,
        }
    }

    /// Absolute and relative change against the previous close
    pub fn change(&self) -> (f64, f64) {
        let change = self.current_price - self.previous_close;
        let pct = if self.previous_close != 0.0 {
            change / self.previous_close * 100.0
        } else {
            0.0
        };
        (change, pct)
    }
}
