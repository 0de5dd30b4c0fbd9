//! Display formatting for market values

use crate::types::StockInfo;
use serde::{Deserialize, Serialize};

/// Round half away from zero to two decimals
///
/// `format!("{:.2}")` rounds the exact binary value, which turns 12.345 into
/// "12.34".
fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// `$` amount with a B/M/K suffix at 1e9, 1e6 and 1e3
pub fn format_currency(value: f64) -> String {
    if value >= 1e9 {
        format!("${:.2}B", round2(value / 1e9))
    } else if value >= 1e6 {
        format!("${:.2}M", round2(value / 1e6))
    } else if value >= 1e3 {
        format!("${:.2}K", round2(value / 1e3))
    } else {
        format!("${:.2}", round2(value))
    }
}

/// Two-decimal percentage, e.g. `12.35%`
pub fn format_percentage(value: f64) -> String {
    format!("{:.2}%", round2(value))
}

/// Signed change against the previous close, e.g. `+1.23 (+0.45%)`
pub fn format_price_change(current: f64, previous: f64) -> String {
    let change = current - previous;
    let pct = if previous != 0.0 {
        change / previous * 100.0
    } else {
        0.0
    };
    format_change(change, pct)
}

fn format_change(change: f64, pct: f64) -> String {
    format!("{:+.2} ({:+.2}%)", round2(change), round2(pct))
}

/// One headline number in the key-metrics strip
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricTile {
    pub label: String,
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delta: Option<String>,
}

impl MetricTile {
    fn new(label: &str, value: String) -> Self {
        Self {
            label: label.to_string(),
            value,
            delta: None,
        }
    }
}

/// Current price, market cap, P/E and dividend yield tiles
pub fn metric_tiles(info: &StockInfo) -> Vec<MetricTile> {
    let (change, pct) = info.change();
    let price = MetricTile {
        delta: Some(format_change(change, pct)),
        ..MetricTile::new("Current Price", format!("${:.2}", round2(info.current_price)))
    };

    let pe_ratio = if info.pe_ratio != 0.0 {
        format!("{:.2}", round2(info.pe_ratio))
    } else {
        "N/A".to_string()
    };

    let dividend_yield = if info.dividend_yield != 0.0 {
        format_percentage(info.dividend_yield * 100.0)
    } else {
        "N/A".to_string()
    };

    vec![
        price,
        MetricTile::new("Market Cap", format_currency(info.market_cap)),
        MetricTile::new("P/E Ratio", pe_ratio),
        MetricTile::new("Dividend Yield", dividend_yield),
    ]
}
