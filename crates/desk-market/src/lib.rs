//! Market data and presentation helpers for trading-desk
//!
//! Two halves live here:
//!
//! - the **accessor** ([`MarketData`]): price history from Yahoo Finance and
//!   descriptive company info from Alpha Vantage, behind TTL caches
//! - the **formatter** ([`format`], [`charts`]): pure functions turning
//!   numbers and [`StockInfo`] into display strings, metric tiles and
//!   Plotly-compatible figures
//!
//! Nothing in this crate touches session state.

pub mod api;
pub mod cache;
pub mod charts;
pub mod config;
pub mod error;
pub mod format;
pub mod market;
pub mod source;
pub mod types;

pub use cache::{CacheKey, MarketCache};
pub use charts::Figure;
pub use config::MarketConfig;
pub use error::{MarketError, Result};
pub use format::{MetricTile, format_currency, format_percentage, format_price_change, metric_tiles};
pub use market::MarketData;
pub use source::{LiveMarketSource, MarketDataSource};
pub use types::{PriceBar, StockInfo};
