//! Validated analysis requests

use chrono::NaiveDate;
use desk_core::{AnalystSelection, Error, Result};
use serde::{Deserialize, Serialize};

pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Inputs for one analysis run, already validated
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnalysisRequest {
    pub ticker: String,
    pub trade_date: NaiveDate,
    pub analysts: AnalystSelection,
}

impl AnalysisRequest {
    pub fn new(ticker: &str, trade_date: NaiveDate, analysts: AnalystSelection) -> Result<Self> {
        Ok(Self {
            ticker: normalise_ticker(ticker)?,
            trade_date,
            analysts,
        })
    }

    /// Validate raw UI input: ticker, `YYYY-MM-DD` date and analyst names
    pub fn parse<S: AsRef<str>>(ticker: &str, trade_date: &str, analysts: &[S]) -> Result<Self> {
        let ticker = normalise_ticker(ticker)?;
        let trade_date = parse_date(trade_date)?;
        let analysts = AnalystSelection::parse(analysts)?;
        Ok(Self {
            ticker,
            trade_date,
            analysts,
        })
    }

    pub fn trade_date_string(&self) -> String {
        self.trade_date.format(DATE_FORMAT).to_string()
    }
}

/// Trimmed, upper-cased ticker; empty or blank-containing input is rejected
pub fn normalise_ticker(ticker: &str) -> Result<String> {
    let ticker = ticker.trim();
    if ticker.is_empty() {
        return Err(Error::invalid("Please provide a ticker symbol"));
    }
    if ticker.chars().any(char::is_whitespace) {
        return Err(Error::invalid(format!("Invalid ticker symbol: '{}'", ticker)));
    }
    Ok(ticker.to_uppercase())
}

pub fn parse_date(date: &str) -> Result<NaiveDate> {
    let date = date.trim();
    if date.is_empty() {
        return Err(Error::invalid("Please provide a trade date"));
    }
    NaiveDate::parse_from_str(date, DATE_FORMAT)
        .map_err(|_| Error::invalid(format!("Invalid trade date '{}': expected YYYY-MM-DD", date)))
}

/// Submission body sent by the dashboard
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AnalysisForm {
    #[serde(default)]
    pub ticker: String,
    #[serde(default)]
    pub trade_date: String,
    /// Analyst names; every analyst when absent
    #[serde(default)]
    pub analysts: Option<Vec<String>>,
}

impl AnalysisForm {
    pub fn into_request(self) -> Result<AnalysisRequest> {
        match self.analysts {
            Some(names) => AnalysisRequest::parse(&self.ticker, &self.trade_date, &names),
            None => AnalysisRequest::new(
                &self.ticker,
                parse_date(&self.trade_date)?,
                AnalystSelection::all(),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use desk_core::AnalystKind;

    #[test]
    fn test_parse() {
        let request = AnalysisRequest::parse(" nvda ", "2024-11-15", &["market", "news"]).unwrap();
        assert_eq!(request.ticker, "NVDA");
        assert_eq!(request.trade_date_string(), "2024-11-15");
        assert_eq!(request.analysts.len(), 2);
        assert!(request.analysts.contains(AnalystKind::News));
    }

    #[test]
    fn test_empty_ticker() {
        let err = AnalysisRequest::parse("   ", "2024-11-15", &["market"]).unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));

        assert!(normalise_ticker("BRK B").is_err());
        assert_eq!(normalise_ticker("brk-b").unwrap(), "BRK-B");
    }

    #[test]
    fn test_bad_date() {
        for date in ["", "2024-13-01", "11/15/2024", "2024-02-30"] {
            let err = AnalysisRequest::parse("AAPL", date, &["market"]).unwrap_err();
            assert!(matches!(err, Error::InvalidInput(_)), "{date} should be rejected");
        }
    }

    #[test]
    fn test_bad_analysts() {
        let none: [&str; 0] = [];
        assert!(AnalysisRequest::parse("AAPL", "2024-11-15", &none).is_err());
        assert!(AnalysisRequest::parse("AAPL", "2024-11-15", &["astrology"]).is_err());
    }

    #[test]
    fn test_form_defaults_to_all_analysts() {
        let form: AnalysisForm =
            serde_json::from_str(r#"{"ticker": "spy", "trade_date": "2024-11-15"}"#).unwrap();
        let request = form.into_request().unwrap();
        assert_eq!(request.ticker, "SPY");
        assert_eq!(request.analysts, AnalystSelection::all());

        let form: AnalysisForm = serde_json::from_str(
            r#"{"ticker": "spy", "trade_date": "2024-11-15", "analysts": []}"#,
        )
        .unwrap();
        assert!(form.into_request().is_err());
    }
}
