//! Result bundle: the outcome of one analysis run

use crate::analyst::AnalystSelection;
use crate::decision::Decision;
use crate::framework::FrameworkOutput;
use crate::report::Reports;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Immutable outcome of one analysis invocation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultBundle {
    pub ticker: String,
    pub trade_date: NaiveDate,
    pub timestamp: DateTime<Utc>,
    pub analysts: AnalystSelection,
    pub decision: Decision,
    pub reports: Reports,
}

impl ResultBundle {
    /// Package the framework's two outputs, stamped with the current instant
    pub fn from_output(
        ticker: impl Into<String>,
        trade_date: NaiveDate,
        analysts: AnalystSelection,
        output: FrameworkOutput,
    ) -> Self {
        Self {
            ticker: ticker.into(),
            trade_date,
            timestamp: Utc::now(),
            analysts,
            decision: Decision::from_value(&output.decision),
            reports: Reports::from_state(&output.final_state),
        }
    }

    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }

    /// Trade date as `YYYY-MM-DD`
    pub fn trade_date_string(&self) -> String {
        self.trade_date.format("%Y-%m-%d").to_string()
    }

    pub fn analysts_used(&self) -> usize {
        self.analysts.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::ReportKind;
    use serde_json::json;

    #[test]
    fn test_from_output() {
        let output = FrameworkOutput::new(
            json!({"market_report": "Breakout above 140", "news_report": ""}),
            json!("BUY"),
        );
        let date = NaiveDate::from_ymd_opt(2024, 11, 15).unwrap();
        let bundle = ResultBundle::from_output("NVDA", date, AnalystSelection::all(), output);

        assert_eq!(bundle.ticker, "NVDA");
        assert_eq!(bundle.trade_date_string(), "2024-11-15");
        assert_eq!(bundle.decision.as_str(), "BUY");
        assert_eq!(bundle.analysts_used(), 4);
        assert_eq!(
            bundle.reports.get(ReportKind::MarketReport),
            Some("Breakout above 140")
        );
        assert_eq!(bundle.reports.get(ReportKind::NewsReport), None);
    }
}
