//! Markdown panes for the chat-style front end

use crate::render::ANALYSIS_TIME_FORMAT;
use desk_core::{ReportKind, ResultBundle};
use serde::{Deserialize, Serialize};

const DETAILED_REPORTS: [(ReportKind, &str); 4] = [
    (ReportKind::MarketReport, "Market Analysis"),
    (ReportKind::SentimentReport, "Sentiment Analysis"),
    (ReportKind::NewsReport, "News Analysis"),
    (ReportKind::FundamentalsReport, "Fundamentals Analysis"),
];

const TRADING_INFO: [(ReportKind, &str); 3] = [
    (ReportKind::InvestmentPlan, "Research Team Decision"),
    (ReportKind::TraderInvestmentPlan, "Trading Plan"),
    (ReportKind::FinalTradeDecision, "Final Trade Decision"),
];

/// The three panes shown after a chat analysis
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatPanes {
    pub summary: String,
    /// Empty when no analyst report is present
    pub detailed_reports: String,
    /// Empty when no trading report is present
    pub trading_info: String,
}

impl ChatPanes {
    pub fn from_bundle(bundle: &ResultBundle) -> Self {
        Self {
            summary: summary(bundle),
            detailed_reports: report_blocks(bundle, &DETAILED_REPORTS),
            trading_info: report_blocks(bundle, &TRADING_INFO),
        }
    }
}

fn summary(bundle: &ResultBundle) -> String {
    let mut out = format!("## Final Decision for {}\n\n", bundle.ticker);
    if !bundle.decision.is_empty() {
        out.push_str(&format!("**Decision:** {}\n\n", bundle.decision));
    }
    out.push_str(&format!("**Date:** {}\n\n", bundle.trade_date_string()));
    out.push_str(&format!(
        "**Analysis Time:** {}\n",
        bundle.timestamp.format(ANALYSIS_TIME_FORMAT)
    ));
    out
}

fn report_blocks(bundle: &ResultBundle, layout: &[(ReportKind, &str)]) -> String {
    layout
        .iter()
        .filter_map(|(kind, title)| {
            bundle
                .reports
                .get(*kind)
                .map(|text| format!("## {}\n\n{}\n", title, text.trim_end()))
        })
        .collect::<Vec<_>>()
        .join("\n")
}
