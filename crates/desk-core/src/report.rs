//! Report kinds produced by the external framework

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// A named text report in the framework's final state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportKind {
    MarketReport,
    SentimentReport,
    NewsReport,
    FundamentalsReport,
    InvestmentPlan,
    TraderInvestmentPlan,
    FinalTradeDecision,
    RiskAssessment,
}

impl ReportKind {
    /// Every text report kind
    pub const ALL: [ReportKind; 8] = [
        ReportKind::MarketReport,
        ReportKind::SentimentReport,
        ReportKind::NewsReport,
        ReportKind::FundamentalsReport,
        ReportKind::InvestmentPlan,
        ReportKind::TraderInvestmentPlan,
        ReportKind::FinalTradeDecision,
        ReportKind::RiskAssessment,
    ];

    /// Kinds carried in the JSON export, in export order
    pub const EXPORTED: [ReportKind; 7] = [
        ReportKind::MarketReport,
        ReportKind::SentimentReport,
        ReportKind::NewsReport,
        ReportKind::FundamentalsReport,
        ReportKind::InvestmentPlan,
        ReportKind::TraderInvestmentPlan,
        ReportKind::FinalTradeDecision,
    ];

    /// Key used in the framework's state mapping and in exports
    pub fn key(&self) -> &'static str {
        match self {
            ReportKind::MarketReport => "market_report",
            ReportKind::SentimentReport => "sentiment_report",
            ReportKind::NewsReport => "news_report",
            ReportKind::FundamentalsReport => "fundamentals_report",
            ReportKind::InvestmentPlan => "investment_plan",
            ReportKind::TraderInvestmentPlan => "trader_investment_plan",
            ReportKind::FinalTradeDecision => "final_trade_decision",
            ReportKind::RiskAssessment => "risk_assessment",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.key() == key)
    }

    pub fn is_exported(&self) -> bool {
        Self::EXPORTED.contains(self)
    }
}

impl fmt::Display for ReportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Key of the optional debate transcript in the state mapping
pub const DEBATE_HISTORY_KEY: &str = "debate_history";

/// Sparse set of reports from one analysis run
///
/// Every field may be missing. Accessors treat an empty string the same as a
/// missing one, so callers never have to repeat presence checks.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reports {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub market_report: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sentiment_report: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub news_report: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fundamentals_report: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub investment_plan: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trader_investment_plan: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub final_trade_decision: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub risk_assessment: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub debate_history: Vec<String>,
}

impl Reports {
    /// Extract the known reports from a framework state mapping
    ///
    /// Unknown keys are ignored. Non-string values are kept as their JSON text.
    pub fn from_state(state: &Map<String, Value>) -> Self {
        let mut reports = Self::default();

        for kind in ReportKind::ALL {
            if let Some(text) = state.get(kind.key()).and_then(coerce_text) {
                reports.set(kind, text);
            }
        }

        if let Some(Value::Array(rounds)) = state.get(DEBATE_HISTORY_KEY) {
            reports.debate_history = rounds
                .iter()
                .map(|round| coerce_text(round).unwrap_or_default())
                .collect();
        }

        reports
    }

    fn slot(&self, kind: ReportKind) -> &Option<String> {
        match kind {
            ReportKind::MarketReport => &self.market_report,
            ReportKind::SentimentReport => &self.sentiment_report,
            ReportKind::NewsReport => &self.news_report,
            ReportKind::FundamentalsReport => &self.fundamentals_report,
            ReportKind::InvestmentPlan => &self.investment_plan,
            ReportKind::TraderInvestmentPlan => &self.trader_investment_plan,
            ReportKind::FinalTradeDecision => &self.final_trade_decision,
            ReportKind::RiskAssessment => &self.risk_assessment,
        }
    }

    fn slot_mut(&mut self, kind: ReportKind) -> &mut Option<String> {
        match kind {
            ReportKind::MarketReport => &mut self.market_report,
            ReportKind::SentimentReport => &mut self.sentiment_report,
            ReportKind::NewsReport => &mut self.news_report,
            ReportKind::FundamentalsReport => &mut self.fundamentals_report,
            ReportKind::InvestmentPlan => &mut self.investment_plan,
            ReportKind::TraderInvestmentPlan => &mut self.trader_investment_plan,
            ReportKind::FinalTradeDecision => &mut self.final_trade_decision,
            ReportKind::RiskAssessment => &mut self.risk_assessment,
        }
    }

    /// Report text, or `None` when absent or empty
    pub fn get(&self, kind: ReportKind) -> Option<&str> {
        self.slot(kind).as_deref().filter(|text| !text.is_empty())
    }

    pub fn set(&mut self, kind: ReportKind, text: impl Into<String>) {
        *self.slot_mut(kind) = Some(text.into());
    }

    pub fn with(mut self, kind: ReportKind, text: impl Into<String>) -> Self {
        self.set(kind, text);
        self
    }

    /// Populated reports, in [`ReportKind::ALL`] order
    pub fn populated(&self) -> impl Iterator<Item = (ReportKind, &str)> + '_ {
        ReportKind::ALL
            .into_iter()
            .filter_map(|kind| self.get(kind).map(|text| (kind, text)))
    }

    /// Non-empty debate rounds with their 1-based round number
    pub fn debate_rounds(&self) -> impl Iterator<Item = (usize, &str)> + '_ {
        self.debate_history
            .iter()
            .enumerate()
            .filter(|(_, text)| !text.is_empty())
            .map(|(i, text)| (i + 1, text.as_str()))
    }

    pub fn is_empty(&self) -> bool {
        self.populated().next().is_none() && self.debate_rounds().next().is_none()
    }
}

/// Convert a state value into display text; falsy values count as absent
pub(crate) fn coerce_text(value: &Value) -> Option<String> {
    match value {
        Value::Null | Value::Bool(false) => None,
        Value::Number(n) if n.as_f64() == Some(0.0) => None,
        Value::String(s) => Some(s.clone()),
        Value::Array(items) if items.is_empty() => None,
        Value::Object(map) if map.is_empty() => None,
        other => Some(other.to_string()),
    }
}
