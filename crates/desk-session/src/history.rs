//! Session history table and decision summaries

use desk_core::{DecisionTone, ResultBundle};
use desk_market::charts::{self, Figure};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Longest decision text shown in the history table
pub const DECISION_PREVIEW_CHARS: usize = 50;

/// One row of the history table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryRow {
    /// Position in the session history, for selection
    pub index: usize,
    pub ticker: String,
    pub trade_date: String,
    pub analysis_time: String,
    pub decision: String,
    pub analysts: String,
}

impl HistoryRow {
    pub fn from_bundle(index: usize, bundle: &ResultBundle) -> Self {
        Self {
            index,
            ticker: bundle.ticker.clone(),
            trade_date: bundle.trade_date_string(),
            analysis_time: bundle.timestamp.format("%Y-%m-%d %H:%M").to_string(),
            decision: bundle.decision.truncated(DECISION_PREVIEW_CHARS),
            analysts: bundle.analysts.names().join(", "),
        }
    }
}

pub fn history_rows(history: &[Arc<ResultBundle>]) -> Vec<HistoryRow> {
    history
        .iter()
        .enumerate()
        .map(|(index, bundle)| HistoryRow::from_bundle(index, bundle))
        .collect()
}

/// How many decisions of each tone the history holds
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToneCounts {
    pub positive: usize,
    pub negative: usize,
    pub neutral: usize,
}

impl ToneCounts {
    /// Empty decisions are not counted
    pub fn from_history(history: &[Arc<ResultBundle>]) -> Self {
        let mut counts = Self::default();
        for bundle in history.iter().filter(|b| !b.decision.is_empty()) {
            match bundle.decision.tone() {
                DecisionTone::Positive => counts.positive += 1,
                DecisionTone::Negative => counts.negative += 1,
                DecisionTone::Neutral => counts.neutral += 1,
            }
        }
        counts
    }

    pub fn total(&self) -> usize {
        self.positive + self.negative + self.neutral
    }

    /// Share of negative decisions in `[0, 1]`, or `None` without decisions
    pub fn negative_share(&self) -> Option<f64> {
        let total = self.total();
        (total > 0).then(|| self.negative as f64 / total as f64)
    }
}

/// Figures summarising the decisions of a session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionCharts {
    pub counts: ToneCounts,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gauge: Option<Figure>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pie: Option<Figure>,
}

/// Gauge of the sell share and pie of tones; no figures for an empty history
pub fn decision_charts(history: &[Arc<ResultBundle>]) -> DecisionCharts {
    let counts = ToneCounts::from_history(history);
    let gauge = counts
        .negative_share()
        .map(|share| charts::gauge("Sell Signal Share", share));
    let pie = charts::pie(
        "Decision Distribution",
        &[
            (DecisionTone::Positive.label(), counts.positive as f64),
            (DecisionTone::Negative.label(), counts.negative as f64),
            (DecisionTone::Neutral.label(), counts.neutral as f64),
        ],
    );

    DecisionCharts { counts, gauge, pie }
}
