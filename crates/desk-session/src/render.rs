//! Organized, read-only views of a result bundle

use crate::export::export_file_name;
use desk_core::{AnalysisConfig, DecisionTone, ReportKind, ResultBundle};
use serde::{Deserialize, Serialize};

/// Display format of the analysis instant
pub const ANALYSIS_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Tabs of the result view, in display order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TabId {
    Summary,
    AnalystReports,
    ResearchDebate,
    TradingDecision,
    RiskAssessment,
    Charts,
    Export,
}

impl TabId {
    pub const ALL: [TabId; 7] = [
        TabId::Summary,
        TabId::AnalystReports,
        TabId::ResearchDebate,
        TabId::TradingDecision,
        TabId::RiskAssessment,
        TabId::Charts,
        TabId::Export,
    ];

    /// Label on the tab itself
    pub fn title(&self) -> &'static str {
        match self {
            TabId::Summary => "Summary",
            TabId::AnalystReports => "Analyst Reports",
            TabId::ResearchDebate => "Research Debate",
            TabId::TradingDecision => "Trading Decision",
            TabId::RiskAssessment => "Risk Assessment",
            TabId::Charts => "Charts",
            TabId::Export => "Export",
        }
    }

    /// Heading inside the tab
    pub fn heading(&self, ticker: &str) -> String {
        match self {
            TabId::Summary => format!("Analysis Summary for {ticker}"),
            TabId::AnalystReports => "Analyst Team Reports".to_string(),
            TabId::ResearchDebate => "Research Team Analysis".to_string(),
            TabId::TradingDecision => "Trading Team Decision".to_string(),
            TabId::RiskAssessment => "Risk Management Assessment".to_string(),
            TabId::Charts => "Stock Charts and Analysis".to_string(),
            TabId::Export => "Export Analysis".to_string(),
        }
    }
}

/// Where each report kind is shown and under which title
pub const REPORT_LAYOUT: [(TabId, ReportKind, &str); 8] = [
    (TabId::AnalystReports, ReportKind::MarketReport, "Market Analysis"),
    (TabId::AnalystReports, ReportKind::SentimentReport, "Social Sentiment Analysis"),
    (TabId::AnalystReports, ReportKind::NewsReport, "News Analysis"),
    (TabId::AnalystReports, ReportKind::FundamentalsReport, "Fundamentals Analysis"),
    (TabId::ResearchDebate, ReportKind::InvestmentPlan, "Research Team Recommendation"),
    (TabId::TradingDecision, ReportKind::TraderInvestmentPlan, "Trader Analysis"),
    (TabId::TradingDecision, ReportKind::FinalTradeDecision, "Final Trade Decision"),
    (TabId::RiskAssessment, ReportKind::RiskAssessment, "Risk Analysis"),
];

/// One titled block of markdown
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    pub title: String,
    /// Absent for debate rounds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<ReportKind>,
    pub body: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tab {
    pub id: TabId,
    pub title: String,
    pub heading: String,
    pub sections: Vec<Section>,
}

/// The final decision, styled by its tone
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecisionBadge {
    pub text: String,
    pub tone: DecisionTone,
    pub color: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewMetrics {
    pub analysts_used: usize,
}

/// Everything the UI needs to show one bundle
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderedView {
    pub ticker: String,
    pub trade_date: String,
    pub analysis_time: String,
    pub analysts: Vec<String>,
    /// `None` when the framework returned an empty decision
    pub decision: Option<DecisionBadge>,
    pub metrics: ViewMetrics,
    pub tabs: Vec<Tab>,
    pub export_file_name: String,
}

impl RenderedView {
    pub fn tab(&self, id: TabId) -> Option<&Tab> {
        self.tabs.iter().find(|tab| tab.id == id)
    }

    /// Total sections across every tab
    pub fn section_count(&self) -> usize {
        self.tabs.iter().map(|tab| tab.sections.len()).sum()
    }
}

/// Organize a bundle into tabs; absent or empty reports are left out
pub fn render(bundle: &ResultBundle) -> RenderedView {
    let decision = (!bundle.decision.is_empty()).then(|| {
        let tone = bundle.decision.tone();
        DecisionBadge {
            text: bundle.decision.to_string(),
            tone,
            color: tone.color().to_string(),
        }
    });

    let tabs = TabId::ALL
        .into_iter()
        .map(|id| Tab {
            id,
            title: id.title().to_string(),
            heading: id.heading(&bundle.ticker),
            sections: sections_for(id, bundle),
        })
        .collect();

    RenderedView {
        ticker: bundle.ticker.clone(),
        trade_date: bundle.trade_date_string(),
        analysis_time: bundle.timestamp.format(ANALYSIS_TIME_FORMAT).to_string(),
        analysts: bundle.analysts.names(),
        decision,
        metrics: ViewMetrics {
            analysts_used: bundle.analysts_used(),
        },
        tabs,
        export_file_name: export_file_name(bundle),
    }
}

fn sections_for(tab: TabId, bundle: &ResultBundle) -> Vec<Section> {
    let mut sections: Vec<Section> = REPORT_LAYOUT
        .iter()
        .filter(|(id, _, _)| *id == tab)
        .filter_map(|(_, kind, title)| {
            bundle.reports.get(*kind).map(|body| Section {
                title: (*title).to_string(),
                kind: Some(*kind),
                body: body.to_string(),
            })
        })
        .collect();

    if tab == TabId::ResearchDebate {
        sections.extend(bundle.reports.debate_rounds().map(|(round, body)| Section {
            title: format!("Debate Round {round}"),
            kind: None,
            body: body.to_string(),
        }));
    }

    sections
}

/// One labelled setting
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigItem {
    pub label: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigGroup {
    pub title: String,
    pub items: Vec<ConfigItem>,
}

/// Read-only view of a session's configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigSummary {
    pub groups: Vec<ConfigGroup>,
    /// Problems found by [`AnalysisConfig::validate`]
    pub issues: Vec<String>,
}

impl ConfigSummary {
    pub fn from_config(config: &AnalysisConfig) -> Self {
        let vendors = &config.data_vendors;
        let group = |title: &str, items: &[(&str, String)]| ConfigGroup {
            title: title.to_string(),
            items: items
                .iter()
                .map(|(label, value)| ConfigItem {
                    label: (*label).to_string(),
                    value: or_na(value),
                })
                .collect(),
        };

        Self {
            groups: vec![
                group(
                    "LLM Settings",
                    &[
                        ("Provider", config.llm_provider.clone()),
                        ("Deep Think Model", config.deep_think_llm.clone()),
                        ("Quick Think Model", config.quick_think_llm.clone()),
                    ],
                ),
                group(
                    "Analysis Settings",
                    &[
                        ("Max Debate Rounds", config.max_debate_rounds.to_string()),
                        ("Max Risk Rounds", config.max_risk_discuss_rounds.to_string()),
                    ],
                ),
                group(
                    "Data Vendors",
                    &[
                        ("Stock Data", vendors.core_stock_apis.clone()),
                        ("Technical Indicators", vendors.technical_indicators.clone()),
                        ("Fundamental Data", vendors.fundamental_data.clone()),
                        ("News Data", vendors.news_data.clone()),
                    ],
                ),
            ],
            issues: config.validate(),
        }
    }

    /// `(group, label, value)` for every setting
    pub fn rows(&self) -> impl Iterator<Item = (&str, &str, &str)> {
        self.groups.iter().flat_map(|group| {
            group
                .items
                .iter()
                .map(move |item| (group.title.as_str(), item.label.as_str(), item.value.as_str()))
        })
    }
}

fn or_na(value: &str) -> String {
    if value.trim().is_empty() {
        "N/A".to_string()
    } else {
        value.to_string()
    }
}
