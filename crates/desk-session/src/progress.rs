//! Coarse progress of the running analysis and the agent status board

use chrono::{DateTime, Utc};
use desk_core::{AnalystKind, AnalystSelection};
use serde::{Deserialize, Serialize};

/// Where the latest analysis is
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    #[default]
    Idle,
    Initializing,
    Running,
    Completed,
    Failed,
}

impl Stage {
    pub fn percent(&self) -> u8 {
        match self {
            Stage::Idle | Stage::Failed => 0,
            Stage::Initializing => 10,
            Stage::Running => 20,
            Stage::Completed => 100,
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(self, Stage::Initializing | Stage::Running)
    }
}

/// Snapshot polled by the UIs
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Progress {
    pub stage: Stage,
    pub percent: u8,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ticker: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trade_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finished_at: Option<DateTime<Utc>>,
}

impl Progress {
    pub fn initializing(ticker: &str, trade_date: &str) -> Self {
        Self {
            stage: Stage::Initializing,
            percent: Stage::Initializing.percent(),
            message: "Initializing TradingAgents...".to_string(),
            ticker: Some(ticker.to_string()),
            trade_date: Some(trade_date.to_string()),
            error: None,
            started_at: Some(Utc::now()),
            finished_at: None,
        }
    }

    pub fn running(&mut self) {
        self.stage = Stage::Running;
        self.percent = Stage::Running.percent();
        self.message = "Running analysis...".to_string();
    }

    pub fn completed(&mut self) {
        self.stage = Stage::Completed;
        self.percent = Stage::Completed.percent();
        self.message = "Analysis completed!".to_string();
        self.finished_at = Some(Utc::now());
    }

    /// Percent stays at the last milestone reached
    pub fn failed(&mut self, error: impl Into<String>) {
        let error = error.into();
        self.stage = Stage::Failed;
        self.message = format!("Analysis failed: {}", error);
        self.error = Some(error);
        self.finished_at = Some(Utc::now());
    }
}

/// Status of one agent on the board
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AgentStatus {
    #[default]
    Pending,
    Running,
    Completed,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentEntry {
    pub name: String,
    pub status: AgentStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentGroup {
    pub name: String,
    pub agents: Vec<AgentEntry>,
}

const ANALYSTS_GROUP: &str = "Analysts";

/// Teams of the framework's agents, in pipeline order
const DOWNSTREAM_GROUPS: [(&str, &[&str]); 4] = [
    ("Researchers", &["Bull Researcher", "Bear Researcher", "Research Manager"]),
    ("Trading", &["Trader"]),
    ("Risk Mgmt", &["Risky Analyst", "Neutral Analyst", "Safe Analyst"]),
    ("Portfolio", &["Portfolio Manager"]),
];

/// Per-agent status grouped by team
///
/// The framework reports nothing while it runs, so the board only moves at
/// the coarse milestones: selected analysts run while the call is in flight,
/// then every participating agent completes or errors together.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentBoard {
    pub groups: Vec<AgentGroup>,
}

impl Default for AgentBoard {
    fn default() -> Self {
        let entry = |name: &str| AgentEntry {
            name: name.to_string(),
            status: AgentStatus::Pending,
        };

        let analysts = AgentGroup {
            name: ANALYSTS_GROUP.to_string(),
            agents: AnalystKind::ALL.iter().map(|k| entry(k.agent_name())).collect(),
        };
        let downstream = DOWNSTREAM_GROUPS.iter().map(|(name, agents)| AgentGroup {
            name: (*name).to_string(),
            agents: agents.iter().map(|a| entry(a)).collect(),
        });

        Self {
            groups: std::iter::once(analysts).chain(downstream).collect(),
        }
    }
}

impl AgentBoard {
    pub fn status_of(&self, agent: &str) -> Option<AgentStatus> {
        self.entries().find(|e| e.name == agent).map(|e| e.status)
    }

    fn entries(&self) -> impl Iterator<Item = &AgentEntry> {
        self.groups.iter().flat_map(|g| g.agents.iter())
    }

    fn update(&mut self, apply: impl Fn(bool, &mut AgentEntry)) {
        for group in &mut self.groups {
            let is_analysts = group.name == ANALYSTS_GROUP;
            for entry in &mut group.agents {
                apply(is_analysts, entry);
            }
        }
    }

    /// Reset and mark the selected analysts as running
    pub fn begin(&mut self, analysts: &AnalystSelection) {
        *self = Self::default();
        self.update(|is_analysts, entry| {
            if is_analysts && selected(analysts, &entry.name) {
                entry.status = AgentStatus::Running;
            }
        });
    }

    /// Every participating agent completed
    pub fn complete(&mut self, analysts: &AnalystSelection) {
        self.update(|is_analysts, entry| {
            if !is_analysts || selected(analysts, &entry.name) {
                entry.status = AgentStatus::Completed;
            }
        });
    }

    /// Anything still running errored
    pub fn fail(&mut self) {
        self.update(|_, entry| {
            if entry.status == AgentStatus::Running {
                entry.status = AgentStatus::Error;
            }
        });
    }
}

fn selected(analysts: &AnalystSelection, agent: &str) -> bool {
    analysts.iter().any(|kind| kind.agent_name() == agent)
}
