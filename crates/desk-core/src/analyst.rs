//! Analyst kinds and the per-run analyst selection

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A category of input analysis the external framework may include
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnalystKind {
    /// Technical indicators and price action
    Market,
    /// Social media and forum sentiment
    Social,
    /// News impact
    News,
    /// Financial health and metrics
    Fundamentals,
}

impl AnalystKind {
    /// Every analyst, in the order the UIs list them
    pub const ALL: [AnalystKind; 4] = [
        AnalystKind::Market,
        AnalystKind::Social,
        AnalystKind::News,
        AnalystKind::Fundamentals,
    ];

    /// Wire name understood by the external framework
    pub fn as_str(&self) -> &'static str {
        match self {
            AnalystKind::Market => "market",
            AnalystKind::Social => "social",
            AnalystKind::News => "news",
            AnalystKind::Fundamentals => "fundamentals",
        }
    }

    /// Display label used on the agent status board
    pub fn agent_name(&self) -> &'static str {
        match self {
            AnalystKind::Market => "Market Analyst",
            AnalystKind::Social => "Social Analyst",
            AnalystKind::News => "News Analyst",
            AnalystKind::Fundamentals => "Fundamentals Analyst",
        }
    }
}

impl fmt::Display for AnalystKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AnalystKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "market" => Ok(AnalystKind::Market),
            "social" => Ok(AnalystKind::Social),
            "news" => Ok(AnalystKind::News),
            "fundamentals" => Ok(AnalystKind::Fundamentals),
            other => Err(Error::invalid(format!("Unknown analyst: {other}"))),
        }
    }
}

/// Non-empty, duplicate-free list of analysts, in selection order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<AnalystKind>", into = "Vec<AnalystKind>")]
pub struct AnalystSelection(Vec<AnalystKind>);

impl AnalystSelection {
    /// Build a selection, dropping repeats and rejecting an empty list
    pub fn new(kinds: impl IntoIterator<Item = AnalystKind>) -> Result<Self> {
        let mut selected = Vec::new();
        for kind in kinds {
            if !selected.contains(&kind) {
                selected.push(kind);
            }
        }

        if selected.is_empty() {
            return Err(Error::invalid("Select at least one analyst"));
        }

        Ok(Self(selected))
    }

    /// Parse analyst names as submitted by a form or the chat prompt
    pub fn parse<S: AsRef<str>>(names: &[S]) -> Result<Self> {
        let kinds = names
            .iter()
            .map(|name| name.as_ref().parse::<AnalystKind>())
            .collect::<Result<Vec<_>>>()?;
        Self::new(kinds)
    }

    /// All four analysts
    pub fn all() -> Self {
        Self(AnalystKind::ALL.to_vec())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, kind: AnalystKind) -> bool {
        self.0.contains(&kind)
    }

    pub fn iter(&self) -> impl Iterator<Item = AnalystKind> + '_ {
        self.0.iter().copied()
    }

    /// Wire names, in selection order
    pub fn names(&self) -> Vec<String> {
        self.0.iter().map(|k| k.as_str().to_string()).collect()
    }
}

impl Default for AnalystSelection {
    fn default() -> Self {
        Self::all()
    }
}

impl TryFrom<Vec<AnalystKind>> for AnalystSelection {
    type Error = Error;

    fn try_from(kinds: Vec<AnalystKind>) -> Result<Self> {
        Self::new(kinds)
    }
}

impl From<AnalystSelection> for Vec<AnalystKind> {
    fn from(selection: AnalystSelection) -> Self {
        selection.0
    }
}
