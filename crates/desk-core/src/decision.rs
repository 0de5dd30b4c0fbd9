//! Final trading decision and its display classification

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Display tone of a decision
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DecisionTone {
    Positive,
    Negative,
    Neutral,
}

impl DecisionTone {
    /// CSS-friendly colour name
    pub fn color(&self) -> &'static str {
        match self {
            DecisionTone::Positive => "green",
            DecisionTone::Negative => "red",
            DecisionTone::Neutral => "gray",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            DecisionTone::Positive => "Positive",
            DecisionTone::Negative => "Negative",
            DecisionTone::Neutral => "Neutral",
        }
    }
}

/// The framework's final decision, kept verbatim
///
/// The framework defines no decision vocabulary, so this is an opaque string.
/// [`Decision::tone`] is a loose substring heuristic for styling only: it
/// misreads phrases such as "not a buy".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Decision(String);

impl Decision {
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    /// Build from the raw value returned by the framework
    pub fn from_value(value: &Value) -> Self {
        match value {
            Value::Null => Self::default(),
            Value::String(s) => Self(s.clone()),
            other => Self(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// "buy" anywhere wins, then "sell", case-insensitive
    pub fn tone(&self) -> DecisionTone {
        let lowered = self.0.to_lowercase();
        if lowered.contains("buy") {
            DecisionTone::Positive
        } else if lowered.contains("sell") {
            DecisionTone::Negative
        } else {
            DecisionTone::Neutral
        }
    }

    /// At most `max_chars` characters, with "..." appended when cut
    pub fn truncated(&self, max_chars: usize) -> String {
        if self.0.chars().count() > max_chars {
            let head: String = self.0.chars().take(max_chars).collect();
            format!("{head}...")
        } else {
            self.0.clone()
        }
    }
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Decision {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}
