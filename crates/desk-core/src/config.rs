//! Analysis configuration handed to the external framework

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Allowed range for debate and risk discussion rounds
pub const ROUNDS_RANGE: std::ops::RangeInclusive<u32> = 1..=5;

/// Choices offered by the UI controls
pub mod options {
    pub const LLM_PROVIDERS: &[&str] = &["openai", "anthropic", "google"];
    pub const DEEP_THINK_MODELS: &[&str] = &[
        "o1-preview",
        "o1-mini",
        "gpt-4o",
        "gpt-4o-mini",
        "claude-3-5-sonnet-20241022",
    ];
    pub const QUICK_THINK_MODELS: &[&str] =
        &["gpt-4o", "gpt-4o-mini", "claude-3-5-sonnet-20241022"];
    pub const STOCK_DATA_VENDORS: &[&str] = &["yfinance", "alpha_vantage"];
    pub const TECHNICAL_VENDORS: &[&str] = &["yfinance", "alpha_vantage"];
    pub const FUNDAMENTAL_VENDORS: &[&str] = &["alpha_vantage", "openai"];
    pub const NEWS_VENDORS: &[&str] = &["alpha_vantage", "openai", "google"];
}

/// Data vendor per data category
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataVendors {
    pub core_stock_apis: String,
    pub technical_indicators: String,
    pub fundamental_data: String,
    pub news_data: String,
}

impl Default for DataVendors {
    fn default() -> Self {
        Self {
            core_stock_apis: "yfinance".to_string(),
            technical_indicators: "yfinance".to_string(),
            fundamental_data: "alpha_vantage".to_string(),
            news_data: "alpha_vantage".to_string(),
        }
    }
}

/// Settings for one analysis run
///
/// Only the keys the UI edits are typed. Anything else the framework put in
/// its baseline configuration is kept in `extra` and passed back untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub llm_provider: String,
    pub deep_think_llm: String,
    pub quick_think_llm: String,
    pub max_debate_rounds: u32,
    pub max_risk_discuss_rounds: u32,
    pub data_vendors: DataVendors,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            llm_provider: "openai".to_string(),
            deep_think_llm: "gpt-4o-mini".to_string(),
            quick_think_llm: "gpt-4o-mini".to_string(),
            max_debate_rounds: 1,
            max_risk_discuss_rounds: 1,
            data_vendors: DataVendors::default(),
            extra: Map::new(),
        }
    }
}

impl AnalysisConfig {
    /// Build from the framework's baseline configuration mapping
    pub fn from_baseline(baseline: Map<String, Value>) -> Result<Self> {
        Ok(serde_json::from_value(Value::Object(baseline))?)
    }

    /// The configuration as the framework expects it
    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }

    /// Apply a partial update, validating only the fields it touches
    pub fn apply(&mut self, patch: ConfigPatch) -> Result<()> {
        patch.validate()?;

        if let Some(v) = patch.llm_provider {
            self.llm_provider = v;
        }
        if let Some(v) = patch.deep_think_llm {
            self.deep_think_llm = v;
        }
        if let Some(v) = patch.quick_think_llm {
            self.quick_think_llm = v;
        }
        if let Some(v) = patch.max_debate_rounds {
            self.max_debate_rounds = v;
        }
        if let Some(v) = patch.max_risk_discuss_rounds {
            self.max_risk_discuss_rounds = v;
        }
        if let Some(vendors) = patch.data_vendors {
            if let Some(v) = vendors.core_stock_apis {
                self.data_vendors.core_stock_apis = v;
            }
            if let Some(v) = vendors.technical_indicators {
                self.data_vendors.technical_indicators = v;
            }
            if let Some(v) = vendors.fundamental_data {
                self.data_vendors.fundamental_data = v;
            }
            if let Some(v) = vendors.news_data {
                self.data_vendors.news_data = v;
            }
        }

        Ok(())
    }

    /// Presence check of the required settings; returns human-readable issues
    pub fn validate(&self) -> Vec<String> {
        let mut issues = Vec::new();

        for (name, value) in [
            ("llm_provider", &self.llm_provider),
            ("deep_think_llm", &self.deep_think_llm),
            ("quick_think_llm", &self.quick_think_llm),
        ] {
            if value.trim().is_empty() {
                issues.push(format!("Missing {name}"));
            }
        }

        let vendors = &self.data_vendors;
        for (name, value) in [
            ("core_stock_apis", &vendors.core_stock_apis),
            ("technical_indicators", &vendors.technical_indicators),
            ("fundamental_data", &vendors.fundamental_data),
            ("news_data", &vendors.news_data),
        ] {
            if value.trim().is_empty() {
                issues.push(format!("Missing data vendor for {name}"));
            }
        }

        issues
    }
}

/// Partial vendor update
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataVendorsPatch {
    pub core_stock_apis: Option<String>,
    pub technical_indicators: Option<String>,
    pub fundamental_data: Option<String>,
    pub news_data: Option<String>,
}

/// Partial configuration update from a UI control
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigPatch {
    pub llm_provider: Option<String>,
    pub deep_think_llm: Option<String>,
    pub quick_think_llm: Option<String>,
    pub max_debate_rounds: Option<u32>,
    pub max_risk_discuss_rounds: Option<u32>,
    pub data_vendors: Option<DataVendorsPatch>,
}

impl ConfigPatch {
    /// Build a single-field patch from a `key value` pair
    pub fn from_key_value(key: &str, value: &str) -> Result<Self> {
        let value = value.trim().to_string();
        let mut patch = Self::default();
        let mut vendors = DataVendorsPatch::default();

        match key {
            "llm_provider" | "provider" => patch.llm_provider = Some(value),
            "deep_think_llm" | "deep" => patch.deep_think_llm = Some(value),
            "quick_think_llm" | "quick" => patch.quick_think_llm = Some(value),
            "max_debate_rounds" | "debate_rounds" => {
                patch.max_debate_rounds = Some(parse_rounds(key, &value)?);
            }
            "max_risk_discuss_rounds" | "risk_rounds" => {
                patch.max_risk_discuss_rounds = Some(parse_rounds(key, &value)?);
            }
            "core_stock_apis" => vendors.core_stock_apis = Some(value),
            "technical_indicators" => vendors.technical_indicators = Some(value),
            "fundamental_data" => vendors.fundamental_data = Some(value),
            "news_data" => vendors.news_data = Some(value),
            other => return Err(Error::invalid(format!("Unknown setting: {other}"))),
        }

        if vendors != DataVendorsPatch::default() {
            patch.data_vendors = Some(vendors);
        }

        patch.validate()?;
        Ok(patch)
    }

    fn validate(&self) -> Result<()> {
        for (name, rounds) in [
            ("max_debate_rounds", self.max_debate_rounds),
            ("max_risk_discuss_rounds", self.max_risk_discuss_rounds),
        ] {
            if let Some(rounds) = rounds {
                if !ROUNDS_RANGE.contains(&rounds) {
                    return Err(Error::invalid(format!(
                        "{name} must be between {} and {}",
                        ROUNDS_RANGE.start(),
                        ROUNDS_RANGE.end()
                    )));
                }
            }
        }

        let vendors = self.data_vendors.clone().unwrap_or_default();
        let texts = [
            ("llm_provider", &self.llm_provider),
            ("deep_think_llm", &self.deep_think_llm),
            ("quick_think_llm", &self.quick_think_llm),
            ("core_stock_apis", &vendors.core_stock_apis),
            ("technical_indicators", &vendors.technical_indicators),
            ("fundamental_data", &vendors.fundamental_data),
            ("news_data", &vendors.news_data),
        ];
        for (name, value) in texts {
            if value.as_deref().is_some_and(|v| v.trim().is_empty()) {
                return Err(Error::invalid(format!("{name} cannot be empty")));
            }
        }

        Ok(())
    }
}

fn parse_rounds(key: &str, value: &str) -> Result<u32> {
    value
        .parse()
        .map_err(|_| Error::invalid(format!("{key} expects a number, got '{value}'")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_default_config() {
        let config = AnalysisConfig::default();
        assert_eq!(config.llm_provider, "openai");
        assert_eq!(config.max_debate_rounds, 1);
        assert!(config.validate().is_empty());
    }

    #[test]
    fn test_from_baseline_keeps_unknown_keys() {
        let baseline = json!({
            "project_dir": "/opt/tradingagents",
            "llm_provider": "anthropic",
            "max_debate_rounds": 2,
            "data_vendors": {"news_data": "google"},
        });
        let Value::Object(map) = baseline else { unreachable!() };

        let config = AnalysisConfig::from_baseline(map).unwrap();
        assert_eq!(config.llm_provider, "anthropic");
        assert_eq!(config.max_debate_rounds, 2);
        assert_eq!(config.deep_think_llm, "gpt-4o-mini");
        assert_eq!(config.data_vendors.news_data, "google");
        assert_eq!(config.data_vendors.core_stock_apis, "yfinance");

        let value = config.to_value();
        assert_eq!(value["project_dir"], "/opt/tradingagents");
        assert_eq!(value["data_vendors"]["news_data"], "google");
    }

    #[test]
    fn test_apply_patch() {
        let mut config = AnalysisConfig::default();
        let patch: ConfigPatch = serde_json::from_value(json!({
            "deep_think_llm": "o1-mini",
            "max_risk_discuss_rounds": 3,
            "data_vendors": {"fundamental_data": "openai"}
        }))
        .unwrap();

        config.apply(patch).unwrap();
        assert_eq!(config.deep_think_llm, "o1-mini");
        assert_eq!(config.quick_think_llm, "gpt-4o-mini");
        assert_eq!(config.max_risk_discuss_rounds, 3);
        assert_eq!(config.data_vendors.fundamental_data, "openai");
        assert_eq!(config.data_vendors.news_data, "alpha_vantage");
    }

    #[test]
    fn test_patch_rejects_out_of_range_rounds() {
        let mut config = AnalysisConfig::default();
        let patch = ConfigPatch {
            max_debate_rounds: Some(9),
            ..Default::default()
        };

        assert!(config.apply(patch).is_err());
        assert_eq!(config.max_debate_rounds, 1);
    }

    #[test]
    fn test_from_key_value() {
        let patch = ConfigPatch::from_key_value("news_data", "openai").unwrap();
        assert_eq!(
            patch.data_vendors.unwrap().news_data.as_deref(),
            Some("openai")
        );

        let patch = ConfigPatch::from_key_value("debate_rounds", "4").unwrap();
        assert_eq!(patch.max_debate_rounds, Some(4));

        assert!(ConfigPatch::from_key_value("debate_rounds", "many").is_err());
        assert!(ConfigPatch::from_key_value("temperature", "0.2").is_err());
        assert!(ConfigPatch::from_key_value("provider", "  ").is_err());
    }

    #[test]
    fn test_validate_reports_missing_fields() {
        let config = AnalysisConfig {
            quick_think_llm: String::new(),
            data_vendors: DataVendors {
                news_data: String::new(),
                ..Default::default()
            },
            ..Default::default()
        };

        let issues = config.validate();
        assert_eq!(
            issues,
            vec![
                "Missing quick_think_llm".to_string(),
                "Missing data vendor for news_data".to_string()
            ]
        );
    }
}
