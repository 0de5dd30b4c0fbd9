//! The seam to the external multi-agent framework
//!
//! The framework is never implemented here. A [`FrameworkFactory`] knows how
//! to reach it (see the `desk-bridge` crate) and builds one
//! [`TradingFramework`] per analysis run, mirroring the framework's own
//! "construct with (analysts, debug, config), then propagate(ticker, date)"
//! entry point.

use crate::analyst::AnalystSelection;
use crate::config::AnalysisConfig;
use crate::error::Result;
use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Raw outputs of one `propagate` call
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FrameworkOutput {
    /// Final state mapping (report name to value)
    #[serde(default)]
    pub final_state: Map<String, Value>,
    /// Decision value, any JSON shape
    #[serde(default)]
    pub decision: Value,
}

impl FrameworkOutput {
    /// Build from a state value; anything other than an object yields an empty state
    pub fn new(final_state: Value, decision: Value) -> Self {
        let final_state = match final_state {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        Self {
            final_state,
            decision,
        }
    }
}

/// Whether the framework can be reached at all
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", content = "reason", rename_all = "lowercase")]
pub enum Availability {
    Available,
    Unavailable(String),
}

impl Availability {
    pub fn is_available(&self) -> bool {
        matches!(self, Availability::Available)
    }

    /// Reason shown in the disabled UI state
    pub fn reason(&self) -> Option<&str> {
        match self {
            Availability::Available => None,
            Availability::Unavailable(reason) => Some(reason),
        }
    }
}

/// One configured analysis engine
#[async_trait]
pub trait TradingFramework: Send + Sync {
    /// Run the full analysis for `ticker` as of `trade_date`
    ///
    /// This can take minutes. Any error is the framework's failure and is
    /// reported to the user verbatim.
    async fn propagate(&self, ticker: &str, trade_date: NaiveDate) -> Result<FrameworkOutput>;
}

/// Builds engines and reports whether the framework is installed
pub trait FrameworkFactory: Send + Sync {
    /// Detected once at startup
    fn availability(&self) -> Availability;

    /// The framework's own default configuration, when it exposes one
    fn baseline_config(&self) -> Option<Map<String, Value>> {
        None
    }

    /// Construct an engine for one run
    fn create(
        &self,
        analysts: &AnalystSelection,
        debug: bool,
        config: &AnalysisConfig,
    ) -> Result<Box<dyn TradingFramework>>;

    /// Starting configuration for a new session
    fn default_config(&self) -> AnalysisConfig {
        self.baseline_config()
            .and_then(|baseline| AnalysisConfig::from_baseline(baseline).ok())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use serde_json::json;

    struct StaticFactory {
        baseline: Option<Map<String, Value>>,
    }

    impl FrameworkFactory for StaticFactory {
        fn availability(&self) -> Availability {
            Availability::Unavailable("not installed".to_string())
        }

        fn baseline_config(&self) -> Option<Map<String, Value>> {
            self.baseline.clone()
        }

        fn create(
            &self,
            _analysts: &AnalystSelection,
            _debug: bool,
            _config: &AnalysisConfig,
        ) -> Result<Box<dyn TradingFramework>> {
            Err(Error::Unavailable("not installed".to_string()))
        }
    }

    mockall::mock! {
        Engine {}

        #[async_trait]
        impl TradingFramework for Engine {
            async fn propagate(&self, ticker: &str, trade_date: NaiveDate) -> Result<FrameworkOutput>;
        }
    }

    #[test]
    fn test_default_config_uses_baseline() {
        let Value::Object(baseline) = json!({"deep_think_llm": "o1-preview"}) else {
            unreachable!()
        };
        let factory = StaticFactory {
            baseline: Some(baseline),
        };
        assert_eq!(factory.default_config().deep_think_llm, "o1-preview");

        let factory = StaticFactory { baseline: None };
        assert_eq!(factory.default_config(), AnalysisConfig::default());
    }

    #[test]
    fn test_default_config_ignores_malformed_baseline() {
        let Value::Object(baseline) = json!({"max_debate_rounds": "two"}) else {
            unreachable!()
        };
        let factory = StaticFactory {
            baseline: Some(baseline),
        };
        assert_eq!(factory.default_config(), AnalysisConfig::default());
    }

    #[test]
    fn test_availability() {
        let unavailable = Availability::Unavailable("bridge missing".to_string());
        assert!(!unavailable.is_available());
        assert_eq!(unavailable.reason(), Some("bridge missing"));
        assert!(Availability::Available.is_available());
    }

    #[tokio::test]
    async fn test_engine_seam_is_mockable() {
        let mut engine = MockEngine::new();
        engine
            .expect_propagate()
            .returning(|_, _| Ok(FrameworkOutput::new(json!({}), json!("HOLD"))));

        let engine: Box<dyn TradingFramework> = Box::new(engine);
        let date = NaiveDate::from_ymd_opt(2024, 11, 15).unwrap();
        let output = engine.propagate("AAPL", date).await.unwrap();
        assert_eq!(output.decision, json!("HOLD"));
    }
}
