//! [`FrameworkFactory`] backed by the bridge process

use crate::config::BridgeConfig;
use crate::error::BridgeError;
use crate::process::run_request;
use crate::protocol::{Request, parse_probe, parse_propagate};
use async_trait::async_trait;
use chrono::NaiveDate;
use desk_core::{
    AnalysisConfig, AnalystSelection, Availability, Error, FrameworkFactory, FrameworkOutput,
    Result, TradingFramework,
};
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::{info, warn};

/// Reaches the external framework through a bridge command
///
/// Availability is decided once, at [`BridgeFactory::detect`]; every
/// analysis then spawns a fresh bridge process.
#[derive(Debug, Clone)]
pub struct BridgeFactory {
    config: Arc<BridgeConfig>,
    availability: Availability,
    baseline: Option<Map<String, Value>>,
}

impl BridgeFactory {
    /// Probe the bridge and remember the outcome
    pub async fn detect(config: BridgeConfig) -> Self {
        if let Err(e) = config.validate() {
            return Self::unavailable(config, e.to_string());
        }

        let outcome = match run_request(&config, &Request::Probe, Some(config.probe_timeout())).await {
            Ok(response) => parse_probe(response),
            Err(e) => Err(e),
        };

        match outcome {
            Ok(probe) => {
                let availability = probe.availability();
                match availability.reason() {
                    None => info!("Trading framework available via `{}`", config.display_command()),
                    Some(reason) => warn!("Trading framework unavailable: {}", reason),
                }
                Self {
                    config: Arc::new(config),
                    availability,
                    baseline: probe.default_config,
                }
            }
            Err(e) => {
                warn!("Trading framework probe failed: {}", e);
                Self::unavailable(config, e.to_string())
            }
        }
    }

    /// A factory that refuses every analysis
    pub fn unavailable(config: BridgeConfig, reason: impl Into<String>) -> Self {
        Self {
            config: Arc::new(config),
            availability: Availability::Unavailable(reason.into()),
            baseline: None,
        }
    }

    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }
}

impl FrameworkFactory for BridgeFactory {
    fn availability(&self) -> Availability {
        self.availability.clone()
    }

    fn baseline_config(&self) -> Option<Map<String, Value>> {
        self.baseline.clone()
    }

    fn create(
        &self,
        analysts: &AnalystSelection,
        debug: bool,
        config: &AnalysisConfig,
    ) -> Result<Box<dyn TradingFramework>> {
        if let Availability::Unavailable(reason) = &self.availability {
            return Err(Error::Unavailable(reason.clone()));
        }

        Ok(Box::new(BridgeFramework {
            bridge: Arc::clone(&self.config),
            selected_analysts: analysts.names(),
            debug,
            config: config.to_value(),
        }))
    }
}

/// One configured engine; each `propagate` is one bridge process
pub struct BridgeFramework {
    bridge: Arc<BridgeConfig>,
    selected_analysts: Vec<String>,
    debug: bool,
    config: Value,
}

impl BridgeFramework {
    fn request(&self, ticker: &str, trade_date: NaiveDate) -> Request {
        Request::Propagate {
            selected_analysts: self.selected_analysts.clone(),
            debug: self.debug,
            config: self.config.clone(),
            ticker: ticker.to_string(),
            trade_date: trade_date.format("%Y-%m-%d").to_string(),
        }
    }
}

#[async_trait]
impl TradingFramework for BridgeFramework {
    async fn propagate(&self, ticker: &str, trade_date: NaiveDate) -> Result<FrameworkOutput> {
        let request = self.request(ticker, trade_date);
        let response = run_request(&self.bridge, &request, self.bridge.run_timeout())
            .await
            .map_err(|e| match e {
                // The probe succeeded earlier, so a spawn failure now is a failed run
                BridgeError::SpawnFailed { .. } => Error::AnalysisFailed(e.to_string()),
                other => other.into(),
            })?;

        Ok(parse_propagate(response)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use desk_core::AnalystKind;

    #[tokio::test]
    async fn test_detect_missing_command() {
        let config = BridgeConfig::new("desk-bridge-command-that-does-not-exist", vec![]);
        let factory = BridgeFactory::detect(config).await;

        assert!(!factory.availability().is_available());
        assert!(factory.baseline_config().is_none());

        let result = factory.create(&AnalystSelection::all(), false, &AnalysisConfig::default());
        assert!(matches!(result, Err(Error::Unavailable(_))));
    }

    #[test]
    fn test_request_shape() {
        let analysts = AnalystSelection::new(vec![AnalystKind::Market, AnalystKind::News]).unwrap();
        let engine = BridgeFramework {
            bridge: Arc::new(BridgeConfig::default()),
            selected_analysts: analysts.names(),
            debug: false,
            config: AnalysisConfig::default().to_value(),
        };

        let date = NaiveDate::from_ymd_opt(2024, 11, 17).unwrap();
        let Request::Propagate {
            selected_analysts,
            ticker,
            trade_date,
            config,
            ..
        } = engine.request("NVDA", date)
        else {
            panic!("expected a propagate request");
        };

        assert_eq!(selected_analysts, ["market", "news"]);
        assert_eq!(ticker, "NVDA");
        assert_eq!(trade_date, "2024-11-17");
        assert_eq!(config["llm_provider"], "openai");
    }

    #[cfg(unix)]
    fn scripted(script: &str) -> BridgeConfig {
        BridgeConfig::new("sh", vec!["-c".to_string(), script.to_string()])
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_detect_and_propagate() {
        // Answers the probe, then answers any other request with a fixed analysis
        let script = r#"read request
case "$request" in
  *probe*) echo '{"available": true, "default_config": {"deep_think_llm": "o1-mini"}}' ;;
  *) echo 'analysing...'; echo '{"final_state": {"market_report": "Uptrend"}, "decision": "BUY"}' ;;
esac"#;
        let factory = BridgeFactory::detect(scripted(script)).await;
        assert!(factory.availability().is_available());
        assert_eq!(factory.default_config().deep_think_llm, "o1-mini");

        let engine = factory
            .create(&AnalystSelection::all(), false, &factory.default_config())
            .unwrap();
        let date = NaiveDate::from_ymd_opt(2024, 11, 15).unwrap();
        let output = engine.propagate("NVDA", date).await.unwrap();
        assert_eq!(output.decision, serde_json::json!("BUY"));
        assert_eq!(output.final_state["market_report"], "Uptrend");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_propagate_remote_error() {
        let script = r#"read request
case "$request" in
  *probe*) echo '{"available": true}' ;;
  *) echo '{"error": "OpenAI API key not found"}'; exit 1 ;;
esac"#;
        let factory = BridgeFactory::detect(scripted(script)).await;
        let engine = factory
            .create(&AnalystSelection::all(), false, &AnalysisConfig::default())
            .unwrap();

        let date = NaiveDate::from_ymd_opt(2024, 11, 15).unwrap();
        let err = engine.propagate("NVDA", date).await.unwrap_err();
        assert!(matches!(err, Error::AnalysisFailed(ref m) if m == "OpenAI API key not found"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_detect_reported_unavailable() {
        let script = r#"read request; echo '{"available": false, "reason": "No module named tradingagents"}'"#;
        let factory = BridgeFactory::detect(scripted(script)).await;
        assert_eq!(
            factory.availability().reason(),
            Some("No module named tradingagents")
        );
    }
}
