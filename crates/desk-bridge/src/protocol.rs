//! Wire messages exchanged with the bridge process
//!
//! One JSON request goes to the child's stdin; the child answers with one JSON
//! object on stdout. Frameworks tend to print progress to stdout as well, so
//! the response is the last stdout line that parses as a JSON object.

use crate::error::{BridgeError, Result};
use desk_core::{Availability, FrameworkOutput};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A request for the bridge
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "lowercase")]
pub enum Request {
    /// Report whether the framework can be imported, plus its default config
    Probe,
    /// Run one analysis
    Propagate {
        selected_analysts: Vec<String>,
        debug: bool,
        config: Value,
        ticker: String,
        trade_date: String,
    },
}

impl Request {
    pub fn action(&self) -> &'static str {
        match self {
            Request::Probe => "probe",
            Request::Propagate { .. } => "propagate",
        }
    }

    /// Newline-terminated JSON
    pub fn to_line(&self) -> Result<String> {
        let mut line = serde_json::to_string(self)?;
        line.push('\n');
        Ok(line)
    }
}

/// Answer to [`Request::Probe`]
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ProbeResponse {
    pub available: bool,
    #[serde(default)]
    pub reason: Option<String>,
    #[serde(default)]
    pub default_config: Option<Map<String, Value>>,
}

impl ProbeResponse {
    pub fn availability(&self) -> Availability {
        if self.available {
            Availability::Available
        } else {
            Availability::Unavailable(
                self.reason
                    .clone()
                    .unwrap_or_else(|| "Framework reported unavailable".to_string()),
            )
        }
    }
}

/// Last stdout line holding a JSON object
pub fn find_response(stdout: &str) -> Option<Value> {
    stdout
        .lines()
        .rev()
        .map(str::trim)
        .filter(|line| line.starts_with('{'))
        .find_map(|line| serde_json::from_str::<Value>(line).ok())
        .filter(Value::is_object)
}

/// `{"error": ...}` responses become [`BridgeError::Remote`]
fn check_remote_error(response: &Value) -> Result<()> {
    match response.get("error") {
        None | Some(Value::Null) => Ok(()),
        Some(Value::String(message)) => Err(BridgeError::Remote(message.clone())),
        Some(other) => Err(BridgeError::Remote(other.to_string())),
    }
}

pub fn parse_probe(response: Value) -> Result<ProbeResponse> {
    check_remote_error(&response)?;
    serde_json::from_value(response)
        .map_err(|e| BridgeError::Protocol(format!("Malformed probe response: {}", e)))
}

pub fn parse_propagate(response: Value) -> Result<FrameworkOutput> {
    check_remote_error(&response)?;

    let Value::Object(mut object) = response else {
        return Err(BridgeError::Protocol("Response is not an object".to_string()));
    };
    let final_state = object
        .remove("final_state")
        .ok_or_else(|| BridgeError::Protocol("Response has no final_state".to_string()))?;
    let decision = object.remove("decision").unwrap_or(Value::Null);

    Ok(FrameworkOutput::new(final_state, decision))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_serialization() {
        assert_eq!(
            serde_json::to_value(Request::Probe).unwrap(),
            json!({"action": "probe"})
        );

        let request = Request::Propagate {
            selected_analysts: vec!["market".to_string(), "news".to_string()],
            debug: false,
            config: json!({"llm_provider": "openai"}),
            ticker: "NVDA".to_string(),
            trade_date: "2024-11-17".to_string(),
        };
        let line = request.to_line().unwrap();
        assert!(line.ends_with('\n'));
        assert_eq!(request.action(), "propagate");

        let value: Value = serde_json::from_str(line.trim()).unwrap();
        assert_eq!(value["action"], "propagate");
        assert_eq!(value["selected_analysts"], json!(["market", "news"]));
        assert_eq!(value["trade_date"], "2024-11-17");
    }

    #[test]
    fn test_find_response_skips_log_lines() {
        let stdout = "Loading graph...\n{\"final_state\": {}, \"decision\": \"BUY\"}\n\n";
        let response = find_response(stdout).unwrap();
        assert_eq!(response["decision"], "BUY");

        let stdout = "{\"step\": 1}\n{broken\nDone\n";
        assert_eq!(find_response(stdout), Some(json!({"step": 1})));

        assert!(find_response("no json here\n").is_none());
        assert!(find_response("").is_none());
    }

    #[test]
    fn test_parse_probe() {
        let probe = parse_probe(json!({
            "available": true,
            "default_config": {"deep_think_llm": "o1-preview", "results_dir": "./results"}
        }))
        .unwrap();
        assert!(probe.availability().is_available());
        assert_eq!(probe.default_config.unwrap().len(), 2);

        let probe = parse_probe(json!({"available": false, "reason": "No module named 'tradingagents'"})).unwrap();
        assert_eq!(
            probe.availability().reason(),
            Some("No module named 'tradingagents'")
        );

        assert!(matches!(
            parse_probe(json!({"reason": 1})),
            Err(BridgeError::Protocol(_))
        ));
    }

    #[test]
    fn test_parse_propagate() {
        let output = parse_propagate(json!({
            "final_state": {"market_report": "Uptrend"},
            "decision": "HOLD"
        }))
        .unwrap();
        assert_eq!(output.final_state["market_report"], "Uptrend");
        assert_eq!(output.decision, json!("HOLD"));

        let err = parse_propagate(json!({"error": "Rate limit reached"})).unwrap_err();
        assert!(matches!(err, BridgeError::Remote(ref m) if m == "Rate limit reached"));

        assert!(matches!(
            parse_propagate(json!({"decision": "BUY"})),
            Err(BridgeError::Protocol(_))
        ));
    }
}
