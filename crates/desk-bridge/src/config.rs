//! Bridge process configuration
//!
//! Settings come from the environment or from a JSON file:
//!
//! ```json
//! {
//!   "command": "python3",
//!   "args": ["scripts/tradingagents_bridge.py"],
//!   "env": {"PYTHONUNBUFFERED": "1"},
//!   "cwd": "/opt/tradingagents",
//!   "probe_timeout_secs": 60
//! }
//! ```

use crate::error::{BridgeError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const COMMAND_VAR: &str = "DESK_FRAMEWORK_COMMAND";
pub const ARGS_VAR: &str = "DESK_FRAMEWORK_ARGS";
pub const CWD_VAR: &str = "DESK_FRAMEWORK_CWD";

const DEFAULT_COMMAND: &str = "python3";
const DEFAULT_SCRIPT: &str = "scripts/tradingagents_bridge.py";

/// How to launch the bridge process
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BridgeConfig {
    /// Command to execute
    pub command: String,

    /// Command arguments
    #[serde(default)]
    pub args: Vec<String>,

    /// Extra environment variables
    #[serde(default)]
    pub env: HashMap<String, String>,

    /// Working directory (optional)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cwd: Option<PathBuf>,

    /// Limit for the startup probe
    #[serde(default = "default_probe_timeout")]
    pub probe_timeout_secs: u64,

    /// Limit for one analysis; unlimited when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub run_timeout_secs: Option<u64>,
}

fn default_probe_timeout() -> u64 {
    60
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            command: DEFAULT_COMMAND.to_string(),
            args: vec![DEFAULT_SCRIPT.to_string()],
            env: HashMap::new(),
            cwd: None,
            probe_timeout_secs: default_probe_timeout(),
            run_timeout_secs: None,
        }
    }
}

impl BridgeConfig {
    pub fn new(command: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            command: command.into(),
            args,
            ..Self::default()
        }
    }

    /// Read `DESK_FRAMEWORK_COMMAND`, `DESK_FRAMEWORK_ARGS` (whitespace
    /// separated) and `DESK_FRAMEWORK_CWD`
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(command) = non_empty(COMMAND_VAR) {
            config.command = command.trim().to_string();
            // A custom command does not take the default script
            config.args.clear();
        }
        if let Some(args) = non_empty(ARGS_VAR) {
            config.args = args.split_whitespace().map(str::to_string).collect();
        }
        if let Some(cwd) = non_empty(CWD_VAR) {
            config.cwd = Some(PathBuf::from(cwd));
        }

        config
    }

    /// Load configuration from a JSON file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            BridgeError::ConfigError(format!(
                "Failed to read {}: {}",
                path.as_ref().display(),
                e
            ))
        })?;

        let config: Self = serde_json::from_str(&content)
            .map_err(|e| BridgeError::ConfigError(format!("Failed to parse config file: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn with_cwd(mut self, cwd: impl Into<PathBuf>) -> Self {
        self.cwd = Some(cwd.into());
        self
    }

    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }

    pub fn with_probe_timeout(mut self, timeout: Duration) -> Self {
        self.probe_timeout_secs = timeout.as_secs().max(1);
        self
    }

    pub fn with_run_timeout(mut self, timeout: Duration) -> Self {
        self.run_timeout_secs = Some(timeout.as_secs().max(1));
        self
    }

    pub fn probe_timeout(&self) -> Duration {
        Duration::from_secs(self.probe_timeout_secs)
    }

    pub fn run_timeout(&self) -> Option<Duration> {
        self.run_timeout_secs.map(Duration::from_secs)
    }

    /// Command line as shown in logs
    pub fn display_command(&self) -> String {
        std::iter::once(self.command.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }

    pub fn validate(&self) -> Result<()> {
        if self.command.trim().is_empty() {
            return Err(BridgeError::ConfigError("command must not be empty".to_string()));
        }
        if self.probe_timeout_secs == 0 {
            return Err(BridgeError::ConfigError(
                "probe_timeout_secs must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lookup(vars: &'static [(&'static str, &'static str)]) -> impl Fn(&str) -> Option<String> {
        move |key| {
            vars.iter()
                .find(|(k, _)| *k == key)
                .map(|(_, v)| (*v).to_string())
        }
    }

    #[test]
    fn test_default_config() {
        let config = BridgeConfig::default();
        assert_eq!(config.display_command(), "python3 scripts/tradingagents_bridge.py");
        assert_eq!(config.probe_timeout(), Duration::from_secs(60));
        assert!(config.run_timeout().is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_from_lookup() {
        let config = BridgeConfig::from_lookup(lookup(&[
            ("DESK_FRAMEWORK_COMMAND", "/opt/venv/bin/python"),
            ("DESK_FRAMEWORK_ARGS", "-u bridge.py  --quiet"),
            ("DESK_FRAMEWORK_CWD", "/opt/tradingagents"),
        ]));

        assert_eq!(config.command, "/opt/venv/bin/python");
        assert_eq!(config.args, ["-u", "bridge.py", "--quiet"]);
        assert_eq!(config.cwd, Some(PathBuf::from("/opt/tradingagents")));
    }

    #[test]
    fn test_custom_command_drops_default_script() {
        let config = BridgeConfig::from_lookup(lookup(&[("DESK_FRAMEWORK_COMMAND", "tradingagents-bridge")]));
        assert!(config.args.is_empty());

        let config = BridgeConfig::from_lookup(lookup(&[("DESK_FRAMEWORK_COMMAND", "  ")]));
        assert_eq!(config, BridgeConfig::default());
    }

    #[test]
    fn test_deserialize() {
        let config: BridgeConfig = serde_json::from_str(
            r#"{"command": "python3", "args": ["bridge.py"], "env": {"PYTHONUNBUFFERED": "1"}}"#,
        )
        .unwrap();

        assert_eq!(config.env.get("PYTHONUNBUFFERED").map(String::as_str), Some("1"));
        assert_eq!(config.probe_timeout_secs, 60);
        assert!(config.cwd.is_none());
    }

    #[test]
    fn test_validation() {
        let config = BridgeConfig::new("", vec![]);
        assert!(matches!(config.validate(), Err(BridgeError::ConfigError(_))));
    }
}
