//! Environment loading and credential checks

use serde::Serialize;
use std::path::PathBuf;

/// LLM provider credential
pub const LLM_API_KEY_VAR: &str = "OPENAI_API_KEY";

/// Market-data vendor credential
pub const MARKET_DATA_API_KEY_VAR: &str = "ALPHA_VANTAGE_API_KEY";

/// Variables the launcher warns about when unset
pub const REQUIRED_ENV_VARS: [&str; 2] = [LLM_API_KEY_VAR, MARKET_DATA_API_KEY_VAR];

/// Load a `.env` file from the working directory or its parents, if there is one
pub fn load_dotenv() -> Option<PathBuf> {
    match dotenvy::dotenv() {
        Ok(path) => {
            tracing::debug!("Loaded environment from {}", path.display());
            Some(path)
        }
        Err(e) if e.not_found() => None,
        Err(e) => {
            tracing::warn!("Ignoring unreadable .env file: {}", e);
            None
        }
    }
}

/// Names from `vars` that are unset or empty in the process environment
pub fn missing_env_vars<'a>(vars: &[&'a str]) -> Vec<&'a str> {
    missing_with(vars, |key| std::env::var(key).ok())
}

fn missing_with<'a>(vars: &[&'a str], lookup: impl Fn(&str) -> Option<String>) -> Vec<&'a str> {
    vars.iter()
        .copied()
        .filter(|var| lookup(var).is_none_or(|value| value.trim().is_empty()))
        .collect()
}

/// Which credentials are configured; shown read-only in the UIs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CredentialStatus {
    pub llm_key_set: bool,
    pub market_data_key_set: bool,
}

impl CredentialStatus {
    pub fn from_env() -> Self {
        Self::from_missing(&missing_env_vars(&REQUIRED_ENV_VARS))
    }

    fn from_missing(missing: &[&str]) -> Self {
        Self {
            llm_key_set: !missing.contains(&LLM_API_KEY_VAR),
            market_data_key_set: !missing.contains(&MARKET_DATA_API_KEY_VAR),
        }
    }

    pub fn all_set(&self) -> bool {
        self.llm_key_set && self.market_data_key_set
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_with() {
        let lookup = |key: &str| match key {
            "OPENAI_API_KEY" => Some("sk-test".to_string()),
            "ALPHA_VANTAGE_API_KEY" => Some("   ".to_string()),
            _ => None,
        };

        let missing = missing_with(&REQUIRED_ENV_VARS, lookup);
        assert_eq!(missing, vec!["ALPHA_VANTAGE_API_KEY"]);
    }

    #[test]
    fn test_credential_status() {
        let status = CredentialStatus::from_missing(&["ALPHA_VANTAGE_API_KEY"]);
        assert!(status.llm_key_set);
        assert!(!status.market_data_key_set);
        assert!(!status.all_set());

        assert!(CredentialStatus::from_missing(&[]).all_set());
    }
}
