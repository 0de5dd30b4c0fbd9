//! Error types for bridge operations

use thiserror::Error;

/// Errors talking to the framework bridge process
#[derive(Error, Debug)]
pub enum BridgeError {
    /// The bridge command could not be started
    #[error("Failed to start bridge command `{command}`: {reason}")]
    SpawnFailed { command: String, reason: String },

    /// The bridge did not answer in time
    #[error("Bridge timed out after {0}s")]
    Timeout(u64),

    /// The bridge exited without a usable response
    #[error("Bridge exited with {status}: {stderr}")]
    ExitStatus { status: String, stderr: String },

    /// The response could not be understood
    #[error("Bridge protocol error: {0}")]
    Protocol(String),

    /// The framework itself reported an error
    #[error("{0}")]
    Remote(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// IO error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Result type alias for bridge operations
pub type Result<T> = std::result::Result<T, BridgeError>;

/// Startup and configuration failures mean the framework is unreachable;
/// anything after that is a failed analysis.
impl From<BridgeError> for desk_core::Error {
    fn from(err: BridgeError) -> Self {
        match err {
            BridgeError::SpawnFailed { .. } | BridgeError::ConfigError(_) => {
                desk_core::Error::Unavailable(err.to_string())
            }
            BridgeError::Remote(message) => desk_core::Error::AnalysisFailed(message),
            other => desk_core::Error::AnalysisFailed(other.to_string()),
        }
    }
}
