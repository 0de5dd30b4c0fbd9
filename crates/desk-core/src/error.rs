//! Error types for desk-core

use thiserror::Error;

/// Result type alias for desk-core
pub type Result<T> = std::result::Result<T, Error>;

/// Error type shared by the invoker, the session store and both UIs
#[derive(Error, Debug)]
pub enum Error {
    /// The external framework (or another required runtime dependency) is missing
    #[error("Analysis framework unavailable: {0}")]
    Unavailable(String),

    /// User input rejected before anything was attempted
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Another analysis is already running for this session
    #[error("An analysis is already running for this session")]
    AnalysisInProgress,

    /// The external framework raised an error
    #[error("Analysis failed: {0}")]
    AnalysisFailed(String),

    /// Market data lookup failed
    #[error("Data fetch failed for {symbol}: {reason}")]
    DataFetchFailed {
        symbol: String,
        reason: String,
    },

    /// No session with the given id
    #[error("Session not found: {0}")]
    SessionNotFound(String),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Shorthand for [`Error::InvalidInput`]
    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Whether the error should be shown next to the form that produced it
    pub fn is_user_error(&self) -> bool {
        matches!(self, Self::InvalidInput(_) | Self::AnalysisInProgress)
    }
}
