//! Shared application state handed to every handler

use crate::templates::Templates;
use desk_market::MarketData;
use desk_session::{AnalysisInvoker, SessionManager};
use desk_utils::CredentialStatus;
use std::sync::Arc;

/// Chart window used when the request does not name one
pub const DEFAULT_CHART_DAYS: u32 = 30;

/// Longest chart window a request may ask for
pub const MAX_CHART_DAYS: u32 = 365;

#[derive(Clone)]
pub struct AppState {
    pub sessions: Arc<SessionManager>,
    pub invoker: AnalysisInvoker,
    pub market: MarketData,
    pub templates: Arc<Templates>,
    pub credentials: CredentialStatus,
}

impl AppState {
    pub fn new(invoker: AnalysisInvoker, market: MarketData) -> Result<Self, minijinja::Error> {
        Ok(Self {
            sessions: Arc::new(SessionManager::new()),
            invoker,
            market,
            templates: Arc::new(Templates::new()?),
            credentials: CredentialStatus::from_env(),
        })
    }

    pub fn with_sessions(mut self, sessions: Arc<SessionManager>) -> Self {
        self.sessions = sessions;
        self
    }

    pub fn with_credentials(mut self, credentials: CredentialStatus) -> Self {
        self.credentials = credentials;
        self
    }
}
