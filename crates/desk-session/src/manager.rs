//! Session registry with idle expiry

use crate::store::Session;
use desk_core::{AnalysisConfig, Error, Result};
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, info};
use uuid::Uuid;

/// Sessions idle for longer than this are evicted
pub const DEFAULT_SESSION_TTL: Duration = Duration::from_secs(3600);

/// Owns every live session, keyed by a random id
#[derive(Debug)]
pub struct SessionManager {
    sessions: RwLock<HashMap<String, Arc<Session>>>,
    session_ttl: Duration,
}

impl Default for SessionManager {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionManager {
    pub fn new() -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            session_ttl: DEFAULT_SESSION_TTL,
        }
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.session_ttl = ttl;
        self
    }

    pub fn session_ttl(&self) -> Duration {
        self.session_ttl
    }

    /// Start a session whose configuration is `config`
    pub fn create(&self, config: AnalysisConfig) -> Arc<Session> {
        let id = Uuid::new_v4().to_string();
        let session = Arc::new(Session::new(id.clone(), config));

        self.sessions
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id.clone(), Arc::clone(&session));
        info!("Created session {}", id);
        session
    }

    /// Look up a session and mark it active
    pub fn get(&self, id: &str) -> Result<Arc<Session>> {
        let session = self
            .sessions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(id)
            .cloned()
            .ok_or_else(|| Error::SessionNotFound(id.to_string()))?;
        session.touch();
        Ok(session)
    }

    pub fn remove(&self, id: &str) -> bool {
        self.sessions
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(id)
            .is_some()
    }

    pub fn len(&self) -> usize {
        self.sessions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop idle sessions; a session with an analysis in flight is kept
    pub fn cleanup_expired(&self) -> usize {
        let mut sessions = self
            .sessions
            .write()
            .unwrap_or_else(PoisonError::into_inner);

        let initial_count = sessions.len();
        sessions.retain(|_, session| {
            session.is_running() || session.idle_for() <= self.session_ttl
        });
        initial_count - sessions.len()
    }

    /// Periodically evict expired sessions
    pub fn spawn_reaper(self: &Arc<Self>, interval: Duration) -> JoinHandle<()> {
        let manager = Arc::clone(self);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            // The first tick completes immediately
            ticker.tick().await;
            loop {
                ticker.tick().await;
                let removed = manager.cleanup_expired();
                if removed > 0 {
                    info!("Evicted {} idle session(s)", removed);
                } else {
                    debug!("No idle sessions to evict");
                }
            }
        })
    }
}
