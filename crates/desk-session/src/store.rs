//! Per-session state: configuration, current result, history, progress

use crate::progress::{AgentBoard, Progress};
use chrono::{DateTime, Utc};
use desk_core::{AnalysisConfig, ConfigPatch, Error, ResultBundle, Result};
use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Duration;

/// Mutable part of a session, behind the session's lock
#[derive(Debug, Clone)]
pub struct SessionState {
    pub config: AnalysisConfig,
    pub current: Option<Arc<ResultBundle>>,
    pub history: Vec<Arc<ResultBundle>>,
    pub progress: Progress,
    pub agents: AgentBoard,
}

impl SessionState {
    pub fn new(config: AnalysisConfig) -> Self {
        Self {
            config,
            current: None,
            history: Vec::new(),
            progress: Progress::default(),
            agents: AgentBoard::default(),
        }
    }
}

/// Progress snapshot returned by [`Session::status`]
#[derive(Debug, Clone, Serialize)]
pub struct StatusSnapshot {
    pub running: bool,
    pub progress: Progress,
    pub agents: AgentBoard,
    pub history_len: usize,
}

/// One interactive session
///
/// History and current are written only by the invoker (plus explicit
/// selection by the UI); the in-flight flag admits one analysis at a time.
#[derive(Debug)]
pub struct Session {
    id: String,
    created_at: DateTime<Utc>,
    last_active: RwLock<DateTime<Utc>>,
    state: RwLock<SessionState>,
    running: AtomicBool,
}

impl Session {
    pub fn new(id: impl Into<String>, config: AnalysisConfig) -> Self {
        let now = Utc::now();
        Self {
            id: id.into(),
            created_at: now,
            last_active: RwLock::new(now),
            state: RwLock::new(SessionState::new(config)),
            running: AtomicBool::new(false),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    // A panic while holding the lock leaves whole values behind, so
    // poisoning is ignored.
    fn read(&self) -> RwLockReadGuard<'_, SessionState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, SessionState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn update<T>(&self, apply: impl FnOnce(&mut SessionState) -> T) -> T {
        apply(&mut self.write())
    }

    pub fn touch(&self) {
        *self
            .last_active
            .write()
            .unwrap_or_else(PoisonError::into_inner) = Utc::now();
    }

    pub fn idle_for(&self) -> Duration {
        let last = *self.last_active.read().unwrap_or_else(PoisonError::into_inner);
        (Utc::now() - last).to_std().unwrap_or_default()
    }

    pub fn get_config(&self) -> AnalysisConfig {
        self.read().config.clone()
    }

    /// Apply a partial update; nothing changes when the patch is rejected
    pub fn set_config(&self, patch: ConfigPatch) -> Result<AnalysisConfig> {
        let mut state = self.write();
        let mut config = state.config.clone();
        config.apply(patch)?;
        state.config = config.clone();
        Ok(config)
    }

    pub fn get_current(&self) -> Option<Arc<ResultBundle>> {
        self.read().current.clone()
    }

    pub fn get_history(&self) -> Vec<Arc<ResultBundle>> {
        self.read().history.clone()
    }

    pub fn history_len(&self) -> usize {
        self.read().history.len()
    }

    /// Record a finished analysis and make it current
    pub(crate) fn append(&self, bundle: Arc<ResultBundle>) {
        let mut state = self.write();
        state.history.push(Arc::clone(&bundle));
        state.current = Some(bundle);
    }

    pub fn set_current(&self, bundle: Arc<ResultBundle>) {
        self.write().current = Some(bundle);
    }

    /// Promote a past analysis to current
    pub fn select_history(&self, index: usize) -> Result<Arc<ResultBundle>> {
        let mut state = self.write();
        let bundle = state.history.get(index).cloned().ok_or_else(|| {
            Error::invalid(format!(
                "No analysis at index {} (history has {})",
                index,
                state.history.len()
            ))
        })?;
        state.current = Some(Arc::clone(&bundle));
        Ok(bundle)
    }

    pub fn status(&self) -> StatusSnapshot {
        let state = self.read();
        StatusSnapshot {
            running: self.is_running(),
            progress: state.progress.clone(),
            agents: state.agents.clone(),
            history_len: state.history.len(),
        }
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// Take the in-flight flag, or `AnalysisInProgress` if it is held
    pub(crate) fn try_begin(self: &Arc<Self>) -> Result<InFlightGuard> {
        self.running
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| Error::AnalysisInProgress)?;
        Ok(InFlightGuard {
            session: Arc::clone(self),
        })
    }
}

/// Holds the session's in-flight flag until dropped
#[derive(Debug)]
pub struct InFlightGuard {
    session: Arc<Session>,
}

impl InFlightGuard {
    pub fn session(&self) -> &Arc<Session> {
        &self.session
    }
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        // An unwinding task never reached its own failure handling
        self.session.update(|state| {
            if state.progress.stage.is_active() {
                state.progress.failed("Analysis task ended unexpectedly");
                state.agents.fail();
            }
        });
        self.session.running.store(false, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use desk_core::{AnalystSelection, Decision, Reports};

    fn bundle(ticker: &str) -> Arc<ResultBundle> {
        Arc::new(ResultBundle {
            ticker: ticker.to_string(),
            trade_date: NaiveDate::from_ymd_opt(2024, 11, 15).unwrap(),
            timestamp: Utc::now(),
            analysts: AnalystSelection::all(),
            decision: Decision::new("HOLD"),
            reports: Reports::default(),
        })
    }

    fn session() -> Arc<Session> {
        Arc::new(Session::new("test", AnalysisConfig::default()))
    }

    #[test]
    fn test_initial_state() {
        let session = session();
        assert!(session.get_current().is_none());
        assert!(session.get_history().is_empty());
        assert!(!session.is_running());
        assert_eq!(session.get_config(), AnalysisConfig::default());
    }

    #[test]
    fn test_append_sets_current() {
        let session = session();
        session.append(bundle("NVDA"));
        session.append(bundle("AAPL"));

        let history = session.get_history();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].ticker, "NVDA");
        assert_eq!(session.get_current().unwrap().ticker, "AAPL");
    }

    #[test]
    fn test_select_history() {
        let session = session();
        session.append(bundle("NVDA"));
        session.append(bundle("AAPL"));

        let selected = session.select_history(0).unwrap();
        assert_eq!(selected.ticker, "NVDA");
        assert_eq!(session.get_current().unwrap().ticker, "NVDA");
        assert_eq!(session.history_len(), 2);

        assert!(matches!(session.select_history(5), Err(Error::InvalidInput(_))));
        assert_eq!(session.get_current().unwrap().ticker, "NVDA");
    }

    #[test]
    fn test_set_config_rejects_bad_patch() {
        let session = session();
        let patch = ConfigPatch {
            max_debate_rounds: Some(9),
            ..ConfigPatch::default()
        };
        assert!(session.set_config(patch).is_err());
        assert_eq!(session.get_config(), AnalysisConfig::default());

        let patch = ConfigPatch {
            max_debate_rounds: Some(3),
            ..ConfigPatch::default()
        };
        assert_eq!(session.set_config(patch).unwrap().max_debate_rounds, 3);
        assert_eq!(session.get_config().max_debate_rounds, 3);
    }

    #[test]
    fn test_in_flight_flag() {
        let session = session();
        let guard = session.try_begin().unwrap();
        assert!(session.is_running());
        assert!(matches!(session.try_begin(), Err(Error::AnalysisInProgress)));

        drop(guard);
        assert!(!session.is_running());
        assert!(session.try_begin().is_ok());
    }

    #[test]
    fn test_guard_marks_abandoned_run_failed() {
        let session = session();
        let guard = session.try_begin().unwrap();
        session.update(|state| state.progress = Progress::initializing("NVDA", "2024-11-15"));

        drop(guard);
        let status = session.status();
        assert!(!status.running);
        assert_eq!(status.progress.stage, crate::progress::Stage::Failed);
    }
}
