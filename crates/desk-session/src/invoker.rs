//! Runs analyses against the external framework on behalf of a session

use crate::progress::Progress;
use crate::request::AnalysisRequest;
use crate::store::{InFlightGuard, Session};
use desk_core::{AnalysisConfig, Availability, Error, FrameworkFactory, ResultBundle, Result};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{info, warn};

/// The only writer of a session's history
#[derive(Clone)]
pub struct AnalysisInvoker {
    factory: Arc<dyn FrameworkFactory>,
    debug: bool,
}

impl AnalysisInvoker {
    pub fn new(factory: Arc<dyn FrameworkFactory>) -> Self {
        Self {
            factory,
            debug: false,
        }
    }

    /// Ask the framework for verbose tracing of its own run
    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    pub fn availability(&self) -> Availability {
        self.factory.availability()
    }

    /// Configuration a new session starts from
    pub fn default_config(&self) -> AnalysisConfig {
        self.factory.default_config()
    }

    /// Parse raw input and run the analysis to completion
    pub async fn analyze<S: AsRef<str>>(
        &self,
        session: &Arc<Session>,
        ticker: &str,
        trade_date: &str,
        analysts: &[S],
    ) -> Result<Arc<ResultBundle>> {
        let request = AnalysisRequest::parse(ticker, trade_date, analysts)?;
        self.invoke(session, request).await
    }

    /// Run the analysis to completion on the current task
    pub async fn invoke(
        &self,
        session: &Arc<Session>,
        request: AnalysisRequest,
    ) -> Result<Arc<ResultBundle>> {
        let guard = self.begin(session, &request)?;
        run(Arc::clone(&self.factory), self.debug, guard, request).await
    }

    /// Start the analysis on a background task
    ///
    /// Availability and the in-flight check happen before spawning, so those
    /// errors come back immediately. Progress is recorded in the session.
    pub fn submit(
        &self,
        session: &Arc<Session>,
        request: AnalysisRequest,
    ) -> Result<JoinHandle<Result<Arc<ResultBundle>>>> {
        let guard = self.begin(session, &request)?;
        let factory = Arc::clone(&self.factory);
        let debug = self.debug;
        Ok(tokio::spawn(run(factory, debug, guard, request)))
    }

    fn begin(&self, session: &Arc<Session>, request: &AnalysisRequest) -> Result<InFlightGuard> {
        if let Availability::Unavailable(reason) = self.factory.availability() {
            return Err(Error::Unavailable(reason));
        }

        let guard = session.try_begin()?;
        let trade_date = request.trade_date_string();
        session.update(|state| {
            state.progress = Progress::initializing(&request.ticker, &trade_date);
            state.agents.begin(&request.analysts);
        });
        info!(
            "Starting analysis of {} for {} in session {}",
            request.ticker,
            trade_date,
            session.id()
        );
        Ok(guard)
    }
}

async fn run(
    factory: Arc<dyn FrameworkFactory>,
    debug: bool,
    guard: InFlightGuard,
    request: AnalysisRequest,
) -> Result<Arc<ResultBundle>> {
    let session = Arc::clone(guard.session());

    match execute(factory.as_ref(), debug, &session, &request).await {
        Ok(bundle) => {
            let bundle = Arc::new(bundle);
            session.append(Arc::clone(&bundle));
            session.update(|state| {
                state.progress.completed();
                state.agents.complete(&request.analysts);
            });
            info!(
                "Analysis of {} completed with decision '{}'",
                request.ticker,
                bundle.decision.truncated(80)
            );
            Ok(bundle)
        }
        Err(e) => {
            let message = match e {
                Error::AnalysisFailed(message) => message,
                other => other.to_string(),
            };
            session.update(|state| {
                state.progress.failed(message.clone());
                state.agents.fail();
            });
            warn!("Analysis of {} failed: {}", request.ticker, message);
            Err(Error::AnalysisFailed(message))
        }
    }
}

async fn execute(
    factory: &dyn FrameworkFactory,
    debug: bool,
    session: &Session,
    request: &AnalysisRequest,
) -> Result<ResultBundle> {
    let config = session.get_config();
    let engine = factory.create(&request.analysts, debug, &config)?;
    session.update(|state| state.progress.running());

    let output = engine.propagate(&request.ticker, request.trade_date).await?;
    Ok(ResultBundle::from_output(
        request.ticker.clone(),
        request.trade_date,
        request.analysts.clone(),
        output,
    ))
}
