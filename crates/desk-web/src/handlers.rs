//! Route handlers

use crate::error::{ApiError, ApiResult};
use crate::state::{AppState, DEFAULT_CHART_DAYS, MAX_CHART_DAYS};
use crate::templates::DashboardPage;
use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::{StatusCode, header};
use axum::response::{Html, IntoResponse, Redirect, Response};
use chrono::{Duration, Utc};
use desk_core::{AnalysisConfig, Availability, ConfigPatch};
use desk_market::charts::{self, Figure};
use desk_market::{MetricTile, StockInfo, metric_tiles};
use desk_session::request::{DATE_FORMAT, normalise_ticker};
use desk_session::{
    AnalysisForm, ConfigSummary, DecisionCharts, HistoryRow, RenderedView, StatusSnapshot,
    decision_charts, export_to_json, history_rows, render,
};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::{info, warn};

/// Create a session and send the browser to its dashboard
pub async fn index(State(state): State<AppState>) -> Redirect {
    let session = state.sessions.create(state.invoker.default_config());
    Redirect::to(&format!("/s/{}", session.id()))
}

/// Dashboard page; an expired or unknown session starts a fresh one
pub async fn dashboard(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Response> {
    let Ok(session) = state.sessions.get(&id) else {
        return Ok(Redirect::to("/").into_response());
    };

    let availability = state.invoker.availability();
    let config = session.get_config();
    // The framework needs a completed trading day
    let default_trade_date = (Utc::now() - Duration::days(1))
        .format(DATE_FORMAT)
        .to_string();

    let html = state.templates.dashboard(&DashboardPage {
        session_id: session.id(),
        availability: &availability,
        credentials: &state.credentials,
        config: &config,
        default_trade_date: &default_trade_date,
    })?;
    Ok(Html(html).into_response())
}

/// Liveness probe
pub async fn health(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "alive",
        "version": env!("CARGO_PKG_VERSION"),
        "framework": state.invoker.availability(),
        "sessions": state.sessions.len(),
    }))
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SessionCreated {
    pub id: String,
    pub config: AnalysisConfig,
    pub framework: Availability,
}

pub async fn create_session(State(state): State<AppState>) -> (StatusCode, Json<SessionCreated>) {
    let session = state.sessions.create(state.invoker.default_config());
    (
        StatusCode::CREATED,
        Json(SessionCreated {
            id: session.id().to_string(),
            config: session.get_config(),
            framework: state.invoker.availability(),
        }),
    )
}

pub async fn get_config(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<AnalysisConfig>> {
    Ok(Json(state.sessions.get(&id)?.get_config()))
}

pub async fn patch_config(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(patch): Json<ConfigPatch>,
) -> ApiResult<Json<AnalysisConfig>> {
    let session = state.sessions.get(&id)?;
    let config = session.set_config(patch)?;
    info!("Updated configuration of session {}", id);
    Ok(Json(config))
}

pub async fn config_summary(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<ConfigSummary>> {
    let session = state.sessions.get(&id)?;
    Ok(Json(ConfigSummary::from_config(&session.get_config())))
}

/// Start an analysis in the background; poll `status` for progress
pub async fn submit_analysis(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(form): Json<AnalysisForm>,
) -> ApiResult<(StatusCode, Json<StatusSnapshot>)> {
    let session = state.sessions.get(&id)?;
    let request = form.into_request()?;
    // Detached: the task records its outcome in the session
    let _task = state.invoker.submit(&session, request)?;
    Ok((StatusCode::ACCEPTED, Json(session.status())))
}

pub async fn status(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<StatusSnapshot>> {
    Ok(Json(state.sessions.get(&id)?.status()))
}

/// Rendered view of the current result, `null` before the first analysis
pub async fn current(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Option<RenderedView>>> {
    let session = state.sessions.get(&id)?;
    Ok(Json(session.get_current().map(|bundle| render(&bundle))))
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SelectHistory {
    pub index: usize,
}

pub async fn select_current(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(selection): Json<SelectHistory>,
) -> ApiResult<Json<RenderedView>> {
    let session = state.sessions.get(&id)?;
    let bundle = session.select_history(selection.index)?;
    Ok(Json(render(&bundle)))
}

pub async fn history(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Vec<HistoryRow>>> {
    let session = state.sessions.get(&id)?;
    Ok(Json(history_rows(&session.get_history())))
}

/// JSON download of the current result
pub async fn export(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Response> {
    let session = state.sessions.get(&id)?;
    let bundle = session
        .get_current()
        .ok_or_else(|| ApiError::NotFound("No analysis to export".to_string()))?;

    let body = export_to_json(&bundle)?;
    let disposition = format!(
        "attachment; filename=\"{}\"",
        desk_session::export_file_name(&bundle)
    );
    Ok((
        [
            (header::CONTENT_TYPE, "application/json".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        body,
    )
        .into_response())
}

pub async fn decision_chart(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<DecisionCharts>> {
    let session = state.sessions.get(&id)?;
    Ok(Json(decision_charts(&session.get_history())))
}

#[derive(Debug, Default, Deserialize)]
pub struct ChartQuery {
    pub days: Option<u32>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MarketChart {
    pub ticker: String,
    pub days: u32,
    pub candlestick: Option<Figure>,
    pub volume: Option<Figure>,
}

/// Price and volume figures; a failed fetch yields no figures
pub async fn market_chart(
    State(state): State<AppState>,
    Path(ticker): Path<String>,
    Query(query): Query<ChartQuery>,
) -> ApiResult<Json<MarketChart>> {
    let ticker = normalise_ticker(&ticker)?;
    let days = query.days.unwrap_or(DEFAULT_CHART_DAYS).clamp(1, MAX_CHART_DAYS);

    let bars = match state.market.fetch_price_history(&ticker, days).await {
        Ok(bars) => bars,
        Err(e) => {
            warn!("No chart data for {}: {}", ticker, e);
            Vec::new()
        }
    };

    Ok(Json(MarketChart {
        candlestick: charts::candlestick(&ticker, days, &bars),
        volume: charts::volume(&ticker, days, &bars),
        ticker,
        days,
    }))
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MarketInfo {
    pub ticker: String,
    pub info: Option<StockInfo>,
    pub tiles: Vec<MetricTile>,
}

pub async fn market_info(
    State(state): State<AppState>,
    Path(ticker): Path<String>,
) -> ApiResult<Json<MarketInfo>> {
    let ticker = normalise_ticker(&ticker)?;
    let info = state.market.fetch_stock_info(&ticker).await;
    let tiles = info.as_ref().map(metric_tiles).unwrap_or_default();
    Ok(Json(MarketInfo { ticker, info, tiles }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::{DateTime, NaiveDate};
    use desk_core::{AnalystSelection, FrameworkFactory, FrameworkOutput, TradingFramework};
    use desk_market::{MarketConfig, MarketData, MarketDataSource, MarketError, PriceBar};
    use desk_session::{AnalysisInvoker, Stage};
    use desk_utils::CredentialStatus;
    use std::sync::Arc;

    struct StaticFactory(Availability);

    impl FrameworkFactory for StaticFactory {
        fn availability(&self) -> Availability {
            self.0.clone()
        }

        fn create(
            &self,
            _analysts: &AnalystSelection,
            _debug: bool,
            _config: &AnalysisConfig,
        ) -> desk_core::Result<Box<dyn TradingFramework>> {
            Ok(Box::new(StaticEngine))
        }
    }

    struct StaticEngine;

    #[async_trait]
    impl TradingFramework for StaticEngine {
        async fn propagate(
            &self,
            _ticker: &str,
            _trade_date: NaiveDate,
        ) -> desk_core::Result<FrameworkOutput> {
            Ok(FrameworkOutput::new(
                json!({"market_report": "Uptrend", "risk_assessment": "Moderate"}),
                json!("BUY"),
            ))
        }
    }

    struct OfflineMarket;

    #[async_trait]
    impl MarketDataSource for OfflineMarket {
        async fn price_history(
            &self,
            _symbol: &str,
            _start: DateTime<Utc>,
            _end: DateTime<Utc>,
        ) -> desk_market::Result<Vec<PriceBar>> {
            Ok(Vec::new())
        }

        async fn stock_info(&self, _symbol: &str) -> desk_market::Result<StockInfo> {
            Err(MarketError::ConfigError("ALPHA_VANTAGE_API_KEY not set".to_string()))
        }
    }

    fn app(availability: Availability) -> AppState {
        let invoker = AnalysisInvoker::new(Arc::new(StaticFactory(availability)));
        let market = MarketData::new(Arc::new(OfflineMarket), &MarketConfig::default());
        AppState::new(invoker, market)
            .unwrap()
            .with_credentials(CredentialStatus {
                llm_key_set: true,
                market_data_key_set: false,
            })
    }

    fn form(ticker: &str) -> AnalysisForm {
        AnalysisForm {
            ticker: ticker.to_string(),
            trade_date: "2024-11-15".to_string(),
            analysts: Some(vec!["market".to_string(), "news".to_string()]),
        }
    }

    async fn new_session(state: &AppState) -> String {
        let (status, Json(created)) = create_session(State(state.clone())).await;
        assert_eq!(status, StatusCode::CREATED);
        created.id
    }

    async fn wait_until_idle(state: &AppState, id: &str) -> StatusSnapshot {
        for _ in 0..100 {
            let Json(snapshot) = status(State(state.clone()), Path(id.to_string()))
                .await
                .unwrap();
            if !snapshot.running {
                return snapshot;
            }
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        }
        panic!("analysis did not finish");
    }

    fn status_of(err: ApiError) -> StatusCode {
        err.status()
    }

    #[tokio::test]
    async fn test_submit_and_render() {
        let state = app(Availability::Available);
        let id = new_session(&state).await;

        let (code, _) = submit_analysis(State(state.clone()), Path(id.clone()), Json(form("nvda")))
            .await
            .unwrap();
        assert_eq!(code, StatusCode::ACCEPTED);

        let snapshot = wait_until_idle(&state, &id).await;
        assert_eq!(snapshot.progress.stage, Stage::Completed);
        assert_eq!(snapshot.history_len, 1);

        let Json(view) = current(State(state.clone()), Path(id.clone())).await.unwrap();
        let view = view.unwrap();
        assert_eq!(view.ticker, "NVDA");
        assert_eq!(view.decision.unwrap().color, "green");
        assert_eq!(view.metrics.analysts_used, 2);

        let Json(rows) = history(State(state.clone()), Path(id.clone())).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].analysts, "market, news");

        let Json(charts) = decision_chart(State(state.clone()), Path(id.clone())).await.unwrap();
        assert_eq!(charts.counts.positive, 1);
    }

    #[tokio::test]
    async fn test_submit_rejections() {
        let state = app(Availability::Available);
        let id = new_session(&state).await;

        let err = submit_analysis(State(state.clone()), Path(id.clone()), Json(form("  ")))
            .await
            .unwrap_err();
        assert_eq!(status_of(err), StatusCode::UNPROCESSABLE_ENTITY);

        let err = submit_analysis(State(state.clone()), Path("missing".to_string()), Json(form("NVDA")))
            .await
            .unwrap_err();
        assert_eq!(status_of(err), StatusCode::NOT_FOUND);

        let unavailable = app(Availability::Unavailable("not installed".to_string()));
        let id = new_session(&unavailable).await;
        let err = submit_analysis(State(unavailable.clone()), Path(id), Json(form("NVDA")))
            .await
            .unwrap_err();
        assert_eq!(status_of(err), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn test_config_endpoints() {
        let state = app(Availability::Available);
        let id = new_session(&state).await;

        let patch = ConfigPatch {
            deep_think_llm: Some("o1-mini".to_string()),
            ..ConfigPatch::default()
        };
        let Json(config) = patch_config(State(state.clone()), Path(id.clone()), Json(patch))
            .await
            .unwrap();
        assert_eq!(config.deep_think_llm, "o1-mini");

        let Json(config) = get_config(State(state.clone()), Path(id.clone())).await.unwrap();
        assert_eq!(config.deep_think_llm, "o1-mini");

        let bad = ConfigPatch {
            max_risk_discuss_rounds: Some(0),
            ..ConfigPatch::default()
        };
        let err = patch_config(State(state.clone()), Path(id.clone()), Json(bad))
            .await
            .unwrap_err();
        assert_eq!(status_of(err), StatusCode::UNPROCESSABLE_ENTITY);

        let Json(summary) = config_summary(State(state.clone()), Path(id)).await.unwrap();
        assert!(summary.rows().any(|row| row == ("LLM Settings", "Deep Think Model", "o1-mini")));
    }

    #[tokio::test]
    async fn test_export_and_selection() {
        let state = app(Availability::Available);
        let id = new_session(&state).await;

        let err = export(State(state.clone()), Path(id.clone())).await.unwrap_err();
        assert_eq!(status_of(err), StatusCode::NOT_FOUND);

        submit_analysis(State(state.clone()), Path(id.clone()), Json(form("AAPL")))
            .await
            .unwrap();
        wait_until_idle(&state, &id).await;

        let response = export(State(state.clone()), Path(id.clone())).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let disposition = response.headers()[header::CONTENT_DISPOSITION].to_str().unwrap();
        assert_eq!(disposition, "attachment; filename=\"AAPL_2024-11-15_analysis.json\"");

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let document = desk_session::parse_export(std::str::from_utf8(&bytes).unwrap()).unwrap();
        assert_eq!(document.final_state.len(), 1);
        assert_eq!(document.final_state["market_report"], "Uptrend");

        let Json(view) = select_current(
            State(state.clone()),
            Path(id.clone()),
            Json(SelectHistory { index: 0 }),
        )
        .await
        .unwrap();
        assert_eq!(view.ticker, "AAPL");

        let err = select_current(State(state.clone()), Path(id), Json(SelectHistory { index: 3 }))
            .await
            .unwrap_err();
        assert_eq!(status_of(err), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn test_market_endpoints_degrade() {
        let state = app(Availability::Available);

        let Json(chart) = market_chart(
            State(state.clone()),
            Path("msft".to_string()),
            Query(ChartQuery { days: Some(9999) }),
        )
        .await
        .unwrap();
        assert_eq!(chart.ticker, "MSFT");
        assert_eq!(chart.days, MAX_CHART_DAYS);
        assert!(chart.candlestick.is_none());
        assert!(chart.volume.is_none());

        let Json(info) = market_info(State(state.clone()), Path("msft".to_string()))
            .await
            .unwrap();
        assert!(info.info.is_none());
        assert!(info.tiles.is_empty());
    }

    #[tokio::test]
    async fn test_pages() {
        let state = app(Availability::Available);

        let response = dashboard(State(state.clone()), Path("expired".to_string()))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);

        let id = new_session(&state).await;
        let response = dashboard(State(state.clone()), Path(id.clone())).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = index(State(state.clone())).await.into_response();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(state.sessions.len(), 2);

        let Json(body) = health(State(state)).await;
        assert_eq!(body["status"], "alive");
        assert_eq!(body["framework"]["state"], "available");
    }
}
