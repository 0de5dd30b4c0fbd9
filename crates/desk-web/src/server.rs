//! Router assembly and the listening loop

use crate::handlers;
use crate::state::AppState;
use axum::Router;
use axum::routing::{get, post};
use desk_utils::ServerConfig;
use std::io;
use std::time::Duration;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

/// How often idle sessions are evicted
const SESSION_SWEEP_INTERVAL: Duration = Duration::from_secs(300);

/// Every route of the dashboard and its API
pub fn router(state: AppState) -> Router {
    let sessions = Router::new()
        .route("/", post(handlers::create_session))
        .route(
            "/:id/config",
            get(handlers::get_config).patch(handlers::patch_config),
        )
        .route("/:id/config/summary", get(handlers::config_summary))
        .route("/:id/analyses", post(handlers::submit_analysis))
        .route("/:id/status", get(handlers::status))
        .route(
            "/:id/current",
            get(handlers::current).put(handlers::select_current),
        )
        .route("/:id/history", get(handlers::history))
        .route("/:id/export", get(handlers::export))
        .route("/:id/charts/decisions", get(handlers::decision_chart));

    let market = Router::new()
        .route("/:ticker/chart", get(handlers::market_chart))
        .route("/:ticker/info", get(handlers::market_info));

    Router::new()
        .route("/", get(handlers::index))
        .route("/s/:id", get(handlers::dashboard))
        .route("/health", get(handlers::health))
        .nest("/api/sessions", sessions)
        .nest("/api/market", market)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Bind and serve until the process is stopped
pub async fn serve(config: &ServerConfig, state: AppState) -> io::Result<()> {
    let addr = config
        .socket_addr()
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;

    let reaper = state.sessions.spawn_reaper(SESSION_SWEEP_INTERVAL);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("{} listening on {}", config.app_name, config.url());

    let result = axum::serve(listener, router(state)).await;
    reaper.abort();
    result
}
