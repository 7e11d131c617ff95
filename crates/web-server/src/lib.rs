use analytics::AnalyticsEngine;
use axum::{routing::get, Router};
use core_types::PanelLimits;
use dataset::OrderTable;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

pub mod error;
pub mod handlers;

/// The shared application state that all handlers can access.
///
/// The order table is immutable and shared between requests; every request runs the
/// stateless engine over it again.
#[derive(Clone)]
pub struct AppState {
    pub table: OrderTable,
    pub engine: AnalyticsEngine,
    pub limits: PanelLimits,
}

impl AppState {
    pub fn new(table: OrderTable, limits: PanelLimits) -> Self {
        Self {
            table,
            engine: AnalyticsEngine::new(),
            limits,
        }
    }
}

/// Builds the API routes over the given state.
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/health", get(|| async { "OK" }))
        .route("/api/date-range", get(handlers::get_date_range))
        .route("/api/dashboard", get(handlers::get_dashboard))
        .route("/api/panels/:panel", get(handlers::get_panel))
        .route("/api/rfm/top", get(handlers::get_rfm_top))
        .with_state(Arc::new(state))
        .layer(cors)
        // This middleware will automatically log information about every incoming request.
        .layer(TraceLayer::new_for_http())
}

/// The main function to configure and run the web server.
///
/// Tracing is expected to be initialized by the caller.
pub async fn run_server(addr: SocketAddr, state: AppState) -> anyhow::Result<()> {
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Web server listening on http://{}", addr);
    axum::serve(listener, app).await?;

    Ok(())
}
