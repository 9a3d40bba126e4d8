use anyhow::{Context, Result};
use axum::{
    extract::State,
    response::Html,
    routing::get,
    Json, Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::dashboard::chart::ChartFigure;

/// Figures are computed once at startup and shared read-only with handlers.
#[derive(Clone)]
pub struct DashboardState {
    charts: Arc<Vec<ChartFigure>>,
}

impl DashboardState {
    pub fn new(charts: Vec<ChartFigure>) -> Self {
        Self {
            charts: Arc::new(charts),
        }
    }
}

async fn index_page() -> Html<&'static str> {
    Html(include_str!("index.html"))
}

async fn get_charts(State(state): State<DashboardState>) -> Json<Vec<ChartFigure>> {
    Json(state.charts.as_ref().clone())
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "alive",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

pub fn router(state: DashboardState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(index_page))
        .route("/api/charts", get(get_charts))
        .route("/health", get(health))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Serve the dashboard until the process is stopped.
pub async fn serve(state: DashboardState, addr: SocketAddr) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;

    tracing::info!("Dashboard listening on http://{}", addr);

    axum::serve(listener, router(state))
        .await
        .context("dashboard server exited")?;

    Ok(())
}
