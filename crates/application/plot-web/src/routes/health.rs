use std::sync::Arc;

use axum::extract::State;
use axum::response::{IntoResponse, Json};
use axum::routing::get;
use axum::Router;
use serde_json::json;

use crate::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/api/health", get(api_health))
}

async fn api_health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(json!({
        "status": "healthy",
        "service": "plot-web",
        "version": env!("CARGO_PKG_VERSION"),
        "views": state.view_count().await,
        "started_at": state.started_at.to_rfc3339(),
        "uptime_secs": state.uptime_secs(),
    }))
}
