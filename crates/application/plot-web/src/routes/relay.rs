use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Json, Response};
use axum::routing::get;
use axum::Router;
use plot_api::SVG_CONTENT_TYPE;
use serde::Deserialize;
use serde_json::json;

use crate::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/api/proxy-svg", get(proxy_svg))
}

#[derive(Deserialize)]
struct RelayQuery {
    url: Option<String>,
}

/// Same-origin copy of an external SVG, with a long public cache lifetime
async fn proxy_svg(State(state): State<Arc<AppState>>, Query(q): Query<RelayQuery>) -> Response {
    match state.relay.fetch(q.url.as_deref()).await {
        Ok(svg) => (
            [
                (header::CONTENT_TYPE, SVG_CONTENT_TYPE.to_string()),
                (header::CACHE_CONTROL, state.config.relay_cache_control()),
            ],
            svg.body,
        )
            .into_response(),
        Err(e) => {
            let status =
                StatusCode::from_u16(e.status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
            (status, Json(json!({ "error": e.to_string() }))).into_response()
        }
    }
}
