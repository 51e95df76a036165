use std::sync::Arc;

use axum::http::header;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Router;

use crate::templates;
use crate::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/static/plotmap.css", get(style_css))
        .route("/static/plotmap.js", get(viewer_js))
}

async fn style_css() -> impl IntoResponse {
    ([(header::CONTENT_TYPE, "text/css")], templates::STYLE_CSS)
}

async fn viewer_js() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "application/javascript")],
        templates::viewer_js(),
    )
}
