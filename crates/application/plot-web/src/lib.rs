//! # plotmap web server
//!
//! Server-driven plot-map viewer using HTMX + inline SVG.
//!
//! - `/api/proxy-svg` relays externally hosted plot maps from our own origin
//! - `/layouts/{id}` opens a view of one layout in its loading state; the page
//!   then posts to `/views/{view}/load`, and every later interaction posts to
//!   `/views/{view}/...` and gets the re-rendered viewer fragment back
//! - views nobody touches for `view_idle_secs` are swept away
//! - `/api/views/{view}` exposes the same view state as JSON

pub mod routes;
pub mod state;
pub mod templates;

use axum::Router;
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub use state::{AppState, View};

/// Create the main router with all routes
pub fn create_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .merge(routes::relay::router())
        .merge(routes::health::router())
        .merge(routes::layouts::router())
        .merge(routes::views::router())
        .merge(routes::assets::router())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// How often idle views are looked for
pub const IDLE_SWEEP_EVERY: Duration = Duration::from_secs(60);

/// Start the web server
pub async fn serve(state: Arc<AppState>, addr: &str) -> Result<(), Box<dyn std::error::Error>> {
    let sweep = state.spawn_idle_sweep(IDLE_SWEEP_EVERY);
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("plotmap listening on http://{}", listener.local_addr()?);

    let served = axum::serve(listener, app).await;
    sweep.abort();
    served?;
    Ok(())
}
