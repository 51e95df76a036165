use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::HeaderMap;
use axum::response::{Html, IntoResponse};
use axum::routing::get;
use axum::Router;
use plot_viewer::PlotMapPage;
use uuid::Uuid;

use crate::routes::{is_htmx, wrap_page};
use crate::templates;
use crate::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/layouts/{id}", get(layout_page))
}

/// Open a new view on layout `id`. The page comes back at once in its loading
/// state and fetches the layout through `/views/{view}/load`.
async fn layout_page(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> impl IntoResponse {
    let mut page = PlotMapPage::new();
    page.begin_load(&id);

    let view = Uuid::new_v4();
    let fragment = templates::viewer(view, &page, None);
    state.register_view(view, page).await;

    if is_htmx(&headers) {
        Html(fragment)
    } else {
        Html(wrap_page(&format!("Layout {id}"), &fragment))
    }
}
