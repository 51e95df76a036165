//! Viewer interactions. Each POST mutates one view and answers with the
//! re-rendered `#plot-viewer` fragment.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Json, Response};
use axum::routing::{delete, get, post};
use axum::{Form, Router};
use plot_viewer::{PlotMapPage, PresentationMode};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::templates;
use crate::{AppState, View};

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/views/{view}", delete(close_view))
        .route("/views/{view}/load", post(load))
        .route("/views/{view}/layout/{id}", post(retarget))
        .route("/views/{view}/plot", post(click_plot))
        .route("/views/{view}/slots/{slot}", post(click_slot))
        .route("/views/{view}/zoom/{action}", post(zoom))
        .route("/views/{view}/fullscreen", post(toggle_fullscreen))
        .route("/views/{view}/fullscreen/exit", post(exit_fullscreen))
        .route("/views/{view}/mode/{mode}", post(set_mode))
        .route("/views/{view}/enquiry", post(enquiry))
        .route("/views/{view}/dialog/dismiss", post(dismiss_dialog))
        .route("/api/views/{view}", get(api_view))
}

#[derive(Deserialize)]
struct PlotClick {
    label: String,
}

#[derive(Deserialize)]
struct EnquiryForm {
    #[serde(default)]
    message: String,
}

fn view_not_found(view: Uuid) -> Response {
    (
        StatusCode::NOT_FOUND,
        Html(format!(r#"<p class="error">View {view} not found</p>"#)),
    )
        .into_response()
}

async fn lookup(state: &AppState, view: Uuid) -> Result<View, Response> {
    state.view(view).await.ok_or_else(|| view_not_found(view))
}

fn fragment(view: Uuid, page: &PlotMapPage, notice: Option<&str>) -> Response {
    Html(templates::viewer(view, page, notice)).into_response()
}

/// Apply a synchronous transition; `f` returns a notice for rejected ones.
async fn transition<F>(state: &AppState, view: Uuid, f: F) -> Response
where
    F: FnOnce(&mut PlotMapPage) -> Option<String>,
{
    let handle = match lookup(state, view).await {
        Ok(handle) => handle,
        Err(resp) => return resp,
    };
    let mut page = handle.lock().await;
    let notice = f(&mut page);
    fragment(view, &page, notice.as_deref())
}

/// Run the fetch a loading viewer asks for. Last request wins.
async fn load(State(state): State<Arc<AppState>>, Path(view): Path<Uuid>) -> Response {
    let handle = match lookup(&state, view).await {
        Ok(handle) => handle,
        Err(resp) => return resp,
    };
    let ticket = handle.lock().await.pending_load();
    if let Some(ticket) = ticket {
        let result = PlotMapPage::fetch(ticket, state.layouts.as_ref(), state.svgs.as_ref()).await;
        handle.lock().await.apply(result);
    }
    let page = handle.lock().await;
    fragment(view, &page, None)
}

/// Point an existing view at another layout. Answers with the loading
/// viewer, which then triggers [`load`].
async fn retarget(
    State(state): State<Arc<AppState>>,
    Path((view, layout_id)): Path<(Uuid, String)>,
) -> Response {
    transition(&state, view, |page| {
        page.begin_load(&layout_id);
        None
    })
    .await
}

async fn click_plot(
    State(state): State<Arc<AppState>>,
    Path(view): Path<Uuid>,
    Form(click): Form<PlotClick>,
) -> Response {
    // An unmatched label leaves the selection alone without a notice
    transition(&state, view, |page| page.click_plot(&click.label).err().map(|e| e.to_string())).await
}

async fn click_slot(
    State(state): State<Arc<AppState>>,
    Path((view, slot)): Path<(Uuid, String)>,
) -> Response {
    transition(&state, view, |page| {
        page.click_grid_cell(&slot).err().map(|e| e.to_string())
    })
    .await
}

async fn zoom(
    State(state): State<Arc<AppState>>,
    Path((view, action)): Path<(Uuid, String)>,
) -> Response {
    let step: fn(&mut PlotMapPage) = match action.as_str() {
        "in" => PlotMapPage::zoom_in,
        "out" => PlotMapPage::zoom_out,
        "reset" => PlotMapPage::reset_zoom,
        other => {
            return (StatusCode::NOT_FOUND, format!("unknown zoom action: {other}")).into_response()
        }
    };
    transition(&state, view, |page| {
        step(page);
        None
    })
    .await
}

async fn toggle_fullscreen(State(state): State<Arc<AppState>>, Path(view): Path<Uuid>) -> Response {
    transition(&state, view, |page| page.toggle_fullscreen().err().map(|e| e.to_string())).await
}

async fn exit_fullscreen(State(state): State<Arc<AppState>>, Path(view): Path<Uuid>) -> Response {
    transition(&state, view, |page| {
        page.exit_fullscreen();
        None
    })
    .await
}

async fn set_mode(
    State(state): State<Arc<AppState>>,
    Path((view, mode)): Path<(Uuid, String)>,
) -> Response {
    let mode: PresentationMode = match mode.parse() {
        Ok(mode) => mode,
        Err(e) => return (StatusCode::BAD_REQUEST, e).into_response(),
    };
    transition(&state, view, |page| {
        page.set_mode(mode);
        None
    })
    .await
}

/// Submit an enquiry for the selected slot; the outcome shows up as a dialog
async fn enquiry(
    State(state): State<Arc<AppState>>,
    Path(view): Path<Uuid>,
    Form(form): Form<EnquiryForm>,
) -> Response {
    let handle = match lookup(&state, view).await {
        Ok(handle) => handle,
        Err(resp) => return resp,
    };
    let request = handle.lock().await.enquiry_request(&form.message);
    let request = match request {
        Ok(request) => request,
        Err(e) => {
            let page = handle.lock().await;
            return fragment(view, &page, Some(&e.to_string()));
        }
    };

    let result = state.enquiries.submit_enquiry(&request).await;

    let mut page = handle.lock().await;
    if let Ok(receipt) = page.record_enquiry(result) {
        tracing::info!(view = %view, slot = %request.slot_id, receipt = ?receipt.id, "enquiry accepted");
    }
    fragment(view, &page, None)
}

async fn dismiss_dialog(State(state): State<Arc<AppState>>, Path(view): Path<Uuid>) -> Response {
    transition(&state, view, |page| {
        page.dismiss_dialog();
        None
    })
    .await
}

async fn api_view(State(state): State<Arc<AppState>>, Path(view): Path<Uuid>) -> Response {
    match state.view(view).await {
        Some(handle) => Json(handle.lock().await.snapshot()).into_response(),
        None => (
            StatusCode::NOT_FOUND,
            Json(json!({ "error": format!("view {view} not found") })),
        )
            .into_response(),
    }
}

/// Navigation away: late layout responses for this view are dropped
async fn close_view(State(state): State<Arc<AppState>>, Path(view): Path<Uuid>) -> Response {
    match state.close_view(view).await {
        Some(handle) => {
            handle.lock().await.leave();
            StatusCode::NO_CONTENT.into_response()
        }
        None => view_not_found(view),
    }
}
