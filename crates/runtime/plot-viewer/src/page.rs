//! One plot-map page instance

use plot_api::{ApiError, EnquiryReceipt, EnquirySink, LayoutSource, SvgSource};
use plot_core::{EnquiryRequest, Layout, PlotKey, Slot};
use serde::Serialize;

use crate::loader::{LoadGuard, LoadTicket};
use crate::state::{ClickOutcome, Dialog, PresentationMode, ViewState};
use crate::surface::{MapSurface, SurfaceKind};
use crate::{Error, Result};

/// A finished fetch, not yet applied
#[derive(Debug)]
pub struct LoadResult {
    ticket: LoadTicket,
    outcome: std::result::Result<(Layout, MapSurface), ApiError>,
}

impl LoadResult {
    pub fn layout_id(&self) -> &str {
        self.ticket.layout_id()
    }
}

/// Layout data, map surface and view state of a single page
#[derive(Debug, Default)]
pub struct PlotMapPage {
    guard: LoadGuard,
    layout: Option<Layout>,
    surface: MapSurface,
    state: ViewState,
    load_error: Option<String>,
}

/// Serializable summary of a page
#[derive(Debug, Clone, Serialize)]
pub struct ViewSnapshot {
    pub layout_id: Option<String>,
    pub title: Option<String>,
    pub surface: SurfaceKind,
    pub plots: usize,
    pub slots: usize,
    pub zoom: f64,
    pub mode: PresentationMode,
    pub fullscreen: bool,
    pub selected_slot: Option<String>,
    pub selected_key: Option<PlotKey>,
    pub dialog: Option<Dialog>,
    pub load_error: Option<String>,
}

impl PlotMapPage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn layout(&self) -> Option<&Layout> {
        self.layout.as_ref()
    }

    pub fn surface(&self) -> &MapSurface {
        &self.surface
    }

    pub fn state(&self) -> &ViewState {
        &self.state
    }

    pub fn load_error(&self) -> Option<&str> {
        self.load_error.as_deref()
    }

    /// Target `layout_id`. View state resets when the layout actually changes.
    pub fn begin_load(&mut self, layout_id: &str) -> LoadTicket {
        let changed = self.layout.as_ref().map(|l| l.id.as_str()) != Some(layout_id);
        if changed {
            self.layout = None;
            self.state = ViewState::default();
        }
        self.surface = MapSurface::Loading;
        self.load_error = None;
        self.guard.begin(layout_id)
    }

    /// Fetch the layout and its plot map. Never fails: SVG problems degrade to the raster image.
    pub async fn fetch(
        ticket: LoadTicket,
        layouts: &dyn LayoutSource,
        svgs: &dyn SvgSource,
    ) -> LoadResult {
        let outcome = match layouts.fetch_layout(ticket.layout_id()).await {
            Ok(layout) => {
                let surface = build_surface(&layout, svgs).await;
                Ok((layout, surface))
            }
            Err(e) => Err(e),
        };
        LoadResult { ticket, outcome }
    }

    /// Apply a finished fetch unless the page has moved on. Returns whether it was applied.
    pub fn apply(&mut self, result: LoadResult) -> bool {
        if !self.guard.is_current(&result.ticket) {
            tracing::debug!(
                stale = result.ticket.layout_id(),
                wanted = ?self.guard.wanted(),
                "discarding stale layout response"
            );
            return false;
        }
        match result.outcome {
            Ok((layout, surface)) => {
                tracing::info!(
                    layout = %layout.id,
                    plots = surface.plot_count(),
                    interactive = surface.is_interactive(),
                    "layout loaded"
                );
                self.layout = Some(layout);
                self.surface = surface;
                self.load_error = None;
            }
            Err(e) => {
                tracing::warn!(layout = result.ticket.layout_id(), error = %e, "layout fetch failed");
                self.layout = None;
                self.surface = MapSurface::Raster(None);
                self.load_error = Some(e.to_string());
            }
        }
        true
    }

    pub async fn load(
        &mut self,
        layout_id: &str,
        layouts: &dyn LayoutSource,
        svgs: &dyn SvgSource,
    ) -> bool {
        let ticket = self.begin_load(layout_id);
        let result = Self::fetch(ticket, layouts, svgs).await;
        self.apply(result)
    }

    /// The load this page is still waiting on, if its surface shows `Loading`
    pub fn pending_load(&self) -> Option<LoadTicket> {
        match self.surface {
            MapSurface::Loading => self.guard.current(),
            _ => None,
        }
    }

    /// Navigation away; late responses are ignored from now on
    pub fn leave(&mut self) {
        self.guard.cancel();
    }

    fn loaded(&self) -> Result<&Layout> {
        self.layout.as_ref().ok_or(Error::NotLoaded)
    }

    pub fn selected_slot(&self) -> Option<&Slot> {
        self.layout.as_ref().and_then(|l| self.state.selected_slot(l))
    }

    pub fn click_plot(&mut self, label: &str) -> Result<ClickOutcome> {
        let layout = self.layout.as_ref().ok_or(Error::NotLoaded)?;
        self.state.click_plot(layout, label)
    }

    pub fn click_grid_cell(&mut self, slot_id: &str) -> Result<()> {
        let layout = self.layout.as_ref().ok_or(Error::NotLoaded)?;
        self.state.click_grid_cell(layout, slot_id)
    }

    pub fn toggle_fullscreen(&mut self) -> Result<()> {
        self.state.toggle_fullscreen()
    }

    pub fn exit_fullscreen(&mut self) {
        self.state.exit_fullscreen();
    }

    pub fn set_mode(&mut self, mode: PresentationMode) {
        self.state.set_mode(mode);
    }

    pub fn zoom_in(&mut self) {
        self.state.zoom_in();
    }

    pub fn zoom_out(&mut self) {
        self.state.zoom_out();
    }

    pub fn reset_zoom(&mut self) {
        self.state.reset_zoom();
    }

    pub fn dismiss_dialog(&mut self) {
        self.state.dismiss_dialog();
    }

    /// Map markup with the selected plot marked, if the map is interactive
    pub fn render_map(&self) -> Option<String> {
        match &self.surface {
            MapSurface::Interactive(svg) => {
                let key = self.layout.as_ref().and_then(|l| self.state.selected_key(l));
                Some(svg.render(key.as_ref()))
            }
            _ => None,
        }
    }

    /// Enquiry payload for the selected slot
    pub fn enquiry_request(&self, message: &str) -> Result<EnquiryRequest> {
        let layout = self.loaded()?;
        let slot = self.state.selected_slot(layout).ok_or(Error::NoSelection)?;
        Ok(EnquiryRequest::for_slot(&layout.id, &slot.id, message))
    }

    /// Raise the dialog for a submission outcome. Selection is left alone either way.
    pub fn record_enquiry(
        &mut self,
        result: std::result::Result<EnquiryReceipt, ApiError>,
    ) -> Result<EnquiryReceipt> {
        match result {
            Ok(receipt) => {
                let slot = self.state.selected.clone().unwrap_or_default();
                self.state.dialog = Some(Dialog::Confirmation(format!(
                    "Thanks! We received your enquiry for {}.",
                    self.selected_slot().map(|s| s.section_title.as_str()).unwrap_or(&slot)
                )));
                Ok(receipt)
            }
            Err(e) => {
                tracing::warn!(error = %e, "enquiry submission failed");
                self.state.dialog = Some(Dialog::Alert(format!(
                    "Could not send your enquiry: {e}"
                )));
                Err(Error::Enquiry(e))
            }
        }
    }

    pub async fn submit_enquiry(
        &mut self,
        sink: &dyn EnquirySink,
        message: &str,
    ) -> Result<EnquiryReceipt> {
        let request = self.enquiry_request(message)?;
        let result = sink.submit_enquiry(&request).await;
        self.record_enquiry(result)
    }

    pub fn snapshot(&self) -> ViewSnapshot {
        ViewSnapshot {
            layout_id: self.layout.as_ref().map(|l| l.id.clone()),
            title: self.layout.as_ref().and_then(|l| l.title.clone()),
            surface: self.surface.kind(),
            plots: self.surface.plot_count(),
            slots: self.layout.as_ref().map_or(0, |l| l.slots.len()),
            zoom: self.state.zoom.level(),
            mode: self.state.mode(),
            fullscreen: self.state.is_fullscreen(),
            selected_slot: self.state.selected.clone(),
            selected_key: self.layout.as_ref().and_then(|l| self.state.selected_key(l)),
            dialog: self.state.dialog.clone(),
            load_error: self.load_error.clone(),
        }
    }
}

async fn build_surface(layout: &Layout, svgs: &dyn SvgSource) -> MapSurface {
    let raster = layout.image_url.clone();
    let Some(url) = layout
        .layout_image_url
        .as_deref()
        .filter(|u| !u.trim().is_empty())
    else {
        return MapSurface::Raster(raster);
    };

    let text = match svgs.fetch_svg(url).await {
        Ok(text) => text,
        Err(e) => {
            tracing::warn!(%url, error = %e, "plot map fetch failed, using raster image");
            return MapSurface::Raster(raster);
        }
    };
    match plot_svg::annotate(&text) {
        Ok(svg) => MapSurface::Interactive(svg),
        Err(e) => {
            tracing::warn!(%url, error = %e, "plot map unusable, using raster image");
            MapSurface::Raster(raster)
        }
    }
}
