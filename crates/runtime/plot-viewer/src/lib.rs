//! # plotmap viewer runtime
//!
//! Everything a plot-map page knows lives in one [`PlotMapPage`]:
//!
//! - **ViewState**: selection, zoom and presentation as one value, so
//!   impossible combinations (fullscreen grid) cannot be represented
//! - **MapSurface**: the interactive SVG, or the raster fallback
//! - **LoadGuard**: last-request-wins loading keyed by layout id
//!
//! The "selected" look of a plot is computed from the state at render time.

pub mod loader;
pub mod page;
pub mod state;
pub mod surface;
pub mod viewport;

pub use loader::{LoadGuard, LoadTicket};
pub use page::{LoadResult, PlotMapPage, ViewSnapshot};
pub use state::{ClickOutcome, Dialog, Fullscreen, Presentation, PresentationMode, ViewState};
pub use surface::{MapSurface, SurfaceKind};
pub use viewport::Zoom;

/// Result type for view transitions
pub type Result<T> = std::result::Result<T, Error>;

/// Rejected transitions and collaborator failures
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("No slot selected")]
    NoSelection,

    #[error("Slot {0} is not available")]
    SlotUnavailable(String),

    #[error("Only possible in map view")]
    MapOnly,

    #[error("Only possible in grid view")]
    GridOnly,

    #[error("Layout not loaded")]
    NotLoaded,

    #[error(transparent)]
    Core(#[from] plot_core::Error),

    #[error("Enquiry failed: {0}")]
    Enquiry(#[from] plot_api::ApiError),
}
