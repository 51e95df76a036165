//! # plotmap core
//!
//! Domain types shared by every plotmap crate:
//!
//! - **Layout**: a subdivided land parcel with its plot-map SVG and raster image
//! - **Slot**: one sellable plot inside a layout, owned by the listing API
//! - **Enquiry**: the payload sent when a visitor asks about a slot
//! - **Label keys**: the normalized join key between SVG groups and slots

pub mod enquiry;
pub mod label;
pub mod layout;
pub mod slot;

pub use enquiry::{EnquiryKind, EnquiryRequest};
pub use label::{normalize_label, PlotKey};
pub use layout::Layout;
pub use slot::{Slot, SlotStatus};

/// Result type for core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors from core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Unknown slot: {0}")]
    UnknownSlot(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
