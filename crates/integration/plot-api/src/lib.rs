//! # plotmap API integration
//!
//! Two outbound concerns live here:
//!
//! - [`ListingClient`]: the listing platform's REST API (`GET /layouts/{id}`,
//!   `POST /enquiries`), behind the [`LayoutSource`] and [`EnquirySink`] traits
//! - [`SvgRelay`]: same-origin relay for externally hosted plot-map SVGs,
//!   behind the [`SvgSource`] trait
//!
//! The traits are the seams the viewer runtime depends on.

pub mod client;
pub mod relay;

pub use client::{EnquiryReceipt, ListingClient};
pub use relay::{RelayError, RelayedSvg, SvgRelay, SVG_CONTENT_TYPE};

use async_trait::async_trait;
use plot_core::{EnquiryRequest, Layout};

/// Result type for listing API calls
pub type Result<T> = std::result::Result<T, ApiError>;

/// Errors from the listing API
#[derive(Debug, Clone, thiserror::Error)]
pub enum ApiError {
    #[error("Invalid API base URL: {0}")]
    InvalidBase(String),

    #[error("API request failed: {0}")]
    Transport(String),

    #[error("API returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Unexpected API response: {0}")]
    Decode(String),
}

/// Read access to layout records
#[async_trait]
pub trait LayoutSource: Send + Sync {
    async fn fetch_layout(&self, id: &str) -> Result<Layout>;
}

/// Enquiry submission
#[async_trait]
pub trait EnquirySink: Send + Sync {
    async fn submit_enquiry(&self, request: &EnquiryRequest) -> Result<EnquiryReceipt>;
}

/// Fetches plot-map SVG text from an external origin
#[async_trait]
pub trait SvgSource: Send + Sync {
    async fn fetch_svg(&self, url: &str) -> std::result::Result<String, RelayError>;
}
