//! # plotmap SVG annotator
//!
//! Turns a plot-map drawing exported from a vector editor into markup that can
//! be embedded inline and driven by a single delegated click handler.
//!
//! A group is a plot when **both** its `id` looks like `g<digits>` and its
//! `inkscape:label` looks like `plot <digits>`. Qualifying groups get the
//! [`PLOT_CLASS`] class and a [`LABEL_ATTR`] attribute holding the normalized
//! label. The root `<svg>` is rescaled to fill its container width.
//!
//! ```ignore
//! let annotated = plot_svg::annotate(&raw_svg)?;
//! let html = annotated.render(Some(&PlotKey::new("plot 7")));
//! ```

pub mod annotate;
pub mod matcher;

pub use annotate::{annotate, plot_groups, AnnotatedSvg};
pub use matcher::{is_plot_group, PlotGroupAnnotation};

/// Class added to every qualifying plot group
pub const PLOT_CLASS: &str = "plot-group";

/// Class carried by the group of the currently selected slot
pub const SELECTED_CLASS: &str = "selected";

/// Attribute holding the normalized plot label
pub const LABEL_ATTR: &str = "data-plot-label";

/// Label attribute written by Inkscape
pub const INKSCAPE_LABEL: &str = "inkscape:label";

/// Result type for annotation
pub type Result<T> = std::result::Result<T, Error>;

/// Errors from annotation. Every variant means "fall back to the raster image".
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("SVG parse error: {0}")]
    Parse(String),

    #[error("No root <svg> element")]
    MissingRoot,

    #[error("SVG write error: {0}")]
    Write(String),
}
