//! What the map area shows

use plot_svg::AnnotatedSvg;
use serde::Serialize;

#[derive(Debug, Clone, Default, PartialEq)]
pub enum MapSurface {
    /// Fetch in flight
    #[default]
    Loading,
    /// Annotated SVG, clickable
    Interactive(AnnotatedSvg),
    /// Static image fallback; `None` when the layout has no image either
    Raster(Option<String>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SurfaceKind {
    Loading,
    Interactive,
    Raster,
}

impl MapSurface {
    pub fn kind(&self) -> SurfaceKind {
        match self {
            MapSurface::Loading => SurfaceKind::Loading,
            MapSurface::Interactive(_) => SurfaceKind::Interactive,
            MapSurface::Raster(_) => SurfaceKind::Raster,
        }
    }

    pub fn is_interactive(&self) -> bool {
        matches!(self, MapSurface::Interactive(_))
    }

    pub fn plot_count(&self) -> usize {
        match self {
            MapSurface::Interactive(svg) => svg.plots().len(),
            _ => 0,
        }
    }
}
