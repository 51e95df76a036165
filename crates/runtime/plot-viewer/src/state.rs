//! Plot selection state machine
//!
//! Three orthogonal axes: selection, presentation (map/grid) and fullscreen.
//! Fullscreen is nested inside the map presentation so a fullscreen grid
//! cannot exist.

use plot_core::{Layout, PlotKey, Slot};
use serde::Serialize;

use crate::viewport::Zoom;
use crate::{Error, Result};

/// Fullscreen-only affordances, dropped whenever fullscreen is left
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Fullscreen {
    /// "Press Esc to exit" overlay, hidden after the first click inside
    pub show_hint: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum Presentation {
    Map { fullscreen: Option<Fullscreen> },
    Grid,
}

/// Presentation without fullscreen detail, as requested by the toggle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PresentationMode {
    Map,
    Grid,
}

impl std::str::FromStr for PresentationMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "map" => Ok(PresentationMode::Map),
            "grid" => Ok(PresentationMode::Grid),
            other => Err(format!("unknown presentation mode: {other}")),
        }
    }
}

/// Modal dialogs raised by enquiry submission
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "message", rename_all = "snake_case")]
pub enum Dialog {
    Confirmation(String),
    Alert(String),
}

/// Result of a delegated map click
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClickOutcome {
    /// The label resolved to this slot id, now selected
    Selected(String),
    /// No slot carries this label; selection and marker stay where they were
    Unmatched(PlotKey),
}

/// All view state of one plot-map page
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ViewState {
    pub presentation: Presentation,
    pub zoom: Zoom,
    /// Id of the selected slot
    pub selected: Option<String>,
    pub dialog: Option<Dialog>,
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            presentation: Presentation::Map { fullscreen: None },
            zoom: Zoom::default(),
            selected: None,
            dialog: None,
        }
    }
}

impl ViewState {
    pub fn mode(&self) -> PresentationMode {
        match self.presentation {
            Presentation::Map { .. } => PresentationMode::Map,
            Presentation::Grid => PresentationMode::Grid,
        }
    }

    pub fn is_fullscreen(&self) -> bool {
        matches!(self.presentation, Presentation::Map { fullscreen: Some(_) })
    }

    pub fn fullscreen(&self) -> Option<Fullscreen> {
        match self.presentation {
            Presentation::Map { fullscreen } => fullscreen,
            Presentation::Grid => None,
        }
    }

    pub fn selected_slot<'a>(&self, layout: &'a Layout) -> Option<&'a Slot> {
        self.selected.as_deref().and_then(|id| layout.slot(id))
    }

    /// Key of the plot group to draw as selected
    pub fn selected_key(&self, layout: &Layout) -> Option<PlotKey> {
        self.selected_slot(layout).map(Slot::key)
    }

    /// Click on an annotated group, in the normal or fullscreen map.
    pub fn click_plot(&mut self, layout: &Layout, label: &str) -> Result<ClickOutcome> {
        let Presentation::Map { fullscreen } = &mut self.presentation else {
            return Err(Error::MapOnly);
        };
        if let Some(fs) = fullscreen {
            fs.show_hint = false;
        }

        let key = PlotKey::new(label);
        match layout.slot_for_key(&key) {
            Some(slot) => {
                tracing::debug!(key = %key, slot = %slot.id, "plot selected");
                self.selected = Some(slot.id.clone());
                Ok(ClickOutcome::Selected(slot.id.clone()))
            }
            None => {
                tracing::warn!(
                    key = %key,
                    layout = %layout.id,
                    "plot group has no matching slot; selection unchanged"
                );
                Ok(ClickOutcome::Unmatched(key))
            }
        }
    }

    /// Click on a grid selector cell. Cells of non-available slots are disabled.
    pub fn click_grid_cell(&mut self, layout: &Layout, slot_id: &str) -> Result<()> {
        if self.presentation != Presentation::Grid {
            return Err(Error::GridOnly);
        }
        let slot = layout.require_slot(slot_id)?;
        if !slot.is_available() {
            return Err(Error::SlotUnavailable(slot.id.clone()));
        }
        self.selected = Some(slot.id.clone());
        Ok(())
    }

    pub fn toggle_fullscreen(&mut self) -> Result<()> {
        match &mut self.presentation {
            Presentation::Map { fullscreen } => {
                *fullscreen = if fullscreen.is_some() {
                    None
                } else {
                    Some(Fullscreen { show_hint: true })
                };
                Ok(())
            }
            Presentation::Grid => Err(Error::MapOnly),
        }
    }

    /// Escape key or backdrop click. No-op when not fullscreen.
    pub fn exit_fullscreen(&mut self) {
        if let Presentation::Map { fullscreen } = &mut self.presentation {
            *fullscreen = None;
        }
    }

    /// Map/grid switch. Keeps the selection; entering the grid leaves fullscreen.
    pub fn set_mode(&mut self, mode: PresentationMode) {
        self.presentation = match (mode, self.presentation) {
            (PresentationMode::Map, Presentation::Map { fullscreen }) => Presentation::Map { fullscreen },
            (PresentationMode::Map, Presentation::Grid) => Presentation::Map { fullscreen: None },
            (PresentationMode::Grid, _) => Presentation::Grid,
        };
    }

    pub fn zoom_in(&mut self) {
        self.zoom.zoom_in();
    }

    pub fn zoom_out(&mut self) {
        self.zoom.zoom_out();
    }

    pub fn reset_zoom(&mut self) {
        self.zoom.reset();
    }

    pub fn dismiss_dialog(&mut self) {
        self.dialog = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use plot_core::SlotStatus;

    fn layout() -> Layout {
        Layout::from_json(
            r#"{
                "id": "L1",
                "slots": [
                    {"id": "s1", "sectionTitle": "Plot 1", "status": "available"},
                    {"id": "s2", "sectionTitle": "Plot 2", "status": "sold"}
                ]
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn test_map_click_selects_matching_slot() {
        let l = layout();
        let mut s = ViewState::default();
        assert_eq!(
            s.click_plot(&l, "plot 1").unwrap(),
            ClickOutcome::Selected("s1".into())
        );
        assert_eq!(s.selected_slot(&l).unwrap().section_title, "Plot 1");
        assert_eq!(s.selected_key(&l), Some(PlotKey::new("plot 1")));
    }

    #[test]
    fn test_map_click_miss_keeps_previous_selection() {
        let l = layout();
        let mut s = ViewState::default();
        s.click_plot(&l, "plot 1").unwrap();
        let outcome = s.click_plot(&l, "plot 3").unwrap();
        assert_eq!(outcome, ClickOutcome::Unmatched(PlotKey::new("plot 3")));
        assert_eq!(s.selected.as_deref(), Some("s1"));
        // The drawn marker derives from the same state, so it stays on plot 1
        assert_eq!(s.selected_key(&l), Some(PlotKey::new("plot 1")));
    }

    #[test]
    fn test_map_click_selects_sold_slot() {
        let l = layout();
        let mut s = ViewState::default();
        s.click_plot(&l, "Plot 2").unwrap();
        assert_eq!(s.selected_slot(&l).unwrap().status, SlotStatus::Sold);
    }

    #[test]
    fn test_map_click_rejected_in_grid() {
        let l = layout();
        let mut s = ViewState::default();
        s.set_mode(PresentationMode::Grid);
        assert!(matches!(s.click_plot(&l, "plot 1"), Err(Error::MapOnly)));
    }

    #[test]
    fn test_grid_click_rules() {
        let l = layout();
        let mut s = ViewState::default();
        assert!(matches!(s.click_grid_cell(&l, "s1"), Err(Error::GridOnly)));

        s.set_mode(PresentationMode::Grid);
        assert!(matches!(s.click_grid_cell(&l, "s2"), Err(Error::SlotUnavailable(_))));
        assert!(s.selected.is_none());
        assert!(matches!(s.click_grid_cell(&l, "zz"), Err(Error::Core(_))));

        s.click_grid_cell(&l, "s1").unwrap();
        assert_eq!(s.selected.as_deref(), Some("s1"));
    }

    #[test]
    fn test_mode_switch_keeps_selection_and_drops_fullscreen() {
        let l = layout();
        let mut s = ViewState::default();
        s.click_plot(&l, "plot 1").unwrap();
        s.toggle_fullscreen().unwrap();
        assert!(s.is_fullscreen());

        s.set_mode(PresentationMode::Grid);
        assert!(!s.is_fullscreen());
        assert_eq!(s.selected.as_deref(), Some("s1"));
        assert!(matches!(s.toggle_fullscreen(), Err(Error::MapOnly)));

        s.set_mode(PresentationMode::Map);
        assert_eq!(s.presentation, Presentation::Map { fullscreen: None });
        assert_eq!(s.selected.as_deref(), Some("s1"));
    }

    #[test]
    fn test_fullscreen_keeps_selection_and_hint_clears_on_click() {
        let l = layout();
        let mut s = ViewState::default();
        s.click_plot(&l, "plot 1").unwrap();
        s.toggle_fullscreen().unwrap();
        assert_eq!(s.fullscreen(), Some(Fullscreen { show_hint: true }));
        assert_eq!(s.selected.as_deref(), Some("s1"));

        s.click_plot(&l, "plot 2").unwrap();
        assert_eq!(s.fullscreen(), Some(Fullscreen { show_hint: false }));
        assert_eq!(s.selected.as_deref(), Some("s2"));

        s.exit_fullscreen();
        assert!(!s.is_fullscreen());
        s.exit_fullscreen();
        s.toggle_fullscreen().unwrap();
        assert_eq!(s.fullscreen(), Some(Fullscreen { show_hint: true }));
    }

    #[test]
    fn test_zoom_survives_fullscreen() {
        let mut s = ViewState::default();
        s.zoom_in();
        s.toggle_fullscreen().unwrap();
        s.zoom_in();
        s.exit_fullscreen();
        assert_eq!(s.zoom.level(), 1.5);
        s.reset_zoom();
        assert_eq!(s.zoom.level(), 1.0);
    }

    #[test]
    fn test_mode_parse() {
        assert_eq!("grid".parse::<PresentationMode>().unwrap(), PresentationMode::Grid);
        assert!("list".parse::<PresentationMode>().is_err());
    }
}
