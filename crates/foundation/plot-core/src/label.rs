//! Plot label normalization.
//!
//! Design tools label plot groups loosely (`Plot 7`, ` plot 7`, `PLOT 7`).
//! The normalized form is the key used to join a drawn group to its slot.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Trim and lowercase a label.
pub fn normalize_label(label: &str) -> String {
    label.trim().to_lowercase()
}

/// Normalized plot label, the join key between SVG groups and slots.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlotKey(String);

impl PlotKey {
    pub fn new(label: &str) -> Self {
        Self(normalize_label(label))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True when `title` normalizes to this key.
    pub fn matches(&self, title: &str) -> bool {
        normalize_label(title) == self.0
    }
}

impl fmt::Display for PlotKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PlotKey {
    fn from(label: &str) -> Self {
        Self::new(label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_trims_and_lowercases() {
        assert_eq!(normalize_label("  Plot 7 "), "plot 7");
        assert_eq!(normalize_label("PLOT12"), "plot12");
    }

    #[test]
    fn test_normalize_is_idempotent() {
        for raw in ["Plot 1", "  pLoT   22\t", "", "   ", "plot 3", "Ünïcode Plot"] {
            let once = normalize_label(raw);
            assert_eq!(normalize_label(&once), once, "input {raw:?}");
        }
    }

    #[test]
    fn test_key_matches_section_title() {
        let key = PlotKey::new("plot 1");
        assert!(key.matches("Plot 1"));
        assert!(key.matches("  PLOT 1 "));
        assert!(!key.matches("Plot 10"));
    }
}
