//! Plot group qualification

use lazy_static::lazy_static;
use plot_core::PlotKey;
use regex::Regex;
use serde::Serialize;

lazy_static! {
    static ref GROUP_ID: Regex = Regex::new(r"^g[0-9]+$").unwrap();
    static ref PLOT_LABEL: Regex = Regex::new(r"(?i)^plot[ \t\r\n]*[0-9]+$").unwrap();
}

/// Both tests must pass. A numeric id alone also matches decorative groups,
/// and a plot-like label alone also matches layers and text groups.
pub fn is_plot_group(element_id: &str, raw_label: &str) -> bool {
    GROUP_ID.is_match(element_id) && PLOT_LABEL.is_match(raw_label)
}

/// A drawn group recognised as a selectable plot
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlotGroupAnnotation {
    pub element_id: String,
    pub raw_label: String,
    pub normalized_key: PlotKey,
}

impl PlotGroupAnnotation {
    /// `None` unless the pair qualifies
    pub fn qualify(element_id: &str, raw_label: &str) -> Option<Self> {
        is_plot_group(element_id, raw_label).then(|| Self {
            element_id: element_id.to_string(),
            raw_label: raw_label.to_string(),
            normalized_key: PlotKey::new(raw_label),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_both_must_match() {
        assert!(is_plot_group("g4107", "plot 12"));
        assert!(!is_plot_group("g4107", "layer 1"));
        assert!(!is_plot_group("deco1", "plot 12"));
        assert!(!is_plot_group("rect12", "tree"));
    }

    #[test]
    fn test_label_pattern() {
        assert!(is_plot_group("g1", "PLOT 3"));
        assert!(is_plot_group("g1", "plot3"));
        assert!(is_plot_group("g1", "Plot \t 44"));
        assert!(!is_plot_group("g1", "plot"));
        assert!(!is_plot_group("g1", "plot 3a"));
        assert!(!is_plot_group("g1", "my plot 3"));
    }

    #[test]
    fn test_id_pattern() {
        assert!(!is_plot_group("G12", "plot 1"));
        assert!(!is_plot_group("g", "plot 1"));
        assert!(!is_plot_group("g12a", "plot 1"));
    }

    #[test]
    fn test_digits_and_spaces_are_ascii() {
        assert!(!is_plot_group("g\u{663}", "plot 1"));
        assert!(!is_plot_group("g1", "plot \u{663}"));
        assert!(!is_plot_group("g1", "plot\u{a0}3"));
        assert!(!is_plot_group("g\u{ff11}", "plot 1"));
    }

    #[test]
    fn test_qualify_normalizes() {
        let a = PlotGroupAnnotation::qualify("g100", "Plot 7").unwrap();
        assert_eq!(a.normalized_key.as_str(), "plot 7");
        assert!(PlotGroupAnnotation::qualify("g100", "Tree").is_none());
    }
}
