use plot_core::PlotKey;
use plot_svg::{annotate, plot_groups, LABEL_ATTR, PLOT_CLASS, SELECTED_CLASS};

const FIXTURE: &str = include_str!("fixtures/green_acres.svg");

#[test]
fn fixture_has_exactly_one_interactive_plot() {
    let annotated = annotate(FIXTURE).expect("fixture parses");

    assert_eq!(annotated.plots().len(), 1);
    assert_eq!(annotated.plots()[0].element_id, "g100");
    assert_eq!(annotated.markup().matches(LABEL_ATTR).count(), 1);
    assert_eq!(annotated.markup().matches(PLOT_CLASS).count(), 1);
}

#[test]
fn fixture_keeps_drawing_content() {
    let annotated = annotate(FIXTURE).unwrap();
    let markup = annotated.markup();

    assert!(markup.contains(r#"d="M 10,10 H 110 V 90 H 10 Z""#));
    assert!(markup.contains(r#"<text x="40" y="55">7</text>"#));
    assert!(markup.contains(r#"viewBox="0 0 1200 900""#));
    assert!(markup.contains("sodipodi:namedview"));
    assert!(!markup.contains("Created with Inkscape"));
}

#[test]
fn fixture_selection_follows_key() {
    let annotated = annotate(FIXTURE).unwrap();

    let selected = annotated.render(Some(&PlotKey::new("Plot 7")));
    assert_eq!(selected.matches(SELECTED_CLASS).count(), 1);

    let missing = annotated.render(Some(&PlotKey::new("plot 3")));
    assert_eq!(missing.matches(SELECTED_CLASS).count(), 0);
}

#[test]
fn fixture_inventory_serializes() {
    let plots = plot_groups(FIXTURE).unwrap();
    let json = serde_json::to_value(&plots).unwrap();
    assert_eq!(
        json,
        serde_json::json!([
            {"element_id": "g100", "raw_label": "plot 7", "normalized_key": "plot 7"}
        ])
    );
}
