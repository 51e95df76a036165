//! Streaming SVG rewrite.
//!
//! The document is read event by event with quick-xml and written straight
//! back out. Start tags are rebuilt for the root `<svg>`, qualifying plot
//! groups, (for [`AnnotatedSvg::render`]) annotated groups, and any other
//! element already carrying plot markers or inline event handlers, which lose
//! them. Everything else is copied through byte for byte, except prolog items
//! and scripts, which are dropped so the result can be embedded inline.

use std::borrow::Cow;

use plot_core::PlotKey;
use quick_xml::events::attributes::Attribute;
use quick_xml::events::{BytesStart, Event};
use quick_xml::{Reader, Writer};
use serde::Serialize;

use crate::matcher::PlotGroupAnnotation;
use crate::{Error, Result, INKSCAPE_LABEL, LABEL_ATTR, PLOT_CLASS, SELECTED_CLASS};

/// Interaction-ready plot map
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnnotatedSvg {
    markup: String,
    plots: Vec<PlotGroupAnnotation>,
}

impl AnnotatedSvg {
    /// Annotated markup with no selection marker
    pub fn markup(&self) -> &str {
        &self.markup
    }

    /// Qualifying groups in document order
    pub fn plots(&self) -> &[PlotGroupAnnotation] {
        &self.plots
    }

    pub fn contains(&self, key: &PlotKey) -> bool {
        self.plots.iter().any(|p| &p.normalized_key == key)
    }

    /// Markup where exactly the groups labelled `selected` carry [`SELECTED_CLASS`].
    ///
    /// Derived from the key on every call; nothing is remembered between renders.
    pub fn render(&self, selected: Option<&PlotKey>) -> String {
        let Some(key) = selected.filter(|k| self.contains(k)) else {
            return self.markup.clone();
        };
        match rewrite(&self.markup, Pass::Select(key)) {
            Ok((markup, _)) => markup,
            Err(e) => {
                // Our own output always re-parses; keep the unmarked map if it somehow does not.
                tracing::warn!(error = %e, "failed to mark selected plot");
                self.markup.clone()
            }
        }
    }
}

/// Parse, annotate and re-serialize a plot-map SVG.
pub fn annotate(svg: &str) -> Result<AnnotatedSvg> {
    let (markup, plots) = rewrite(svg, Pass::Annotate)?;
    tracing::debug!(plots = plots.len(), bytes = markup.len(), "annotated plot map");
    Ok(AnnotatedSvg { markup, plots })
}

/// Qualifying plot groups of `svg`, in document order
pub fn plot_groups(svg: &str) -> Result<Vec<PlotGroupAnnotation>> {
    annotate(svg).map(|a| a.plots)
}

#[derive(Clone, Copy)]
enum Pass<'k> {
    Annotate,
    Select(&'k PlotKey),
}

fn rewrite(svg: &str, pass: Pass<'_>) -> Result<(String, Vec<PlotGroupAnnotation>)> {
    let mut reader = Reader::from_str(svg);
    let mut writer = Writer::new(Vec::with_capacity(svg.len() + 256));
    let mut plots = Vec::new();

    let mut depth = 0usize;
    let mut root_seen = false;
    // Depth at which a dropped <script> started
    let mut skip_from: Option<usize> = None;

    loop {
        let event = reader
            .read_event()
            .map_err(|e| Error::Parse(format!("{e} (byte {})", reader.buffer_position())))?;

        let out = match event {
            Event::Eof => break,
            Event::Start(e) => {
                let at = depth;
                depth += 1;
                if skip_from.is_some() {
                    None
                } else if is_script(&e) {
                    skip_from = Some(at);
                    None
                } else {
                    let e = open_element(e, at, &mut root_seen, pass, &mut plots)?;
                    Some(Event::Start(e))
                }
            }
            Event::Empty(e) => {
                if skip_from.is_some() || is_script(&e) {
                    None
                } else {
                    let e = open_element(e, depth, &mut root_seen, pass, &mut plots)?;
                    Some(Event::Empty(e))
                }
            }
            Event::End(e) => {
                depth = depth
                    .checked_sub(1)
                    .ok_or_else(|| Error::Parse("unexpected closing tag".to_string()))?;
                match skip_from {
                    Some(at) if at == depth => {
                        skip_from = None;
                        None
                    }
                    Some(_) => None,
                    None => Some(Event::End(e)),
                }
            }
            // Prolog, doctype and anything else outside the root element
            _ if depth == 0 => None,
            _ if skip_from.is_some() => None,
            Event::Decl(_) | Event::DocType(_) | Event::PI(_) => None,
            other => Some(other),
        };

        if let Some(event) = out {
            writer
                .write_event(event)
                .map_err(|e| Error::Write(e.to_string()))?;
        }
    }

    if depth != 0 {
        return Err(Error::Parse(format!("{depth} unclosed element(s)")));
    }
    if !root_seen {
        return Err(Error::MissingRoot);
    }

    let markup = String::from_utf8(writer.into_inner()).map_err(|e| Error::Write(e.to_string()))?;
    Ok((markup, plots))
}

fn open_element(
    e: BytesStart<'_>,
    depth: usize,
    root_seen: &mut bool,
    pass: Pass<'_>,
    plots: &mut Vec<PlotGroupAnnotation>,
) -> Result<BytesStart<'static>> {
    if depth == 0 {
        if *root_seen {
            return Err(Error::Parse("multiple root elements".to_string()));
        }
        if e.local_name().as_ref() != b"svg" {
            return Err(Error::MissingRoot);
        }
        *root_seen = true;
        return match pass {
            Pass::Annotate => fit_root(&e),
            Pass::Select(_) => Ok(e.into_owned()),
        };
    }

    let is_group = e.local_name().as_ref() == b"g";

    match pass {
        Pass::Annotate => {
            let qualified = if is_group {
                let id = attr_value(&e, b"id")?;
                let label = attr_value(&e, INKSCAPE_LABEL.as_bytes())?;
                match (id, label) {
                    (Some(id), Some(label)) => PlotGroupAnnotation::qualify(&id, &label),
                    _ => None,
                }
            } else {
                None
            };
            match qualified {
                Some(plot) => {
                    let tagged = tag_plot(&e, &plot)?;
                    plots.push(plot);
                    Ok(tagged)
                }
                None if needs_scrub(&e)? => scrub(&e),
                None => Ok(e.into_owned()),
            }
        }
        Pass::Select(key) if is_group && has_class(&e, PLOT_CLASS)? => {
            match attr_value(&e, LABEL_ATTR.as_bytes())? {
                Some(label) if label == key.as_str() => set_selected(&e),
                _ => Ok(e.into_owned()),
            }
        }
        Pass::Select(_) => Ok(e.into_owned()),
    }
}

fn is_script(e: &BytesStart<'_>) -> bool {
    e.local_name().as_ref().eq_ignore_ascii_case(b"script")
}

fn attr_value(e: &BytesStart<'_>, key: &[u8]) -> Result<Option<String>> {
    for attr in e.attributes() {
        let attr = attr.map_err(|err| Error::Parse(err.to_string()))?;
        if attr.key.as_ref() == key {
            let value = attr
                .unescape_value()
                .map_err(|err| Error::Parse(err.to_string()))?;
            return Ok(Some(value.into_owned()));
        }
    }
    Ok(None)
}

/// Copy `e` without the attributes named in `drop` and without inline event handlers.
fn rebuild(e: &BytesStart<'_>, drop: &[&[u8]]) -> Result<(BytesStart<'static>, Vec<String>)> {
    let mut out = e.to_owned();
    out.clear_attributes();
    let mut classes = Vec::new();

    for attr in e.attributes() {
        let attr = attr.map_err(|err| Error::Parse(err.to_string()))?;
        let key = attr.key.as_ref();
        if key == b"class" {
            let value = attr
                .unescape_value()
                .map_err(|err| Error::Parse(err.to_string()))?;
            classes.extend(value.split_whitespace().map(str::to_string));
            continue;
        }
        if drop.contains(&key) || is_event_handler(key) {
            continue;
        }
        out.push_attribute(Attribute {
            key: attr.key,
            value: requote(attr.value),
        });
    }
    Ok((out, classes))
}

fn is_marker_class(class: &str) -> bool {
    class == PLOT_CLASS || class == SELECTED_CLASS
}

fn has_class(e: &BytesStart<'_>, class: &str) -> Result<bool> {
    Ok(attr_value(e, b"class")?
        .is_some_and(|value| value.split_whitespace().any(|c| c == class)))
}

/// Whether a non-plot element carries anything only plot groups may have.
fn needs_scrub(e: &BytesStart<'_>) -> Result<bool> {
    for attr in e.attributes() {
        let attr = attr.map_err(|err| Error::Parse(err.to_string()))?;
        let key = attr.key.as_ref();
        if key == LABEL_ATTR.as_bytes() || is_event_handler(key) {
            return Ok(true);
        }
        if key == b"class" {
            let value = attr
                .unescape_value()
                .map_err(|err| Error::Parse(err.to_string()))?;
            if value.split_whitespace().any(is_marker_class) {
                return Ok(true);
            }
        }
    }
    Ok(false)
}

/// Strip plot markers from an element that did not qualify.
fn scrub(e: &BytesStart<'_>) -> Result<BytesStart<'static>> {
    let (mut out, mut classes) = rebuild(e, &[LABEL_ATTR.as_bytes()])?;
    classes.retain(|c| !is_marker_class(c));
    push_classes(&mut out, &classes);
    Ok(out)
}

fn push_classes(out: &mut BytesStart<'static>, classes: &[String]) {
    if !classes.is_empty() {
        out.push_attribute(("class", classes.join(" ").as_str()));
    }
}

fn tag_plot(e: &BytesStart<'_>, plot: &PlotGroupAnnotation) -> Result<BytesStart<'static>> {
    let (mut out, mut classes) = rebuild(e, &[LABEL_ATTR.as_bytes()])?;
    if !classes.iter().any(|c| c == PLOT_CLASS) {
        classes.push(PLOT_CLASS.to_string());
    }
    // Selection is a render-time concern, never baked into the annotated markup
    classes.retain(|c| c != SELECTED_CLASS);
    push_classes(&mut out, &classes);
    out.push_attribute((LABEL_ATTR, plot.normalized_key.as_str()));
    Ok(out)
}

fn set_selected(e: &BytesStart<'_>) -> Result<BytesStart<'static>> {
    let (mut out, mut classes) = rebuild(e, &[LABEL_ATTR.as_bytes()])?;
    let label = attr_value(e, LABEL_ATTR.as_bytes())?.unwrap_or_default();
    classes.retain(|c| c != SELECTED_CLASS);
    classes.push(SELECTED_CLASS.to_string());
    push_classes(&mut out, &classes);
    out.push_attribute((LABEL_ATTR, label.as_str()));
    Ok(out)
}

/// Scale the root to its container: `width="100%" height="auto"`.
///
/// A pixel-sized drawing without a `viewBox` gets one from its old size so the
/// user coordinate system survives the rescale.
fn fit_root(e: &BytesStart<'_>) -> Result<BytesStart<'static>> {
    let has_view_box = attr_value(e, b"viewBox")?.is_some();
    let width = attr_value(e, b"width")?.as_deref().and_then(parse_px);
    let height = attr_value(e, b"height")?.as_deref().and_then(parse_px);

    let (mut out, mut classes) = rebuild(e, &[b"width", b"height", LABEL_ATTR.as_bytes()])?;
    classes.retain(|c| !is_marker_class(c));
    push_classes(&mut out, &classes);
    if !has_view_box {
        if let (Some(w), Some(h)) = (width, height) {
            out.push_attribute(("viewBox", format!("0 0 {w} {h}").as_str()));
        }
    }
    out.push_attribute(("width", "100%"));
    out.push_attribute(("height", "auto"));
    Ok(out)
}

fn parse_px(raw: &str) -> Option<f64> {
    let raw = raw.trim();
    let number = raw.strip_suffix("px").unwrap_or(raw).trim();
    number.parse::<f64>().ok().filter(|v| *v > 0.0)
}

fn is_event_handler(key: &[u8]) -> bool {
    key.len() > 2 && key[..2].eq_ignore_ascii_case(b"on")
}

/// Raw values are re-emitted in double quotes; escape any that came single-quoted.
fn requote(value: Cow<'_, [u8]>) -> Cow<'_, [u8]> {
    if !value.contains(&b'"') {
        return value;
    }
    let mut escaped = Vec::with_capacity(value.len() + 8);
    for &b in value.iter() {
        if b == b'"' {
            escaped.extend_from_slice(b"&quot;");
        } else {
            escaped.push(b);
        }
    }
    Cow::Owned(escaped)
}

#[cfg(test)]
mod tests {
    use super::*;

    const MAP: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<!DOCTYPE svg PUBLIC "-//W3C//DTD SVG 1.1//EN" "http://www.w3.org/Graphics/SVG/1.1/DTD/svg11.dtd">
<svg xmlns="http://www.w3.org/2000/svg" xmlns:inkscape="http://www.inkscape.org/namespaces/inkscape" width="800" height="600">
  <g id="layer1" inkscape:label="Layer 1">
    <g id="g100" inkscape:label="Plot 7" class="lot"><rect x="0" y="0" width="10" height="10"/></g>
    <g id="g101" inkscape:label="plot 8"><rect x="10" y="0" width="10" height="10"/></g>
    <g id="deco1" inkscape:label="plot 9"><circle r="2"/></g>
    <g id="g102" inkscape:label="tree"><circle r="3"/></g>
  </g>
</svg>"#;

    #[test]
    fn test_annotates_only_qualifying_groups() {
        let a = annotate(MAP).unwrap();
        let ids: Vec<_> = a.plots().iter().map(|p| p.element_id.as_str()).collect();
        assert_eq!(ids, ["g100", "g101"]);
        assert_eq!(a.markup().matches(LABEL_ATTR).count(), 2);
        assert!(a.markup().contains(r#"class="lot plot-group" data-plot-label="plot 7""#));
        assert!(!a.markup().contains(r#"id="deco1" inkscape:label="plot 9" class"#));
    }

    #[test]
    fn test_root_is_rescaled_and_prolog_dropped() {
        let a = annotate(MAP).unwrap();
        assert!(a.markup().starts_with("<svg"));
        assert!(a.markup().contains(r#"viewBox="0 0 800 600" width="100%" height="auto""#));
        assert!(!a.markup().contains("<?xml"));
        assert!(!a.markup().contains("DOCTYPE"));
    }

    #[test]
    fn test_existing_view_box_kept() {
        let a = annotate(r#"<svg viewBox="0 0 10 20" width="10mm" height="20mm"><g/></svg>"#).unwrap();
        assert_eq!(
            a.markup(),
            r#"<svg viewBox="0 0 10 20" width="100%" height="auto"><g/></svg>"#
        );
    }

    #[test]
    fn test_idempotent() {
        let once = annotate(MAP).unwrap();
        let twice = annotate(once.markup()).unwrap();
        assert_eq!(once.markup(), twice.markup());
        assert_eq!(once.plots(), twice.plots());
    }

    #[test]
    fn test_render_marks_exactly_one_group() {
        let a = annotate(MAP).unwrap();
        let html = a.render(Some(&PlotKey::new("plot 8")));
        assert_eq!(html.matches(SELECTED_CLASS).count(), 1);
        assert!(html.contains(r#"class="plot-group selected" data-plot-label="plot 8""#));

        let moved = a.render(Some(&PlotKey::new("plot 7")));
        assert_eq!(moved.matches(SELECTED_CLASS).count(), 1);
        assert!(moved.contains(r#"class="lot plot-group selected" data-plot-label="plot 7""#));
    }

    #[test]
    fn test_render_without_match_is_plain() {
        let a = annotate(MAP).unwrap();
        assert_eq!(a.render(None), a.markup());
        assert_eq!(a.render(Some(&PlotKey::new("plot 99"))), a.markup());
    }

    #[test]
    fn test_scripts_and_handlers_removed() {
        let svg = r#"<svg onload="steal()"><script>alert(1)</script><g id="g1" inkscape:label="plot 1" onclick="x()"><script/></g></svg>"#;
        let a = annotate(svg).unwrap();
        assert!(!a.markup().contains("script"));
        assert!(!a.markup().contains("onload"));
        assert!(!a.markup().contains("onclick"));
        assert_eq!(a.plots().len(), 1);
    }

    #[test]
    fn test_single_quoted_values_survive() {
        let svg = r#"<svg width="100"><g id="g1" inkscape:label="plot 1" style='font-family:"Sans"'/></svg>"#;
        let a = annotate(svg).unwrap();
        assert!(a.markup().contains(r#"style="font-family:&quot;Sans&quot;""#));
        annotate(a.markup()).unwrap();
    }

    #[test]
    fn test_stray_markers_are_stripped() {
        let svg = r#"<svg class="plot-group" data-plot-label="plot 7"><g id="g100" inkscape:label="plot 7"/><g id="deco1" class="plot-group selected shrub" data-plot-label="plot 7"/><rect data-plot-label="plot 7" class="selected" onclick="x()"/><g id="g9" inkscape:label="tree" data-plot-label="plot 7"/></svg>"#;
        let a = annotate(svg).unwrap();
        assert_eq!(a.plots().len(), 1);
        assert_eq!(a.markup().matches(LABEL_ATTR).count(), 1);
        assert_eq!(a.markup().matches(PLOT_CLASS).count(), 1);
        assert!(!a.markup().contains(SELECTED_CLASS));
        assert!(!a.markup().contains("onclick"));
        assert!(a.markup().contains(r#"<g id="deco1" class="shrub"/>"#));
        assert!(a.markup().contains("<rect/>"));

        let html = a.render(Some(&PlotKey::new("plot 7")));
        assert_eq!(html.matches(SELECTED_CLASS).count(), 1);
        assert!(html.contains(r#"<g id="g100" inkscape:label="plot 7" class="plot-group selected" data-plot-label="plot 7"/>"#));
    }

    #[test]
    fn test_select_requires_plot_class() {
        let a = annotate(r#"<svg><g id="g1" inkscape:label="plot 1"/></svg>"#).unwrap();
        // A hand-edited copy where a decoy has the label but not the class
        let tampered = AnnotatedSvg {
            markup: a
                .markup()
                .replace("</svg>", r#"<g data-plot-label="plot 1"/></svg>"#),
            plots: a.plots().to_vec(),
        };
        let html = tampered.render(Some(&PlotKey::new("plot 1")));
        assert_eq!(html.matches(SELECTED_CLASS).count(), 1);
        assert!(html.contains(r#"<g data-plot-label="plot 1"/>"#));
    }

    #[test]
    fn test_unavailable_inputs() {
        assert!(matches!(annotate("not svg at all"), Err(Error::MissingRoot)));
        assert!(matches!(annotate(""), Err(Error::MissingRoot)));
        assert!(matches!(annotate("<html><body/></html>"), Err(Error::MissingRoot)));
        assert!(matches!(annotate("<svg><g></svg>"), Err(Error::Parse(_))));
        assert!(matches!(annotate("<svg><g>"), Err(Error::Parse(_))));
        assert!(matches!(annotate("<svg/><svg/>"), Err(Error::Parse(_))));
    }
}
