//! HTML templates for the plot-map viewer
//!
//! The whole viewer is one `#plot-viewer` fragment. Buttons post to
//! `/views/{view}/...` and HTMX swaps the returned fragment in place; clicks on
//! the inline SVG go through one delegated listener in [`viewer_js`].

use plot_core::{Layout, Slot};
use plot_svg::LABEL_ATTR;
use plot_viewer::{Dialog, MapSurface, PlotMapPage, PresentationMode};
use uuid::Uuid;

use crate::routes::html_escape;

/// CSS styles
pub const STYLE_CSS: &str = r#"
:root {
    --bg: #f7f7f4;
    --panel: #ffffff;
    --border: #dcdcd6;
    --text: #22252a;
    --muted: #6b6f76;
    --accent: #1f7a4d;
    --available: #2e9e5b;
    --sold: #c0392b;
    --blocked: #8c8c8c;
    --selected: #f0b429;
}

* { margin: 0; padding: 0; box-sizing: border-box; }

body {
    font-family: system-ui, -apple-system, 'Segoe UI', sans-serif;
    background: var(--bg);
    color: var(--text);
    line-height: 1.5;
}

#main { max-width: 1280px; margin: 0 auto; padding: 24px; }

.htmx-indicator { display: none; }
.htmx-indicator.htmx-request, .htmx-request .htmx-indicator { display: inline-block; }
#spinner {
    position: fixed;
    top: 12px;
    right: 12px;
    padding: 4px 12px;
    border-radius: 6px;
    background: var(--text);
    color: var(--panel);
    z-index: 30;
}

.plot-viewer { display: flex; flex-direction: column; gap: 16px; }

.viewer-header { display: flex; align-items: baseline; justify-content: space-between; }
.viewer-header h1 { font-size: 1.5rem; }
.availability { color: var(--muted); }

.notice, .load-error {
    padding: 8px 12px;
    border-radius: 6px;
    background: #fff4e5;
    border: 1px solid #f5c26b;
}
.load-error { background: #fdecea; border-color: #f19a92; }

.toolbar { display: flex; gap: 8px; align-items: center; flex-wrap: wrap; }
.toolbar .spacer { flex: 1; }
.toolbar button, .fullscreen-toolbar button {
    border: 1px solid var(--border);
    background: var(--panel);
    padding: 6px 12px;
    border-radius: 6px;
    cursor: pointer;
}
.toolbar button[aria-pressed="true"] { background: var(--accent); color: #fff; border-color: var(--accent); }
.toolbar button:disabled, .fullscreen-toolbar button:disabled { opacity: 0.4; cursor: default; }
.zoom-level { min-width: 4em; text-align: center; font-variant-numeric: tabular-nums; }

.viewer-body { display: grid; grid-template-columns: 1fr 320px; gap: 16px; }

.map-frame {
    background: var(--panel);
    border: 1px solid var(--border);
    border-radius: 8px;
    overflow: auto;
    max-height: 75vh;
}
.map-canvas { width: 100%; }
.map-canvas svg { display: block; }
.map-raster { display: block; width: 100%; height: auto; }
.map-loading, .map-empty { padding: 48px; text-align: center; color: var(--muted); }

.plot-group { cursor: pointer; }
.plot-group:hover > * { opacity: 0.8; }
.plot-group.selected > * { fill: var(--selected) !important; stroke: #8a5a00; stroke-width: 2; }

.grid { display: flex; flex-direction: column; gap: 16px; }
.grid-section h3 { font-size: 0.95rem; margin-bottom: 8px; }
.grid-cells { display: grid; grid-template-columns: repeat(auto-fill, minmax(72px, 1fr)); gap: 6px; }
.grid-cell {
    padding: 10px 4px;
    border-radius: 6px;
    border: 2px solid transparent;
    color: #fff;
    cursor: pointer;
}
.grid-cell.slot-available { background: var(--available); }
.grid-cell.slot-sold { background: var(--sold); }
.grid-cell.slot-na { background: var(--blocked); }
.grid-cell:disabled { cursor: not-allowed; opacity: 0.6; }
.grid-cell.is-selected { border-color: var(--selected); box-shadow: 0 0 0 2px var(--selected); }

.viewer-details {
    background: var(--panel);
    border: 1px solid var(--border);
    border-radius: 8px;
    padding: 16px;
    align-self: start;
}
.viewer-details dl { display: grid; grid-template-columns: auto 1fr; gap: 4px 12px; margin: 12px 0; }
.viewer-details dt { color: var(--muted); }
.detail-empty { color: var(--muted); }
.status-badge { padding: 2px 8px; border-radius: 10px; color: #fff; font-size: 0.85rem; }
.status-badge.slot-available { background: var(--available); }
.status-badge.slot-sold { background: var(--sold); }
.status-badge.slot-na { background: var(--blocked); }

.enquiry { display: flex; flex-direction: column; gap: 8px; }
.enquiry textarea { min-height: 80px; padding: 8px; border: 1px solid var(--border); border-radius: 6px; }
.enquiry button { padding: 8px; border: none; border-radius: 6px; background: var(--accent); color: #fff; cursor: pointer; }

.fullscreen {
    position: fixed;
    inset: 0;
    background: rgba(10, 12, 16, 0.88);
    display: flex;
    flex-direction: column;
    align-items: center;
    justify-content: center;
    z-index: 100;
}
.fullscreen-toolbar { position: absolute; top: 16px; right: 16px; display: flex; gap: 8px; }
.fullscreen-viewport { width: 92vw; height: 84vh; overflow: auto; background: var(--panel); border-radius: 8px; }
.fullscreen-hint {
    position: absolute;
    bottom: 24px;
    color: #fff;
    background: rgba(0, 0, 0, 0.6);
    padding: 6px 14px;
    border-radius: 16px;
}

.dialog-backdrop {
    position: fixed;
    inset: 0;
    background: rgba(0, 0, 0, 0.4);
    display: flex;
    align-items: center;
    justify-content: center;
    z-index: 200;
}
.dialog { background: var(--panel); padding: 24px; border-radius: 10px; max-width: 420px; }
.dialog p { margin-bottom: 16px; }
.dialog-alert { border-top: 4px solid var(--sold); }
.dialog-confirmation { border-top: 4px solid var(--available); }
.dialog button { padding: 6px 18px; border-radius: 6px; border: 1px solid var(--border); cursor: pointer; }

@media (max-width: 900px) {
    .viewer-body { grid-template-columns: 1fr; }
}
"#;

/// Client glue: one delegated click listener for plot groups and the
/// fullscreen backdrop, Escape to leave fullscreen, and closing the
/// server-side view when the page goes away.
const VIEWER_JS: &str = r#"(function () {
    function viewOf(el) {
        var root = el.closest('[data-view]');
        return root ? root.getAttribute('data-view') : null;
    }

    function post(view, path, values) {
        htmx.ajax('POST', '/views/' + view + path, {
            target: '#plot-viewer',
            swap: 'outerHTML',
            values: values || {}
        });
    }

    document.addEventListener('click', function (ev) {
        var target = ev.target;
        if (!(target instanceof Element)) return;

        if (target.hasAttribute('data-backdrop')) {
            var backdropView = viewOf(target);
            if (backdropView) post(backdropView, '/fullscreen/exit');
            return;
        }

        var group = target.closest('[__LABEL_ATTR__]');
        if (!group) return;
        var plotView = viewOf(group);
        if (plotView) post(plotView, '/plot', { label: group.getAttribute('__LABEL_ATTR__') });
    });

    document.addEventListener('keydown', function (ev) {
        if (ev.key !== 'Escape') return;
        var overlay = document.querySelector('[data-fullscreen]');
        var view = overlay && viewOf(overlay);
        if (view) post(view, '/fullscreen/exit');
    });

    window.addEventListener('pagehide', function () {
        document.querySelectorAll('.plot-viewer[data-view]').forEach(function (el) {
            fetch('/views/' + el.getAttribute('data-view'), { method: 'DELETE', keepalive: true });
        });
    });

    // Restored from the back/forward cache after its view was closed
    window.addEventListener('pageshow', function (ev) {
        if (ev.persisted && document.querySelector('.plot-viewer[data-view]')) location.reload();
    });
})();
"#;

pub fn viewer_js() -> String {
    VIEWER_JS.replace("__LABEL_ATTR__", LABEL_ATTR)
}

/// The whole viewer fragment for one view
pub fn viewer(view: Uuid, page: &PlotMapPage, notice: Option<&str>) -> String {
    let state = page.state();
    let main = match state.mode() {
        PresentationMode::Map => format!(r#"<div class="map-frame">{}</div>"#, map_canvas(page)),
        PresentationMode::Grid => grid(view, page),
    };
    let notice = notice
        .map(|n| format!(r#"<div class="notice" role="status">{}</div>"#, html_escape(n)))
        .unwrap_or_default();
    let load_error = page
        .load_error()
        .map(|e| {
            format!(
                r#"<div class="load-error">Could not load this layout: {}</div>"#,
                html_escape(e)
            )
        })
        .unwrap_or_default();
    let overlay = if state.is_fullscreen() {
        fullscreen_overlay(view, page)
    } else {
        String::new()
    };
    let dialog = state
        .dialog
        .as_ref()
        .map(|d| dialog_html(view, d))
        .unwrap_or_default();
    // Fires once the fragment is in the document and swaps in the loaded viewer
    let pending = if page.pending_load().is_some() {
        format!(r#"<div class="load-trigger" hx-post="/views/{view}/load" hx-trigger="load"></div>"#)
    } else {
        String::new()
    };

    format!(
        r##"<section id="plot-viewer" class="plot-viewer" data-view="{view}" hx-target="this" hx-swap="outerHTML" hx-indicator="#spinner">
    {header}
    {notice}
    {load_error}
    {toolbar}
    {pending}
    <div class="viewer-body">
        <div class="viewer-main">{main}</div>
        <aside class="viewer-details">{details}</aside>
    </div>
    {overlay}
    {dialog}
</section>"##,
        header = header(page.layout()),
        toolbar = toolbar(view, page),
        details = details(view, page),
    )
}

fn header(layout: Option<&Layout>) -> String {
    match layout {
        Some(layout) => format!(
            r#"<header class="viewer-header"><h1>{}</h1><span class="availability">{} of {} plots available</span></header>"#,
            html_escape(layout.display_title()),
            layout.available_count(),
            layout.slots.len()
        ),
        None => r#"<header class="viewer-header"><h1>Layout</h1></header>"#.to_string(),
    }
}

fn toolbar(view: Uuid, page: &PlotMapPage) -> String {
    let state = page.state();
    let is_map = state.mode() == PresentationMode::Map;
    let map_controls = if is_map {
        format!(
            r#"{zoom}
        <button hx-post="/views/{view}/fullscreen" title="Fullscreen">&#x26F6; Fullscreen</button>"#,
            zoom = zoom_controls(view, page)
        )
    } else {
        String::new()
    };

    format!(
        r#"<div class="toolbar">
        <button hx-post="/views/{view}/mode/map" aria-pressed="{is_map}">Map</button>
        <button hx-post="/views/{view}/mode/grid" aria-pressed="{is_grid}">Grid</button>
        <span class="spacer"></span>
        {map_controls}
    </div>"#,
        is_grid = !is_map,
    )
}

fn zoom_controls(view: Uuid, page: &PlotMapPage) -> String {
    let zoom = page.state().zoom;
    format!(
        r#"<button hx-post="/views/{view}/zoom/out" title="Zoom out"{out}>&minus;</button>
        <span class="zoom-level">{zoom}</span>
        <button hx-post="/views/{view}/zoom/in" title="Zoom in"{inn}>+</button>
        <button hx-post="/views/{view}/zoom/reset" title="Reset zoom">Reset</button>"#,
        out = disabled(!zoom.can_zoom_out()),
        inn = disabled(!zoom.can_zoom_in()),
    )
}

fn disabled(flag: bool) -> &'static str {
    if flag {
        " disabled"
    } else {
        ""
    }
}

/// Map content scaled by the current zoom; shared by the normal and fullscreen views
fn map_canvas(page: &PlotMapPage) -> String {
    let inner = match page.surface() {
        MapSurface::Loading => r#"<div class="map-loading">Loading map&hellip;</div>"#.to_string(),
        MapSurface::Interactive(_) => page.render_map().unwrap_or_default(),
        MapSurface::Raster(Some(url)) => format!(
            r#"<img class="map-raster" src="{}" alt="Layout plan">"#,
            html_escape(url)
        ),
        MapSurface::Raster(None) => {
            r#"<div class="map-empty">No map available for this layout</div>"#.to_string()
        }
    };
    format!(
        r#"<div class="map-canvas" style="{}">{}</div>"#,
        page.state().zoom.css(),
        inner
    )
}

fn grid(view: Uuid, page: &PlotMapPage) -> String {
    let Some(layout) = page.layout() else {
        return r#"<div class="map-empty">No plots to show</div>"#.to_string();
    };
    let selected = page.state().selected.as_deref();

    let mut html = String::from(r#"<div class="grid">"#);
    for (section, slots) in layout.slots_by_section() {
        html.push_str(&format!(
            r#"<div class="grid-section"><h3>{}</h3><div class="grid-cells">"#,
            html_escape(&section)
        ));
        for slot in &slots {
            html.push_str(&grid_cell(view, slot, selected == Some(slot.id.as_str())));
        }
        html.push_str("</div></div>");
    }
    html.push_str("</div>");
    html
}

fn grid_cell(view: Uuid, slot: &Slot, is_selected: bool) -> String {
    let label = slot.plot_number.as_deref().unwrap_or(&slot.section_title);
    format!(
        r#"<button class="grid-cell {class}{sel}" hx-post="/views/{view}/slots/{id}" title="{title}"{dis}>{label}</button>"#,
        class = slot.status.css_class(),
        sel = if is_selected { " is-selected" } else { "" },
        id = path_segment(&slot.id),
        title = html_escape(&format!("{} - {}", slot.section_title, slot.status.label())),
        dis = disabled(!slot.is_available()),
        label = html_escape(label),
    )
}

/// Percent-encode `raw` as a single URL path segment.
///
/// The output is plain ASCII with no `&`, `<` or `"`, so it is also safe inside
/// an attribute.
fn path_segment(raw: &str) -> String {
    // form encoding writes spaces as `+`, which a path keeps literally
    url::form_urlencoded::byte_serialize(raw.as_bytes())
        .collect::<String>()
        .replace('+', "%20")
}

fn details(view: Uuid, page: &PlotMapPage) -> String {
    let Some(slot) = page.selected_slot() else {
        return r#"<p class="detail-empty">Click a plot on the map to see its details.</p>"#
            .to_string();
    };

    let mut rows = Vec::new();
    if let Some(number) = &slot.plot_number {
        rows.push(("Plot number", html_escape(number)));
    }
    if let Some(area) = &slot.area {
        rows.push(("Area", html_escape(area)));
    }
    if let Some(facing) = &slot.facing {
        rows.push(("Facing", html_escape(facing)));
    }
    if let Some(dimensions) = slot.dimensions() {
        rows.push(("Dimensions", html_escape(&dimensions)));
    }
    rows.push(("Price", html_escape(&slot.display_price())));
    rows.push((
        "Status",
        format!(
            r#"<span class="status-badge {}">{}</span>"#,
            slot.status.css_class(),
            slot.status.label()
        ),
    ));
    let rows: String = rows
        .into_iter()
        .map(|(k, v)| format!("<dt>{k}</dt><dd>{v}</dd>"))
        .collect();

    format!(
        r#"<h2>{title}</h2>
        <dl>{rows}</dl>
        <form class="enquiry" hx-post="/views/{view}/enquiry">
            <label for="enquiry-message">Interested in this plot?</label>
            <textarea id="enquiry-message" name="message" placeholder="Tell us when to reach you"></textarea>
            <button type="submit">Send enquiry</button>
        </form>"#,
        title = html_escape(&slot.section_title),
    )
}

fn fullscreen_overlay(view: Uuid, page: &PlotMapPage) -> String {
    let hint = match page.state().fullscreen() {
        Some(fs) if fs.show_hint => {
            r#"<div class="fullscreen-hint">Press Esc to exit fullscreen</div>"#
        }
        _ => "",
    };
    format!(
        r#"<div class="fullscreen" data-fullscreen data-backdrop>
        <div class="fullscreen-toolbar">
            {zoom}
            <button hx-post="/views/{view}/fullscreen/exit" title="Exit fullscreen">&times;</button>
        </div>
        <div class="fullscreen-viewport">{canvas}</div>
        {hint}
    </div>"#,
        zoom = zoom_controls(view, page),
        canvas = map_canvas(page),
    )
}

fn dialog_html(view: Uuid, dialog: &Dialog) -> String {
    let (class, role, message) = match dialog {
        Dialog::Confirmation(m) => ("dialog-confirmation", "dialog", m),
        Dialog::Alert(m) => ("dialog-alert", "alertdialog", m),
    };
    format!(
        r#"<div class="dialog-backdrop">
        <div class="dialog {class}" role="{role}" aria-modal="true">
            <p>{}</p>
            <button hx-post="/views/{view}/dialog/dismiss" autofocus>OK</button>
        </div>
    </div>"#,
        html_escape(message)
    )
}
