pub mod assets;
pub mod health;
pub mod layouts;
pub mod relay;
pub mod views;

/// All routes served, for `plotmap serve --routes`
pub const ROUTES: &[(&str, &str, &str)] = &[
    // Pages
    ("GET", "/layouts/{id}", "Plot-map viewer for one layout"),

    // Viewer fragments (HTMX)
    ("POST", "/views/{view}/load", "Fetch the layout a loading view waits on"),
    ("POST", "/views/{view}/layout/{id}", "Switch the view to another layout"),
    ("POST", "/views/{view}/plot", "Map click on a plot group"),
    ("POST", "/views/{view}/slots/{slot}", "Grid cell click"),
    ("POST", "/views/{view}/zoom/{action}", "Zoom in, out or reset"),
    ("POST", "/views/{view}/fullscreen", "Toggle fullscreen"),
    ("POST", "/views/{view}/fullscreen/exit", "Leave fullscreen"),
    ("POST", "/views/{view}/mode/{mode}", "Switch between map and grid"),
    ("POST", "/views/{view}/enquiry", "Submit an enquiry for the selected plot"),
    ("POST", "/views/{view}/dialog/dismiss", "Close the open dialog"),
    ("DELETE", "/views/{view}", "Navigate away"),

    // API
    ("GET", "/api/proxy-svg", "Same-origin SVG relay (?url=)"),
    ("GET", "/api/views/{view}", "View state JSON"),
    ("GET", "/api/health", "Health check"),

    // Static assets
    ("GET", "/static/plotmap.css", "Stylesheet"),
    ("GET", "/static/plotmap.js", "Delegated click and keyboard handling"),
];

/// Print all routes
pub fn print_routes() {
    println!("\nplotmap routes:");
    println!("{:-<72}", "");
    for (method, path, desc) in ROUTES {
        println!("{:6} {:34} {}", method, path, desc);
    }
    println!();
}

/// Check if the request comes from HTMX (has HX-Request header).
pub fn is_htmx(headers: &axum::http::HeaderMap) -> bool {
    headers.get("HX-Request").is_some()
}

/// HTML-escape a string for hand-built HTML responses.
pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}

/// Wrap fragment HTML in the page shell for direct URL access.
pub fn wrap_page(title: &str, content: &str) -> String {
    let base = r##"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>__TITLE__ | plotmap</title>
    <link rel="stylesheet" href="/static/plotmap.css">
    <script src="https://unpkg.com/htmx.org@2.0.4"></script>
    <script src="/static/plotmap.js" defer></script>
</head>
<body>
    <div id="spinner" class="htmx-indicator">Loading...</div>
    <main id="main">
__CONTENT__
    </main>
</body>
</html>"##;
    base.replace("__TITLE__", &html_escape(title))
        .replace("__CONTENT__", content)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderMap;

    #[test]
    fn test_html_escape() {
        assert_eq!(
            html_escape(r#"<a href="x">Tom's & Co</a>"#),
            "&lt;a href=&quot;x&quot;&gt;Tom&#x27;s &amp; Co&lt;/a&gt;"
        );
    }

    #[test]
    fn test_wrap_page_escapes_title_only() {
        let html = wrap_page("A<B", "<p>body</p>");
        assert!(html.contains("<title>A&lt;B | plotmap</title>"));
        assert!(html.contains("<p>body</p>"));
        assert!(html.contains(r#"<div id="spinner" class="htmx-indicator">"#));
    }

    #[test]
    fn test_is_htmx() {
        let mut headers = HeaderMap::new();
        assert!(!is_htmx(&headers));
        headers.insert("HX-Request", "true".parse().unwrap());
        assert!(is_htmx(&headers));
    }
}
