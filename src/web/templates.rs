//! HTML pages around a rendered [`Session`].
//!
//! Element contents produced by the renderers are already safe markup and
//! are inserted verbatim. Attribute values and status lines are escaped
//! here.

use crate::dom::Document;
use crate::escape::html_escape;
use crate::page::{PageKind, Session};

/// Stylesheet served next to the pages.
pub const STYLESHEET: &str = r#":root {
  --bg: #ffffff;
  --surface: #f6f8fa;
  --border: #d0d7de;
  --text: #1f2328;
  --text-muted: #656d76;
  --accent: #0969da;
  --red: #cf222e;
  --mono: 'SF Mono', 'Cascadia Code', 'Fira Code', monospace;
}

body {
  background: var(--bg);
  color: var(--text);
  font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Helvetica, Arial, sans-serif;
  font-size: 14px;
  margin: 2em auto;
  max-width: 60em;
}
a { color: var(--accent); }
code { font-family: var(--mono); font-size: 12px; word-break: break-all; }

#topbox { color: var(--text-muted); }
#status { color: var(--red); }
#status:empty { display: none; }

table {
  border-collapse: collapse;
  margin-bottom: 2em;
  width: 100%;
}
thead td {
  background: var(--surface);
  font-weight: bold;
}
td {
  border-bottom: 1px solid var(--border);
  padding: 4px 8px;
  vertical-align: top;
}
td:first-child { text-align: right; white-space: nowrap; width: 6em; }
td.name { text-align: left; }
.summary b { font-size: 16px; }
"#;

// ---------------------------------------------------------------------------
// Pieces
// ---------------------------------------------------------------------------

fn head(title: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{}</title>
<link rel="stylesheet" type="text/css" href="wild.css">
</head>
<body>
"#,
        html_escape(title)
    )
}

const FOOT: &str = "</body>\n</html>\n";

fn attr(doc: &Document, id: &str, name: &str) -> String {
    doc.get(id)
        .and_then(|e| e.attr(name))
        .map(html_escape)
        .unwrap_or_default()
}

fn block(doc: &Document, tag: &str, id: &str) -> String {
    format!(r#"<{tag} id="{id}">{}</{tag}>"#, doc.inner_html(id))
}

fn table(doc: &Document, id: &str, caption: &str, headers: &[&str]) -> String {
    let cells: String = headers.iter().map(|h| format!("<td>{h}</td>")).collect();
    format!(
        r#"<h3>{caption}</h3>
<table id="{id}">
  <thead><tr>{cells}</tr></thead>
  <tbody>{}</tbody>
</table>
"#,
        doc.inner_html(id)
    )
}

fn status(session: &Session) -> String {
    let lines: Vec<String> = session.status().lines().iter().map(|l| html_escape(l)).collect();
    format!(r#"<p id="status">{}</p>"#, lines.join("<br>\n"))
}

fn period_nav(doc: &Document) -> String {
    format!(
        r#"<p id="topbox">Period: {} | {}</p>"#,
        block(doc, "span", "recentLink"),
        block(doc, "span", "allLink")
    )
}

fn summary(doc: &Document, fields: &[(&str, &str)]) -> String {
    let rows: String = fields
        .iter()
        .map(|(id, label)| format!("  <li>{label}: {}</li>\n", block(doc, "span", id)))
        .collect();
    format!("<ul class=\"summary\">\n{rows}</ul>\n")
}

fn plot(doc: &Document) -> String {
    format!(
        r#"<p><img id="hitsPlot" src="{}" alt="hits over time"></p>"#,
        attr(doc, "hitsPlot", "src")
    )
}

fn underlying(doc: &Document) -> String {
    format!(
        r#"<p>Underlying data: <a id="underlying" href="{}">{}</a></p>"#,
        attr(doc, "underlying", "href"),
        doc.inner_html("underlying")
    )
}

// ---------------------------------------------------------------------------
// Pages
// ---------------------------------------------------------------------------

/// Full HTML for the session's page.
pub fn render_page(session: &Session) -> String {
    match session.kind() {
        PageKind::Detail => render_detail_page(session),
        PageKind::Overview => render_overview_page(session),
        PageKind::Directory => render_dir_page(session),
    }
}

fn render_detail_page(session: &Session) -> String {
    let doc = session.document();
    let mut html = head("Hits for one URI");
    html.push_str(&period_nav(doc));
    html.push_str(&status(session));
    html.push_str(&summary(
        doc,
        &[
            ("uri_base", "URI"),
            ("hits", "Hits"),
            ("earliest", "Earliest"),
            ("latest", "Latest"),
        ],
    ));
    html.push_str(&plot(doc));
    html.push_str(&table(doc, "topUriRest", "Query strings", &["Count", "Rest of URI"]));
    html.push_str(&table(doc, "topReferers", "Referrers", &["Count", "Referrer"]));
    html.push_str(&table(doc, "topIpAddrs", "IP addresses", &["Count", "IP address"]));
    html.push_str(&table(doc, "topUserAgents", "User agents", &["Count", "User agent"]));
    html.push_str(&underlying(doc));
    html.push_str(FOOT);
    html
}

fn render_overview_page(session: &Session) -> String {
    let doc = session.document();
    let mut html = head("Site hits");
    html.push_str(&period_nav(doc));
    html.push_str(&status(session));
    html.push_str(&summary(
        doc,
        &[("hits", "Hits"), ("earliest", "Earliest"), ("latest", "Latest")],
    ));
    html.push_str(&plot(doc));
    html.push_str(&format!(
        r#"<p><a id="topUrisPlotLink" href="{}">Top URIs over time</a></p>"#,
        attr(doc, "topUrisPlotLink", "href")
    ));
    html.push_str(&table(doc, "topBlog", "Blog posts", &["Count", "URI"]));
    html.push_str(&table(doc, "topDownload", "Downloads", &["Count", "URI"]));
    html.push_str(&table(doc, "topOther", "Other", &["Count", "URI"]));
    html.push_str(&table(doc, "topReferers", "Referrers", &["Count", "Referrer"]));
    html.push_str(&table(doc, "topIpAddrs", "IP addresses", &["Count", "IP address"]));
    html.push_str(&table(doc, "topUserAgents", "User agents", &["Count", "User agent"]));
    html.push_str(&underlying(doc));
    html.push_str(FOOT);
    html
}

fn render_dir_page(session: &Session) -> String {
    let doc = session.document();
    let mut html = head("Published files");
    html.push_str(&format!(
        "<p id=\"topbox\">{}</p>\n",
        block(doc, "span", "breadcrumbs")
    ));
    html.push_str(&status(session));
    html.push_str(&table(doc, "dirs", "Directories", &["Size", "Name"]));
    html.push_str(&table(doc, "files", "Files", &["Size", "Modified", "Name"]));
    html.push_str(FOOT);
    html
}
