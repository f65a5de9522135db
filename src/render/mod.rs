//! Turn histograms and summary records into page markup.
//!
//! All values come from web server logs (URIs, referrers, user agents), so
//! every value is HTML escaped before it is placed in markup, link text and
//! attributes alike.

pub mod listing;

use serde_json::{Map, Value};

use crate::dom::Document;
use crate::error::RenderError;
use crate::escape::{filename_escape, html_escape};
use crate::format::{format_timestamp, format_value};
use crate::histogram::Histogram;
use crate::state::{Period, StateCarrier, UrlHash};

/// Page that shows a single URI.
pub const DETAIL_PAGE: &str = "page.html";

// ---------------------------------------------------------------------------
// Histogram tables
// ---------------------------------------------------------------------------

/// Build `<tr>` rows for the top `max` entries, rendering each value with
/// `cell`.
fn table_rows(hist: &Histogram, max: usize, cell: impl Fn(&str) -> String) -> String {
    let mut html = String::new();
    for entry in hist.top_n(max) {
        html.push_str("<tr>");
        html.push_str(&format!("<td>{}</td>", entry.display_count));
        html.push_str(&format!("<td>{}</td>", cell(entry.value)));
        html.push_str("</tr>");
    }
    html
}

/// Rows linking each URI to its own detail page.
///
/// The link keeps the current page state and sets `uri_base` to the
/// filename-escaped URI.
pub fn show_top_uri_links(
    hist: &Histogram,
    doc: &mut Document,
    table_id: &str,
    url_hash: &UrlHash,
    carrier: StateCarrier,
    max: usize,
) -> Result<(), RenderError> {
    let rows = table_rows(hist, max, |uri| {
        let escaped = filename_escape(uri);
        let query = url_hash.modify_and_encode(&[("uri_base", escaped.as_str())]);
        format!(
            r#"<a href="{}">{}</a>"#,
            html_escape(&carrier.link(DETAIL_PAGE, &query)),
            html_escape(uri)
        )
    });
    doc.replace_table_body(table_id, rows)
}

/// Rows whose values are external links (referrers).
pub fn show_top_as_links(
    hist: &Histogram,
    doc: &mut Document,
    table_id: &str,
    max: usize,
) -> Result<(), RenderError> {
    let rows = table_rows(hist, max, |value| {
        let value = html_escape(value);
        format!(r#"<a href="{value}">{value}</a>"#)
    });
    doc.replace_table_body(table_id, rows)
}

/// Rows whose values are shown as code (IPs, user agents, URI suffixes).
pub fn show_top_as_code(
    hist: &Histogram,
    doc: &mut Document,
    table_id: &str,
    max: usize,
) -> Result<(), RenderError> {
    let rows = table_rows(hist, max, |value| {
        format!("<code>{}</code>", html_escape(value))
    });
    doc.replace_table_body(table_id, rows)
}

// ---------------------------------------------------------------------------
// Single values
// ---------------------------------------------------------------------------

/// Fill the summary elements from the `single` record.
///
/// Each field goes to the element with the same id; fields without an
/// element are skipped.
pub fn show_single(record: &Map<String, Value>, doc: &mut Document) {
    for (name, value) in record {
        let html = match name.as_str() {
            "earliest" | "latest" => single_timestamp(value),
            "uri_base" => single_uri(value),
            _ => format!("<b>{}</b>", html_escape(&format_value(value))),
        };
        if !doc.set_inner_html(name, html) {
            tracing::debug!(field = %name, "no element for summary field");
        }
    }
}

fn single_timestamp(value: &Value) -> String {
    let formatted = value
        .as_i64()
        .or_else(|| value.as_f64().map(|f| f as i64))
        .and_then(format_timestamp);
    match formatted {
        Some(date) => date,
        None => html_escape(&format_value(value)),
    }
}

fn single_uri(value: &Value) -> String {
    let uri = html_escape(&format_value(value));
    if is_linkable(value.as_str().unwrap_or_default()) {
        format!(r#"<a href="{uri}">{uri}</a>"#)
    } else {
        uri
    }
}

/// Only site paths and http(s) URLs become links.
fn is_linkable(uri: &str) -> bool {
    uri.starts_with('/') || uri.starts_with("http://") || uri.starts_with("https://")
}

// ---------------------------------------------------------------------------
// Navigation
// ---------------------------------------------------------------------------

/// Update the `recentLink` / `allLink` toggle: the current period is bold,
/// the other one links to the same view in that period.
pub fn show_nav_links(doc: &mut Document, url_hash: &UrlHash, period: Period, carrier: StateCarrier) {
    let other = period.other();
    let query = url_hash.modify_and_encode(&[("period", other.as_str())]);
    let link = format!(
        r#"<a href="{}">{other}</a>"#,
        html_escape(&carrier.link("", &query))
    );
    let current = format!("<b>{period}</b>");

    let (recent, all) = match period {
        Period::All => (link, current),
        Period::Recent => (current, link),
    };
    doc.set_inner_html("recentLink", recent);
    doc.set_inner_html("allLink", all);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::ElementKind;
    use serde_json::json;

    fn doc() -> Document {
        Document::with_elements(&[
            ("topUris", ElementKind::Table),
            ("topReferers", ElementKind::Table),
            ("topIpAddrs", ElementKind::Table),
            ("hits", ElementKind::Block),
            ("earliest", ElementKind::Block),
            ("uri_base", ElementKind::Block),
            ("recentLink", ElementKind::Block),
            ("allLink", ElementKind::Block),
        ])
    }

    fn hist(pairs: &[(&str, u64)]) -> Histogram {
        Histogram::from_parts(
            pairs.iter().map(|(v, _)| v.to_string()).collect(),
            pairs.iter().map(|(_, c)| *c).collect(),
        )
    }

    #[test]
    fn code_rows_escape_values() {
        let mut d = doc();
        let h = hist(&[("<script>alert(1)</script>", 12345), ("1.2.3.4", 7)]);
        show_top_as_code(&h, &mut d, "topIpAddrs", 5).unwrap();
        assert_eq!(
            d.inner_html("topIpAddrs"),
            "<tr><td>12,345</td><td><code>&lt;script&gt;alert(1)&lt;/script&gt;</code></td></tr>\
             <tr><td>7</td><td><code>1.2.3.4</code></td></tr>"
        );
    }

    #[test]
    fn link_rows_escape_href_and_text() {
        let mut d = doc();
        let h = hist(&[(r#"http://x/"><img src=x>"#, 3)]);
        show_top_as_links(&h, &mut d, "topReferers", 10).unwrap();
        let html = d.inner_html("topReferers");
        assert!(html.contains(r#"href="http://x/&quot;&gt;&lt;img src=x&gt;""#), "{html}");
        assert!(!html.contains("<img"));
    }

    #[test]
    fn uri_links_point_at_detail_page_with_escaped_uri() {
        let mut d = doc();
        let state = UrlHash::parse("#period=recent&uri_base=_2F_");
        let h = hist(&[("/blog/?a=1&b=<2>", 40)]);
        show_top_uri_links(&h, &mut d, "topUris", &state, StateCarrier::Fragment, 40).unwrap();
        assert_eq!(
            d.inner_html("topUris"),
            "<tr><td>40</td><td><a href=\"page.html#period=recent&amp;uri_base=_2F_blog_2F__3F_a_3D_1_26_b_3D_%3C2%3E\">\
             /blog/?a=1&amp;b=&lt;2&gt;</a></td></tr>"
        );
    }

    #[test]
    fn empty_histogram_clears_table() {
        let mut d = doc();
        d.replace_table_body("topIpAddrs", "<tr><td>old</td></tr>".into())
            .unwrap();
        show_top_as_code(&Histogram::default(), &mut d, "topIpAddrs", 5).unwrap();
        assert_eq!(d.inner_html("topIpAddrs"), "");
    }

    #[test]
    fn max_beyond_length_renders_all_rows() {
        let mut d = doc();
        let h = hist(&[("a", 3), ("b", 2)]);
        show_top_as_code(&h, &mut d, "topIpAddrs", 100).unwrap();
        assert_eq!(d.inner_html("topIpAddrs").matches("<tr>").count(), 2);
    }

    #[test]
    fn missing_table_is_an_error() {
        let mut d = doc();
        let err = show_top_as_code(&hist(&[("a", 1)]), &mut d, "nope", 5).unwrap_err();
        assert_eq!(err, RenderError::MissingTarget("nope".into()));
    }

    #[test]
    fn single_formats_each_field_kind() {
        let mut d = doc();
        let record = json!({"hits": 12345, "earliest": 1_700_000_000, "uri_base": "/x", "unknown": 1});
        show_single(record.as_object().unwrap(), &mut d);
        assert_eq!(d.inner_html("hits"), "<b>12,345</b>");
        assert!(d.inner_html("earliest").contains("2023"));
        assert_eq!(d.inner_html("uri_base"), r#"<a href="/x">/x</a>"#);
        assert!(d.get("unknown").is_none());
    }

    #[test]
    fn single_uri_base_is_escaped_and_not_linked_when_unsafe() {
        let mut d = doc();
        let record = json!({"uri_base": "javascript:alert('x')"});
        show_single(record.as_object().unwrap(), &mut d);
        assert_eq!(d.inner_html("uri_base"), "javascript:alert(&#39;x&#39;)");

        let record = json!({"uri_base": "/a\"><b>"});
        show_single(record.as_object().unwrap(), &mut d);
        assert_eq!(
            d.inner_html("uri_base"),
            r#"<a href="/a&quot;&gt;&lt;b&gt;">/a&quot;&gt;&lt;b&gt;</a>"#
        );
    }

    #[test]
    fn single_escapes_string_values() {
        let mut d = doc();
        let record = json!({"hits": "<i>many</i>"});
        show_single(record.as_object().unwrap(), &mut d);
        assert_eq!(d.inner_html("hits"), "<b>&lt;i&gt;many&lt;/i&gt;</b>");
    }

    #[test]
    fn nav_links_toggle_period() {
        let mut d = doc();
        let state = UrlHash::parse("#period=all&uri_base=_2F_x");
        show_nav_links(&mut d, &state, Period::All, StateCarrier::Fragment);
        assert_eq!(
            d.inner_html("recentLink"),
            r##"<a href="#period=recent&amp;uri_base=_2F_x">recent</a>"##
        );
        assert_eq!(d.inner_html("allLink"), "<b>all</b>");

        show_nav_links(&mut d, &state, Period::Recent, StateCarrier::Query);
        assert_eq!(d.inner_html("recentLink"), "<b>recent</b>");
        assert_eq!(
            d.inner_html("allLink"),
            r#"<a href="?period=all&amp;uri_base=_2F_x">all</a>"#
        );
    }
}
