//! Directory listing pages.
//!
//! Each directory of the published data has an `INDEX.json` next to it:
//!
//! ```json
//! {
//!   "files": { "access.log": { "size": 1024, "modified_at": 1700000000 } },
//!   "dirs":  { "2023": { "num_lines": 99 } }
//! }
//! ```
//!
//! `num_lines` is accepted as the size of an entry so older indexes keep
//! working.

use std::collections::BTreeMap;

use serde::Deserialize;
use serde_json::Value;

use crate::dom::Document;
use crate::error::RenderError;
use crate::escape::html_escape;
use crate::format::{format_count, format_timestamp};
use crate::state::{StateCarrier, UrlHash};

/// Page that shows a directory listing.
pub const DIR_PAGE: &str = "dir.html";

/// One file or directory in a listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntry {
    pub name: String,
    pub is_directory: bool,
    pub size: Option<u64>,
    pub modified_at: Option<i64>,
}

#[derive(Debug, Default, Deserialize)]
struct IndexFile {
    #[serde(default)]
    files: BTreeMap<String, EntryStats>,
    #[serde(default)]
    dirs: BTreeMap<String, EntryStats>,
}

#[derive(Debug, Default, Deserialize)]
struct EntryStats {
    #[serde(default, alias = "num_lines")]
    size: Option<u64>,
    #[serde(default)]
    modified_at: Option<i64>,
}

/// Read the entries of an `INDEX.json` document.
///
/// Directories come first, then files, each sorted by name.
pub fn parse_index(value: Value) -> Result<Vec<DirEntry>, serde_json::Error> {
    let index: IndexFile = serde_json::from_value(value)?;
    let entry = |is_directory| {
        move |(name, stats): (String, EntryStats)| DirEntry {
            name,
            is_directory,
            size: stats.size,
            modified_at: stats.modified_at,
        }
    };
    // BTreeMap iteration is already sorted by name.
    Ok(index
        .dirs
        .into_iter()
        .map(entry(true))
        .chain(index.files.into_iter().map(entry(false)))
        .collect())
}

/// Fill the `files` and `dirs` tables for the directory at `path`.
pub fn show_listing(
    entries: &[DirEntry],
    doc: &mut Document,
    url_hash: &UrlHash,
    path: &str,
    carrier: StateCarrier,
) -> Result<(), RenderError> {
    let mut files = String::new();
    let mut dirs = String::new();

    for entry in entries {
        let size = entry.size.map(format_count).unwrap_or_default();
        let name = html_escape(&entry.name);
        if entry.is_directory {
            let child = format!("{path}{}/", entry.name);
            let query = url_hash.modify_and_encode(&[("path", child.as_str())]);
            dirs.push_str(&format!(
                r#"<tr><td>{size}</td><td class="name"><a href="{}">{name}/</a></td></tr>"#,
                html_escape(&carrier.link(DIR_PAGE, &query))
            ));
        } else {
            let modified = entry
                .modified_at
                .and_then(format_timestamp)
                .unwrap_or_default();
            let href = encode_path(&format!("{path}{}", entry.name));
            files.push_str(&format!(
                r#"<tr><td>{size}</td><td>{modified}</td><td class="name"><a href="{}">{name}</a></td></tr>"#,
                html_escape(&href)
            ));
        }
    }

    if entries.is_empty() {
        files.push_str(r#"<tr><td colspan="3"><i>(empty dir)</i></td></tr>"#);
    }

    doc.replace_table_body("files", files)?;
    doc.replace_table_body("dirs", dirs)
}

/// Links to every ancestor of `path`; the current directory is not linked.
pub fn breadcrumbs(url_hash: &UrlHash, path: &str, carrier: StateCarrier) -> String {
    let parts: Vec<&str> = path.split('/').filter(|p| !p.is_empty()).collect();
    let mut crumbs = Vec::with_capacity(parts.len() + 1);

    let link = |target: &str, anchor: &str| {
        let query = url_hash.modify_and_encode(&[("path", target)]);
        format!(
            r#"<a href="{}">{}</a>"#,
            html_escape(&carrier.link(DIR_PAGE, &query)),
            html_escape(anchor)
        )
    };

    if parts.is_empty() {
        crumbs.push("root".to_string());
    } else {
        crumbs.push(link("", "root"));
    }
    for (i, part) in parts.iter().enumerate() {
        if i + 1 == parts.len() {
            crumbs.push(html_escape(part));
        } else {
            let target = format!("{}/", parts[..=i].join("/"));
            crumbs.push(link(&target, part));
        }
    }
    crumbs.join(" / ")
}

/// Percent-encode each segment of a relative path, keeping the slashes.
fn encode_path(path: &str) -> String {
    path.split('/')
        .map(|segment| urlencoding::encode(segment).into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::ElementKind;
    use serde_json::json;

    fn doc() -> Document {
        Document::with_elements(&[("files", ElementKind::Table), ("dirs", ElementKind::Table)])
    }

    #[test]
    fn parse_index_sorts_dirs_then_files() {
        let entries = parse_index(json!({
            "files": {"b.txt": {"size": 10}, "a.txt": {"num_lines": 2000, "modified_at": 1700000000}},
            "dirs": {"zeta": {}, "alpha": {"size": 5}}
        }))
        .unwrap();
        let names: Vec<_> = entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, ["alpha", "zeta", "a.txt", "b.txt"]);
        assert!(entries[0].is_directory);
        assert!(!entries[2].is_directory);
        assert_eq!(entries[2].size, Some(2000));
        assert_eq!(entries[2].modified_at, Some(1_700_000_000));
    }

    #[test]
    fn parse_index_accepts_missing_sections() {
        assert!(parse_index(json!({})).unwrap().is_empty());
        assert!(parse_index(json!({"files": []})).is_err());
    }

    #[test]
    fn listing_rows_link_files_and_subdirs() {
        let mut d = doc();
        let entries = vec![
            DirEntry {
                name: "logs".into(),
                is_directory: true,
                size: Some(1234),
                modified_at: None,
            },
            DirEntry {
                name: "a b.txt".into(),
                is_directory: false,
                size: None,
                modified_at: None,
            },
        ];
        let state = UrlHash::parse("#path=data%2F");
        show_listing(&entries, &mut d, &state, "data/", StateCarrier::Fragment).unwrap();
        assert_eq!(
            d.inner_html("dirs"),
            r#"<tr><td>1,234</td><td class="name"><a href="dir.html#path=data%2Flogs%2F">logs/</a></td></tr>"#
        );
        assert_eq!(
            d.inner_html("files"),
            r#"<tr><td></td><td></td><td class="name"><a href="data/a%20b.txt">a b.txt</a></td></tr>"#
        );
    }

    #[test]
    fn listing_escapes_names() {
        let mut d = doc();
        let entries = vec![DirEntry {
            name: "<x>".into(),
            is_directory: false,
            size: None,
            modified_at: None,
        }];
        show_listing(&entries, &mut d, &UrlHash::default(), "", StateCarrier::Fragment).unwrap();
        let html = d.inner_html("files");
        assert!(html.contains(">&lt;x&gt;</a>"), "{html}");
        assert!(html.contains(r#"href="%3Cx%3E""#), "{html}");
    }

    #[test]
    fn empty_listing_says_so() {
        let mut d = doc();
        show_listing(&[], &mut d, &UrlHash::default(), "", StateCarrier::Query).unwrap();
        assert!(d.inner_html("files").contains("(empty dir)"));
        assert_eq!(d.inner_html("dirs"), "");
    }

    #[test]
    fn breadcrumbs_link_ancestors_only() {
        let state = UrlHash::default();
        assert_eq!(breadcrumbs(&state, "", StateCarrier::Fragment), "root");
        assert_eq!(
            breadcrumbs(&state, "a/b/", StateCarrier::Fragment),
            r#"<a href="dir.html#path=">root</a> / <a href="dir.html#path=a%2F">a</a> / b"#
        );
    }
}
