//! In-memory page document.
//!
//! Renderers address elements by id, the same way a browser page would.
//! A [`Document`] is created with the element ids of its template; the
//! renderers overwrite contents and attributes but never add or remove
//! elements. `web::templates` turns a filled document into an HTML page.

use std::collections::BTreeMap;

use crate::error::RenderError;

/// What an element is, as far as rendering cares.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementKind {
    /// Any container whose inner HTML is replaced wholesale.
    Block,
    /// A `<table>`; its inner HTML is the body (`tBodies[0]`).
    Table,
    /// An `<img>`; only the `src` attribute is used.
    Image,
    /// An `<a>`; `href` attribute plus inner HTML.
    Anchor,
}

/// A single addressable element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    pub kind: ElementKind,
    pub inner_html: String,
    pub attrs: BTreeMap<String, String>,
}

impl Element {
    pub fn new(kind: ElementKind) -> Self {
        Self {
            kind,
            inner_html: String::new(),
            attrs: BTreeMap::new(),
        }
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs.get(name).map(String::as_str)
    }
}

/// The set of elements of one page, keyed by id.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Document {
    elements: BTreeMap<String, Element>,
}

impl Document {
    /// Build a document from `(id, kind)` pairs.
    pub fn with_elements(elements: &[(&str, ElementKind)]) -> Self {
        Self {
            elements: elements
                .iter()
                .map(|(id, kind)| ((*id).to_string(), Element::new(*kind)))
                .collect(),
        }
    }

    pub fn get(&self, id: &str) -> Option<&Element> {
        self.elements.get(id)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut Element> {
        self.elements.get_mut(id)
    }

    /// Inner HTML of `id`, or `""` when the element does not exist.
    pub fn inner_html(&self, id: &str) -> &str {
        self.get(id).map(|e| e.inner_html.as_str()).unwrap_or("")
    }

    /// Replace the inner HTML of `id`. Returns `false` if there is no such
    /// element.
    pub fn set_inner_html(&mut self, id: &str, html: String) -> bool {
        match self.get_mut(id) {
            Some(elem) => {
                elem.inner_html = html;
                true
            }
            None => false,
        }
    }

    /// Set an attribute on `id`. Returns `false` if there is no such element.
    pub fn set_attr(&mut self, id: &str, name: &str, value: String) -> bool {
        match self.get_mut(id) {
            Some(elem) => {
                elem.attrs.insert(name.to_string(), value);
                true
            }
            None => false,
        }
    }

    /// Replace the body of table `id`.
    ///
    /// Tables are mandatory render targets, so a missing or non-table
    /// element is an error rather than a silent skip.
    pub fn replace_table_body(&mut self, id: &str, rows: String) -> Result<(), RenderError> {
        match self.get_mut(id) {
            Some(elem) if elem.kind == ElementKind::Table => {
                elem.inner_html = rows;
                Ok(())
            }
            Some(_) => Err(RenderError::NotATable(id.to_string())),
            None => Err(RenderError::MissingTarget(id.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// Status messages
// ---------------------------------------------------------------------------

/// Sink for human-readable status lines (errors and progress).
pub trait StatusSink {
    fn report(&mut self, message: &str);
}

/// Status sink that keeps every line in order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatusLog {
    lines: Vec<String>,
}

impl StatusLog {
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

impl StatusSink for StatusLog {
    fn report(&mut self, message: &str) {
        tracing::warn!(status = message, "page status");
        self.lines.push(message.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc() -> Document {
        Document::with_elements(&[
            ("title", ElementKind::Block),
            ("rows", ElementKind::Table),
            ("plot", ElementKind::Image),
        ])
    }

    #[test]
    fn set_inner_html_only_touches_existing_elements() {
        let mut d = doc();
        assert!(d.set_inner_html("title", "<b>x</b>".into()));
        assert!(!d.set_inner_html("nope", "y".into()));
        assert_eq!(d.inner_html("title"), "<b>x</b>");
        assert_eq!(d.inner_html("nope"), "");
        assert!(d.get("nope").is_none());
    }

    #[test]
    fn replace_table_body_requires_a_table() {
        let mut d = doc();
        assert!(d.replace_table_body("rows", "<tr></tr>".into()).is_ok());
        assert_eq!(d.inner_html("rows"), "<tr></tr>");
        assert_eq!(
            d.replace_table_body("missing", String::new()),
            Err(RenderError::MissingTarget("missing".into()))
        );
        assert_eq!(
            d.replace_table_body("title", String::new()),
            Err(RenderError::NotATable("title".into()))
        );
    }

    #[test]
    fn set_attr_records_value() {
        let mut d = doc();
        assert!(d.set_attr("plot", "src", "a.png".into()));
        assert_eq!(d.get("plot").unwrap().attr("src"), Some("a.png"));
    }

    #[test]
    fn status_log_keeps_order() {
        let mut log = StatusLog::default();
        log.report("one");
        log.report("two");
        assert_eq!(log.lines(), ["one", "two"]);
    }
}
