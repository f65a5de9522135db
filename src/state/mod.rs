//! Page state carried in the URL fragment.
//!
//! The fragment is a query-string style list of `key=value` pairs joined by
//! `&`, with keys and values percent-encoded:
//!
//! ```text
//! #period=recent&uri_base=_2F_blog_2F_
//! ```
//!
//! [`UrlHash`] is built once per page load and never mutated. Links to other
//! views are produced with [`UrlHash::modify_and_encode`], which returns a new
//! string and leaves the parsed state untouched.

use std::borrow::Cow;
use std::fmt;

/// Parsed fragment state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UrlHash {
    pairs: Vec<(String, String)>,
}

impl UrlHash {
    /// Parse a raw fragment.
    ///
    /// A leading `#` (or `?`, for query strings) is ignored. Empty segments
    /// are skipped, a segment without `=` gets an empty value, and a repeated
    /// key keeps its first position with the last value seen.
    pub fn parse(raw: &str) -> Self {
        let raw = raw
            .strip_prefix('#')
            .or_else(|| raw.strip_prefix('?'))
            .unwrap_or(raw);

        let mut state = Self::default();
        for segment in raw.split('&').filter(|s| !s.is_empty()) {
            let (key, value) = segment.split_once('=').unwrap_or((segment, ""));
            state.set(decode(key), decode(value));
        }
        state
    }

    /// Look up a key. Absent keys are `None`; callers supply the default.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Iterate over `(key, value)` pairs in fragment order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pairs.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Encode the current state merged with `overrides`.
    ///
    /// Keys in `overrides` replace existing values in place or are appended
    /// in the order given; every other key is carried over unchanged. The
    /// result is safe to put directly after `#` in an `href`.
    pub fn modify_and_encode(&self, overrides: &[(&str, &str)]) -> String {
        let mut merged = self.clone();
        for (key, value) in overrides {
            merged.set((*key).to_string(), (*value).to_string());
        }
        merged
            .pairs
            .iter()
            .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
            .collect::<Vec<_>>()
            .join("&")
    }

    /// Encode the current state without changes.
    pub fn encode(&self) -> String {
        self.modify_and_encode(&[])
    }

    fn set(&mut self, key: String, value: String) {
        match self.pairs.iter_mut().find(|(k, _)| *k == key) {
            Some((_, existing)) => *existing = value,
            None => self.pairs.push((key, value)),
        }
    }
}

/// How page state is attached to a link.
///
/// Static pages keep it in the fragment. The server renders pages itself and
/// never sees fragments, so its links carry state in the query string.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StateCarrier {
    #[default]
    Fragment,
    Query,
}

impl StateCarrier {
    pub fn marker(self) -> char {
        match self {
            Self::Fragment => '#',
            Self::Query => '?',
        }
    }

    /// `target` plus encoded state, e.g. `page.html#uri_base=_2F_`.
    pub fn link(self, target: &str, encoded_state: &str) -> String {
        format!("{target}{}{encoded_state}", self.marker())
    }
}

/// Which slice of the logs a detail page shows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Period {
    #[default]
    All,
    Recent,
}

impl Period {
    /// Read `period` from the state, defaulting to [`Period::All`].
    pub fn from_state(state: &UrlHash) -> Self {
        match state.get("period") {
            None | Some("all") => Self::All,
            Some("recent") => Self::Recent,
            Some(other) => {
                tracing::warn!(period = other, "unknown period, showing all");
                Self::All
            }
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Recent => "recent",
        }
    }

    /// The period the nav toggle links to.
    pub fn other(self) -> Self {
        match self {
            Self::All => Self::Recent,
            Self::Recent => Self::All,
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Percent-decode, keeping the raw text when it does not decode to UTF-8.
fn decode(s: &str) -> String {
    urlencoding::decode(s)
        .map(Cow::into_owned)
        .unwrap_or_else(|_| s.to_string())
}
