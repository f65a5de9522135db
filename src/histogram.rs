//! Read-only view over the precomputed histograms in a stats file.
//!
//! A histogram is stored as two index-aligned arrays, already sorted by the
//! producer:
//!
//! ```json
//! { "top": { "value": ["/", "/blog/"], "count": [12345, 678] } }
//! ```

use serde::Deserialize;

use crate::format::format_count;

/// Number of rows shown when a caller does not pick a limit.
pub const DEFAULT_MAX_ROWS: usize = 5;

/// A histogram as found in a stats file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Histogram {
    pub top: TopValues,
}

/// The parallel `value` / `count` arrays.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct TopValues {
    #[serde(default)]
    pub value: Vec<String>,
    #[serde(default)]
    pub count: Vec<u64>,
}

/// One displayed row: the grouped count and the raw value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopEntry<'a> {
    pub display_count: String,
    pub value: &'a str,
}

/// Single-pass iterator over the first `n` entries of a histogram.
#[derive(Debug)]
pub struct TopN<'a> {
    top: &'a TopValues,
    next: usize,
    end: usize,
}

impl Histogram {
    pub fn from_parts(value: Vec<String>, count: Vec<u64>) -> Self {
        Self {
            top: TopValues { value, count },
        }
    }

    /// Number of usable rows. A producer that writes arrays of different
    /// lengths gets the shorter one.
    pub fn len(&self) -> usize {
        let (values, counts) = (self.top.value.len(), self.top.count.len());
        if values != counts {
            tracing::warn!(values, counts, "histogram arrays differ in length");
        }
        values.min(counts)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The first `min(len, max)` entries in stored order.
    pub fn top_n(&self, max: usize) -> TopN<'_> {
        TopN {
            top: &self.top,
            next: 0,
            end: self.len().min(max),
        }
    }

    /// Like [`top_n`](Self::top_n), defaulting to [`DEFAULT_MAX_ROWS`].
    pub fn top(&self, max: Option<usize>) -> TopN<'_> {
        self.top_n(max.unwrap_or(DEFAULT_MAX_ROWS))
    }
}

impl<'a> Iterator for TopN<'a> {
    type Item = TopEntry<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.next >= self.end {
            return None;
        }
        let i = self.next;
        self.next += 1;
        Some(TopEntry {
            display_count: format_count(self.top.count[i]),
            value: &self.top.value[i],
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.end - self.next;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for TopN<'_> {}
