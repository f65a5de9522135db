//! Error kinds of the dashboard core.
//!
//! Absent fragment keys are not errors (they are `None`). These types cover
//! the cases that must be surfaced to the user.

use thiserror::Error;

/// A required page parameter was not supplied.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PageError {
    /// `uri_base` is absent from the detail page state.
    #[error("Missing URI in URL hash.")]
    MissingUri,
}

/// A resource could not be fetched or decoded.
#[derive(Debug, Error)]
pub enum FetchError {
    /// `url` is the page-relative URL; the resolved file path only goes to
    /// the log.
    #[error("failed to read {url}: {source}")]
    Io {
        url: String,
        #[source]
        source: std::io::Error,
    },
    #[error("{url} returned HTTP {status}")]
    Http { url: String, status: u16 },
    #[error("request for {url} failed: {message}")]
    Transport { url: String, message: String },
    #[error("invalid JSON in {url}: {source}")]
    Parse {
        url: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("{url} resolves outside the site root")]
    OutsideRoot { url: String },
}

/// A render target is unusable.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RenderError {
    #[error("no element with id '{0}'")]
    MissingTarget(String),
    #[error("element '{0}' is not a table")]
    NotATable(String),
}
