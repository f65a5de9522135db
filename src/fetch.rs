//! Loading the JSON resources a page asks for.
//!
//! Pages build URLs relative to their own location, for example
//! `../analytics-data/all/stage3/stats.ALL.json` from `web/page.html`.
//! [`FsFetcher`] resolves those against a directory on disk and
//! [`HttpFetcher`] against a published site, using the synchronous `ureq`
//! client.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde_json::Value;

use crate::error::FetchError;

/// Source of JSON documents for page controllers.
pub trait Fetch {
    /// Fetch and parse the resource at `url` (relative to the page).
    fn fetch_json(&self, url: &str) -> Result<Value, FetchError>;
}

impl<F: Fetch + ?Sized> Fetch for &F {
    fn fetch_json(&self, url: &str) -> Result<Value, FetchError> {
        (**self).fetch_json(url)
    }
}

// ---------------------------------------------------------------------------
// URL resolution
// ---------------------------------------------------------------------------

/// Resolve `url` against the directory `base` (both `/` separated, relative
/// to the site root). Returns the path segments, or `None` when the result
/// would leave the root.
fn resolve_segments(base: &str, url: &str) -> Option<Vec<String>> {
    let url = url.split(['?', '#']).next().unwrap_or_default();
    let (start, rest) = match url.strip_prefix('/') {
        Some(absolute) => ("", absolute),
        None => (base, url),
    };

    let mut segments: Vec<String> = Vec::new();
    for part in start.split('/').chain(rest.split('/')) {
        match part {
            "" | "." => {}
            ".." => {
                segments.pop()?;
            }
            other => segments.push(other.to_string()),
        }
    }
    Some(segments)
}

// ---------------------------------------------------------------------------
// Filesystem
// ---------------------------------------------------------------------------

/// Reads resources from a site directory on disk.
#[derive(Debug, Clone)]
pub struct FsFetcher {
    root: PathBuf,
    base: String,
}

impl FsFetcher {
    /// `root` is the site directory; `pages_dir` is where the pages live
    /// inside it, which is what relative URLs are resolved against.
    pub fn new(root: impl Into<PathBuf>, pages_dir: &str) -> Self {
        Self {
            root: root.into(),
            base: pages_dir.to_string(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Map a page-relative URL to a file under the root.
    pub fn resolve(&self, url: &str) -> Result<PathBuf, FetchError> {
        if url.contains("://") {
            return Err(FetchError::OutsideRoot { url: url.to_string() });
        }
        let segments = resolve_segments(&self.base, url)
            .ok_or_else(|| FetchError::OutsideRoot { url: url.to_string() })?;
        Ok(segments.iter().fold(self.root.clone(), |path, s| path.join(s)))
    }
}

impl Fetch for FsFetcher {
    fn fetch_json(&self, url: &str) -> Result<Value, FetchError> {
        let path = self.resolve(url)?;
        tracing::debug!(url, path = %path.display(), "reading resource");
        let bytes = fs::read(&path).map_err(|source| {
            tracing::warn!(url, path = %path.display(), error = %source, "resource unreadable");
            FetchError::Io {
                url: url.to_string(),
                source,
            }
        })?;
        serde_json::from_slice(&bytes).map_err(|source| FetchError::Parse {
            url: url.to_string(),
            source,
        })
    }
}

// ---------------------------------------------------------------------------
// HTTP
// ---------------------------------------------------------------------------

/// Fetches resources from a published site over HTTP.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    origin: String,
    base: String,
    timeout: Duration,
}

impl HttpFetcher {
    /// `page_url` is the URL of the directory holding the pages, e.g.
    /// `https://example.com/web/`.
    pub fn new(page_url: &str, timeout: Duration) -> Self {
        let after_scheme = page_url.find("://").map(|i| i + 3).unwrap_or(0);
        let (origin, path) = match page_url[after_scheme..].find('/') {
            Some(i) => page_url.split_at(after_scheme + i),
            None => (page_url, ""),
        };
        // A base without a trailing slash names a page; drop it.
        let base = match path.rfind('/') {
            Some(i) => &path[..=i],
            None => "",
        };
        Self {
            origin: origin.to_string(),
            base: base.to_string(),
            timeout,
        }
    }

    /// Absolute URL for a page-relative `url`.
    pub fn resolve(&self, url: &str) -> Result<String, FetchError> {
        if url.contains("://") {
            return Ok(url.to_string());
        }
        let segments = resolve_segments(&self.base, url)
            .ok_or_else(|| FetchError::OutsideRoot { url: url.to_string() })?;
        Ok(format!("{}/{}", self.origin, segments.join("/")))
    }
}

impl Fetch for HttpFetcher {
    fn fetch_json(&self, url: &str) -> Result<Value, FetchError> {
        let full = self.resolve(url)?;
        tracing::debug!(url = %full, "fetching resource");

        let resp = match ureq::get(&full).timeout(self.timeout).call() {
            Ok(resp) => resp,
            Err(ureq::Error::Status(status, _)) => {
                return Err(FetchError::Http { url: full, status });
            }
            Err(e) => {
                return Err(FetchError::Transport {
                    url: full,
                    message: e.to_string(),
                });
            }
        };

        let body = resp.into_string().map_err(|e| FetchError::Transport {
            url: full.clone(),
            message: e.to_string(),
        })?;
        serde_json::from_str(&body).map_err(|source| FetchError::Parse { url: full, source })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_segments_handles_dot_dot() {
        assert_eq!(
            resolve_segments("web/", "../analytics-data/all/stage3/stats.ALL.json").unwrap(),
            ["analytics-data", "all", "stage3", "stats.ALL.json"]
        );
        assert_eq!(resolve_segments("web/", "INDEX.json").unwrap(), ["web", "INDEX.json"]);
        assert_eq!(resolve_segments("web/", "/x.json").unwrap(), ["x.json"]);
        assert_eq!(resolve_segments("", "a/./b.json?x=1").unwrap(), ["a", "b.json"]);
    }

    #[test]
    fn resolve_segments_refuses_escaping_root() {
        assert!(resolve_segments("web/", "../../etc/passwd").is_none());
        assert!(resolve_segments("", "../x").is_none());
    }

    #[test]
    fn fs_fetcher_reads_json() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("web/logs")).unwrap();
        fs::write(dir.path().join("web/logs/INDEX.json"), r#"{"files": {}}"#).unwrap();

        let fetcher = FsFetcher::new(dir.path(), "web");
        let value = fetcher.fetch_json("logs/INDEX.json").unwrap();
        assert!(value["files"].is_object());
    }

    #[test]
    fn fs_fetcher_reports_missing_and_invalid_files() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("web")).unwrap();
        fs::write(dir.path().join("web/bad.json"), "{not json").unwrap();

        let fetcher = FsFetcher::new(dir.path(), "web");
        let err = fetcher.fetch_json("missing.json").unwrap_err();
        assert!(matches!(err, FetchError::Io { .. }));
        let message = err.to_string();
        assert!(message.starts_with("failed to read missing.json: "), "{message}");
        assert!(!message.contains(&dir.path().display().to_string()), "{message}");
        assert!(matches!(
            fetcher.fetch_json("bad.json"),
            Err(FetchError::Parse { .. })
        ));
        assert!(matches!(
            fetcher.fetch_json("../../outside.json"),
            Err(FetchError::OutsideRoot { .. })
        ));
        assert!(matches!(
            fetcher.fetch_json("http://evil/x.json"),
            Err(FetchError::OutsideRoot { .. })
        ));
    }

    #[test]
    fn http_fetcher_resolves_relative_urls() {
        let f = HttpFetcher::new("https://example.com/web/", Duration::from_secs(1));
        assert_eq!(
            f.resolve("../analytics-data/recent/stage3/stats.ALL.json").unwrap(),
            "https://example.com/analytics-data/recent/stage3/stats.ALL.json"
        );

        let f = HttpFetcher::new("https://example.com/web/page.html", Duration::from_secs(1));
        assert_eq!(f.resolve("INDEX.json").unwrap(), "https://example.com/web/INDEX.json");

        let f = HttpFetcher::new("http://localhost:8000", Duration::from_secs(1));
        assert_eq!(f.resolve("INDEX.json").unwrap(), "http://localhost:8000/INDEX.json");
        assert!(f.resolve("../x").is_err());
    }
}
