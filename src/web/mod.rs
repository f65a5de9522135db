//! Dashboard web server.
//!
//! Provides a lightweight HTTP server (sync, via `tiny_http`) that serves:
//! - The detail, overview and directory pages, rendered on the server
//! - The stats files, plots and listings under the site root
//!
//! Browsers do not send the URL fragment, so the server reads page state from
//! the query string and renders its links the same way
//! (`page.html?period=recent&uri_base=...`).
//!
//! Launched via `hitstats serve` (default: `http://127.0.0.1:9747`).

pub mod templates;

use std::io::Cursor;
use std::path::Path;

use anyhow::{Context, Result};
use tiny_http::{Header, Method, Response, Server, StatusCode};

use crate::config::HitstatsConfig;
use crate::error::FetchError;
use crate::fetch::FsFetcher;
use crate::page::{LoadState, PageKind, Session};
use crate::state::StateCarrier;

type HttpResponse = Response<Cursor<Vec<u8>>>;

// ---------------------------------------------------------------------------
// Server entry point
// ---------------------------------------------------------------------------

/// Start the dashboard server on the configured address.
///
/// Blocks the current thread. Handles requests sequentially, each with its
/// own page session. Errors are handled per request without stopping the
/// server.
pub fn serve(config: &HitstatsConfig) -> Result<()> {
    let addr = config.server.addr.as_str();
    let server = Server::http(addr)
        .map_err(|e| anyhow::anyhow!("failed to start HTTP server on {addr}: {e}"))?;

    let site = Site::new(config);
    let url = format!("http://{addr}/{}/overview.html", site.pages_dir);
    tracing::info!(%url, root = %site.fetcher.root().display(), "dashboard running");

    if config.server.open_browser
        && let Err(e) = open_browser(&url)
    {
        tracing::warn!(error = %e, "could not open browser");
    }

    for request in server.incoming_requests() {
        let method = request.method().clone();
        let url = request.url().to_string();

        let resp = match site.dispatch(&method, &url) {
            Ok(resp) => resp,
            Err(e) => {
                tracing::error!(%method, %url, error = %e, "request failed");
                let body = serde_json::json!({ "error": e.to_string() }).to_string();
                Response::from_data(body.into_bytes())
                    .with_header(content_type("application/json; charset=utf-8"))
                    .with_status_code(StatusCode(500))
            }
        };
        let status = resp.status_code().0;

        if let Err(e) = request.respond(resp) {
            tracing::warn!(%url, error = %e, "failed to send response");
        }

        access_log(&method, &url, status);
    }

    Ok(())
}

/// One structured line per request; the subscriber adds the timestamp.
fn access_log(method: &Method, url: &str, status: u16) {
    tracing::info!(%method, url, status, "request");
}

// ---------------------------------------------------------------------------
// Router
// ---------------------------------------------------------------------------

/// Everything a request handler needs.
pub struct Site {
    fetcher: FsFetcher,
    pages_dir: String,
    config: HitstatsConfig,
}

impl Site {
    pub fn new(config: &HitstatsConfig) -> Self {
        let pages_dir = config.site.pages_dir.trim_matches('/').to_string();
        Self {
            fetcher: FsFetcher::new(&config.site.root, &pages_dir),
            pages_dir,
            config: config.clone(),
        }
    }

    /// Dispatch a request to the page renderers or the static file handler.
    pub fn dispatch(&self, method: &Method, url: &str) -> Result<HttpResponse> {
        if *method != Method::Get && *method != Method::Head {
            return Ok(text_response(405, "method not allowed"));
        }

        let (path, query) = url.split_once('?').unwrap_or((url, ""));
        if path == "/" {
            let location = format!("/{}/overview.html", self.pages_dir);
            return Ok(Response::from_data(Vec::new())
                .with_header(header("Location", &location))
                .with_status_code(StatusCode(302)));
        }

        let page = path
            .strip_prefix('/')
            .and_then(|p| p.strip_prefix(self.pages_dir.as_str()))
            .and_then(|p| p.strip_prefix('/'));

        match page {
            Some("page.html") => Ok(self.render(PageKind::Detail, query)),
            Some("overview.html") => Ok(self.render(PageKind::Overview, query)),
            Some("dir.html") => Ok(self.render(PageKind::Directory, query)),
            Some("wild.css") => Ok(Response::from_data(templates::STYLESHEET.as_bytes().to_vec())
                .with_header(content_type("text/css; charset=utf-8"))),
            _ => self.serve_file(path),
        }
    }

    /// Render a page for the state in `query`.
    ///
    /// A page whose data could not be loaded is still a page: it shows the
    /// status message, and the HTTP status tells scripts what happened.
    fn render(&self, kind: PageKind, query: &str) -> HttpResponse {
        let mut session = Session::new(kind, StateCarrier::Query, self.config.tables.clone());
        let state = match kind {
            PageKind::Detail => session.load_detail(query, &self.fetcher),
            PageKind::Overview => session.load_overview(query, &self.fetcher),
            PageKind::Directory => session.load_dir(query, &self.fetcher),
        };

        let code = match state {
            LoadState::Rendered => 200,
            LoadState::MissingParameter => 400,
            LoadState::Failed | LoadState::Stale => 502,
        };
        Response::from_data(templates::render_page(&session).into_bytes())
            .with_header(content_type("text/html; charset=utf-8"))
            .with_status_code(StatusCode(code))
    }

    /// Serve a file under the site root.
    fn serve_file(&self, path: &str) -> Result<HttpResponse> {
        let decoded = urlencoding::decode(path).context("request path is not valid UTF-8")?;
        let file = match self.fetcher.resolve(&decoded) {
            Ok(file) => file,
            Err(FetchError::OutsideRoot { .. }) => return Ok(text_response(403, "forbidden")),
            Err(e) => return Err(e.into()),
        };

        if !file.is_file() {
            return Ok(text_response(404, "not found"));
        }
        let data = std::fs::read(&file)
            .inspect_err(|e| tracing::warn!(file = %file.display(), error = %e, "static file unreadable"))
            .with_context(|| format!("failed to read {path}"))?;
        Ok(Response::from_data(data).with_header(content_type(guess_content_type(&file))))
    }
}

// ---------------------------------------------------------------------------
// Response helpers
// ---------------------------------------------------------------------------

fn text_response(code: u16, body: &str) -> HttpResponse {
    Response::from_data(body.as_bytes().to_vec())
        .with_header(content_type("text/plain; charset=utf-8"))
        .with_status_code(StatusCode(code))
}

fn header(name: &str, value: &str) -> Header {
    Header::from_bytes(name.as_bytes(), value.as_bytes()).unwrap()
}

fn content_type(value: &str) -> Header {
    header("Content-Type", value)
}

fn guess_content_type(path: &Path) -> &'static str {
    match path.extension().and_then(|e| e.to_str()) {
        Some("json") => "application/json; charset=utf-8",
        Some("png") => "image/png",
        Some("html") => "text/html; charset=utf-8",
        Some("css") => "text/css; charset=utf-8",
        Some("js") => "text/javascript; charset=utf-8",
        Some("txt") | Some("log") => "text/plain; charset=utf-8",
        _ => "application/octet-stream",
    }
}

/// Attempt to open a URL in the system default browser.
fn open_browser(url: &str) -> Result<()> {
    #[cfg(target_os = "windows")]
    {
        std::process::Command::new("cmd")
            .args(["/C", "start", url])
            .spawn()
            .context("failed to open browser")?;
    }

    #[cfg(target_os = "macos")]
    {
        std::process::Command::new("open")
            .arg(url)
            .spawn()
            .context("failed to open browser")?;
    }

    #[cfg(target_os = "linux")]
    {
        std::process::Command::new("xdg-open")
            .arg(url)
            .spawn()
            .context("failed to open browser")?;
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
