//! Page controllers.
//!
//! A [`Session`] holds one page's document and status messages. Loading a
//! view is split in two so the fetch can happen anywhere in between:
//!
//! 1. `begin_*` reads the page state, does the synchronous document updates
//!    (nav links, plot image, breadcrumbs) and returns a [`PendingLoad`].
//! 2. [`Session::complete`] takes the fetch result and renders it.
//!
//! Every `begin_*` starts a new navigation. A result that arrives for an
//! older navigation is dropped without touching the document, so a slow
//! response can never overwrite a newer view.

pub mod stats;

use serde_json::Value;

use crate::config::schema::TablesConfig;
use crate::dom::{Document, ElementKind, StatusLog, StatusSink};
use crate::error::{FetchError, PageError, RenderError};
use crate::escape::html_escape;
use crate::fetch::Fetch;
use crate::render::{self, listing};
use crate::state::{Period, StateCarrier, UrlHash};

use stats::{SiteStats, UriStats};

/// Which page a session renders.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageKind {
    /// `page.html`: one URI.
    Detail,
    /// `overview.html`: the whole site.
    Overview,
    /// `dir.html`: a directory of published files.
    Directory,
}

impl PageKind {
    fn elements(self) -> &'static [(&'static str, ElementKind)] {
        use ElementKind::{Anchor, Block, Image, Table};
        match self {
            Self::Detail => &[
                ("recentLink", Block),
                ("allLink", Block),
                ("hitsPlot", Image),
                ("underlying", Anchor),
                ("topUriRest", Table),
                ("topReferers", Table),
                ("topIpAddrs", Table),
                ("topUserAgents", Table),
                ("hits", Block),
                ("earliest", Block),
                ("latest", Block),
                ("uri_base", Block),
            ],
            Self::Overview => &[
                ("recentLink", Block),
                ("allLink", Block),
                ("hitsPlot", Image),
                ("topUrisPlotLink", Anchor),
                ("underlying", Anchor),
                ("topBlog", Table),
                ("topDownload", Table),
                ("topOther", Table),
                ("topReferers", Table),
                ("topIpAddrs", Table),
                ("topUserAgents", Table),
                ("hits", Block),
                ("earliest", Block),
                ("latest", Block),
            ],
            Self::Directory => &[
                ("breadcrumbs", Block),
                ("files", Table),
                ("dirs", Table),
            ],
        }
    }
}

/// Where a load ended up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadState {
    /// Fetched and rendered.
    Rendered,
    /// The fetch (or decoding its result) failed; reported, nothing rendered.
    Failed,
    /// A required parameter was missing; reported, nothing fetched.
    MissingParameter,
    /// A newer navigation started before this result arrived; discarded.
    Stale,
}

/// A load waiting for its resource.
#[derive(Debug, Clone)]
pub struct PendingLoad {
    generation: u64,
    url: String,
    target: Target,
}

#[derive(Debug, Clone)]
enum Target {
    Detail,
    Overview { url_hash: UrlHash },
    Directory { url_hash: UrlHash, path: String },
}

impl PendingLoad {
    /// Resource URL to fetch, relative to the page.
    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// One page being shown.
#[derive(Debug, Clone)]
pub struct Session {
    kind: PageKind,
    doc: Document,
    status: StatusLog,
    generation: u64,
    carrier: StateCarrier,
    tables: TablesConfig,
}

// ---------------------------------------------------------------------------
// Resource URLs
// ---------------------------------------------------------------------------

/// Stats JSON for `uri` (already filename escaped, or `ALL`).
pub fn stats_url(period: Period, uri: &str) -> String {
    format!("../analytics-data/{period}/stage3/stats.{uri}.json")
}

/// Hits-over-time plot for `uri`.
pub fn plot_url(period: Period, uri: &str) -> String {
    format!("../analytics-data/{period}/stage3/hits.{uri}.png")
}

/// Directory index for `path` (empty or ending in `/`).
pub fn index_url(path: &str) -> String {
    format!("{path}INDEX.json")
}

impl Session {
    pub fn new(kind: PageKind, carrier: StateCarrier, tables: TablesConfig) -> Self {
        Self {
            kind,
            doc: Document::with_elements(kind.elements()),
            status: StatusLog::default(),
            generation: 0,
            carrier,
            tables,
        }
    }

    pub fn kind(&self) -> PageKind {
        self.kind
    }

    pub fn document(&self) -> &Document {
        &self.doc
    }

    pub fn status(&self) -> &StatusLog {
        &self.status
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    fn next_generation(&mut self) -> u64 {
        self.generation += 1;
        self.generation
    }

    // -----------------------------------------------------------------------
    // Init
    // -----------------------------------------------------------------------

    /// Start showing one URI. Needs `uri_base`; `period` defaults to `all`.
    pub fn begin_detail(&mut self, hash: &str) -> Result<PendingLoad, PageError> {
        let generation = self.next_generation();
        let url_hash = UrlHash::parse(hash);
        let period = Period::from_state(&url_hash);

        render::show_nav_links(&mut self.doc, &url_hash, period, self.carrier);

        let Some(uri) = url_hash.get("uri_base") else {
            let err = PageError::MissingUri;
            self.status.report(&err.to_string());
            return Err(err);
        };

        let url = stats_url(period, uri);
        self.doc.set_attr("hitsPlot", "src", plot_url(period, uri));
        self.doc.set_attr("underlying", "href", url.clone());
        self.doc
            .set_inner_html("underlying", html_escape(&format!("stats.{uri}.json")));

        tracing::debug!(generation, %period, uri, "detail page");
        Ok(PendingLoad {
            generation,
            url,
            target: Target::Detail,
        })
    }

    /// Start showing the site-wide overview for `period`.
    pub fn begin_overview(&mut self, hash: &str) -> PendingLoad {
        let generation = self.next_generation();
        let url_hash = UrlHash::parse(hash);
        let period = Period::from_state(&url_hash);

        render::show_nav_links(&mut self.doc, &url_hash, period, self.carrier);

        let url = stats_url(period, "ALL");
        self.doc.set_attr("hitsPlot", "src", plot_url(period, "ALL"));
        self.doc
            .set_attr("topUrisPlotLink", "href", plot_url(period, "TOP_URIS"));
        self.doc.set_attr("underlying", "href", url.clone());
        self.doc
            .set_inner_html("underlying", "stats.ALL.json".to_string());

        tracing::debug!(generation, %period, "overview page");
        PendingLoad {
            generation,
            url,
            target: Target::Overview { url_hash },
        }
    }

    /// Start showing the directory named by `path` (default: the root).
    pub fn begin_dir(&mut self, hash: &str) -> PendingLoad {
        let generation = self.next_generation();
        let url_hash = UrlHash::parse(hash);
        let path = url_hash.get("path").unwrap_or_default().to_string();

        let crumbs = listing::breadcrumbs(&url_hash, &path, self.carrier);
        self.doc.set_inner_html("breadcrumbs", crumbs);

        tracing::debug!(generation, path = %path, "directory page");
        PendingLoad {
            generation,
            url: index_url(&path),
            target: Target::Directory { url_hash, path },
        }
    }

    // -----------------------------------------------------------------------
    // Completion
    // -----------------------------------------------------------------------

    /// Render the result of a fetch started by a `begin_*` call.
    pub fn complete(&mut self, load: PendingLoad, result: Result<Value, FetchError>) -> LoadState {
        if load.generation != self.generation {
            tracing::debug!(
                stale = load.generation,
                current = self.generation,
                url = %load.url,
                "dropping response for an old navigation"
            );
            return LoadState::Stale;
        }

        let value = match result {
            Ok(value) => value,
            Err(e) => {
                self.status.report(&e.to_string());
                return LoadState::Failed;
            }
        };

        // Decode fully before touching the document so a bad file renders
        // nothing at all.
        let rendered = match load.target {
            Target::Detail => match serde_json::from_value::<UriStats>(value) {
                Ok(stats) => self.show_detail(&stats),
                Err(e) => return self.report_parse_error(&load.url, e),
            },
            Target::Overview { url_hash } => match serde_json::from_value::<SiteStats>(value) {
                Ok(stats) => self.show_overview(&stats, &url_hash),
                Err(e) => return self.report_parse_error(&load.url, e),
            },
            Target::Directory { url_hash, path } => match listing::parse_index(value) {
                Ok(entries) => {
                    listing::show_listing(&entries, &mut self.doc, &url_hash, &path, self.carrier)
                }
                Err(e) => return self.report_parse_error(&load.url, e),
            },
        };

        match rendered {
            Ok(()) => LoadState::Rendered,
            Err(e) => {
                self.status.report(&format!("Render error: {e}"));
                LoadState::Failed
            }
        }
    }

    fn report_parse_error(&mut self, url: &str, source: serde_json::Error) -> LoadState {
        let err = FetchError::Parse {
            url: url.to_string(),
            source,
        };
        self.status.report(&err.to_string());
        LoadState::Failed
    }

    fn show_detail(&mut self, stats: &UriStats) -> Result<(), RenderError> {
        let t = &self.tables;
        let doc = &mut self.doc;
        render::show_top_as_code(&stats.uri_rest_hist, doc, "topUriRest", t.uri_rest)?;
        render::show_top_as_links(&stats.referer_hist, doc, "topReferers", t.referers)?;
        render::show_top_as_code(&stats.ip_addr_hist, doc, "topIpAddrs", t.ip_addrs)?;
        render::show_top_as_code(&stats.user_agent_hist, doc, "topUserAgents", t.user_agents)?;
        render::show_single(&stats.single, doc);
        Ok(())
    }

    fn show_overview(&mut self, stats: &SiteStats, url_hash: &UrlHash) -> Result<(), RenderError> {
        let t = &self.tables;
        let carrier = self.carrier;
        let doc = &mut self.doc;
        render::show_top_uri_links(&stats.blog_hist, doc, "topBlog", url_hash, carrier, t.blog)?;
        render::show_top_uri_links(
            &stats.download_hist,
            doc,
            "topDownload",
            url_hash,
            carrier,
            t.downloads,
        )?;
        render::show_top_uri_links(
            &stats.other_uri_hist,
            doc,
            "topOther",
            url_hash,
            carrier,
            t.other_uris,
        )?;
        render::show_top_as_code(&stats.referer_hist, doc, "topReferers", t.referers)?;
        render::show_top_as_code(&stats.ip_addr_hist, doc, "topIpAddrs", t.ip_addrs)?;
        render::show_top_as_code(&stats.user_agent_hist, doc, "topUserAgents", t.user_agents)?;
        render::show_single(&stats.single, doc);
        Ok(())
    }

    // -----------------------------------------------------------------------
    // One-shot loads
    // -----------------------------------------------------------------------

    /// Begin, fetch and complete a detail page load.
    pub fn load_detail(&mut self, hash: &str, fetcher: &dyn Fetch) -> LoadState {
        match self.begin_detail(hash) {
            Ok(load) => self.fetch_and_complete(load, fetcher),
            Err(PageError::MissingUri) => LoadState::MissingParameter,
        }
    }

    /// Begin, fetch and complete an overview page load.
    pub fn load_overview(&mut self, hash: &str, fetcher: &dyn Fetch) -> LoadState {
        let load = self.begin_overview(hash);
        self.fetch_and_complete(load, fetcher)
    }

    /// Begin, fetch and complete a directory page load.
    pub fn load_dir(&mut self, hash: &str, fetcher: &dyn Fetch) -> LoadState {
        let load = self.begin_dir(hash);
        self.fetch_and_complete(load, fetcher)
    }

    fn fetch_and_complete(&mut self, load: PendingLoad, fetcher: &dyn Fetch) -> LoadState {
        let result = fetcher.fetch_json(load.url());
        self.complete(load, result)
    }
}
