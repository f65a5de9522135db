//! CLI command implementations.
//!
//! Provides subcommand handlers for:
//! - `hitstats page|overview|dir [HASH]` — render a page to stdout
//! - `hitstats escape URI...` — print filename-escaped URIs
//! - `hitstats config show|init|set|reset` — configuration management

use std::time::Duration;

use anyhow::Result;
use colored::Colorize;

use crate::config::{self, HitstatsConfig};
use crate::escape::filename_escape;
use crate::fetch::{Fetch, FsFetcher, HttpFetcher};
use crate::page::{LoadState, PageKind, Session};
use crate::state::StateCarrier;
use crate::web::templates;

// ---------------------------------------------------------------------------
// hitstats page | overview | dir
// ---------------------------------------------------------------------------

/// Render one page for `hash` and print the HTML.
///
/// Status messages go to stderr. Returns whether the page was fully
/// rendered.
pub fn run_render(
    cfg: &HitstatsConfig,
    kind: PageKind,
    hash: &str,
    base_url: Option<&str>,
) -> Result<bool> {
    let fetcher = build_fetcher(cfg, base_url);
    let mut session = Session::new(kind, StateCarrier::Fragment, cfg.tables.clone());

    let state = match kind {
        PageKind::Detail => session.load_detail(hash, fetcher.as_ref()),
        PageKind::Overview => session.load_overview(hash, fetcher.as_ref()),
        PageKind::Directory => session.load_dir(hash, fetcher.as_ref()),
    };

    for line in session.status().lines() {
        eprintln!("{} {}", "!".yellow().bold(), line.yellow());
    }
    print!("{}", templates::render_page(&session));

    Ok(state == LoadState::Rendered)
}

/// Remote fetcher when a base URL is given (flag or config), otherwise the
/// site directory on disk.
fn build_fetcher(cfg: &HitstatsConfig, base_url: Option<&str>) -> Box<dyn Fetch> {
    let base_url = base_url.unwrap_or(&cfg.fetch.base_url);
    if base_url.is_empty() {
        Box::new(FsFetcher::new(&cfg.site.root, &cfg.site.pages_dir))
    } else {
        Box::new(HttpFetcher::new(
            base_url,
            Duration::from_millis(cfg.fetch.timeout_ms),
        ))
    }
}

// ---------------------------------------------------------------------------
// hitstats escape
// ---------------------------------------------------------------------------

/// Print the filename-escaped form of each URI, one per line.
pub fn run_escape(uris: &[String]) {
    for uri in uris {
        println!("{}", filename_escape(uri));
    }
}

// ---------------------------------------------------------------------------
// hitstats config show | init | set | reset
// ---------------------------------------------------------------------------

/// Show the effective (merged) configuration as TOML.
pub fn run_config_show() -> Result<()> {
    let toml_str = config::show_effective_config()?;
    println!("{}", "Effective hitstats configuration".bold().cyan());
    println!("{}", "=".repeat(50));
    println!();
    println!("{toml_str}");

    let global_exists = config::global_config_file()
        .map(|p| p.exists())
        .unwrap_or(false);
    let project_exists = config::project_config_file()
        .map(|p| p.exists())
        .unwrap_or(false);
    println!("{}", "Sources (highest priority last):".dimmed());
    println!("  {} built-in defaults", "·".dimmed());
    print_source(global_exists, "~/.hitstats/config.toml");
    print_source(project_exists, ".hitstats.toml");
    println!(
        "  {} {}",
        "·".dimmed(),
        "HITSTATS_* environment variables".dimmed()
    );

    Ok(())
}

fn print_source(exists: bool, name: &str) {
    if exists {
        println!("  {} {}", "✓".green(), name.dimmed());
    } else {
        println!("  {} {}", "·".dimmed(), format!("{name} (not found)").dimmed());
    }
}

/// Initialize a default config file at `~/.hitstats/config.toml`.
pub fn run_config_init(force: bool) -> Result<()> {
    let path = config::init_config(force)?;
    println!(
        "{} Config written to {}",
        "✓".green().bold(),
        path.display()
    );
    Ok(())
}

/// Set a single configuration value in the global config file.
pub fn run_config_set(key: &str, value: &str) -> Result<()> {
    config::set_config_value(key, value)?;
    println!("{} Set {} = {}", "✓".green().bold(), key.bold(), value);
    Ok(())
}

/// Reset configuration to defaults.
pub fn run_config_reset() -> Result<()> {
    let path = config::reset_config()?;
    println!(
        "{} Config reset to defaults at {}",
        "✓".green().bold(),
        path.display()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn render_reports_missing_uri() {
        let dir = tempfile::tempdir().unwrap();
        let mut cfg = HitstatsConfig::default();
        cfg.site.root = dir.path().to_string_lossy().into_owned();
        assert!(!run_render(&cfg, PageKind::Detail, "#period=all", None).unwrap());
    }

    #[test]
    fn render_reads_site_root() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("web")).unwrap();
        fs::write(dir.path().join("web/INDEX.json"), r#"{"files": {}}"#).unwrap();
        let mut cfg = HitstatsConfig::default();
        cfg.site.root = dir.path().to_string_lossy().into_owned();
        assert!(run_render(&cfg, PageKind::Directory, "", None).unwrap());
    }
}
