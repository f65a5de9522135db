/// Configuration schema and defaults for hitstats.
///
/// Defines the TOML-serializable configuration structure with all sections:
/// `[server]`, `[site]`, `[fetch]`, `[tables]`, and `[logging]`.
///
/// Every field has a sensible built-in default. Users only need to set the
/// values they want to override.
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

/// Top-level hitstats configuration.
///
/// Maps directly to the `~/.hitstats/config.toml` and `.hitstats.toml` file
/// schemas. All sections and fields are optional; missing values fall back
/// to built-in defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HitstatsConfig {
    pub server: ServerConfig,
    pub site: SiteConfig,
    pub fetch: FetchConfig,
    pub tables: TablesConfig,
    pub logging: LoggingConfig,
}

// ---------------------------------------------------------------------------
// [server]
// ---------------------------------------------------------------------------

/// Dashboard server settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address to listen on.
    pub addr: String,
    /// Open the dashboard in the default browser on startup.
    pub open_browser: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: "127.0.0.1:9747".to_string(),
            open_browser: false,
        }
    }
}

// ---------------------------------------------------------------------------
// [site]
// ---------------------------------------------------------------------------

/// Where the published site lives on disk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    /// Site root. Holds `analytics-data/` and the pages directory.
    pub root: String,
    /// Directory (relative to `root`) the pages are served from. Resource
    /// URLs such as `../analytics-data/...` are resolved against it.
    pub pages_dir: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            root: ".".to_string(),
            pages_dir: "web".to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// [fetch]
// ---------------------------------------------------------------------------

/// Remote fetch settings for the `page` / `dir` commands.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    /// URL of the published pages directory. Empty means read from
    /// `site.root` on disk.
    pub base_url: String,
    /// Request timeout (milliseconds).
    pub timeout_ms: u64,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            timeout_ms: 5000,
        }
    }
}

// ---------------------------------------------------------------------------
// [tables]
// ---------------------------------------------------------------------------

/// Row limits for each histogram table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TablesConfig {
    /// Query strings seen after a URI (detail page).
    pub uri_rest: usize,
    pub referers: usize,
    pub ip_addrs: usize,
    pub user_agents: usize,
    /// Blog posts on the site overview.
    pub blog: usize,
    /// Downloads on the site overview.
    pub downloads: usize,
    /// Everything else on the site overview.
    pub other_uris: usize,
}

impl Default for TablesConfig {
    fn default() -> Self {
        Self {
            uri_rest: 10,
            referers: 10,
            ip_addrs: 5,
            user_agents: 5,
            blog: 40,
            downloads: 10,
            other_uris: 10,
        }
    }
}

// ---------------------------------------------------------------------------
// [logging]
// ---------------------------------------------------------------------------

/// Logging settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default `tracing` filter when `RUST_LOG` is unset, e.g. `"info"` or
    /// `"hitstats=debug"`.
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Default TOML content
// ---------------------------------------------------------------------------

impl HitstatsConfig {
    /// Generate the annotated default TOML config file content.
    pub fn default_toml() -> String {
        r#"# hitstats configuration
#
# Configuration hierarchy (highest precedence wins):
#   1. Environment variables (HITSTATS_*)
#   2. Project config (.hitstats.toml in current directory)
#   3. User global config (~/.hitstats/config.toml)
#   4. Built-in defaults

[server]
addr = "127.0.0.1:9747"
open_browser = false

[site]
root = "."            # holds analytics-data/ and the pages directory
pages_dir = "web"     # page.html, dir.html and overview.html are served from here

[fetch]
base_url = ""         # e.g. "https://example.com/web/"; empty reads site.root
timeout_ms = 5000

[tables]
uri_rest = 10
referers = 10
ip_addrs = 5
user_agents = 5
blog = 40
downloads = 10
other_uris = 10

[logging]
level = "info"        # overridden by RUST_LOG
"#
        .to_string()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_toml_parses_back() {
        let toml_str = HitstatsConfig::default_toml();
        let config: HitstatsConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(config, HitstatsConfig::default());
    }

    #[test]
    fn partial_toml_fills_defaults() {
        let config: HitstatsConfig = toml::from_str(
            r#"
[tables]
referers = 25
"#,
        )
        .unwrap();
        assert_eq!(config.tables.referers, 25);
        assert_eq!(config.tables.ip_addrs, 5);
        assert_eq!(config.site.pages_dir, "web");
    }

    #[test]
    fn serialized_config_round_trips() {
        let config = HitstatsConfig::default();
        let text = toml::to_string_pretty(&config).unwrap();
        let back: HitstatsConfig = toml::from_str(&text).unwrap();
        assert_eq!(back, config);
    }
}
