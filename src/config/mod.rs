/// Configuration system for hitstats.
///
/// Provides a layered configuration hierarchy:
///
/// 1. **Built-in defaults** — hardcoded in [`schema::HitstatsConfig::default()`]
/// 2. **User global config** — `~/.hitstats/config.toml`
/// 3. **Project local config** — `.hitstats.toml` in the current working directory
/// 4. **Environment variables** — `HITSTATS_*` overrides (highest precedence)
///
/// # Usage
///
/// ```rust,ignore
/// use hitstats::config;
///
/// let cfg = config::load();
/// let fetcher = FsFetcher::new(&cfg.site.root, &cfg.site.pages_dir);
/// ```
pub mod schema;

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};

pub use schema::HitstatsConfig;

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Load the fully resolved hitstats configuration.
///
/// Merges all layers in order: defaults → global TOML → project TOML → env
/// vars. Malformed files are skipped and logged.
pub fn load() -> HitstatsConfig {
    let (config, problems) = load_with_problems();
    for problem in &problems {
        tracing::warn!("{problem:#}");
    }
    config
}

/// Like [`load`], but hands back the malformed-file errors instead of
/// logging them, for callers that set up logging from the config itself.
pub fn load_with_problems() -> (HitstatsConfig, Vec<anyhow::Error>) {
    let mut config = HitstatsConfig::default();
    let mut problems = Vec::new();

    // Layer 2: user global config, then layer 3: project local config
    for path in [global_config_path(), project_config_path()] {
        match load_toml_file(path) {
            Ok(Some(layer)) => config = layer,
            Ok(None) => {}
            Err(e) => problems.push(e),
        }
    }

    // Layer 4: environment variable overrides
    apply_env_overrides(&mut config);

    (config, problems)
}

/// Load a TOML config file from the given path (if it exists).
///
/// Missing files are `Ok(None)`. A malformed file is an error so the caller
/// can report it and carry on with the layer below.
///
/// Each layer is deserialized with `serde(default)`, so a layer fully
/// replaces the one below it; keys a file leaves out come back as defaults.
fn load_toml_file(path: Option<PathBuf>) -> Result<Option<HitstatsConfig>> {
    let Some(path) = path else {
        return Ok(None);
    };
    let Ok(content) = fs::read_to_string(&path) else {
        return Ok(None);
    };
    let config = toml::from_str(&content)
        .with_context(|| format!("ignoring malformed config file {}", path.display()))?;
    Ok(Some(config))
}

// ---------------------------------------------------------------------------
// File paths
// ---------------------------------------------------------------------------

/// Path to the user global config: `~/.hitstats/config.toml`.
fn global_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".hitstats").join("config.toml"))
}

/// Path to the project local config: `.hitstats.toml` in the current directory.
fn project_config_path() -> Option<PathBuf> {
    std::env::current_dir()
        .ok()
        .map(|cwd| cwd.join(".hitstats.toml"))
}

/// Return the path to the global config file for display/init purposes.
pub fn global_config_file() -> Option<PathBuf> {
    global_config_path()
}

/// Return the path to the project config file for display purposes.
pub fn project_config_file() -> Option<PathBuf> {
    project_config_path()
}

// ---------------------------------------------------------------------------
// Environment variable overrides
// ---------------------------------------------------------------------------

/// Apply environment variable overrides (highest precedence layer).
///
/// Supported variables:
/// - `HITSTATS_ADDR` — server listen address
/// - `HITSTATS_OPEN_BROWSER` — open the dashboard on startup (`1`/`true`/`yes`/`on`)
/// - `HITSTATS_ROOT` — site root directory
/// - `HITSTATS_PAGES_DIR` — pages directory inside the root
/// - `HITSTATS_BASE_URL` — remote pages URL for `page` / `dir`
/// - `HITSTATS_TIMEOUT_MS` — remote fetch timeout
/// - `HITSTATS_LOG` — default log filter
fn apply_env_overrides(config: &mut HitstatsConfig) {
    if let Ok(val) = std::env::var("HITSTATS_ADDR")
        && !val.is_empty()
    {
        config.server.addr = val;
    }
    if let Ok(val) = std::env::var("HITSTATS_OPEN_BROWSER") {
        config.server.open_browser = is_truthy(&val);
    }
    if let Ok(val) = std::env::var("HITSTATS_ROOT")
        && !val.is_empty()
    {
        config.site.root = val;
    }
    if let Ok(val) = std::env::var("HITSTATS_PAGES_DIR") {
        config.site.pages_dir = val;
    }
    if let Ok(val) = std::env::var("HITSTATS_BASE_URL") {
        config.fetch.base_url = val;
    }
    if let Ok(val) = std::env::var("HITSTATS_TIMEOUT_MS")
        && let Ok(ms) = val.parse::<u64>()
    {
        config.fetch.timeout_ms = ms;
    }
    if let Ok(val) = std::env::var("HITSTATS_LOG")
        && !val.is_empty()
    {
        config.logging.level = val;
    }
}

/// Check if a string value represents a truthy boolean.
fn is_truthy(val: &str) -> bool {
    matches!(
        val.to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

// ---------------------------------------------------------------------------
// Config init / set / reset
// ---------------------------------------------------------------------------

/// Write the default annotated config to `~/.hitstats/config.toml`.
///
/// Creates the `~/.hitstats/` directory if it doesn't exist. Returns an error
/// if the file already exists (use `force = true` to overwrite).
pub fn init_config(force: bool) -> Result<PathBuf> {
    let path = global_config_path().context("could not determine home directory")?;

    if path.exists() && !force {
        anyhow::bail!(
            "config file already exists at {}. Use --force to overwrite.",
            path.display()
        );
    }

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).context("failed to create ~/.hitstats/ directory")?;
    }

    fs::write(&path, HitstatsConfig::default_toml()).context("failed to write config file")?;

    Ok(path)
}

/// Set a single config key to a value in the global config file.
///
/// Reads the current global config (or defaults), updates the specified key,
/// and writes the result back. Supports dotted keys like `tables.referers`.
pub fn set_config_value(key: &str, value: &str) -> Result<()> {
    let path = global_config_path().context("could not determine home directory")?;

    let current = if path.exists() {
        fs::read_to_string(&path).context("failed to read config file")?
    } else {
        toml::to_string_pretty(&HitstatsConfig::default())
            .context("failed to serialize default config")?
    };

    let mut value_table: toml::Value =
        toml::from_str(&current).context("failed to parse config as TOML value")?;
    set_toml_value(&mut value_table, key, value)?;

    // Reject edits that no longer fit the schema.
    let updated = toml::to_string_pretty(&value_table).context("failed to serialize config")?;
    toml::from_str::<HitstatsConfig>(&updated)
        .with_context(|| format!("invalid value for '{key}': {value}"))?;

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).context("failed to create config directory")?;
    }
    fs::write(&path, updated).context("failed to write config file")?;

    Ok(())
}

/// Set a value in a TOML value tree using a dotted key path.
fn set_toml_value(root: &mut toml::Value, key: &str, raw_value: &str) -> Result<()> {
    let parts: Vec<&str> = key.split('.').collect();
    let Some((leaf, sections)) = parts.split_last() else {
        anyhow::bail!("empty config key");
    };

    // Navigate to the parent table
    let mut current = root;
    for &part in sections {
        current = current
            .get_mut(part)
            .with_context(|| format!("config key not found: section '{part}' in '{key}'"))?;
    }

    let table = current.as_table_mut().with_context(|| {
        format!(
            "expected table at '{}'",
            key.rsplit_once('.').map(|(s, _)| s).unwrap_or("")
        )
    })?;

    let new_value = match table.get(*leaf) {
        Some(toml::Value::Boolean(_)) => toml::Value::Boolean(is_truthy(raw_value)),
        Some(toml::Value::Integer(_)) => {
            let n: i64 = raw_value
                .parse()
                .with_context(|| format!("expected integer for '{key}', got '{raw_value}'"))?;
            toml::Value::Integer(n)
        }
        Some(_) => toml::Value::String(raw_value.to_string()),
        None => anyhow::bail!("unknown config key: '{key}'"),
    };

    table.insert((*leaf).to_string(), new_value);
    Ok(())
}

/// Reset the global config to defaults (overwrite the file).
pub fn reset_config() -> Result<PathBuf> {
    init_config(true)
}

/// Show the effective (fully resolved) config as TOML.
pub fn show_effective_config() -> Result<String> {
    let config = load();
    toml::to_string_pretty(&config).context("failed to serialize effective config")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn is_truthy_accepts_variants() {
        assert!(is_truthy("1"));
        assert!(is_truthy("true"));
        assert!(is_truthy("YES"));
        assert!(is_truthy("on"));
        assert!(!is_truthy("0"));
        assert!(!is_truthy("off"));
        assert!(!is_truthy(""));
    }

    #[test]
    fn set_toml_value_updates_integer() {
        let mut root: toml::Value = toml::from_str(
            r#"
[tables]
referers = 10
"#,
        )
        .unwrap();
        set_toml_value(&mut root, "tables.referers", "25").unwrap();
        assert_eq!(root["tables"]["referers"].as_integer(), Some(25));
    }

    #[test]
    fn set_toml_value_updates_string_and_bool() {
        let mut root: toml::Value = toml::from_str(
            r#"
[server]
addr = "127.0.0.1:9747"
open_browser = false
"#,
        )
        .unwrap();
        set_toml_value(&mut root, "server.addr", "0.0.0.0:80").unwrap();
        set_toml_value(&mut root, "server.open_browser", "yes").unwrap();
        assert_eq!(root["server"]["addr"].as_str(), Some("0.0.0.0:80"));
        assert_eq!(root["server"]["open_browser"].as_bool(), Some(true));
    }

    #[test]
    fn set_toml_value_rejects_bad_input() {
        let mut root: toml::Value = toml::from_str(
            r#"
[tables]
referers = 10
"#,
        )
        .unwrap();
        assert!(set_toml_value(&mut root, "tables.referers", "many").is_err());
        assert!(set_toml_value(&mut root, "tables.nope", "1").is_err());
        assert!(set_toml_value(&mut root, "nope.key", "1").is_err());
    }

    #[test]
    fn malformed_file_is_an_error_naming_the_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".hitstats.toml");
        std::fs::write(&path, "[tables\nbroken = ").unwrap();

        let err = load_toml_file(Some(path.clone())).unwrap_err();
        assert!(format!("{err:#}").contains(&path.display().to_string()), "{err:#}");
    }

    #[test]
    fn missing_file_is_not_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_toml_file(Some(dir.path().join("none.toml"))).unwrap().is_none());
        assert!(load_toml_file(None).unwrap().is_none());
    }

    #[test]
    fn valid_file_replaces_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[tables]\nreferers = 3\n").unwrap();

        let config = load_toml_file(Some(path)).unwrap().unwrap();
        assert_eq!(config.tables.referers, 3);
        assert_eq!(config.tables.ip_addrs, 5);
    }

    #[test]
    fn show_effective_config_returns_toml() {
        let toml_str = show_effective_config().unwrap();
        let _: HitstatsConfig = toml::from_str(&toml_str).unwrap();
    }
}
