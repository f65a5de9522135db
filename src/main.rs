use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use hitstats::page::PageKind;
use hitstats::{cli, config, web};

#[derive(Debug, Parser)]
#[command(name = "hitstats")]
#[command(about = "Browse precomputed web analytics histograms")]
struct App {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Serve the dashboard and the site files over HTTP
    Serve {
        /// Listen address (default from config: 127.0.0.1:9747)
        #[arg(long)]
        addr: Option<String>,
    },
    /// Render the page for one URI, e.g. `hitstats page '#period=all&uri_base=_2F_blog_2F_'`
    Page {
        /// Page state, as found after `#` in the page URL
        #[arg(default_value = "")]
        hash: String,
        /// Fetch from this published pages URL instead of the site root
        #[arg(long)]
        base_url: Option<String>,
    },
    /// Render the site-wide overview page
    Overview {
        #[arg(default_value = "")]
        hash: String,
        #[arg(long)]
        base_url: Option<String>,
    },
    /// Render a directory listing page, e.g. `hitstats dir '#path=logs/'`
    Dir {
        #[arg(default_value = "")]
        hash: String,
        #[arg(long)]
        base_url: Option<String>,
    },
    /// Print the filename-escaped form of URIs
    Escape {
        #[arg(required = true)]
        uris: Vec<String>,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Debug, Subcommand)]
enum ConfigAction {
    /// Show the effective configuration
    Show,
    /// Write the default config to ~/.hitstats/config.toml
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
    /// Set one key, e.g. `tables.referers 20`
    Set { key: String, value: String },
    /// Reset the global config to defaults
    Reset,
}

fn init_tracing(default_filter: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_filter))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    let app = App::parse();
    let (mut cfg, problems) = config::load_with_problems();
    init_tracing(&cfg.logging.level);
    for problem in &problems {
        tracing::warn!("{problem:#}");
    }

    let rendered = match app.command {
        Commands::Serve { addr } => {
            if let Some(addr) = addr {
                cfg.server.addr = addr;
            }
            return web::serve(&cfg);
        }
        Commands::Page { hash, base_url } => {
            cli::run_render(&cfg, PageKind::Detail, &hash, base_url.as_deref())?
        }
        Commands::Overview { hash, base_url } => {
            cli::run_render(&cfg, PageKind::Overview, &hash, base_url.as_deref())?
        }
        Commands::Dir { hash, base_url } => {
            cli::run_render(&cfg, PageKind::Directory, &hash, base_url.as_deref())?
        }
        Commands::Escape { uris } => {
            cli::run_escape(&uris);
            return Ok(());
        }
        Commands::Config { action } => {
            return match action {
                ConfigAction::Show => cli::run_config_show(),
                ConfigAction::Init { force } => cli::run_config_init(force),
                ConfigAction::Set { key, value } => cli::run_config_set(&key, &value),
                ConfigAction::Reset => cli::run_config_reset(),
            };
        }
    };

    if !rendered {
        std::process::exit(1);
    }
    Ok(())
}
