//! Shared utilities for CLI commands

use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use pricetree_cli::config::{Config, LoggingConfig};
use pricetree_cli::{ApiClient, HttpCategoryFetcher};
use pricetree_core::{CatalogSession, CategoryId, TreeBuilder};
use std::time::Duration;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Install the tracing subscriber
///
/// `RUST_LOG` wins over `logging.level`. With `to_file` and `logging.dir`
/// set, logs also go to a daily rolling file; keep the guard alive until exit.
pub fn init_logging(logging: &LoggingConfig, to_file: bool) -> Result<Option<WorkerGuard>> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&logging.level))
        .with_context(|| format!("Invalid logging.level '{}'", logging.level))?;

    let stderr = fmt::layer().with_writer(std::io::stderr);

    match (&logging.dir, to_file) {
        (Some(dir), true) => {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create log directory {}", dir.display()))?;
            let appender = tracing_appender::rolling::daily(dir, "ptree.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            tracing_subscriber::registry()
                .with(env_filter)
                .with(stderr)
                .with(fmt::layer().with_ansi(false).with_writer(writer))
                .init();
            Ok(Some(guard))
        }
        _ => {
            tracing_subscriber::registry().with(env_filter).with(stderr).init();
            Ok(None)
        }
    }
}

pub fn spinner(message: impl Into<String>) -> ProgressBar {
    let bar = ProgressBar::new_spinner();
    bar.set_style(
        ProgressStyle::with_template("{spinner:.cyan} {msg}").unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    bar.set_message(message.into());
    bar.enable_steady_tick(Duration::from_millis(80));
    bar
}

pub fn api_client(config: &Config) -> Result<ApiClient> {
    ApiClient::new(&config.api).context("Failed to create API client")
}

/// Build the tree for `root` over HTTP and install it in a fresh session
///
/// With a vendor, the selection is restored from that vendor's stored active leaves.
pub async fn load_session(config: &Config, root: &CategoryId, vendor: Option<&str>) -> Result<CatalogSession> {
    let client = api_client(config)?;
    let builder = TreeBuilder::new(HttpCategoryFetcher::new(client.clone())).with_strategy(config.fetch_strategy());

    let mut session = CatalogSession::new();
    let ticket = session.begin_build(root.clone());

    let bar = spinner(format!("Loading categories under {root}"));
    let built = builder.build_for(&ticket).await;
    bar.finish_and_clear();
    let tree = built.with_context(|| format!("Failed to build category tree for {root}"))?;

    let leaves = match vendor {
        Some(vendor) => client
            .active_leaves(vendor, root)
            .await
            .with_context(|| format!("Failed to load active leaves for vendor {vendor}"))?,
        None => Vec::new(),
    };
    session.install_with_leaves(&ticket, tree, &leaves)?;
    Ok(session)
}
