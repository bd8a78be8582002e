//! Run the API server over the local pricebook

use anyhow::{Context, Result};
use owo_colors::OwoColorize;
use pricetree_cli::Config;
use pricetree_server::AppState;
use pricetree_store::Pricebook;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{info, warn};

pub async fn run(mut config: Config, bind: Option<String>, data_dir: Option<PathBuf>) -> Result<()> {
    if let Some(bind) = bind {
        config.server.bind = bind;
    }
    if let Some(dir) = data_dir {
        config.store.data_dir = Some(dir);
    }
    config.validate()?;

    let data_dir = config.data_dir()?;
    std::fs::create_dir_all(&data_dir)
        .with_context(|| format!("Failed to create data directory {}", data_dir.display()))?;
    let pricebook = Arc::new(
        Pricebook::open(&data_dir)
            .with_context(|| format!("Failed to open pricebook in {} (is another server running?)", data_dir.display()))?,
    );

    let listener = TcpListener::bind(&config.server.bind)
        .await
        .with_context(|| format!("Failed to bind {}", config.server.bind))?;
    println!(
        "{} Serving {} on http://{}",
        "✓".green(),
        data_dir.display(),
        listener.local_addr().map(|a| a.to_string()).unwrap_or_else(|_| config.server.bind.clone())
    );

    let state = AppState::with_config(Arc::clone(&pricebook), config.server_config());
    pricetree_server::serve(listener, state, shutdown_signal())
        .await
        .context("Server failed")?;

    pricebook.flush().context("Failed to flush pricebook")?;
    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Shutdown requested"),
        Err(err) => {
            warn!("Cannot listen for ctrl-c ({}); stop the process to shut down", err);
            std::future::pending::<()>().await;
        }
    }
}
