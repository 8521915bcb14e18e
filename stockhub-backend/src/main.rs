//! StockHub backend server.
//!
//! Loads configuration, connects the counter store, seeds the ledgers and
//! serves the reservation API.

use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;

use stockhub_backend::build_router;
use stockhub_backend::state::{AppState, BootstrapOptions};

mod cli;
mod config_helpers;
mod tracing_setup;

use cli::CliArgs;
use config_helpers::{
    catalog_from_config, counter_store_from_config, job_queue_from_config, parse_bind_address,
};
use tracing_setup::install_tracing_from_config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = CliArgs::parse();

    if args.help_requested {
        CliArgs::print_help();
        return Ok(());
    }

    // CLI > environment variable
    let config_path = args
        .config_path
        .or_else(|| std::env::var("STOCKHUB_CONFIG_PATH").ok());

    let config = load_config(config_path.as_deref())?;
    install_tracing_from_config(&config.logging)?;
    tracing::info!(config_path = ?config_path, "configuration loaded");

    let store = counter_store_from_config(&config)
        .await
        .context("failed to connect counter store")?;
    let catalog = catalog_from_config(&config).context("invalid product catalog")?;
    let job_queue = job_queue_from_config(&config);

    let state = AppState::new(store, catalog, job_queue);
    state
        .bootstrap(&BootstrapOptions::from_config(&config))
        .await
        .context("failed to initialize application state")?;

    let app = build_router(Arc::new(state));

    let addr = parse_bind_address(&config.server.host, config.server.port);
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    tracing::info!(%addr, "API available on port {}", config.server.port);

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("server stopped");
    Ok(())
}

/// Load and validate configuration from file (if any) and environment.
fn load_config(path: Option<&str>) -> anyhow::Result<stockhub_config::Config> {
    let config = stockhub_config::load_config(path)
        .with_context(|| format!("failed to load configuration from {path:?}"))?;
    stockhub_config::validate_config(&config).context("invalid configuration")?;
    Ok(config)
}

async fn shutdown_signal() {
    if let Err(error) = tokio::signal::ctrl_c().await {
        tracing::error!(%error, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown signal received");
}
