//! routine-sw entry point.
//!
//! Boots the offline cache worker behind an MCP server on stdio transport.
//! Logging goes to stderr to avoid interfering with the JSON-RPC protocol on stdout.

use std::sync::Arc;

use anyhow::{Context, Result};
use rmcp::service::serve_server;
use rmcp::transport::io::stdio;
use routine_client::FetchClient;
use routine_core::{AppConfig, CacheDb};
use tracing_subscriber::EnvFilter;

mod error;
mod handler;
mod tools;
mod worker;

use worker::{EffectLog, SiteWorker, WorkerSettings};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .json()
        .init();

    let config = AppConfig::load().context("failed to load configuration")?;
    let settings = WorkerSettings::from_config(&config)?;

    tracing::info!(
        cache_name = %settings.cache_name,
        scope = %settings.scope,
        db_path = %config.db_path.display(),
        "Starting routine-sw on stdio transport"
    );

    let storage = CacheDb::open(&config.db_path).await?;
    let network = FetchClient::new((&config).into())?;
    let worker = SiteWorker::new(settings, Arc::new(storage), Arc::new(network), Arc::new(EffectLog::new()));

    let handler = handler::WorkerServer::new(Arc::new(worker));
    let transport = stdio();
    let server = serve_server(handler, transport).await?;

    server.waiting().await?;

    Ok(())
}
