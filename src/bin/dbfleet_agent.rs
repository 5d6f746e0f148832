//! Agent binary: fronts one database server for the router.

use clap::Parser;
use dbfleet::agent::adapters::HttpServerLink;
use dbfleet::agent::http::{AgentState, router};
use dbfleet::agent::services::KeepAlive;
use dbfleet::command::SystemCommandRunner;
use dbfleet::config::AgentConfig;
use dbfleet::import::adapters::HttpDumpFetcher;
use dbfleet::import::services::{ImportPipeline, ImportQueue};
use dbfleet::vendor::adapters::adapter_for;
use dbfleet::{signal, telemetry};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

const ROUTER_TIMEOUT: Duration = Duration::from_secs(30);
const DOWNLOAD_CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

#[tokio::main]
async fn main() -> eyre::Result<()> {
    let config = AgentConfig::parse();
    telemetry::init(&config.log_level)?;

    let adapter = adapter_for(config.vendor, Arc::new(SystemCommandRunner::new()));
    adapter.connect(&config.vendor_settings()).await?;
    let version = adapter.version().await?;
    info!(vendor = %config.vendor, %version, "database connection established");

    tokio::fs::create_dir_all(&config.scratch_dir).await?;
    let link = Arc::new(HttpServerLink::new(&config.server_url, ROUTER_TIMEOUT)?);
    let fetcher = Arc::new(HttpDumpFetcher::new(DOWNLOAD_CONNECT_TIMEOUT)?);
    let pipeline = Arc::new(ImportPipeline::new(
        Arc::clone(&adapter),
        fetcher.clone(),
        link.clone(),
        config.scratch_dir.clone(),
    ));
    let (queue, _workers) = ImportQueue::start(pipeline, config.import_workers, config.import_queue);

    let keepalive = Arc::new(KeepAlive::new(link, config.descriptor(&version)));
    tokio::spawn(Arc::clone(&keepalive).run(config.keepalive_interval()));

    let state = Arc::new(AgentState::new(Arc::clone(&adapter), fetcher, queue, version));
    let listener = tokio::net::TcpListener::bind(config.listen_addr()).await?;
    info!(address = %config.listen_addr(), short_name = %config.short_name, "agent listening");
    axum::serve(listener, router(state))
        .with_graceful_shutdown(signal::shutdown_signal())
        .await?;

    if let Err(err) = keepalive.unregister().await {
        warn!(error = %err, "could not unregister from router");
    }
    adapter.close().await;
    info!("agent stopped");
    Ok(())
}
