//! Router binary: agent registry, record store, client API and the
//! background liveness and expiry sweeps.

use clap::Parser;
use dbfleet::agent_registry::adapters::HttpAgentClient;
use dbfleet::agent_registry::services::{
    AgentRegistrationService, AgentRegistry, IdGenerator, LivenessMonitor,
};
use dbfleet::config::ServerConfig;
use dbfleet::maintenance::{ExpirySweeper, SweepDeps};
use dbfleet::records::adapters::memory::InMemoryRecordRepository;
use dbfleet::records::adapters::postgres::{
    MIGRATIONS, PgMigrationTarget, PostgresRecordRepository, RecordPgPool,
};
use dbfleet::records::ports::RecordRepository;
use dbfleet::records::services::MigrationRunner;
use dbfleet::server::http::{AppState, router};
use dbfleet::server::{ProvisioningDeps, ProvisioningService, ProvisioningSettings};
use dbfleet::{signal, telemetry};
use diesel::pg::PgConnection;
use diesel::r2d2::{ConnectionManager, Pool};
use mockable::DefaultClock;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{info, warn};

const RECORD_POOL_SIZE: u32 = 8;

#[tokio::main]
async fn main() -> eyre::Result<()> {
    let config = ServerConfig::parse();
    telemetry::init(&config.log_level)?;

    let records = record_store(config.database_url.as_deref()).await?;
    let registry = Arc::new(AgentRegistry::new());
    let ids = Arc::new(IdGenerator::new());
    let clock = Arc::new(DefaultClock);
    let agents = Arc::new(HttpAgentClient::new(config.agent_timeout())?);

    let provisioning = ProvisioningService::new(
        ProvisioningDeps {
            registry: Arc::clone(&registry),
            records: Arc::clone(&records),
            agents: agents.clone(),
            ids: Arc::clone(&ids),
            clock: Arc::clone(&clock),
        },
        ProvisioningSettings {
            record_lifetime: config.record_lifetime()?,
        },
    );
    let registration =
        AgentRegistrationService::new(Arc::clone(&registry), Arc::clone(&ids), Arc::clone(&clock));

    let liveness = Arc::new(LivenessMonitor::new(
        Arc::clone(&registry),
        agents.clone(),
        config.eviction_threshold,
    ));
    tokio::spawn(liveness.run(config.liveness_interval()));

    let sweeper = Arc::new(ExpirySweeper::new(SweepDeps {
        records,
        registry,
        agents,
        ids,
        clock,
    }));
    tokio::spawn(sweeper.run(config.sweep_interval()));

    let state = Arc::new(AppState {
        provisioning,
        registration,
    });
    let listener = tokio::net::TcpListener::bind(config.bind).await?;
    info!(address = %config.bind, "router listening");
    axum::serve(
        listener,
        router(state).into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(signal::shutdown_signal())
    .await?;

    info!("router stopped");
    Ok(())
}

async fn record_store(database_url: Option<&str>) -> eyre::Result<Arc<dyn RecordRepository>> {
    let Some(url) = database_url else {
        warn!("DATABASE_URL is not set; records are kept in memory");
        return Ok(Arc::new(InMemoryRecordRepository::new()));
    };

    let manager = ConnectionManager::<PgConnection>::new(url);
    let pool: RecordPgPool = tokio::task::spawn_blocking(move || {
        Pool::builder().max_size(RECORD_POOL_SIZE).build(manager)
    })
    .await??;

    let report = MigrationRunner::new(Arc::new(PgMigrationTarget::new(pool.clone())), MIGRATIONS)
        .run()
        .await?;
    info!(
        previously_applied = report.previously_applied,
        newly_applied = report.newly_applied,
        "record store ready"
    );
    Ok(Arc::new(PostgresRecordRepository::new(pool)))
}
