//! End-to-end flow over real sockets: an agent registers with the router,
//! a client provisions and drops a database through the router, and the
//! agent leaves the fleet again.

use dbfleet::agent::adapters::HttpServerLink;
use dbfleet::agent::http::{AgentState, router as agent_router};
use dbfleet::agent::services::KeepAlive;
use dbfleet::agent_registry::adapters::HttpAgentClient;
use dbfleet::agent_registry::services::{AgentRegistrationService, AgentRegistry, IdGenerator};
use dbfleet::import::adapters::HttpDumpFetcher;
use dbfleet::import::services::{ImportPipeline, ImportQueue};
use dbfleet::protocol::AgentDescriptor;
use dbfleet::records::adapters::memory::InMemoryRecordRepository;
use dbfleet::server::http::{AppState, router as server_router};
use dbfleet::server::{ProvisioningDeps, ProvisioningService, ProvisioningSettings};
use dbfleet::vendor::adapters::InMemoryVendorAdapter;
use dbfleet::vendor::domain::Vendor;
use eyre::Result;
use mockable::DefaultClock;
use serde_json::{Value, json};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;

const SHORT_NAME: &str = "pg-e2e";
const CLIENT: &str = "alice";
const TIMEOUT: Duration = Duration::from_secs(5);

struct Fleet {
    router_url: String,
    registry: Arc<AgentRegistry>,
    database: InMemoryVendorAdapter,
    keepalive: Arc<KeepAlive>,
    client: reqwest::Client,
    _scratch: tempfile::TempDir,
}

async fn start_router() -> Result<(String, Arc<AgentRegistry>)> {
    let registry = Arc::new(AgentRegistry::new());
    let ids = Arc::new(IdGenerator::new());
    let clock = Arc::new(DefaultClock);
    let provisioning = ProvisioningService::new(
        ProvisioningDeps {
            registry: Arc::clone(&registry),
            records: Arc::new(InMemoryRecordRepository::new()),
            agents: Arc::new(HttpAgentClient::new(TIMEOUT)?),
            ids: Arc::clone(&ids),
            clock: Arc::clone(&clock),
        },
        ProvisioningSettings::default(),
    );
    let registration = AgentRegistrationService::new(Arc::clone(&registry), ids, clock);
    let state = Arc::new(AppState {
        provisioning,
        registration,
    });

    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let address = listener.local_addr()?;
    tokio::spawn(async move {
        axum::serve(
            listener,
            server_router(state).into_make_service_with_connect_info::<SocketAddr>(),
        )
        .await
    });
    Ok((format!("http://{address}"), registry))
}

async fn start_fleet() -> Result<Fleet> {
    let (router_url, registry) = start_router().await?;

    let database = InMemoryVendorAdapter::new(Vendor::Postgres);
    let scratch = tempfile::tempdir()?;
    let link = Arc::new(HttpServerLink::new(&router_url, TIMEOUT)?);
    let fetcher = Arc::new(HttpDumpFetcher::default());
    let pipeline = Arc::new(ImportPipeline::new(
        Arc::new(database.clone()),
        fetcher.clone(),
        link.clone(),
        scratch.path(),
    ));
    let (queue, _workers) = ImportQueue::start(pipeline, 1, 4);
    let state = Arc::new(AgentState::new(
        Arc::new(database.clone()),
        fetcher,
        queue,
        "16.2",
    ));

    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let agent_port = listener.local_addr()?.port();
    tokio::spawn(async move { axum::serve(listener, agent_router(state)).await });

    let keepalive = Arc::new(KeepAlive::new(link, descriptor(agent_port)));
    Ok(Fleet {
        router_url,
        registry,
        database,
        keepalive,
        client: reqwest::Client::builder().timeout(TIMEOUT).build()?,
        _scratch: scratch,
    })
}

fn descriptor(port: u16) -> AgentDescriptor {
    AgentDescriptor {
        identifier: format!("postgres-16-{SHORT_NAME}"),
        vendor: Vendor::Postgres,
        db_port: "5432".to_owned(),
        db_address: "db.internal".to_owned(),
        db_sid: String::new(),
        short_name: SHORT_NAME.to_owned(),
        long_name: "End-to-end Postgres".to_owned(),
        version: "16.2".to_owned(),
        port: port.to_string(),
        address: "127.0.0.1".to_owned(),
        up: true,
    }
}

impl Fleet {
    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.router_url)
    }

    async fn get(&self, path: &str) -> Result<(reqwest::StatusCode, Value)> {
        let response = self
            .client
            .get(self.url(path))
            .bearer_auth(CLIENT)
            .send()
            .await?;
        Ok((response.status(), response.json().await?))
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn agent_registers_serves_a_database_and_leaves() -> Result<()> {
    let fleet = start_fleet().await?;

    assert!(fleet.keepalive.tick().await);
    assert!(fleet.registry.get_live(SHORT_NAME).is_some());
    let (status, agents) = fleet.get("/api/agents").await?;
    assert_eq!(status, reqwest::StatusCode::OK);
    assert_eq!(agents[0]["short_name"], json!(SHORT_NAME));

    let created = fleet
        .client
        .post(fleet.url("/api/databases"))
        .bearer_auth(CLIENT)
        .json(&json!({
            "agent_identifier": SHORT_NAME,
            "database_name": "orders",
            "username": "orders",
            "password": "secret",
        }))
        .send()
        .await?;
    assert_eq!(created.status(), reqwest::StatusCode::CREATED);
    let record: Value = created.json().await?;
    assert_eq!(record["status"], json!(100));
    assert_eq!(record["database_address"], json!("db.internal"));
    assert!(fleet.database.has_database("orders"));

    let id = record["id"].as_u64().expect("record id");
    let (status, listed) = fleet
        .get(&format!("/api/agents/{SHORT_NAME}/databases"))
        .await?;
    assert_eq!(status, reqwest::StatusCode::OK);
    assert_eq!(listed[0]["id"], json!(id));

    let dropped = fleet
        .client
        .delete(fleet.url(&format!("/api/databases/{id}")))
        .bearer_auth(CLIENT)
        .send()
        .await?;
    assert_eq!(dropped.status(), reqwest::StatusCode::OK);
    assert!(!fleet.database.has_database("orders"));

    fleet.keepalive.unregister().await?;
    assert!(fleet.registry.get(SHORT_NAME).is_none());
    Ok(())
}
