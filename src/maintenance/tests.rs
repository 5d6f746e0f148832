//! Expiry sweep tests.

use super::{ExpirySweeper, SweepDeps};
use crate::agent_registry::adapters::LoopbackAgentClient;
use crate::agent_registry::domain::Agent;
use crate::agent_registry::ports::{AgentClient, AgentClientResult};
use crate::agent_registry::services::{AgentRegistrationService, AgentRegistry, IdGenerator};
use crate::protocol::{AgentDescriptor, Message};
use crate::records::adapters::memory::InMemoryRecordRepository;
use crate::records::domain::{ProvisioningRecord, RecordFields, RecordId, Visibility};
use crate::records::ports::RecordRepository;
use crate::status::StatusCode;
use crate::vendor::adapters::InMemoryVendorAdapter;
use crate::vendor::domain::{DbRequest, Vendor};
use crate::vendor::ports::VendorAdapter;
use async_trait::async_trait;
use chrono::{Duration, Utc};
use mockable::DefaultClock;
use rstest::{fixture, rstest};
use std::net::{IpAddr, Ipv4Addr};
use std::sync::Arc;

const AGENT: &str = "mysql-8";

struct World {
    records: InMemoryRecordRepository,
    registry: Arc<AgentRegistry>,
    client: LoopbackAgentClient,
    database: InMemoryVendorAdapter,
    sweeper: ExpirySweeper<DefaultClock>,
}

impl World {
    async fn store(&self, name: &str, expires_in: Duration) -> RecordId {
        let now = Utc::now();
        let created_at = (now + expires_in).min(now) - Duration::days(30);
        let fields = RecordFields {
            vendor: Vendor::Mysql,
            database_name: name.to_owned(),
            database_user: name.to_owned(),
            database_password: "secret".to_owned(),
            sid: String::new(),
            dump_location: String::new(),
            created_at,
            expires_at: now + expires_in,
            creator: "alice".to_owned(),
            agent_name: AGENT.to_owned(),
            database_address: "db.internal".to_owned(),
            database_port: "3306".to_owned(),
            status: StatusCode::SUCCESS,
            message: "created".to_owned(),
            visibility: Visibility::Private,
        };
        let record = ProvisioningRecord::new(fields).expect("valid record");
        self.database
            .create_database(&DbRequest {
                database_name: name.to_owned(),
                username: name.to_owned(),
                ..DbRequest::default()
            })
            .await
            .expect("create");
        self.records.insert(&record).await.expect("insert")
    }

    async fn fetch(&self, id: RecordId) -> Option<ProvisioningRecord> {
        self.records.fetch_by_id(id).await.expect("fetch")
    }
}

fn descriptor() -> AgentDescriptor {
    AgentDescriptor {
        identifier: "mysql-8.0-host".to_owned(),
        vendor: Vendor::Mysql,
        db_port: "3306".to_owned(),
        db_address: "db.internal".to_owned(),
        db_sid: String::new(),
        short_name: AGENT.to_owned(),
        long_name: "MySQL".to_owned(),
        version: "8.0.33".to_owned(),
        port: "7020".to_owned(),
        address: String::new(),
        up: true,
    }
}

fn world_with(database: InMemoryVendorAdapter) -> World {
    let registry = Arc::new(AgentRegistry::new());
    let ids = Arc::new(IdGenerator::new());
    let clock = Arc::new(DefaultClock);
    AgentRegistrationService::new(Arc::clone(&registry), Arc::clone(&ids), Arc::clone(&clock))
        .register(&descriptor(), Some(IpAddr::V4(Ipv4Addr::LOCALHOST)))
        .expect("registration");
    let client = LoopbackAgentClient::new();
    client.attach(AGENT, Arc::new(database.clone()));
    let records = InMemoryRecordRepository::new();
    let sweeper = ExpirySweeper::new(SweepDeps {
        records: Arc::new(records.clone()),
        registry: Arc::clone(&registry),
        agents: Arc::new(client.clone()),
        ids,
        clock,
    });
    World {
        records,
        registry,
        client,
        database,
        sweeper,
    }
}

#[fixture]
fn world() -> World {
    world_with(InMemoryVendorAdapter::new(Vendor::Mysql))
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn distant_expiry_is_untouched(world: World) {
    let id = world.store("shop", Duration::days(10)).await;

    let report = world.sweeper.sweep().await.expect("sweep");

    assert_eq!(report, super::SweepReport::default());
    assert_eq!(
        world.fetch(id).await.map(|record| record.status()),
        Some(StatusCode::SUCCESS)
    );
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn imminent_expiry_is_flagged_once(world: World) {
    let id = world.store("shop", Duration::days(3)).await;

    let first = world.sweeper.sweep().await.expect("sweep");
    let second = world.sweeper.sweep().await.expect("sweep");

    assert_eq!(first.flagged, vec![id]);
    assert!(second.flagged.is_empty());
    let flagged = world.fetch(id).await.expect("kept");
    assert_eq!(flagged.status(), StatusCode::REMOVAL_SCHEDULED);
    assert_eq!(flagged.message(), "created");
    assert!(world.database.has_database("shop"));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn expired_database_is_dropped_and_its_record_removed(world: World) {
    let id = world.store("shop", Duration::days(-1)).await;

    let report = world.sweeper.sweep().await.expect("sweep");

    assert_eq!(report.dropped, vec![id]);
    assert!(world.fetch(id).await.is_none());
    assert!(!world.database.has_database("shop"));
    let calls = world.client.calls();
    assert_eq!(calls.first().map(|(operation, _)| operation.as_str()), Some("drop"));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn unreachable_agent_keeps_the_expired_record(world: World) {
    let id = world.store("shop", Duration::days(-1)).await;
    world.client.set_unreachable(AGENT, true);

    let report = world.sweeper.sweep().await.expect("sweep");

    assert_eq!(report.retained, vec![id]);
    assert!(world.fetch(id).await.is_some());
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn departed_agent_keeps_the_expired_record(world: World) {
    let id = world.store("shop", Duration::days(-1)).await;
    world.registry.remove(AGENT);

    let report = world.sweeper.sweep().await.expect("sweep");

    assert_eq!(report.retained, vec![id]);
    assert!(world.client.calls().is_empty());
}

#[tokio::test(flavor = "multi_thread")]
async fn refused_drop_keeps_the_expired_record() {
    let world = world_with(InMemoryVendorAdapter::new(Vendor::Mysql).with_failing_drops());
    let id = world.store("shop", Duration::days(-1)).await;

    let report = world.sweeper.sweep().await.expect("sweep");

    assert_eq!(report.retained, vec![id]);
    assert!(world.fetch(id).await.is_some());
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn store_outage_fails_the_sweep(world: World) {
    world.records.set_available(false);

    assert!(world.sweeper.sweep().await.is_err());
}

/// Publishes `edited` with a finished import while a drop is in flight.
struct EditingClient {
    inner: LoopbackAgentClient,
    records: InMemoryRecordRepository,
    edited: RecordId,
}

#[async_trait]
impl AgentClient for EditingClient {
    async fn create_database(&self, agent: &Agent, request: &DbRequest) -> AgentClientResult<Message> {
        self.inner.create_database(agent, request).await
    }

    async fn import_database(&self, agent: &Agent, request: &DbRequest) -> AgentClientResult<Message> {
        self.inner.import_database(agent, request).await
    }

    async fn drop_database(&self, agent: &Agent, request: &DbRequest) -> AgentClientResult<Message> {
        let mut record = self
            .records
            .fetch_by_id(self.edited)
            .await
            .expect("fetch")
            .expect("edited record exists");
        record.set_visibility(Visibility::Public);
        record.set_status(StatusCode::SUCCESS, "import finished");
        self.records.update(&record).await.expect("update");
        self.inner.drop_database(agent, request).await
    }

    async fn heartbeat(&self, agent: &Agent) -> AgentClientResult<()> {
        self.inner.heartbeat(agent).await
    }
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn flagging_keeps_changes_made_during_the_sweep(world: World) {
    let soon = world.store("soon", Duration::days(3)).await;
    let expired = world.store("old", Duration::days(-1)).await;
    let sweeper = ExpirySweeper::new(SweepDeps {
        records: Arc::new(world.records.clone()),
        registry: Arc::clone(&world.registry),
        agents: Arc::new(EditingClient {
            inner: world.client.clone(),
            records: world.records.clone(),
            edited: soon,
        }),
        ids: Arc::new(IdGenerator::new()),
        clock: Arc::new(DefaultClock),
    });

    let report = sweeper.sweep().await.expect("sweep");

    assert_eq!(report.dropped, vec![expired]);
    assert_eq!(report.flagged, vec![soon]);
    let flagged = world.fetch(soon).await.expect("kept");
    assert_eq!(flagged.status(), StatusCode::REMOVAL_SCHEDULED);
    assert_eq!(flagged.message(), "import finished");
    assert_eq!(flagged.visibility(), Visibility::Public);
}
