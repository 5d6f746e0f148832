//! Tests for the provisioning workflow and its HTTP surface.

mod service_tests;

use crate::agent_registry::adapters::LoopbackAgentClient;
use crate::agent_registry::services::{AgentRegistrationService, AgentRegistry, IdGenerator};
use crate::protocol::AgentDescriptor;
use crate::records::adapters::memory::InMemoryRecordRepository;
use crate::server::http::AppState;
use crate::server::{ProvisioningDeps, ProvisioningService, ProvisioningSettings};
use crate::vendor::adapters::InMemoryVendorAdapter;
use crate::vendor::domain::Vendor;
use mockable::DefaultClock;
use rstest::fixture;
use std::net::{IpAddr, Ipv4Addr};
use std::sync::Arc;

pub(super) const AGENT: &str = "pg-16";

/// A router wired to in-memory collaborators with one live Postgres agent.
pub(super) struct Harness {
    pub registry: Arc<AgentRegistry>,
    pub records: InMemoryRecordRepository,
    pub client: LoopbackAgentClient,
    pub database: InMemoryVendorAdapter,
    pub state: Arc<AppState>,
}

impl Harness {
    pub fn with_database(database: InMemoryVendorAdapter) -> Self {
        let registry = Arc::new(AgentRegistry::new());
        let ids = Arc::new(IdGenerator::new());
        let clock = Arc::new(DefaultClock);
        let records = InMemoryRecordRepository::new();
        let client = LoopbackAgentClient::new();
        client.attach(AGENT, Arc::new(database.clone()));

        let registration =
            AgentRegistrationService::new(Arc::clone(&registry), Arc::clone(&ids), Arc::clone(&clock));
        registration
            .register(&descriptor(AGENT), Some(IpAddr::V4(Ipv4Addr::LOCALHOST)))
            .expect("registration");

        let provisioning = ProvisioningService::new(
            ProvisioningDeps {
                registry: Arc::clone(&registry),
                records: Arc::new(records.clone()),
                agents: Arc::new(client.clone()),
                ids,
                clock,
            },
            ProvisioningSettings::default(),
        );

        Self {
            registry,
            records,
            client,
            database,
            state: Arc::new(AppState {
                provisioning,
                registration,
            }),
        }
    }

    pub fn service(&self) -> &ProvisioningService<DefaultClock> {
        &self.state.provisioning
    }
}

#[fixture]
pub(super) fn harness() -> Harness {
    Harness::with_database(InMemoryVendorAdapter::new(Vendor::Postgres))
}

pub(super) fn descriptor(short_name: &str) -> AgentDescriptor {
    AgentDescriptor {
        identifier: format!("postgres-16-{short_name}"),
        vendor: Vendor::Postgres,
        db_port: "5432".to_owned(),
        db_address: "db.internal".to_owned(),
        db_sid: String::new(),
        short_name: short_name.to_owned(),
        long_name: format!("Postgres agent {short_name}"),
        version: "16.2".to_owned(),
        port: "7010".to_owned(),
        address: String::new(),
        up: true,
    }
}
