//! Liveness sweep tests.

use super::descriptor;
use crate::agent_registry::adapters::LoopbackAgentClient;
use crate::agent_registry::domain::Agent;
use crate::agent_registry::ports::{AgentClient, AgentClientResult};
use crate::agent_registry::services::{
    AgentRegistrationService, AgentRegistry, IdGenerator, LivenessMonitor,
};
use crate::vendor::adapters::InMemoryVendorAdapter;
use crate::protocol::Message;
use crate::vendor::domain::{DbRequest, Vendor};
use async_trait::async_trait;
use mockable::DefaultClock;
use std::net::{IpAddr, Ipv4Addr};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

fn registered(names: &[&str]) -> (Arc<AgentRegistry>, LoopbackAgentClient) {
    let registry = Arc::new(AgentRegistry::new());
    let service = AgentRegistrationService::new(
        Arc::clone(&registry),
        Arc::new(IdGenerator::new()),
        Arc::new(DefaultClock),
    );
    let client = LoopbackAgentClient::new();
    for name in names {
        service
            .register(&descriptor(name), Some(IpAddr::V4(Ipv4Addr::LOCALHOST)))
            .expect("registration");
        client.attach(name, Arc::new(InMemoryVendorAdapter::new(Vendor::Mysql)));
    }
    (registry, client)
}

#[tokio::test(flavor = "multi_thread")]
async fn unreachable_agent_is_marked_down_then_evicted() {
    let (registry, client) = registered(&["mysql-8", "pg-16"]);
    client.set_unreachable("pg-16", true);
    let monitor = LivenessMonitor::new(Arc::clone(&registry), Arc::new(client.clone()), 2);

    let first = monitor.sweep().await;

    assert_eq!(first.down.len(), 1);
    assert!(!registry.get("pg-16").expect("still registered").is_up());
    assert!(registry.get("mysql-8").expect("registered").is_up());

    let second = monitor.sweep().await;

    assert_eq!(second.evicted.len(), 1);
    assert!(registry.get("pg-16").is_none());
    assert_eq!(registry.len(), 1);
}

#[tokio::test(flavor = "multi_thread")]
async fn recovered_agent_is_marked_up_and_its_count_reset() {
    let (registry, client) = registered(&["mysql-8"]);
    client.set_unreachable("mysql-8", true);
    let monitor = LivenessMonitor::new(Arc::clone(&registry), Arc::new(client.clone()), 2);

    monitor.sweep().await;
    client.set_unreachable("mysql-8", false);
    let recovered = monitor.sweep().await;
    client.set_unreachable("mysql-8", true);
    let missed_again = monitor.sweep().await;

    assert_eq!(recovered.up.len(), 1);
    assert_eq!(missed_again.down.len(), 1);
    assert!(missed_again.evicted.is_empty());
}

/// Holds the heartbeat of `waiting` until every other agent has answered.
struct WaitingClient {
    inner: LoopbackAgentClient,
    waiting: &'static str,
    others: usize,
    answered: AtomicUsize,
}

#[async_trait]
impl AgentClient for WaitingClient {
    async fn create_database(&self, agent: &Agent, request: &DbRequest) -> AgentClientResult<Message> {
        self.inner.create_database(agent, request).await
    }

    async fn import_database(&self, agent: &Agent, request: &DbRequest) -> AgentClientResult<Message> {
        self.inner.import_database(agent, request).await
    }

    async fn drop_database(&self, agent: &Agent, request: &DbRequest) -> AgentClientResult<Message> {
        self.inner.drop_database(agent, request).await
    }

    async fn heartbeat(&self, agent: &Agent) -> AgentClientResult<()> {
        if agent.short_name().as_str() == self.waiting {
            while self.answered.load(Ordering::SeqCst) < self.others {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        } else {
            self.answered.fetch_add(1, Ordering::SeqCst);
        }
        self.inner.heartbeat(agent).await
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn a_slow_agent_does_not_hold_up_the_others() {
    let (registry, client) = registered(&["a-slow", "mysql-8", "pg-16"]);
    client.set_unreachable("pg-16", true);
    let monitor = LivenessMonitor::new(
        Arc::clone(&registry),
        Arc::new(WaitingClient {
            inner: client.clone(),
            waiting: "a-slow",
            others: 2,
            answered: AtomicUsize::new(0),
        }),
        2,
    );

    let report = tokio::time::timeout(Duration::from_secs(5), monitor.sweep())
        .await
        .expect("heartbeats should run side by side");

    let up: Vec<&str> = report.up.iter().map(|name| name.as_str()).collect();
    assert_eq!(up, ["a-slow", "mysql-8"]);
    assert_eq!(report.down.len(), 1);
    assert!(!registry.get("pg-16").expect("still registered").is_up());
}
