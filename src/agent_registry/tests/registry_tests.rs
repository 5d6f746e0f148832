//! Registry map tests.

use super::descriptor;
use crate::agent_registry::domain::{Agent, AgentRegistration};
use crate::agent_registry::services::AgentRegistry;
use mockable::DefaultClock;
use std::sync::Arc;

const AGENTS: usize = 32;

fn agent(short_name: &str, id: u64) -> Agent {
    Agent::register(
        AgentRegistration {
            id,
            descriptor: &descriptor(short_name),
            address: "10.0.0.7".to_owned(),
            token: format!("token-{id}"),
        },
        &DefaultClock,
    )
    .expect("valid agent")
}

#[tokio::test(flavor = "multi_thread")]
async fn concurrent_upserts_keep_every_agent_in_name_order() {
    let registry = Arc::new(AgentRegistry::new());
    let mut tasks = tokio::task::JoinSet::new();
    for index in (0..AGENTS).rev() {
        let shared = Arc::clone(&registry);
        tasks.spawn(async move {
            let id = u64::try_from(index).expect("small index");
            shared.upsert(agent(&format!("agent-{index:02}"), id));
        });
    }
    while let Some(joined) = tasks.join_next().await {
        joined.expect("upsert task");
    }

    let listed: Vec<String> = registry
        .list()
        .iter()
        .map(|agent| agent.short_name().as_str().to_owned())
        .collect();
    let expected: Vec<String> = (0..AGENTS).map(|index| format!("agent-{index:02}")).collect();
    assert_eq!(listed, expected);
    assert_eq!(registry.len(), AGENTS);
}

#[test]
fn admitting_a_known_name_keeps_its_identity() {
    let registry = AgentRegistry::new();
    let (first, new) = registry.admit(agent("mysql-8", 0), || 7);
    assert!(new);
    assert_eq!(first.id(), 7);

    let (second, again_new) = registry.admit(agent("mysql-8", 0), || 99);

    assert!(!again_new);
    assert_eq!(second.id(), 7);
    assert_eq!(second.token(), first.token());
    assert_eq!(registry.len(), 1);
}
