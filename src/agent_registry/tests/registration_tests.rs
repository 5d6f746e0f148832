//! Registration service tests.

use super::descriptor;
use crate::agent_registry::domain::AgentDomainError;
use crate::agent_registry::services::{
    AgentRegistrationService, AgentRegistry, IdGenerator, RegistrationError,
};
use mockable::DefaultClock;
use rstest::{fixture, rstest};
use std::net::{IpAddr, Ipv4Addr};
use std::sync::Arc;

struct Fixture {
    registry: Arc<AgentRegistry>,
    service: AgentRegistrationService<DefaultClock>,
}

#[fixture]
fn registration() -> Fixture {
    let registry = Arc::new(AgentRegistry::new());
    let service = AgentRegistrationService::new(
        Arc::clone(&registry),
        Arc::new(IdGenerator::new()),
        Arc::new(DefaultClock),
    );
    Fixture { registry, service }
}

const PEER: IpAddr = IpAddr::V4(Ipv4Addr::new(192, 168, 1, 20));

#[rstest]
fn observed_address_fills_in_a_missing_one(registration: Fixture) {
    let response = registration
        .service
        .register(&descriptor("mysql-8"), Some(PEER))
        .expect("registration should succeed");

    assert_eq!(response.id, 1);
    assert_eq!(response.address, "192.168.1.20:7020");
    assert!(!response.token.is_empty());
}

#[rstest]
fn announced_address_wins_over_the_observed_one(registration: Fixture) {
    let mut announced = descriptor("mysql-8");
    announced.address = "agent.internal".to_owned();

    let response = registration
        .service
        .register(&announced, Some(PEER))
        .expect("registration should succeed");

    assert_eq!(response.address, "agent.internal:7020");
}

#[rstest]
fn reregistration_updates_in_place_and_keeps_the_id_and_token(registration: Fixture) {
    let first = registration
        .service
        .register(&descriptor("mysql-8"), Some(PEER))
        .expect("first registration");
    registration
        .service
        .register(&descriptor("pg-16"), Some(PEER))
        .expect("second agent");
    let mut moved = descriptor("mysql-8");
    moved.address = "10.1.1.1".to_owned();

    let again = registration
        .service
        .register(&moved, None)
        .expect("re-registration");

    assert_eq!(again.id, first.id);
    assert_eq!(again.token, first.token);
    assert_eq!(registration.registry.len(), 2);
    let stored = registration.registry.get("mysql-8").expect("agent present");
    assert_eq!(stored.address(), "10.1.1.1");
}

#[rstest]
fn registration_without_any_address_fails(registration: Fixture) {
    let result = registration.service.register(&descriptor("mysql-8"), None);

    assert_eq!(
        result,
        Err(RegistrationError::Domain(AgentDomainError::MissingAddress))
    );
    assert!(registration.registry.is_empty());
}

#[rstest]
fn unregister_removes_the_agent(registration: Fixture) {
    registration
        .service
        .register(&descriptor("mysql-8"), Some(PEER))
        .expect("registration");
    let mut leaving = descriptor("mysql-8");
    leaving.up = false;

    let removed = registration.service.unregister(&leaving).expect("unregister");

    assert_eq!(removed.short_name().as_str(), "mysql-8");
    assert!(registration.registry.get("mysql-8").is_none());
    assert_eq!(
        registration.service.unregister(&leaving).err(),
        Some(RegistrationError::NotRegistered("mysql-8".to_owned()))
    );
}

#[rstest]
fn simultaneous_first_registrations_share_one_identity(registration: Fixture) {
    let responses: Vec<_> = std::thread::scope(|scope| {
        let handles: Vec<_> = (0..8)
            .map(|_| {
                scope.spawn(|| {
                    registration
                        .service
                        .register(&descriptor("mysql-8"), Some(PEER))
                        .expect("registration")
                })
            })
            .collect();
        handles
            .into_iter()
            .map(|handle| handle.join().expect("registering thread"))
            .collect()
    });

    let first = responses.first().expect("eight responses");
    assert!(
        responses
            .iter()
            .all(|response| response.id == first.id && response.token == first.token)
    );
    assert_eq!(registration.registry.len(), 1);
    let stored = registration.registry.get("mysql-8").expect("agent present");
    assert_eq!(stored.id(), first.id);
    assert_eq!(stored.token(), first.token);
}
