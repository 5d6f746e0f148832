//! Agent registration and unregistration.

use super::{AgentRegistry, IdGenerator};
use crate::agent_registry::domain::{Agent, AgentDomainError, AgentRegistration};
use crate::protocol::{AgentDescriptor, RegisterResponse};
use mockable::Clock;
use std::net::IpAddr;
use std::sync::Arc;
use thiserror::Error;
use tracing::info;
use uuid::Uuid;

/// Errors returned by the registration service.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RegistrationError {
    /// The descriptor failed validation.
    #[error(transparent)]
    Domain(#[from] AgentDomainError),

    /// No agent is registered under the name.
    #[error("agent not registered: {0}")]
    NotRegistered(String),
}

/// Admits agents into the registry.
#[derive(Clone)]
pub struct AgentRegistrationService<C>
where
    C: Clock + Send + Sync,
{
    registry: Arc<AgentRegistry>,
    ids: Arc<IdGenerator>,
    clock: Arc<C>,
}

impl<C> AgentRegistrationService<C>
where
    C: Clock + Send + Sync,
{
    /// Creates a registration service.
    #[must_use]
    pub const fn new(registry: Arc<AgentRegistry>, ids: Arc<IdGenerator>, clock: Arc<C>) -> Self {
        Self {
            registry,
            ids,
            clock,
        }
    }

    /// Registers or re-registers an agent.
    ///
    /// Re-registering under a known short name replaces the entry in place
    /// and keeps its identifier. When the descriptor carries no address,
    /// the peer address observed by the router is used.
    ///
    /// # Errors
    ///
    /// Returns [`RegistrationError::Domain`] when the descriptor is invalid.
    pub fn register(
        &self,
        descriptor: &AgentDescriptor,
        observed: Option<IpAddr>,
    ) -> Result<RegisterResponse, RegistrationError> {
        let address = if descriptor.address.trim().is_empty() {
            observed.map(|ip| ip.to_string()).unwrap_or_default()
        } else {
            descriptor.address.clone()
        };

        let candidate = Agent::register(
            AgentRegistration {
                id: 0,
                descriptor,
                address,
                token: Uuid::new_v4().to_string(),
            },
            &*self.clock,
        )?;
        let (agent, first) = self.registry.admit(candidate, || self.ids.next_id());

        let response = RegisterResponse {
            id: agent.id(),
            address: agent.endpoint(),
            token: agent.token().to_owned(),
        };
        if first {
            info!(
                agent = %agent.short_name(),
                vendor = %agent.vendor(),
                endpoint = %response.address,
                "agent registered"
            );
        }
        Ok(response)
    }

    /// Removes an agent from the registry.
    ///
    /// # Errors
    ///
    /// Returns [`RegistrationError::NotRegistered`] when the name is unknown.
    pub fn unregister(&self, descriptor: &AgentDescriptor) -> Result<Agent, RegistrationError> {
        let removed = self
            .registry
            .remove(&descriptor.short_name)
            .ok_or_else(|| RegistrationError::NotRegistered(descriptor.short_name.clone()))?;
        info!(agent = %removed.short_name(), "agent unregistered");
        Ok(removed)
    }
}
