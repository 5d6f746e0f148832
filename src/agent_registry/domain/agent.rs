//! Registered agent.

use super::{AgentDomainError, ShortName};
use crate::protocol::AgentDescriptor;
use crate::vendor::domain::Vendor;
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::Serialize;

/// An agent known to the router.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Agent {
    id: u64,
    short_name: ShortName,
    long_name: String,
    identifier: String,
    vendor: Vendor,
    version: String,
    db_address: String,
    db_port: String,
    db_sid: String,
    address: String,
    port: u16,
    #[serde(skip_serializing)]
    token: String,
    up: bool,
    registered_at: DateTime<Utc>,
}

/// Parameter object for building an [`Agent`] from a registration.
#[derive(Debug, Clone)]
pub struct AgentRegistration<'a> {
    /// Identifier to assign.
    pub id: u64,
    /// Descriptor the agent sent.
    pub descriptor: &'a AgentDescriptor,
    /// Address to reach the agent at, already resolved.
    pub address: String,
    /// Identity token issued for this registration.
    pub token: String,
}

impl Agent {
    /// Builds a live agent from its registration.
    ///
    /// # Errors
    ///
    /// Returns [`AgentDomainError`] when the short name or port is invalid
    /// or the address is empty.
    pub fn register(
        registration: AgentRegistration<'_>,
        clock: &impl Clock,
    ) -> Result<Self, AgentDomainError> {
        let descriptor = registration.descriptor;
        let short_name = ShortName::new(descriptor.short_name.as_str())?;
        let port = descriptor
            .port
            .trim()
            .parse::<u16>()
            .ok()
            .filter(|port| *port != 0)
            .ok_or_else(|| AgentDomainError::InvalidPort(descriptor.port.clone()))?;
        if registration.address.trim().is_empty() {
            return Err(AgentDomainError::MissingAddress);
        }

        Ok(Self {
            id: registration.id,
            short_name,
            long_name: descriptor.long_name.clone(),
            identifier: descriptor.identifier.clone(),
            vendor: descriptor.vendor,
            version: descriptor.version.clone(),
            db_address: descriptor.db_address.clone(),
            db_port: descriptor.db_port.clone(),
            db_sid: descriptor.db_sid.clone(),
            address: registration.address.trim().to_owned(),
            port,
            token: registration.token,
            up: true,
            registered_at: clock.utc(),
        })
    }

    /// Returns the agent identifier.
    #[must_use]
    pub const fn id(&self) -> u64 {
        self.id
    }

    /// Returns the registry key.
    #[must_use]
    pub const fn short_name(&self) -> &ShortName {
        &self.short_name
    }

    /// Returns the display name.
    #[must_use]
    pub fn long_name(&self) -> &str {
        &self.long_name
    }

    /// Returns the identifying token the agent announced.
    #[must_use]
    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    /// Returns the vendor served.
    #[must_use]
    pub const fn vendor(&self) -> Vendor {
        self.vendor
    }

    /// Returns the database server version.
    #[must_use]
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Returns the host clients use to reach the database.
    #[must_use]
    pub fn db_address(&self) -> &str {
        &self.db_address
    }

    /// Returns the port clients use to reach the database.
    #[must_use]
    pub fn db_port(&self) -> &str {
        &self.db_port
    }

    /// Returns the Oracle SID, empty for other vendors.
    #[must_use]
    pub fn db_sid(&self) -> &str {
        &self.db_sid
    }

    /// Returns the agent's HTTP host.
    #[must_use]
    pub fn address(&self) -> &str {
        &self.address
    }

    /// Returns the agent's HTTP port.
    #[must_use]
    pub const fn port(&self) -> u16 {
        self.port
    }

    /// Returns the identity token issued at registration.
    #[must_use]
    pub fn token(&self) -> &str {
        &self.token
    }

    /// Returns `true` while the agent answers liveness probes.
    #[must_use]
    pub const fn is_up(&self) -> bool {
        self.up
    }

    /// Returns when the agent last registered.
    #[must_use]
    pub const fn registered_at(&self) -> DateTime<Utc> {
        self.registered_at
    }

    /// Returns `host:port`.
    #[must_use]
    pub fn endpoint(&self) -> String {
        format!("{}:{}", self.address, self.port)
    }

    /// Returns the URL of `path` on the agent.
    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("http://{}/{}", self.endpoint(), path.trim_start_matches('/'))
    }

    /// Records the outcome of a liveness probe.
    pub const fn set_up(&mut self, up: bool) {
        self.up = up;
    }

    /// Sets the identifier assigned to a first registration.
    pub const fn assign_id(&mut self, id: u64) {
        self.id = id;
    }

    /// Keeps the identifier and token of an earlier registration under the
    /// same name.
    pub fn keep_identity(&mut self, earlier: &Self) {
        self.id = earlier.id;
        self.token.clone_from(&earlier.token);
    }
}
