//! JSON payloads exchanged between the router and its agents.

use crate::status::StatusCode;
use crate::vendor::domain::Vendor;
use serde::{Deserialize, Serialize};

/// Reply body returned by every agent endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Outcome of the operation.
    pub status: StatusCode,
    /// Human-readable detail.
    pub message: String,
}

impl Message {
    /// Creates a reply.
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }
}

/// Reply of an agent's `/list-databases` endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabaseList {
    /// Outcome of the listing.
    pub status: StatusCode,
    /// Database names.
    pub message: Vec<String>,
}

/// Progress report an agent posts to the router's `/status` endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusUpdate {
    /// Correlation number of the request, equal to the record ID.
    pub id: u64,
    /// New status of the record.
    #[serde(rename = "statusCode")]
    pub status: StatusCode,
    /// Human-readable detail.
    pub message: String,
}

/// Self-description an agent registers and unregisters with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentDescriptor {
    /// Identifying token, usually `vendor-version-host`.
    #[serde(rename = "connector_name", default)]
    pub identifier: String,
    /// Database vendor the agent serves.
    #[serde(rename = "dbvendor")]
    pub vendor: Vendor,
    /// Port clients use to reach the database.
    #[serde(rename = "dbport", default)]
    pub db_port: String,
    /// Host clients use to reach the database.
    #[serde(rename = "dbaddress", default)]
    pub db_address: String,
    /// Oracle SID, empty for other vendors.
    #[serde(rename = "dbsid", default)]
    pub db_sid: String,
    /// Unique short name, the registry key.
    pub short_name: String,
    /// Display name.
    #[serde(default)]
    pub long_name: String,
    /// Database server version.
    #[serde(default)]
    pub version: String,
    /// Port the agent's HTTP interface listens on.
    pub port: String,
    /// Address the agent's HTTP interface is reachable at; the router
    /// falls back to the observed peer address when empty.
    #[serde(default)]
    pub address: String,
    /// Liveness flag, `false` when unregistering.
    #[serde(default = "default_up")]
    pub up: bool,
}

const fn default_up() -> bool {
    true
}

/// Router reply to a successful registration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterResponse {
    /// Identifier assigned to the agent.
    pub id: u64,
    /// Address the router will use to reach the agent.
    pub address: String,
    /// Identity token issued for this registration.
    pub token: String,
}

/// Agent self-description served at `/whoami`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct WhoAmI {
    /// Database vendor.
    pub database_vendor: Vendor,
    /// Database server version.
    pub database_version: String,
    /// Agent build version.
    pub agent_version: String,
    /// Seconds since the agent started.
    pub uptime_seconds: u64,
}
