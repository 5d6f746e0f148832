//! dbfleet: on-demand test databases handed out through a central router.
//!
//! A single router keeps a registry of agents, each fronting one database
//! server of a given vendor, and a record store of every database it has
//! handed out. Clients ask the router for a database; the router picks the
//! agent, records the request and forwards it. Agents create, drop and
//! import databases against their local server and report import progress
//! back to the router.
//!
//! # Architecture
//!
//! Each context follows the hexagonal layout:
//!
//! - **Domain**: validated values and aggregates with no I/O
//! - **Ports**: async traits for the outside world
//! - **Adapters**: HTTP, diesel, child-process and in-memory implementations
//! - **Services**: orchestration over ports
//!
//! # Modules
//!
//! - [`status`]: numeric status codes shared by router, agents and clients
//! - [`protocol`]: JSON payloads exchanged between router and agents
//! - [`command`]: child-process execution for vendor client tools
//! - [`vendor`]: per-vendor database administration
//! - [`import`]: dump download, extraction and the bounded import queue
//! - [`agent_registry`]: registered agents, liveness and router-to-agent calls
//! - [`records`]: provisioning records and their persistence
//! - [`server`]: the router's provisioning service and client API
//! - [`maintenance`]: expiry sweeps over the record store
//! - [`agent`]: the agent's HTTP surface and keep-alive
//! - [`config`]: command-line and environment configuration
//! - [`telemetry`]: tracing setup and access logging
//! - [`signal`]: shutdown signal handling

pub mod agent;
pub mod agent_registry;
pub mod command;
pub mod config;
pub mod import;
pub mod maintenance;
pub mod protocol;
pub mod records;
pub mod server;
pub mod signal;
pub mod status;
pub mod telemetry;
pub mod vendor;
