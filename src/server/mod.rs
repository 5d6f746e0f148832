//! The router: the central process clients and agents talk to.
//!
//! [`service::ProvisioningService`] validates client requests, routes them
//! to the owning agent, and keeps the record store in step with the status
//! callbacks agents send back. [`http`] exposes it, together with agent
//! registration, over axum.

pub mod error;
pub mod http;
pub mod request;
pub mod service;

pub use error::ProvisioningError;
pub use request::{AccessInfo, ClientRequest, RestartReport};
pub use service::{ProvisioningDeps, ProvisioningService, ProvisioningSettings};

#[cfg(test)]
mod tests;
