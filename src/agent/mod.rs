//! Agent side of the fleet.
//!
//! An agent fronts one database server. It registers with the router,
//! answers provisioning calls over HTTP and runs imports on its bounded
//! queue, reporting progress back through the same link it registered
//! with.
//!
//! - The router link contract in [`ports`]
//! - HTTP and in-memory router links in [`adapters`]
//! - Registration keep-alive in [`services`]
//! - The agent's HTTP interface in [`http`]

pub mod adapters;
pub mod http;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
