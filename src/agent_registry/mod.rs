//! Registry of the agents attached to the router.
//!
//! Agents announce themselves on start-up, re-announce periodically, and are
//! probed by a liveness sweep; unreachable agents are marked down and
//! eventually evicted. The registry is process-local and rebuilt from
//! re-registrations after a router restart.
//!
//! - Agent identity types in [`domain`]
//! - The outbound [`ports::AgentClient`] contract in [`ports`]
//! - HTTP and loopback clients in [`adapters`]
//! - Registry store, ID generation, registration and liveness in
//!   [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
