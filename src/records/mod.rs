//! Provisioning records kept by the router.
//!
//! Each database handed out to a client is tracked by a record carrying its
//! credentials, owner, visibility, expiry and latest status. Records are
//! stored in `PostgreSQL` when a database URL is configured, otherwise in
//! memory.
//!
//! - Record types in [`domain`]
//! - Repository and migration contracts in [`ports`]
//! - In-memory and `PostgreSQL` implementations in [`adapters`]
//! - Schema migration orchestration in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
