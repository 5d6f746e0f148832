//! Asynchronous dump import on the agent.
//!
//! An import request is acknowledged as soon as its database exists; the
//! dump is then downloaded, unpacked, validated and loaded by a bounded pool
//! of workers, each stage reported to the router as a status update.
//!
//! - Archive formats and pipeline errors in [`domain`]
//! - Download and status-reporting ports in [`ports`]
//! - HTTP/file fetching, archive extraction and a recording reporter in
//!   [`adapters`]
//! - The pipeline and its work queue in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
