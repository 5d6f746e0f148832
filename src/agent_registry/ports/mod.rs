//! Outbound agent ports.

mod client;

pub use client::{AgentClient, AgentClientError, AgentClientResult};
