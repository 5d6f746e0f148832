//! Agent-to-router link.

use crate::protocol::{AgentDescriptor, RegisterResponse};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for router link calls.
pub type ServerLinkResult<T> = Result<T, ServerLinkError>;

/// Registration calls an agent makes against the router.
#[async_trait]
pub trait ServerLink: Send + Sync {
    /// Registers, or re-registers, the agent.
    ///
    /// # Errors
    ///
    /// Returns [`ServerLinkError`] when the router is unreachable or
    /// refuses the descriptor.
    async fn register(&self, descriptor: &AgentDescriptor) -> ServerLinkResult<RegisterResponse>;

    /// Removes the agent from the router's registry.
    ///
    /// # Errors
    ///
    /// Returns [`ServerLinkError`] when the router is unreachable or does
    /// not know the agent.
    async fn unregister(&self, descriptor: &AgentDescriptor) -> ServerLinkResult<()>;
}

/// Errors returned by router links.
#[derive(Debug, Clone, Error)]
pub enum ServerLinkError {
    /// The router could not be reached.
    #[error("router unreachable: {0}")]
    Unreachable(Arc<dyn std::error::Error + Send + Sync>),

    /// The router answered with an error.
    #[error("router answered HTTP {status}: {body}")]
    Rejected {
        /// HTTP status code.
        status: u16,
        /// Response body.
        body: String,
    },
}

impl ServerLinkError {
    /// Wraps a transport error.
    pub fn unreachable(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Unreachable(Arc::new(err))
    }
}
