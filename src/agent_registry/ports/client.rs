//! Router-to-agent calls.

use crate::agent_registry::domain::Agent;
use crate::protocol::Message;
use crate::vendor::domain::DbRequest;
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for agent calls.
pub type AgentClientResult<T> = Result<T, AgentClientError>;

/// Calls the HTTP interface of a registered agent.
///
/// Provisioning calls return the agent's [`Message`] whatever its status;
/// only transport-level failures are errors.
#[async_trait]
pub trait AgentClient: Send + Sync {
    /// Asks the agent to create a database.
    ///
    /// # Errors
    ///
    /// Returns [`AgentClientError`] when the agent cannot be reached or
    /// answers with something other than a status message.
    async fn create_database(&self, agent: &Agent, request: &DbRequest)
    -> AgentClientResult<Message>;

    /// Asks the agent to create a database and queue an import into it.
    ///
    /// # Errors
    ///
    /// Returns [`AgentClientError`] on transport failures.
    async fn import_database(&self, agent: &Agent, request: &DbRequest)
    -> AgentClientResult<Message>;

    /// Asks the agent to drop a database.
    ///
    /// # Errors
    ///
    /// Returns [`AgentClientError`] on transport failures.
    async fn drop_database(&self, agent: &Agent, request: &DbRequest) -> AgentClientResult<Message>;

    /// Probes the agent's heartbeat endpoint.
    ///
    /// # Errors
    ///
    /// Returns [`AgentClientError`] when the agent does not answer
    /// successfully.
    async fn heartbeat(&self, agent: &Agent) -> AgentClientResult<()>;
}

/// Errors returned by agent clients.
#[derive(Debug, Clone, Error)]
pub enum AgentClientError {
    /// The agent could not be reached.
    #[error("agent {agent} is unreachable: {cause}")]
    Unreachable {
        /// Short name of the agent.
        agent: String,
        /// Transport error.
        cause: Arc<dyn std::error::Error + Send + Sync>,
    },

    /// The agent answered with an unexpected body or status.
    #[error("agent {agent} sent an invalid response: {detail}")]
    InvalidResponse {
        /// Short name of the agent.
        agent: String,
        /// What was wrong with the response.
        detail: String,
    },
}

impl AgentClientError {
    /// Wraps a transport error for `agent`.
    pub fn unreachable(
        agent: &Agent,
        err: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Unreachable {
            agent: agent.short_name().to_string(),
            cause: Arc::new(err),
        }
    }
}
