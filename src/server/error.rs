//! Provisioning errors surfaced to clients.

use crate::agent_registry::ports::AgentClientError;
use crate::records::ports::RecordStoreError;
use crate::status::StatusCode;
use std::sync::Arc;
use thiserror::Error;

/// Result type for provisioning operations.
pub type ProvisioningResult<T> = Result<T, ProvisioningError>;

/// Failures of client-facing provisioning operations.
#[derive(Debug, Clone, Error)]
pub enum ProvisioningError {
    /// The request is incomplete or malformed.
    #[error("invalid request: {0}")]
    Validation(String),

    /// The agent, record or dump does not exist.
    #[error("{0} not found")]
    NotFound(String),

    /// The database or user already exists on the agent.
    #[error("already exists: {0}")]
    AlreadyExists(String),

    /// The caller may not see or change the record.
    #[error("access denied")]
    AccessDenied,

    /// The agent ran the operation and reported a failure.
    #[error("agent reported {status}: {message}")]
    ExternalTool {
        /// Status the agent replied with.
        status: StatusCode,
        /// Agent message, including tool output where available.
        message: String,
    },

    /// The record store or the agent could not be reached.
    #[error("backend unavailable: {0}")]
    BackendUnavailable(Arc<dyn std::error::Error + Send + Sync>),

    /// The record store failed.
    #[error(transparent)]
    Store(RecordStoreError),
}

impl From<RecordStoreError> for ProvisioningError {
    fn from(err: RecordStoreError) -> Self {
        match err {
            RecordStoreError::Unavailable(cause) => Self::BackendUnavailable(cause),
            RecordStoreError::NotFound(id) => Self::NotFound(format!("record {id}")),
            other => Self::Store(other),
        }
    }
}

impl From<AgentClientError> for ProvisioningError {
    fn from(err: AgentClientError) -> Self {
        Self::BackendUnavailable(Arc::new(err))
    }
}
