//! Validation errors for agent identity values.

use thiserror::Error;

/// Errors returned while constructing agent domain values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AgentDomainError {
    /// The short name is empty after trimming.
    #[error("agent short name must not be empty")]
    EmptyShortName,

    /// The short name contains characters outside `[a-z0-9_.-]`.
    #[error("agent short name '{0}' may only contain lowercase letters, digits, '.', '-' and '_'")]
    InvalidShortName(String),

    /// The short name exceeds the storage limit.
    #[error("agent short name exceeds 100 character limit: {0}")]
    ShortNameTooLong(String),

    /// The agent port is not a valid TCP port.
    #[error("agent port '{0}' is not a valid TCP port")]
    InvalidPort(String),

    /// Neither the descriptor nor the connection supplied an address.
    #[error("agent address is unknown")]
    MissingAddress,
}
