//! Schema migration port.

use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for migration operations.
pub type MigrationResult<T> = Result<T, MigrationError>;

/// One schema change, applied at most once per store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Migration {
    /// SQL executed against the store.
    pub statement: &'static str,
    /// Short summary recorded next to the version.
    pub description: &'static str,
}

impl Migration {
    /// Creates a migration.
    #[must_use]
    pub const fn new(statement: &'static str, description: &'static str) -> Self {
        Self {
            statement,
            description,
        }
    }
}

/// A store that tracks how many migrations it has applied.
#[async_trait]
pub trait MigrationTarget: Send + Sync {
    /// Creates the version table when it does not exist yet.
    async fn prepare(&self) -> MigrationResult<()>;

    /// Returns the number of migrations already applied.
    async fn applied_count(&self) -> MigrationResult<usize>;

    /// Executes `migration` and records `version` as applied. Both happen
    /// or neither does.
    async fn apply(&self, version: usize, migration: &Migration) -> MigrationResult<()>;
}

/// Errors returned while migrating a store.
#[derive(Debug, Clone, Error)]
pub enum MigrationError {
    /// The store could not be reached.
    #[error("migration target unavailable: {0}")]
    Unavailable(Arc<dyn std::error::Error + Send + Sync>),

    /// The version table could not be read or written.
    #[error("migration bookkeeping failed: {0}")]
    Bookkeeping(Arc<dyn std::error::Error + Send + Sync>),

    /// A migration statement failed.
    #[error("migration {version} ({description}) failed: {cause}")]
    Statement {
        /// One-based version of the failed migration.
        version: usize,
        /// Description of the failed migration.
        description: &'static str,
        /// Underlying failure.
        cause: Arc<dyn std::error::Error + Send + Sync>,
    },

    /// The store records more migrations than are known.
    #[error("store reports {applied} applied migrations but only {known} are known")]
    AheadOfCode {
        /// Count stored in the version table.
        applied: usize,
        /// Length of the migration list.
        known: usize,
    },
}

impl MigrationError {
    /// Wraps a connection failure.
    pub fn unavailable(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Unavailable(Arc::new(err))
    }

    /// Wraps a version table failure.
    pub fn bookkeeping(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Bookkeeping(Arc::new(err))
    }

    /// Wraps a failed statement.
    pub fn statement(
        version: usize,
        migration: &Migration,
        err: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Statement {
            version,
            description: migration.description,
            cause: Arc::new(err),
        }
    }
}
