//! Repository port for provisioning records.

use crate::records::domain::{ProvisioningRecord, RecordId};
use crate::status::StatusCode;
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for record store operations.
pub type RecordStoreResult<T> = Result<T, RecordStoreError>;

/// Persistence contract for provisioning records.
///
/// Every operation first checks that the backing store is reachable and
/// reports [`RecordStoreError::Unavailable`] when it is not. Listings are
/// ordered newest first.
#[async_trait]
pub trait RecordRepository: Send + Sync {
    /// Checks that the store can serve requests.
    ///
    /// # Errors
    ///
    /// Returns [`RecordStoreError::Unavailable`] when the store is down.
    async fn alive(&self) -> RecordStoreResult<()>;

    /// Finds a record by ID.
    async fn fetch_by_id(&self, id: RecordId) -> RecordStoreResult<Option<ProvisioningRecord>>;

    /// Returns the private records created by `creator`.
    async fn fetch_by_creator(&self, creator: &str) -> RecordStoreResult<Vec<ProvisioningRecord>>;

    /// Returns every public record.
    async fn fetch_public(&self) -> RecordStoreResult<Vec<ProvisioningRecord>>;

    /// Returns every record.
    async fn fetch_all(&self) -> RecordStoreResult<Vec<ProvisioningRecord>>;

    /// Returns the records hosted by one agent.
    async fn fetch_by_agent(&self, agent: &str) -> RecordStoreResult<Vec<ProvisioningRecord>>;

    /// Finds the newest record for a database name on one agent.
    async fn fetch_by_agent_and_name(
        &self,
        agent: &str,
        database_name: &str,
    ) -> RecordStoreResult<Option<ProvisioningRecord>>;

    /// Stores a new record and returns its assigned ID. Any ID already set
    /// on `record` is ignored.
    async fn insert(&self, record: &ProvisioningRecord) -> RecordStoreResult<RecordId>;

    /// Persists changes to a record, inserting it under a fresh ID when it
    /// has no ID or its ID is unknown. Returns the ID the record is stored
    /// under.
    async fn update(&self, record: &ProvisioningRecord) -> RecordStoreResult<RecordId>;

    /// Sets the status of an existing record, and its message when one is
    /// given. No other column is written.
    ///
    /// # Errors
    ///
    /// Returns [`RecordStoreError::NotFound`] when no record has the ID.
    async fn update_status(
        &self,
        id: RecordId,
        status: StatusCode,
        message: Option<&str>,
    ) -> RecordStoreResult<()>;

    /// Removes a record.
    ///
    /// # Errors
    ///
    /// Returns [`RecordStoreError::NotFound`] when no record has the ID.
    async fn delete(&self, id: RecordId) -> RecordStoreResult<()>;
}

/// Errors returned by record repository implementations.
#[derive(Debug, Clone, Error)]
pub enum RecordStoreError {
    /// The record was not found.
    #[error("record not found: {0}")]
    NotFound(RecordId),

    /// The store failed its liveness check.
    #[error("record store unavailable: {0}")]
    Unavailable(Arc<dyn std::error::Error + Send + Sync>),

    /// Persisted data could not be reconstructed into domain types.
    #[error("invalid persisted record data: {0}")]
    InvalidPersistedData(Arc<dyn std::error::Error + Send + Sync>),

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl RecordStoreError {
    /// Wraps a liveness failure.
    pub fn unavailable(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Unavailable(Arc::new(err))
    }

    /// Wraps persisted-data decoding or validation failures.
    pub fn invalid_persisted_data(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::InvalidPersistedData(Arc::new(err))
    }

    /// Wraps a persistence-layer failure.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
