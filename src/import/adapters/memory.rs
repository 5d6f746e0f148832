//! Status reporter that keeps updates in memory.

use crate::import::ports::StatusReporter;
use crate::protocol::StatusUpdate;
use crate::status::StatusCode;
use async_trait::async_trait;
use std::sync::{Arc, Mutex, PoisonError};

/// Records every update it receives.
#[derive(Debug, Clone, Default)]
pub struct RecordingStatusReporter {
    updates: Arc<Mutex<Vec<StatusUpdate>>>,
}

impl RecordingStatusReporter {
    /// Creates an empty reporter.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns every update received so far.
    #[must_use]
    pub fn updates(&self) -> Vec<StatusUpdate> {
        self.updates
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Returns the status codes received so far, in order.
    #[must_use]
    pub fn statuses(&self) -> Vec<StatusCode> {
        self.updates().into_iter().map(|update| update.status).collect()
    }
}

#[async_trait]
impl StatusReporter for RecordingStatusReporter {
    async fn report(&self, update: StatusUpdate) {
        self.updates
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(update);
    }
}
