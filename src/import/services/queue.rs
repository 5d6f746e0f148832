//! Bounded import work queue.

use super::ImportPipeline;
use crate::vendor::domain::DbRequest;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::{Mutex, mpsc};
use tokio::task::JoinHandle;
use tracing::{debug, info};

/// Errors returned when reserving queue capacity.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum QueueError {
    /// Every slot is taken.
    #[error("import queue full")]
    Full,
    /// The workers have shut down.
    #[error("import queue closed")]
    Closed,
}

/// Handle for submitting imports to a fixed pool of workers.
#[derive(Debug, Clone)]
pub struct ImportQueue {
    sender: mpsc::Sender<DbRequest>,
}

/// Reserved queue capacity; submitting through it cannot fail.
pub struct ImportSlot<'a> {
    permit: mpsc::Permit<'a, DbRequest>,
}

impl ImportQueue {
    /// Spawns `workers` tasks draining a queue of `capacity` pending
    /// imports. Both values are raised to at least one.
    #[must_use]
    pub fn start(
        pipeline: Arc<ImportPipeline>,
        workers: usize,
        capacity: usize,
    ) -> (Self, Vec<JoinHandle<()>>) {
        let (sender, receiver) = mpsc::channel(capacity.max(1));
        let shared = Arc::new(Mutex::new(receiver));
        let handles = (0..workers.max(1))
            .map(|worker| {
                tokio::spawn(work(worker, Arc::clone(&shared), Arc::clone(&pipeline)))
            })
            .collect();
        (Self { sender }, handles)
    }

    /// Reserves a slot without waiting.
    ///
    /// Reserve before doing work that an import depends on, so a full queue
    /// is detected while the request can still be refused cleanly.
    ///
    /// # Errors
    ///
    /// Returns [`QueueError::Full`] when no slot is free or
    /// [`QueueError::Closed`] when the workers are gone.
    pub fn try_reserve(&self) -> Result<ImportSlot<'_>, QueueError> {
        self.sender
            .try_reserve()
            .map(|permit| ImportSlot { permit })
            .map_err(|err| match err {
                mpsc::error::TrySendError::Full(()) => QueueError::Full,
                mpsc::error::TrySendError::Closed(()) => QueueError::Closed,
            })
    }

    /// Returns the number of free slots.
    #[must_use]
    pub fn available(&self) -> usize {
        self.sender.capacity()
    }
}

impl ImportSlot<'_> {
    /// Enqueues `request` into the reserved slot.
    pub fn submit(self, request: DbRequest) {
        debug!(id = request.id, "queued import");
        self.permit.send(request);
    }
}

async fn work(
    worker: usize,
    receiver: Arc<Mutex<mpsc::Receiver<DbRequest>>>,
    pipeline: Arc<ImportPipeline>,
) {
    loop {
        let next = receiver.lock().await.recv().await;
        let Some(request) = next else {
            debug!(worker, "import queue closed, worker exiting");
            break;
        };
        let id = request.id;
        let status = pipeline.run(request).await;
        info!(worker, id, %status, "import finished");
    }
}
