//! Status reporting port.

use crate::protocol::StatusUpdate;
use async_trait::async_trait;

/// Delivers progress updates to the router.
///
/// Delivery is best effort: implementations log failures and never stop the
/// pipeline.
#[async_trait]
pub trait StatusReporter: Send + Sync {
    /// Sends one update.
    async fn report(&self, update: StatusUpdate);
}
