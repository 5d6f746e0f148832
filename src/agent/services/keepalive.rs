//! Registration keep-alive.

use crate::agent::ports::{ServerLink, ServerLinkResult};
use crate::protocol::AgentDescriptor;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Keeps the agent registered with the router.
///
/// Every tick re-registers. Registration is an upsert on the router, so
/// this is harmless while registered and restores the entry after a router
/// restart or a failed first attempt.
pub struct KeepAlive {
    link: Arc<dyn ServerLink>,
    descriptor: AgentDescriptor,
    registered: AtomicBool,
}

impl KeepAlive {
    /// Creates an unregistered keep-alive for `descriptor`.
    #[must_use]
    pub fn new(link: Arc<dyn ServerLink>, descriptor: AgentDescriptor) -> Self {
        Self {
            link,
            descriptor,
            registered: AtomicBool::new(false),
        }
    }

    /// Returns `true` when the last attempt succeeded.
    #[must_use]
    pub fn is_registered(&self) -> bool {
        self.registered.load(Ordering::SeqCst)
    }

    /// Makes one registration attempt and returns whether it succeeded.
    pub async fn tick(&self) -> bool {
        match self.link.register(&self.descriptor).await {
            Ok(response) => {
                let was_registered = self.registered.swap(true, Ordering::SeqCst);
                if was_registered {
                    debug!(id = response.id, "registration refreshed");
                } else {
                    info!(
                        id = response.id,
                        address = %response.address,
                        "registered with router"
                    );
                }
                true
            }
            Err(err) => {
                if self.registered.swap(false, Ordering::SeqCst) {
                    warn!(error = %err, "lost contact with router");
                } else {
                    warn!(error = %err, "could not register with router; will retry");
                }
                false
            }
        }
    }

    /// Re-registers every `interval` until the task is cancelled.
    pub async fn run(self: Arc<Self>, interval: Duration) {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            self.tick().await;
        }
    }

    /// Unregisters from the router.
    ///
    /// # Errors
    ///
    /// Returns the link's failure.
    pub async fn unregister(&self) -> ServerLinkResult<()> {
        self.link.unregister(&self.descriptor).await?;
        self.registered.store(false, Ordering::SeqCst);
        info!(agent = %self.descriptor.short_name, "unregistered from router");
        Ok(())
    }
}
