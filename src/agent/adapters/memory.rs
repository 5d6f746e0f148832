//! In-memory router link for tests.

use crate::agent::ports::{ServerLink, ServerLinkError, ServerLinkResult};
use crate::protocol::{AgentDescriptor, RegisterResponse};
use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

/// Records registrations and can be switched unreachable.
#[derive(Debug, Clone, Default)]
pub struct InMemoryServerLink {
    down: Arc<AtomicBool>,
    next_id: Arc<AtomicU64>,
    registrations: Arc<Mutex<Vec<AgentDescriptor>>>,
    unregistrations: Arc<Mutex<Vec<AgentDescriptor>>>,
}

impl InMemoryServerLink {
    /// Creates a reachable link.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every call fail as unreachable, or not.
    pub fn set_unreachable(&self, unreachable: bool) {
        self.down.store(unreachable, Ordering::SeqCst);
    }

    /// Returns the number of successful registrations.
    #[must_use]
    pub fn registrations(&self) -> usize {
        self.registrations
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Returns every descriptor received by `unregister`.
    #[must_use]
    pub fn unregistrations(&self) -> Vec<AgentDescriptor> {
        self.unregistrations
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn ensure_reachable(&self) -> ServerLinkResult<()> {
        if self.down.load(Ordering::SeqCst) {
            Err(ServerLinkError::unreachable(std::io::Error::from(
                std::io::ErrorKind::ConnectionRefused,
            )))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl ServerLink for InMemoryServerLink {
    async fn register(&self, descriptor: &AgentDescriptor) -> ServerLinkResult<RegisterResponse> {
        self.ensure_reachable()?;
        self.registrations
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(descriptor.clone());
        Ok(RegisterResponse {
            id: self.next_id.fetch_add(1, Ordering::SeqCst) + 1,
            address: descriptor.address.clone(),
            token: format!("token-{}", descriptor.short_name),
        })
    }

    async fn unregister(&self, descriptor: &AgentDescriptor) -> ServerLinkResult<()> {
        self.ensure_reachable()?;
        self.unregistrations
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(AgentDescriptor {
                up: false,
                ..descriptor.clone()
            });
        Ok(())
    }
}
