//! In-memory migration target.

use crate::records::ports::{Migration, MigrationError, MigrationResult, MigrationTarget};
use async_trait::async_trait;
use std::sync::{Arc, Mutex, PoisonError};

/// Migration target that records executed statements instead of running
/// them.
#[derive(Debug, Clone, Default)]
pub struct InMemoryMigrationTarget {
    state: Arc<Mutex<MigrationState>>,
}

#[derive(Debug, Default)]
struct MigrationState {
    prepared: bool,
    executed: Vec<&'static str>,
    fail_at: Option<usize>,
}

impl InMemoryMigrationTarget {
    /// Creates a target with nothing applied.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes the migration with the given one-based version fail.
    #[must_use]
    pub fn failing_at(self, version: usize) -> Self {
        self.lock().fail_at = Some(version);
        self
    }

    /// Clears any injected failure.
    pub fn heal(&self) {
        self.lock().fail_at = None;
    }

    /// Returns every statement executed so far, in order.
    #[must_use]
    pub fn executed(&self) -> Vec<&'static str> {
        self.lock().executed.clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MigrationState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl MigrationTarget for InMemoryMigrationTarget {
    async fn prepare(&self) -> MigrationResult<()> {
        self.lock().prepared = true;
        Ok(())
    }

    async fn applied_count(&self) -> MigrationResult<usize> {
        let state = self.lock();
        if !state.prepared {
            return Err(MigrationError::bookkeeping(std::io::Error::other(
                "version table missing",
            )));
        }
        Ok(state.executed.len())
    }

    async fn apply(&self, version: usize, migration: &Migration) -> MigrationResult<()> {
        let mut state = self.lock();
        if state.fail_at == Some(version) {
            return Err(MigrationError::statement(
                version,
                migration,
                std::io::Error::other("statement rejected"),
            ));
        }
        state.executed.push(migration.statement);
        Ok(())
    }
}
