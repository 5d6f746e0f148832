//! Linear schema migration runner.

use crate::records::ports::{Migration, MigrationError, MigrationResult, MigrationTarget};
use std::sync::Arc;
use tracing::info;

/// Outcome of a migration run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MigrationReport {
    /// Migrations already applied before the run.
    pub previously_applied: usize,
    /// Migrations applied by this run.
    pub newly_applied: usize,
}

/// Applies the unapplied suffix of a migration list, in order.
///
/// Each migration is recorded as applied in the same step that runs it, so
/// a failure part way leaves the version count equal to the migrations that
/// committed.
pub struct MigrationRunner {
    target: Arc<dyn MigrationTarget>,
    migrations: &'static [Migration],
}

impl MigrationRunner {
    /// Creates a runner for `migrations` against `target`.
    #[must_use]
    pub fn new(target: Arc<dyn MigrationTarget>, migrations: &'static [Migration]) -> Self {
        Self { target, migrations }
    }

    /// Brings the target up to date.
    ///
    /// # Errors
    ///
    /// Returns [`MigrationError::AheadOfCode`] when the target has applied
    /// more migrations than the list holds, or the first failure raised by
    /// the target.
    pub async fn run(&self) -> MigrationResult<MigrationReport> {
        self.target.prepare().await?;
        let applied = self.target.applied_count().await?;
        let pending = self
            .migrations
            .get(applied..)
            .ok_or(MigrationError::AheadOfCode {
                applied,
                known: self.migrations.len(),
            })?;

        for (offset, migration) in pending.iter().enumerate() {
            let version = applied + offset + 1;
            self.target.apply(version, migration).await?;
            info!(version, description = migration.description, "applied migration");
        }

        Ok(MigrationReport {
            previously_applied: applied,
            newly_applied: pending.len(),
        })
    }
}
