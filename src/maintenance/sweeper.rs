//! Expiry sweeper.

use crate::agent_registry::ports::AgentClient;
use crate::agent_registry::services::{AgentRegistry, IdGenerator};
use crate::records::domain::{ProvisioningRecord, RecordId};
use crate::records::ports::{RecordRepository, RecordStoreResult};
use crate::status::StatusCode;
use crate::vendor::domain::DbRequest;
use chrono::{DateTime, Duration, Utc};
use mockable::Clock;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// How long before expiry a record is flagged as scheduled for removal.
pub const REMOVAL_WARNING_WINDOW: Duration = Duration::days(7);

/// Outcome of one sweep.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SweepReport {
    /// Records whose database was dropped and whose record was removed.
    pub dropped: Vec<RecordId>,
    /// Expired records kept for the next sweep.
    pub retained: Vec<RecordId>,
    /// Records newly flagged as scheduled for removal.
    pub flagged: Vec<RecordId>,
}

/// Collaborators of an [`ExpirySweeper`].
pub struct SweepDeps<C> {
    /// Record store.
    pub records: Arc<dyn RecordRepository>,
    /// Registered agents.
    pub registry: Arc<AgentRegistry>,
    /// Outbound agent calls.
    pub agents: Arc<dyn AgentClient>,
    /// Correlation numbers for drop requests.
    pub ids: Arc<IdGenerator>,
    /// Time source.
    pub clock: Arc<C>,
}

enum Expired {
    Dropped,
    Retained,
}

/// Drops expired databases and flags records close to expiry.
///
/// A record is removed only after its agent confirmed the drop; when the
/// agent is gone, down or refuses, the record stays for the next sweep.
pub struct ExpirySweeper<C>
where
    C: Clock + Send + Sync,
{
    records: Arc<dyn RecordRepository>,
    registry: Arc<AgentRegistry>,
    agents: Arc<dyn AgentClient>,
    ids: Arc<IdGenerator>,
    clock: Arc<C>,
}

impl<C> ExpirySweeper<C>
where
    C: Clock + Send + Sync,
{
    /// Creates a sweeper.
    #[must_use]
    pub fn new(deps: SweepDeps<C>) -> Self {
        let SweepDeps {
            records,
            registry,
            agents,
            ids,
            clock,
        } = deps;
        Self {
            records,
            registry,
            agents,
            ids,
            clock,
        }
    }

    /// Visits every record once.
    ///
    /// Failures on single records are logged and leave them for the next
    /// sweep.
    ///
    /// # Errors
    ///
    /// Returns the record store's failure when the records cannot be
    /// listed.
    pub async fn sweep(&self) -> RecordStoreResult<SweepReport> {
        let now = self.clock.utc();
        let mut report = SweepReport::default();

        for record in self.records.fetch_all().await? {
            let Some(id) = record.id() else {
                continue;
            };
            if record.is_expired(now) {
                match self.expire(id, &record).await {
                    Expired::Dropped => report.dropped.push(id),
                    Expired::Retained => report.retained.push(id),
                }
            } else if self.flag(id, &record, now).await {
                report.flagged.push(id);
            }
        }

        info!(
            dropped = report.dropped.len(),
            retained = report.retained.len(),
            flagged = report.flagged.len(),
            "expiry sweep finished"
        );
        Ok(report)
    }

    async fn expire(&self, id: RecordId, record: &ProvisioningRecord) -> Expired {
        let Some(agent) = self.registry.get_live(record.agent_name()) else {
            warn!(%id, agent = record.agent_name(), "agent unavailable; expired record kept");
            return Expired::Retained;
        };

        let request = DbRequest {
            id: self.ids.next_id(),
            database_name: record.database_name().to_owned(),
            username: record.database_user().to_owned(),
            ..DbRequest::default()
        };
        match self.agents.drop_database(&agent, &request).await {
            Ok(reply) if reply.status.is_success() => {}
            Ok(reply) => {
                warn!(%id, status = %reply.status, message = %reply.message, "agent refused to drop expired database");
                return Expired::Retained;
            }
            Err(err) => {
                warn!(%id, error = %err, "could not reach agent to drop expired database");
                return Expired::Retained;
            }
        }

        match self.records.delete(id).await {
            Ok(()) => {
                info!(%id, database = record.database_name(), "expired database dropped");
                Expired::Dropped
            }
            Err(err) => {
                warn!(%id, error = %err, "expired database dropped but record kept");
                Expired::Retained
            }
        }
    }

    async fn flag(&self, id: RecordId, record: &ProvisioningRecord, now: DateTime<Utc>) -> bool {
        if !record.expires_within(now, REMOVAL_WARNING_WINDOW)
            || record.status() == StatusCode::REMOVAL_SCHEDULED
        {
            return false;
        }
        match self
            .records
            .update_status(id, StatusCode::REMOVAL_SCHEDULED, None)
            .await
        {
            Ok(()) => {
                debug!(%id, expires_at = %record.expires_at(), "record scheduled for removal");
                true
            }
            Err(err) => {
                warn!(%id, error = %err, "could not flag record for removal");
                false
            }
        }
    }

    /// Sweeps every `interval` until the task is cancelled.
    pub async fn run(self: Arc<Self>, interval: std::time::Duration) {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            if let Err(err) = self.sweep().await {
                warn!(error = %err, "expiry sweep skipped");
            }
        }
    }
}
