//! Client-facing provisioning workflow.

use super::error::{ProvisioningError, ProvisioningResult};
use super::request::{AccessInfo, ClientRequest, RestartReport};
use crate::agent_registry::domain::Agent;
use crate::agent_registry::ports::AgentClient;
use crate::agent_registry::services::{AgentRegistry, IdGenerator};
use crate::protocol::{Message, StatusUpdate};
use crate::records::domain::{
    ExpiryExtension, ProvisioningRecord, RecordFields, RecordId, Visibility,
};
use crate::records::ports::{RecordRepository, RecordStoreError};
use crate::status::StatusCode;
use crate::vendor::domain::{DbRequest, OperationKind, RequestField};
use mockable::Clock;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

const GENERATED_NAME_PREFIX: &str = "dbf_";
const GENERATED_NAME_LENGTH: usize = 10;
const GENERATED_PASSWORD_LENGTH: usize = 16;

/// Tunables of the provisioning workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProvisioningSettings {
    /// Lifetime of a new record, counted from its creation.
    pub record_lifetime: ExpiryExtension,
}

impl Default for ProvisioningSettings {
    fn default() -> Self {
        Self {
            record_lifetime: ExpiryExtension::ONE_MONTH,
        }
    }
}

/// Routes client requests to agents and keeps records in step.
///
/// Records are inserted before the agent is called so that the record ID
/// can serve as the correlation number of the agent's status callbacks.
/// A record whose dispatch fails is deleted again.
pub struct ProvisioningService<C>
where
    C: Clock + Send + Sync,
{
    registry: Arc<AgentRegistry>,
    records: Arc<dyn RecordRepository>,
    agents: Arc<dyn AgentClient>,
    ids: Arc<IdGenerator>,
    clock: Arc<C>,
    settings: ProvisioningSettings,
}

/// Shared collaborators of a [`ProvisioningService`].
pub struct ProvisioningDeps<C> {
    /// Registered agents.
    pub registry: Arc<AgentRegistry>,
    /// Record store.
    pub records: Arc<dyn RecordRepository>,
    /// Outbound agent calls.
    pub agents: Arc<dyn AgentClient>,
    /// Correlation number source for drops.
    pub ids: Arc<IdGenerator>,
    /// Time source.
    pub clock: Arc<C>,
}

impl<C> ProvisioningService<C>
where
    C: Clock + Send + Sync,
{
    /// Creates the service.
    #[must_use]
    pub fn new(deps: ProvisioningDeps<C>, settings: ProvisioningSettings) -> Self {
        let ProvisioningDeps {
            registry,
            records,
            agents,
            ids,
            clock,
        } = deps;
        Self {
            registry,
            records,
            agents,
            ids,
            clock,
            settings,
        }
    }

    /// Creates an empty database for `caller`.
    ///
    /// # Errors
    ///
    /// Returns [`ProvisioningError::Validation`] for incomplete requests,
    /// [`ProvisioningError::NotFound`] for unknown or down agents, and the
    /// agent's failure otherwise.
    pub async fn create(
        &self,
        caller: &str,
        request: ClientRequest,
    ) -> ProvisioningResult<ProvisioningRecord> {
        self.provision(caller, request, OperationKind::Create).await
    }

    /// Creates a database for `caller` and has the agent import a dump into
    /// it in the background.
    ///
    /// The returned record is in progress; the agent's status callbacks
    /// move it on.
    ///
    /// # Errors
    ///
    /// As for [`ProvisioningService::create`]; additionally the dump
    /// location is required.
    pub async fn import(
        &self,
        caller: &str,
        request: ClientRequest,
    ) -> ProvisioningResult<ProvisioningRecord> {
        self.provision(caller, request, OperationKind::Import).await
    }

    async fn provision(
        &self,
        caller: &str,
        mut request: ClientRequest,
        kind: OperationKind,
    ) -> ProvisioningResult<ProvisioningRecord> {
        if request.agent_identifier.trim().is_empty() {
            return Err(ProvisioningError::Validation(
                "missing agent_identifier".to_owned(),
            ));
        }
        let agent = self
            .registry
            .get_live(&request.agent_identifier)
            .ok_or_else(|| {
                ProvisioningError::NotFound(format!("agent {}", request.agent_identifier))
            })?;

        fill_defaults(&mut request);
        let mut db_request = DbRequest {
            id: 0,
            database_name: request.database_name.clone(),
            dump_location: request.dump_location.clone(),
            username: request.username.clone(),
            password: request.password.clone(),
        };
        ensure_complete(&db_request, &agent, kind)?;

        let record = self.new_record(caller, &agent, request)?;
        let id = self.records.insert(&record).await?;
        db_request.id = id.into_inner();
        let mut stored = record.with_id(id);

        let dispatched = match kind {
            OperationKind::Import => self.agents.import_database(&agent, &db_request).await,
            OperationKind::Create | OperationKind::Drop => {
                self.agents.create_database(&agent, &db_request).await
            }
        };
        let reply = match dispatched {
            Ok(reply) if reply.status.is_success() => reply,
            Ok(reply) => {
                self.discard(id).await;
                return Err(rejection(reply));
            }
            Err(err) => {
                self.discard(id).await;
                return Err(err.into());
            }
        };

        info!(
            %id,
            agent = %agent.short_name(),
            database = stored.database_name(),
            operation = %kind,
            "provisioning dispatched"
        );
        if matches!(kind, OperationKind::Create) {
            self.records
                .update_status(id, reply.status, Some(&reply.message))
                .await?;
            stored.set_status(reply.status, reply.message);
        }
        Ok(stored)
    }

    fn new_record(
        &self,
        caller: &str,
        agent: &Agent,
        request: ClientRequest,
    ) -> ProvisioningResult<ProvisioningRecord> {
        let created_at = self.clock.utc();
        let expires_at = self
            .settings
            .record_lifetime
            .apply(created_at)
            .map_err(|err| ProvisioningError::Validation(err.to_string()))?;
        let fields = RecordFields {
            vendor: agent.vendor(),
            database_name: request.database_name,
            database_user: request.username,
            database_password: request.password,
            sid: agent.db_sid().to_owned(),
            dump_location: request.dump_location,
            created_at,
            expires_at,
            creator: caller.to_owned(),
            agent_name: agent.short_name().to_string(),
            database_address: agent.db_address().to_owned(),
            database_port: agent.db_port().to_owned(),
            status: StatusCode::STARTED,
            message: "dispatching to agent".to_owned(),
            visibility: request.visibility,
        };
        ProvisioningRecord::new(fields).map_err(|err| ProvisioningError::Validation(err.to_string()))
    }

    async fn discard(&self, id: RecordId) {
        if let Err(err) = self.records.delete(id).await {
            warn!(%id, error = %err, "could not remove record of failed dispatch");
        }
    }

    /// Applies an agent's status callback.
    ///
    /// Returns `false` when no record carries the update's ID; such updates
    /// are logged and dropped.
    ///
    /// # Errors
    ///
    /// Returns [`ProvisioningError::BackendUnavailable`] when the record
    /// store is down.
    pub async fn apply_status(&self, update: StatusUpdate) -> ProvisioningResult<bool> {
        let id = RecordId::new(update.id);
        match self
            .records
            .update_status(id, update.status, Some(&update.message))
            .await
        {
            Ok(()) => Ok(true),
            Err(RecordStoreError::NotFound(_)) => {
                warn!(%id, status = %update.status, "status update for unknown record dropped");
                Ok(false)
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Returns the caller's private records and every public record, newest
    /// first.
    ///
    /// # Errors
    ///
    /// Returns the record store's failure.
    pub async fn list_visible(&self, caller: &str) -> ProvisioningResult<Vec<ProvisioningRecord>> {
        let mut records = self.records.fetch_by_creator(caller).await?;
        records.extend(self.records.fetch_public().await?);
        records.sort_by(|a, b| b.id().cmp(&a.id()));
        Ok(records)
    }

    /// Returns the records on one agent the caller may see.
    ///
    /// # Errors
    ///
    /// Returns the record store's failure.
    pub async fn list_for_agent(
        &self,
        caller: &str,
        agent: &str,
    ) -> ProvisioningResult<Vec<ProvisioningRecord>> {
        let records = self.records.fetch_by_agent(agent).await?;
        Ok(records
            .into_iter()
            .filter(|record| record.is_visible_to(caller))
            .collect())
    }

    /// Looks up a record by ID.
    ///
    /// # Errors
    ///
    /// Returns [`ProvisioningError::NotFound`] for unknown IDs and
    /// [`ProvisioningError::AccessDenied`] for another caller's private
    /// record.
    pub async fn get(&self, caller: &str, id: RecordId) -> ProvisioningResult<ProvisioningRecord> {
        let record = self
            .records
            .fetch_by_id(id)
            .await?
            .ok_or_else(|| ProvisioningError::NotFound(format!("record {id}")))?;
        visible(record, caller)
    }

    /// Looks up the newest record for a database name on an agent.
    ///
    /// # Errors
    ///
    /// As for [`ProvisioningService::get`].
    pub async fn get_by_agent_and_name(
        &self,
        caller: &str,
        agent: &str,
        database_name: &str,
    ) -> ProvisioningResult<ProvisioningRecord> {
        let record = self
            .records
            .fetch_by_agent_and_name(agent, database_name)
            .await?
            .ok_or_else(|| ProvisioningError::NotFound(format!("{database_name} on {agent}")))?;
        visible(record, caller)
    }

    /// Returns the connection details of a record.
    ///
    /// # Errors
    ///
    /// As for [`ProvisioningService::get`].
    pub async fn access_info(&self, caller: &str, id: RecordId) -> ProvisioningResult<AccessInfo> {
        let record = self.get(caller, id).await?;
        Ok(AccessInfo::for_record(&record))
    }

    /// Drops the database behind a record and removes the record.
    ///
    /// When the owning agent is no longer registered only the record is
    /// removed. A failed drop keeps the record, flagged as such.
    ///
    /// # Errors
    ///
    /// As for [`ProvisioningService::get`], plus the agent's failure.
    pub async fn delete(&self, caller: &str, id: RecordId) -> ProvisioningResult<()> {
        let record = self.get(caller, id).await?;

        if let Some(agent) = self.registry.get(record.agent_name()) {
            let request = DbRequest {
                id: self.ids.next_id(),
                database_name: record.database_name().to_owned(),
                username: record.database_user().to_owned(),
                ..DbRequest::default()
            };
            let reply = self.agents.drop_database(&agent, &request).await?;
            if !reply.status.is_success() {
                self.records
                    .update_status(id, StatusCode::DROP_DATABASE_FAILED, Some(&reply.message))
                    .await?;
                return Err(ProvisioningError::ExternalTool {
                    status: reply.status,
                    message: reply.message,
                });
            }
        } else {
            warn!(
                %id,
                agent = record.agent_name(),
                "agent is not registered; removing the record only"
            );
        }

        self.records.delete(id).await?;
        info!(%id, database = record.database_name(), "record deleted");
        Ok(())
    }

    /// Changes who may see a record.
    ///
    /// # Errors
    ///
    /// As for [`ProvisioningService::get`].
    pub async fn set_visibility(
        &self,
        caller: &str,
        id: RecordId,
        visibility: Visibility,
    ) -> ProvisioningResult<ProvisioningRecord> {
        let mut record = self.get(caller, id).await?;
        if record.visibility() != visibility {
            record.set_visibility(visibility);
            self.records.update(&record).await?;
        }
        Ok(record)
    }

    /// Moves a record's expiry forward.
    ///
    /// # Errors
    ///
    /// As for [`ProvisioningService::get`], plus
    /// [`ProvisioningError::Validation`] on calendar overflow.
    pub async fn extend_expiry(
        &self,
        caller: &str,
        id: RecordId,
        extension: ExpiryExtension,
    ) -> ProvisioningResult<ProvisioningRecord> {
        let mut record = self.get(caller, id).await?;
        record
            .extend_expiry(extension)
            .map_err(|err| ProvisioningError::Validation(err.to_string()))?;
        self.records.update(&record).await?;
        Ok(record)
    }

    /// Reports where imports are still running.
    ///
    /// # Errors
    ///
    /// Returns the record store's failure.
    pub async fn safe_to_restart(&self) -> ProvisioningResult<RestartReport> {
        let mut running: BTreeMap<String, usize> = BTreeMap::new();
        for record in self.records.fetch_all().await? {
            if record.status().is_in_progress() {
                *running.entry(record.agent_name().to_owned()).or_default() += 1;
            }
        }

        let server = running.is_empty();
        let agents = self
            .registry
            .list()
            .into_iter()
            .map(|agent| {
                let name = agent.short_name().to_string();
                let count = running.get(&name).copied().unwrap_or_default();
                (name, count)
            })
            .collect();
        Ok(RestartReport { server, agents })
    }

    /// Returns every registered agent.
    #[must_use]
    pub fn agents(&self) -> Vec<Agent> {
        self.registry.list()
    }

    /// Looks up an agent.
    ///
    /// # Errors
    ///
    /// Returns [`ProvisioningError::NotFound`] for unknown agents.
    pub fn agent(&self, short_name: &str) -> ProvisioningResult<Agent> {
        self.registry
            .get(short_name)
            .ok_or_else(|| ProvisioningError::NotFound(format!("agent {short_name}")))
    }
}

fn visible(record: ProvisioningRecord, caller: &str) -> ProvisioningResult<ProvisioningRecord> {
    if record.is_visible_to(caller) {
        Ok(record)
    } else {
        Err(ProvisioningError::AccessDenied)
    }
}

fn fill_defaults(request: &mut ClientRequest) {
    if request.username.trim().is_empty() {
        request.username = format!(
            "{GENERATED_NAME_PREFIX}{}",
            random_token(GENERATED_NAME_LENGTH)
        );
    }
    if request.database_name.trim().is_empty() {
        request.database_name.clone_from(&request.username);
    }
    if request.password.is_empty() {
        request.password = random_token(GENERATED_PASSWORD_LENGTH);
    }
}

fn random_token(length: usize) -> String {
    Uuid::new_v4().simple().to_string().chars().take(length).collect()
}

fn ensure_complete(
    request: &DbRequest,
    agent: &Agent,
    kind: OperationKind,
) -> ProvisioningResult<()> {
    // The correlation number is assigned once the record is stored.
    let missing: Vec<&str> = request
        .missing_fields(agent.vendor().required_fields(kind))
        .into_iter()
        .filter(|field| *field != RequestField::Id)
        .map(RequestField::as_str)
        .collect();
    if missing.is_empty() {
        Ok(())
    } else {
        Err(ProvisioningError::Validation(format!(
            "missing {}",
            missing.join(", ")
        )))
    }
}

fn rejection(reply: Message) -> ProvisioningError {
    match reply.status {
        StatusCode::ALREADY_EXISTS => ProvisioningError::AlreadyExists(reply.message),
        StatusCode::NOT_FOUND => ProvisioningError::NotFound(reply.message),
        StatusCode::MISSING_PARAMETERS => ProvisioningError::Validation(reply.message),
        status => ProvisioningError::ExternalTool {
            status,
            message: reply.message,
        },
    }
}
