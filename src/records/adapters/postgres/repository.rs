//! `PostgreSQL` repository implementation for provisioning records.

use super::{
    models::{NewRecordRow, RecordRow},
    schema::provisioning_records,
};
use crate::records::{
    domain::{ProvisioningRecord, RecordFields, RecordId, Visibility},
    ports::{RecordRepository, RecordStoreError, RecordStoreResult},
};
use crate::status::StatusCode;
use crate::vendor::domain::Vendor;
use async_trait::async_trait;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};

/// `PostgreSQL` connection pool type for the record store.
pub type RecordPgPool = Pool<ConnectionManager<PgConnection>>;

const LIVENESS_PROBE: &str = "SELECT 1";

/// `PostgreSQL`-backed repository for provisioning records.
#[derive(Debug, Clone)]
pub struct PostgresRecordRepository {
    pool: RecordPgPool,
}

impl PostgresRecordRepository {
    /// Creates a new repository from a `PostgreSQL` pool.
    #[must_use]
    pub const fn new(pool: RecordPgPool) -> Self {
        Self { pool }
    }

    async fn run_blocking<F, T>(&self, operation: F) -> RecordStoreResult<T>
    where
        F: FnOnce(&mut PgConnection) -> RecordStoreResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut connection = pool.get().map_err(RecordStoreError::unavailable)?;
            diesel::sql_query(LIVENESS_PROBE)
                .execute(&mut connection)
                .map_err(RecordStoreError::unavailable)?;
            operation(&mut connection)
        })
        .await
        .map_err(RecordStoreError::unavailable)?
    }

    async fn load(&self, filter: RecordFilter) -> RecordStoreResult<Vec<ProvisioningRecord>> {
        self.run_blocking(move |connection| {
            let mut query = provisioning_records::table.into_boxed();
            query = match filter {
                RecordFilter::All => query,
                RecordFilter::Public => {
                    query.filter(provisioning_records::visibility.eq(Visibility::Public.as_i16()))
                }
                RecordFilter::PrivateOf(creator) => query
                    .filter(provisioning_records::creator.eq(creator))
                    .filter(provisioning_records::visibility.eq(Visibility::Private.as_i16())),
                RecordFilter::Agent(agent) => {
                    query.filter(provisioning_records::agent_name.eq(agent))
                }
                RecordFilter::AgentAndName(agent, name) => query
                    .filter(provisioning_records::agent_name.eq(agent))
                    .filter(provisioning_records::database_name.eq(name)),
            };
            let rows = query
                .order(provisioning_records::id.desc())
                .load::<RecordRow>(connection)
                .map_err(RecordStoreError::persistence)?;
            rows.into_iter().map(row_to_record).collect()
        })
        .await
    }
}

enum RecordFilter {
    All,
    Public,
    PrivateOf(String),
    Agent(String),
    AgentAndName(String, String),
}

#[async_trait]
impl RecordRepository for PostgresRecordRepository {
    async fn alive(&self) -> RecordStoreResult<()> {
        self.run_blocking(|_| Ok(())).await
    }

    async fn fetch_by_id(&self, id: RecordId) -> RecordStoreResult<Option<ProvisioningRecord>> {
        let key = to_key(id)?;
        self.run_blocking(move |connection| {
            let row = provisioning_records::table
                .find(key)
                .select(RecordRow::as_select())
                .first::<RecordRow>(connection)
                .optional()
                .map_err(RecordStoreError::persistence)?;
            row.map(row_to_record).transpose()
        })
        .await
    }

    async fn fetch_by_creator(&self, creator: &str) -> RecordStoreResult<Vec<ProvisioningRecord>> {
        self.load(RecordFilter::PrivateOf(creator.to_owned())).await
    }

    async fn fetch_public(&self) -> RecordStoreResult<Vec<ProvisioningRecord>> {
        self.load(RecordFilter::Public).await
    }

    async fn fetch_all(&self) -> RecordStoreResult<Vec<ProvisioningRecord>> {
        self.load(RecordFilter::All).await
    }

    async fn fetch_by_agent(&self, agent: &str) -> RecordStoreResult<Vec<ProvisioningRecord>> {
        self.load(RecordFilter::Agent(agent.to_owned())).await
    }

    async fn fetch_by_agent_and_name(
        &self,
        agent: &str,
        database_name: &str,
    ) -> RecordStoreResult<Option<ProvisioningRecord>> {
        let filter = RecordFilter::AgentAndName(agent.to_owned(), database_name.to_owned());
        let records = self.load(filter).await?;
        Ok(records.into_iter().next())
    }

    async fn insert(&self, record: &ProvisioningRecord) -> RecordStoreResult<RecordId> {
        let new_row = to_new_row(record);
        self.run_blocking(move |connection| insert_row(connection, &new_row))
            .await
    }

    async fn update(&self, record: &ProvisioningRecord) -> RecordStoreResult<RecordId> {
        let new_row = to_new_row(record);
        let key = record.id().map(to_key).transpose()?;

        self.run_blocking(move |connection| {
            if let Some(id) = key {
                let updated = diesel::update(provisioning_records::table.find(id))
                    .set(&new_row)
                    .execute(connection)
                    .map_err(RecordStoreError::persistence)?;
                if updated > 0 {
                    return from_key(id);
                }
            }
            insert_row(connection, &new_row)
        })
        .await
    }

    async fn update_status(
        &self,
        id: RecordId,
        status: StatusCode,
        message: Option<&str>,
    ) -> RecordStoreResult<()> {
        let key = to_key(id)?;
        let code = i32::from(status);
        let message = message.map(str::to_owned);
        self.run_blocking(move |connection| {
            let target = provisioning_records::table.find(key);
            let updated = match message {
                Some(text) => diesel::update(target)
                    .set((
                        provisioning_records::status.eq(code),
                        provisioning_records::message.eq(text),
                    ))
                    .execute(connection),
                None => diesel::update(target)
                    .set(provisioning_records::status.eq(code))
                    .execute(connection),
            }
            .map_err(RecordStoreError::persistence)?;
            if updated == 0 {
                return Err(RecordStoreError::NotFound(id));
            }
            Ok(())
        })
        .await
    }

    async fn delete(&self, id: RecordId) -> RecordStoreResult<()> {
        let key = to_key(id)?;
        self.run_blocking(move |connection| {
            let deleted = diesel::delete(provisioning_records::table.find(key))
                .execute(connection)
                .map_err(RecordStoreError::persistence)?;
            if deleted == 0 {
                return Err(RecordStoreError::NotFound(id));
            }
            Ok(())
        })
        .await
    }
}

fn insert_row(connection: &mut PgConnection, row: &NewRecordRow) -> RecordStoreResult<RecordId> {
    let id = diesel::insert_into(provisioning_records::table)
        .values(row)
        .returning(provisioning_records::id)
        .get_result::<i64>(connection)
        .map_err(RecordStoreError::persistence)?;
    from_key(id)
}

fn to_key(id: RecordId) -> RecordStoreResult<i64> {
    i64::try_from(id.into_inner()).map_err(RecordStoreError::persistence)
}

fn from_key(key: i64) -> RecordStoreResult<RecordId> {
    u64::try_from(key)
        .map(RecordId::new)
        .map_err(RecordStoreError::invalid_persisted_data)
}

fn to_new_row(record: &ProvisioningRecord) -> NewRecordRow {
    let fields = record.fields();
    NewRecordRow {
        vendor: fields.vendor.as_str().to_owned(),
        database_name: fields.database_name.clone(),
        database_user: fields.database_user.clone(),
        database_password: fields.database_password.clone(),
        sid: fields.sid.clone(),
        dump_location: fields.dump_location.clone(),
        created_at: fields.created_at,
        expires_at: fields.expires_at,
        creator: fields.creator.clone(),
        agent_name: fields.agent_name.clone(),
        database_address: fields.database_address.clone(),
        database_port: fields.database_port.clone(),
        status: i32::from(fields.status),
        message: fields.message.clone(),
        visibility: fields.visibility.as_i16(),
    }
}

fn row_to_record(row: RecordRow) -> RecordStoreResult<ProvisioningRecord> {
    let RecordRow {
        id,
        vendor,
        database_name,
        database_user,
        database_password,
        sid,
        dump_location,
        created_at,
        expires_at,
        creator,
        agent_name,
        database_address,
        database_port,
        status,
        message,
        visibility,
    } = row;

    let fields = RecordFields {
        vendor: Vendor::try_from(vendor.as_str())
            .map_err(RecordStoreError::invalid_persisted_data)?,
        database_name,
        database_user,
        database_password,
        sid,
        dump_location,
        created_at,
        expires_at,
        creator,
        agent_name,
        database_address,
        database_port,
        status: StatusCode::try_from(status).map_err(RecordStoreError::invalid_persisted_data)?,
        message,
        visibility: Visibility::try_from(visibility)
            .map_err(RecordStoreError::invalid_persisted_data)?,
    };

    ProvisioningRecord::from_persisted(from_key(id)?, fields)
        .map_err(RecordStoreError::invalid_persisted_data)
}
