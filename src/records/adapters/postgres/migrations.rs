//! `PostgreSQL` migration target and the record store's schema history.

use super::repository::RecordPgPool;
use super::schema::schema_versions;
use crate::records::ports::{Migration, MigrationError, MigrationResult, MigrationTarget};
use async_trait::async_trait;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::result::Error as DieselError;

/// Ordered schema history of the record store. Append only.
pub const MIGRATIONS: &[Migration] = &[
    Migration::new(
        "CREATE TABLE provisioning_records (\
            id BIGSERIAL PRIMARY KEY, \
            vendor VARCHAR(20) NOT NULL, \
            database_name VARCHAR(128) NOT NULL, \
            database_user VARCHAR(128) NOT NULL, \
            database_password TEXT NOT NULL, \
            sid VARCHAR(64) NOT NULL DEFAULT '', \
            dump_location TEXT NOT NULL DEFAULT '', \
            created_at TIMESTAMPTZ NOT NULL, \
            expires_at TIMESTAMPTZ NOT NULL, \
            creator VARCHAR(255) NOT NULL, \
            agent_name VARCHAR(100) NOT NULL, \
            database_address VARCHAR(255) NOT NULL DEFAULT '', \
            database_port VARCHAR(16) NOT NULL DEFAULT '', \
            status INTEGER NOT NULL CHECK (status BETWEEN 1 AND 499), \
            message TEXT NOT NULL DEFAULT '', \
            CHECK (expires_at >= created_at))",
        "create provisioning_records",
    ),
    Migration::new(
        "ALTER TABLE provisioning_records \
            ADD COLUMN visibility SMALLINT NOT NULL DEFAULT 0",
        "add record visibility",
    ),
    Migration::new(
        "CREATE INDEX idx_provisioning_records_creator ON provisioning_records (creator)",
        "index records by creator",
    ),
    Migration::new(
        "CREATE INDEX idx_provisioning_records_agent \
            ON provisioning_records (agent_name, database_name)",
        "index records by agent and database name",
    ),
];

const CREATE_VERSION_TABLE: &str = "CREATE TABLE IF NOT EXISTS schema_versions (\
    version INTEGER PRIMARY KEY, \
    description TEXT NOT NULL, \
    applied_at TIMESTAMPTZ NOT NULL DEFAULT now())";

/// Applies migrations to a `PostgreSQL` database, one transaction each.
#[derive(Debug, Clone)]
pub struct PgMigrationTarget {
    pool: RecordPgPool,
}

impl PgMigrationTarget {
    /// Creates a target from a `PostgreSQL` pool.
    #[must_use]
    pub const fn new(pool: RecordPgPool) -> Self {
        Self { pool }
    }

    async fn run_blocking<F, T>(&self, operation: F) -> MigrationResult<T>
    where
        F: FnOnce(&mut PgConnection) -> MigrationResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut connection = pool.get().map_err(MigrationError::unavailable)?;
            operation(&mut connection)
        })
        .await
        .map_err(MigrationError::unavailable)?
    }
}

#[async_trait]
impl MigrationTarget for PgMigrationTarget {
    async fn prepare(&self) -> MigrationResult<()> {
        self.run_blocking(|connection| {
            diesel::sql_query(CREATE_VERSION_TABLE)
                .execute(connection)
                .map(|_| ())
                .map_err(MigrationError::bookkeeping)
        })
        .await
    }

    async fn applied_count(&self) -> MigrationResult<usize> {
        self.run_blocking(|connection| {
            let count = schema_versions::table
                .count()
                .get_result::<i64>(connection)
                .map_err(MigrationError::bookkeeping)?;
            usize::try_from(count).map_err(MigrationError::bookkeeping)
        })
        .await
    }

    async fn apply(&self, version: usize, migration: &Migration) -> MigrationResult<()> {
        let number = i32::try_from(version).map_err(MigrationError::bookkeeping)?;
        let step = *migration;

        self.run_blocking(move |connection| {
            connection
                .transaction::<_, DieselError, _>(|transaction| {
                    diesel::sql_query(step.statement).execute(transaction)?;
                    diesel::insert_into(schema_versions::table)
                        .values((
                            schema_versions::version.eq(number),
                            schema_versions::description.eq(step.description),
                        ))
                        .execute(transaction)?;
                    Ok(())
                })
                .map_err(|err| MigrationError::statement(version, &step, err))
        })
        .await
    }
}
