//! `PostgreSQL` adapters for provisioning record persistence.

mod migrations;
mod models;
mod repository;
mod schema;

pub use migrations::{MIGRATIONS, PgMigrationTarget};
pub use repository::{PostgresRecordRepository, RecordPgPool};
