//! Ports for record persistence and schema migration.

mod migrations;
mod repository;

pub use migrations::{Migration, MigrationError, MigrationResult, MigrationTarget};
pub use repository::{RecordRepository, RecordStoreError, RecordStoreResult};
