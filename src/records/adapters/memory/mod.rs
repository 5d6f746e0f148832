//! In-memory record store and migration target.

mod migrations;
mod repository;

pub use migrations::InMemoryMigrationTarget;
pub use repository::InMemoryRecordRepository;
