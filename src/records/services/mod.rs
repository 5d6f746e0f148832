//! Record store services.

mod migrations;

pub use migrations::{MigrationReport, MigrationRunner};
