//! Diesel row models for provisioning record persistence.

use super::schema::provisioning_records;
use chrono::{DateTime, Utc};
use diesel::prelude::*;

/// Query result row for provisioning records.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = provisioning_records)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct RecordRow {
    /// Store-assigned identifier.
    pub id: i64,
    /// Vendor name.
    pub vendor: String,
    /// Database name.
    pub database_name: String,
    /// Owning user.
    pub database_user: String,
    /// Owning user's password.
    pub database_password: String,
    /// Oracle SID.
    pub sid: String,
    /// Dump location.
    pub dump_location: String,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Expiry timestamp.
    pub expires_at: DateTime<Utc>,
    /// Creator identity.
    pub creator: String,
    /// Hosting agent.
    pub agent_name: String,
    /// Database host.
    pub database_address: String,
    /// Database port.
    pub database_port: String,
    /// Numeric status code.
    pub status: i32,
    /// Latest status message.
    pub message: String,
    /// Visibility flag.
    pub visibility: i16,
}

/// Insert and update model for provisioning records.
#[derive(Debug, Clone, Insertable, AsChangeset)]
#[diesel(table_name = provisioning_records)]
pub struct NewRecordRow {
    /// Vendor name.
    pub vendor: String,
    /// Database name.
    pub database_name: String,
    /// Owning user.
    pub database_user: String,
    /// Owning user's password.
    pub database_password: String,
    /// Oracle SID.
    pub sid: String,
    /// Dump location.
    pub dump_location: String,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Expiry timestamp.
    pub expires_at: DateTime<Utc>,
    /// Creator identity.
    pub creator: String,
    /// Hosting agent.
    pub agent_name: String,
    /// Database host.
    pub database_address: String,
    /// Database port.
    pub database_port: String,
    /// Numeric status code.
    pub status: i32,
    /// Latest status message.
    pub message: String,
    /// Visibility flag.
    pub visibility: i16,
}
