//! JSON representations of records.

use crate::records::domain::{ProvisioningRecord, Visibility};
use crate::vendor::domain::Vendor;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Record as returned to clients, with the derived status label and
/// progress.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordView {
    /// Record ID.
    pub id: u64,
    /// Vendor.
    pub vendor: Vendor,
    /// Database name.
    pub database_name: String,
    /// Owning user.
    pub database_user: String,
    /// Owning user's password.
    pub database_password: String,
    /// Oracle SID.
    pub sid: String,
    /// Dump location.
    pub dumpfile_location: String,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Expiry time.
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
    pub status: u16,
    /// Status label.
    pub status_label: String,
    /// Completion percentage.
    pub progress: u8,
    /// Latest status message.
    pub message: String,
    /// Visibility.
    pub visibility: Visibility,
}

impl From<&ProvisioningRecord> for RecordView {
    fn from(record: &ProvisioningRecord) -> Self {
        let fields = record.fields();
        Self {
            id: record.id().map_or(0, |id| id.into_inner()),
            vendor: fields.vendor,
            database_name: fields.database_name.clone(),
            database_user: fields.database_user.clone(),
            database_password: fields.database_password.clone(),
            sid: fields.sid.clone(),
            dumpfile_location: fields.dump_location.clone(),
            created_at: fields.created_at,
            expires_at: fields.expires_at,
            creator: fields.creator.clone(),
            agent_name: fields.agent_name.clone(),
            database_address: fields.database_address.clone(),
            database_port: fields.database_port.clone(),
            status: fields.status.code(),
            status_label: fields.status.label().to_owned(),
            progress: fields.status.progress(),
            message: fields.message.clone(),
            visibility: fields.visibility,
        }
    }
}

/// Converts a list of records.
#[must_use]
pub fn record_views(records: &[ProvisioningRecord]) -> Vec<RecordView> {
    records.iter().map(RecordView::from).collect()
}
