//! Provisioning record aggregate.

use super::{ExpiryExtension, RecordDomainError, RecordId, Visibility};
use crate::status::StatusCode;
use crate::vendor::domain::Vendor;
use chrono::{DateTime, Duration, Utc};

/// Parameter object holding every stored field of a record except its ID.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordFields {
    /// Database vendor.
    pub vendor: Vendor,
    /// Database name.
    pub database_name: String,
    /// Owning user name.
    pub database_user: String,
    /// Owning user password.
    pub database_password: String,
    /// Oracle SID, empty for other vendors.
    pub sid: String,
    /// Dump location for imports, empty for plain creates.
    pub dump_location: String,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Expiry timestamp.
    pub expires_at: DateTime<Utc>,
    /// Identity of the client that requested the database.
    pub creator: String,
    /// Short name of the agent hosting the database.
    pub agent_name: String,
    /// Host clients connect to.
    pub database_address: String,
    /// Port clients connect to.
    pub database_port: String,
    /// Latest status.
    pub status: StatusCode,
    /// Latest status message.
    pub message: String,
    /// Who besides the creator may see the record.
    pub visibility: Visibility,
}

/// A database handed out to a client.
///
/// The ID is absent until the record store assigns one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProvisioningRecord {
    id: Option<RecordId>,
    fields: RecordFields,
}

impl ProvisioningRecord {
    /// Creates an unsaved record.
    ///
    /// # Errors
    ///
    /// Returns [`RecordDomainError::ExpiryBeforeCreation`] when the expiry
    /// precedes the creation time.
    pub fn new(fields: RecordFields) -> Result<Self, RecordDomainError> {
        if fields.expires_at < fields.created_at {
            return Err(RecordDomainError::ExpiryBeforeCreation);
        }
        Ok(Self { id: None, fields })
    }

    /// Reconstructs a stored record.
    ///
    /// # Errors
    ///
    /// Returns [`RecordDomainError::ExpiryBeforeCreation`] for inconsistent
    /// stored timestamps.
    pub fn from_persisted(id: RecordId, fields: RecordFields) -> Result<Self, RecordDomainError> {
        Self::new(fields).map(|record| record.with_id(id))
    }

    /// Returns the record with its store-assigned ID.
    #[must_use]
    pub const fn with_id(mut self, id: RecordId) -> Self {
        self.id = Some(id);
        self
    }

    /// Returns the ID, if assigned.
    #[must_use]
    pub const fn id(&self) -> Option<RecordId> {
        self.id
    }

    /// Returns every stored field.
    #[must_use]
    pub const fn fields(&self) -> &RecordFields {
        &self.fields
    }

    /// Returns the vendor.
    #[must_use]
    pub const fn vendor(&self) -> Vendor {
        self.fields.vendor
    }

    /// Returns the database name.
    #[must_use]
    pub fn database_name(&self) -> &str {
        &self.fields.database_name
    }

    /// Returns the owning user.
    #[must_use]
    pub fn database_user(&self) -> &str {
        &self.fields.database_user
    }

    /// Returns the owning user's password.
    #[must_use]
    pub fn database_password(&self) -> &str {
        &self.fields.database_password
    }

    /// Returns the creator's identity.
    #[must_use]
    pub fn creator(&self) -> &str {
        &self.fields.creator
    }

    /// Returns the hosting agent's short name.
    #[must_use]
    pub fn agent_name(&self) -> &str {
        &self.fields.agent_name
    }

    /// Returns the latest status.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        self.fields.status
    }

    /// Returns the latest status message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.fields.message
    }

    /// Returns the visibility.
    #[must_use]
    pub const fn visibility(&self) -> Visibility {
        self.fields.visibility
    }

    /// Returns the creation time.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.fields.created_at
    }

    /// Returns the expiry time.
    #[must_use]
    pub const fn expires_at(&self) -> DateTime<Utc> {
        self.fields.expires_at
    }

    /// Returns `true` when `caller` may see the record: it is public or
    /// `caller` created it.
    #[must_use]
    pub fn is_visible_to(&self, caller: &str) -> bool {
        self.fields.visibility == Visibility::Public || self.fields.creator == caller
    }

    /// Returns `true` once the expiry time has passed.
    #[must_use]
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.fields.expires_at < now
    }

    /// Returns `true` when the record expires within `window` of `now`.
    #[must_use]
    pub fn expires_within(&self, now: DateTime<Utc>, window: Duration) -> bool {
        self.fields.expires_at < now + window
    }

    /// Replaces the status and message.
    pub fn set_status(&mut self, status: StatusCode, message: impl Into<String>) {
        self.fields.status = status;
        self.fields.message = message.into();
    }

    /// Replaces the status, keeping the message.
    pub const fn set_status_code(&mut self, status: StatusCode) {
        self.fields.status = status;
    }

    /// Replaces the visibility.
    pub const fn set_visibility(&mut self, visibility: Visibility) {
        self.fields.visibility = visibility;
    }

    /// Moves the expiry forward by `extension`, counted from the current
    /// expiry.
    ///
    /// # Errors
    ///
    /// Returns [`RecordDomainError::ExpiryOutOfRange`] on calendar overflow.
    pub fn extend_expiry(&mut self, extension: ExpiryExtension) -> Result<(), RecordDomainError> {
        self.fields.expires_at = extension.apply(self.fields.expires_at)?;
        Ok(())
    }
}
