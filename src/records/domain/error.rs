//! Record domain errors.

use thiserror::Error;

/// Errors returned while constructing or changing records.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RecordDomainError {
    /// The expiry precedes the creation time.
    #[error("record would expire before it was created")]
    ExpiryBeforeCreation,

    /// An expiry extension overflowed the calendar.
    #[error("expiry extension is out of range")]
    ExpiryOutOfRange,

    /// An expiry extension of zero units was requested.
    #[error("expiry extension must be at least one unit")]
    EmptyExtension,
}

/// Error returned when a visibility value is not recognised.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown visibility: {0}")]
pub struct ParseVisibilityError(pub String);

/// Error returned when an expiry unit is not recognised.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown expiry unit: {0} (expected days, months or years)")]
pub struct ParseExpiryUnitError(pub String);
