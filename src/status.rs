//! Provisioning status codes shared by the router and its agents.
//!
//! A status code is a small integer whose hundreds band carries its
//! meaning: `1..=99` in progress, `100..=199` success, `200..=299` client
//! error, `300..=399` server error and `400..=499` warning. Human-readable
//! labels and progress percentages are derived from the code and are never
//! persisted alongside it.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Numeric provisioning status carried on the wire and in the record store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u16", into = "u16")]
pub struct StatusCode(u16);

/// Semantic band a [`StatusCode`] belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatusBand {
    /// Work has started and has not finished yet.
    InProgress,
    /// Work finished successfully.
    Success,
    /// The request itself was at fault.
    ClientError,
    /// The agent or database failed while serving a valid request.
    ServerError,
    /// Informational warning such as a pending removal.
    Warning,
}

/// Error returned for integers outside every status band.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
#[error("status code {0} is outside the range 1..=499")]
pub struct InvalidStatusCode(pub u16);

impl StatusCode {
    /// Provisioning has started.
    pub const STARTED: Self = Self(1);
    /// Generic in-progress marker.
    pub const IN_PROGRESS: Self = Self(2);
    /// The dump file is being downloaded.
    pub const DOWNLOAD_IN_PROGRESS: Self = Self(3);
    /// The downloaded archive is being unpacked.
    pub const EXTRACTING_ARCHIVE: Self = Self(4);
    /// The dump is being checked before import.
    pub const VALIDATING_DUMP: Self = Self(5);
    /// The dump is being loaded into the database.
    pub const IMPORT_IN_PROGRESS: Self = Self(6);

    /// Generic success.
    pub const SUCCESS: Self = Self(100);
    /// The database was created.
    pub const CREATED: Self = Self(101);
    /// The request was accepted for asynchronous processing.
    pub const ACCEPTED: Self = Self(102);
    /// Informational progress update.
    pub const UPDATE: Self = Self(103);

    /// Generic client error.
    pub const CLIENT_ERROR: Self = Self(200);
    /// A referenced resource does not exist.
    pub const NOT_FOUND: Self = Self(201);
    /// The dump could not be downloaded.
    pub const DOWNLOAD_FAILED: Self = Self(202);
    /// The dump is an archive type that cannot be unpacked.
    pub const ARCHIVE_NOT_SUPPORTED: Self = Self(203);
    /// The archive holds more than one payload file.
    pub const MULTIPLE_FILES_IN_ARCHIVE: Self = Self(204);
    /// Required request fields were empty.
    pub const MISSING_PARAMETERS: Self = Self(205);
    /// The database or user already exists.
    pub const ALREADY_EXISTS: Self = Self(206);

    /// Generic server error.
    pub const SERVER_ERROR: Self = Self(300);
    /// The database could not be created.
    pub const CREATE_DATABASE_FAILED: Self = Self(301);
    /// The archive could not be unpacked.
    pub const EXTRACTING_ARCHIVE_FAILED: Self = Self(302);
    /// The dump failed validation.
    pub const VALIDATION_FAILED: Self = Self(303);
    /// The dump could not be imported.
    pub const IMPORT_FAILED: Self = Self(304);
    /// The database could not be dropped.
    pub const DROP_DATABASE_FAILED: Self = Self(305);
    /// The databases on an agent could not be listed.
    pub const LIST_DATABASE_FAILED: Self = Self(306);

    /// The record expires soon and will be removed.
    pub const REMOVAL_SCHEDULED: Self = Self(400);

    /// Creates a status code from its numeric form.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidStatusCode`] when `code` is outside `1..=499`.
    pub const fn new(code: u16) -> Result<Self, InvalidStatusCode> {
        match code {
            1..=499 => Ok(Self(code)),
            _ => Err(InvalidStatusCode(code)),
        }
    }

    /// Returns the numeric code.
    #[must_use]
    pub const fn code(self) -> u16 {
        self.0
    }

    /// Returns the band this code belongs to.
    #[must_use]
    pub const fn band(self) -> StatusBand {
        match self.0 {
            100..=199 => StatusBand::Success,
            200..=299 => StatusBand::ClientError,
            300..=399 => StatusBand::ServerError,
            400.. => StatusBand::Warning,
            _ => StatusBand::InProgress,
        }
    }

    /// Returns `true` for codes in the in-progress band.
    #[must_use]
    pub const fn is_in_progress(self) -> bool {
        matches!(self.band(), StatusBand::InProgress)
    }

    /// Returns `true` for codes in the success band.
    #[must_use]
    pub const fn is_success(self) -> bool {
        matches!(self.band(), StatusBand::Success)
    }

    /// Returns `true` for client and server errors.
    #[must_use]
    pub const fn is_error(self) -> bool {
        matches!(self.band(), StatusBand::ClientError | StatusBand::ServerError)
    }

    /// Returns the human-readable label; codes without a name inside a
    /// valid band read as `"Unknown"`.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self.0 {
            1 => "Started",
            2 => "In progress",
            3 => "Download in progress",
            4 => "Extracting archive",
            5 => "Validating dump",
            6 => "Import in progress",
            100 => "Success",
            101 => "Created",
            102 => "Accepted",
            103 => "Update",
            200 => "Client error",
            201 => "Not found",
            202 => "Download failed",
            203 => "Archive not supported",
            204 => "Multiple files in archive",
            205 => "Missing parameters",
            206 => "Already exists",
            300 => "Server error",
            301 => "Create database failed",
            302 => "Extracting archive failed",
            303 => "Validation failed",
            304 => "Import failed",
            305 => "Drop database failed",
            306 => "List database failed",
            400 => "Removal scheduled",
            _ => "Unknown",
        }
    }

    /// Returns the completion percentage shown to clients.
    ///
    /// Errors and warnings report 0, successes report 100, and the import
    /// stages advance in quarters.
    #[must_use]
    pub const fn progress(self) -> u8 {
        match self.band() {
            StatusBand::Success => 100,
            StatusBand::ClientError | StatusBand::ServerError | StatusBand::Warning => 0,
            StatusBand::InProgress => match self.0 {
                4 => 25,
                5 => 50,
                6 => 75,
                _ => 0,
            },
        }
    }
}

impl TryFrom<u16> for StatusCode {
    type Error = InvalidStatusCode;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl TryFrom<i32> for StatusCode {
    type Error = InvalidStatusCode;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        let code = u16::try_from(value).map_err(|_| InvalidStatusCode(0))?;
        Self::new(code)
    }
}

impl From<StatusCode> for u16 {
    fn from(value: StatusCode) -> Self {
        value.0
    }
}

impl From<StatusCode> for i32 {
    fn from(value: StatusCode) -> Self {
        Self::from(value.0)
    }
}

impl fmt::Display for StatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.0, self.label())
    }
}
