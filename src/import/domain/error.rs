//! Import pipeline errors.

use crate::status::StatusCode;
use crate::vendor::ports::VendorError;
use std::sync::Arc;
use thiserror::Error;

/// Result type for import pipeline stages.
pub type ImportResult<T> = Result<T, ImportError>;

/// Reasons an import stops before completing.
#[derive(Debug, Clone, Error)]
pub enum ImportError {
    /// The dump could not be downloaded.
    #[error("download failed: {0}")]
    Download(String),

    /// The dump is an archive type the agent cannot unpack.
    #[error("archive type '{0}' is not supported")]
    ArchiveNotSupported(String),

    /// The archive holds more than one payload file.
    #[error("archive holds {0} files, expected exactly one")]
    MultipleFiles(usize),

    /// The archive holds no payload file.
    #[error("archive holds no files")]
    EmptyArchive,

    /// The archive is corrupt or could not be written out.
    #[error("could not extract archive: {0}")]
    Extract(Arc<dyn std::error::Error + Send + Sync>),

    /// The vendor rejected the dump.
    #[error("dump validation failed: {0}")]
    Validation(VendorError),

    /// The vendor's import tool failed.
    #[error("import failed: {0}")]
    Import(VendorError),

    /// Scratch space could not be prepared.
    #[error("scratch space error: {0}")]
    Io(Arc<std::io::Error>),
}

impl ImportError {
    /// Wraps an extraction failure.
    pub fn extract(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Extract(Arc::new(err))
    }

    /// Returns the status code reported for this failure.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::Download(_) => StatusCode::DOWNLOAD_FAILED,
            Self::ArchiveNotSupported(_) => StatusCode::ARCHIVE_NOT_SUPPORTED,
            Self::MultipleFiles(_) => StatusCode::MULTIPLE_FILES_IN_ARCHIVE,
            Self::EmptyArchive => StatusCode::CLIENT_ERROR,
            Self::Extract(_) => StatusCode::EXTRACTING_ARCHIVE_FAILED,
            Self::Validation(_) => StatusCode::VALIDATION_FAILED,
            Self::Import(_) => StatusCode::IMPORT_FAILED,
            Self::Io(_) => StatusCode::SERVER_ERROR,
        }
    }

    /// Returns `true` when the freshly created database should be dropped.
    ///
    /// Failures in the import step itself leave the database in place so a
    /// partially loaded dump can be inspected.
    #[must_use]
    pub const fn discards_database(&self) -> bool {
        !matches!(self, Self::Import(_))
    }
}

impl From<std::io::Error> for ImportError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(Arc::new(err))
    }
}
