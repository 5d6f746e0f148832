//! Dump download port.

use crate::import::domain::ImportResult;
use async_trait::async_trait;
use std::path::{Path, PathBuf};

/// Retrieves dump files named by a request's dump location.
#[async_trait]
pub trait DumpFetcher: Send + Sync {
    /// Returns `true` when `location` can be fetched.
    async fn exists(&self, location: &str) -> bool;

    /// Downloads `location` into `directory` and returns the local path.
    ///
    /// # Errors
    ///
    /// Returns [`crate::import::domain::ImportError::Download`] when the
    /// source cannot be read or the file cannot be written.
    async fn fetch(&self, location: &str, directory: &Path) -> ImportResult<PathBuf>;
}
