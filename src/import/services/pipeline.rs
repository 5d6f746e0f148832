//! Staged import of a dump into a freshly created database.

use crate::import::adapters::extract_archive;
use crate::import::domain::{ArchiveFormat, ImportError, ImportResult};
use crate::import::ports::{DumpFetcher, StatusReporter};
use crate::protocol::StatusUpdate;
use crate::status::StatusCode;
use crate::vendor::domain::DbRequest;
use crate::vendor::ports::VendorAdapter;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

/// Runs one import from download to completion.
///
/// The database named by the request must already exist. Every stage emits
/// a status update before it starts. A failure before the import step drops
/// the database again; a failure in the import step leaves it in place.
/// Scratch files live in a per-run temporary directory that is removed when
/// the run ends.
pub struct ImportPipeline {
    adapter: Arc<dyn VendorAdapter>,
    fetcher: Arc<dyn DumpFetcher>,
    reporter: Arc<dyn StatusReporter>,
    scratch_root: PathBuf,
}

impl ImportPipeline {
    /// Creates a pipeline that stages files under `scratch_root`.
    pub fn new(
        adapter: Arc<dyn VendorAdapter>,
        fetcher: Arc<dyn DumpFetcher>,
        reporter: Arc<dyn StatusReporter>,
        scratch_root: impl Into<PathBuf>,
    ) -> Self {
        Self {
            adapter,
            fetcher,
            reporter,
            scratch_root: scratch_root.into(),
        }
    }

    /// Runs the import and returns the terminal status reported.
    pub async fn run(&self, request: DbRequest) -> StatusCode {
        self.report(&request, StatusCode::STARTED, "import started")
            .await;

        match self.stage_and_import(&request).await {
            Ok(()) => {
                self.report(&request, StatusCode::SUCCESS, "import finished successfully")
                    .await;
                StatusCode::SUCCESS
            }
            Err(err) => {
                if err.discards_database() {
                    self.discard(&request).await;
                }
                let status = err.status();
                self.report(&request, status, err.to_string()).await;
                status
            }
        }
    }

    async fn stage_and_import(&self, request: &DbRequest) -> ImportResult<()> {
        let scratch = tempfile::Builder::new()
            .prefix("import-")
            .tempdir_in(&self.scratch_root)?;

        self.report(
            request,
            StatusCode::DOWNLOAD_IN_PROGRESS,
            format!("downloading {}", request.dump_location),
        )
        .await;
        let downloaded = self
            .fetcher
            .fetch(&request.dump_location, scratch.path())
            .await?;

        let payload = match ArchiveFormat::detect(&downloaded) {
            None => downloaded,
            Some(ArchiveFormat::Unsupported(extension)) => {
                return Err(ImportError::ArchiveNotSupported(extension));
            }
            Some(format) => {
                self.report(request, StatusCode::EXTRACTING_ARCHIVE, "extracting archive")
                    .await;
                Self::extract(format, downloaded, scratch.path().join("extracted")).await?
            }
        };

        let dump = if self.adapter.validates_dumps() {
            self.report(request, StatusCode::VALIDATING_DUMP, "validating dump")
                .await;
            self.adapter
                .validate_dump(&payload)
                .await
                .map_err(ImportError::Validation)?
        } else {
            payload
        };

        self.report(request, StatusCode::IMPORT_IN_PROGRESS, "importing dump")
            .await;
        self.adapter
            .import_database(&request.with_dump_location(dump.display().to_string()))
            .await
            .map_err(ImportError::Import)?;

        drop(scratch);
        Ok(())
    }

    async fn extract(
        format: ArchiveFormat,
        archive: PathBuf,
        destination: PathBuf,
    ) -> ImportResult<PathBuf> {
        let files = tokio::task::spawn_blocking(move || {
            extract_archive(&format, &archive, &destination)
        })
        .await
        .map_err(ImportError::extract)??;

        let count = files.len();
        let mut remaining = files.into_iter();
        match (remaining.next(), count) {
            (Some(only), 1) => Ok(only),
            (None, _) => Err(ImportError::EmptyArchive),
            (Some(_), _) => Err(ImportError::MultipleFiles(count)),
        }
    }

    async fn discard(&self, request: &DbRequest) {
        if let Err(err) = self.adapter.drop_database(request).await {
            warn!(
                id = request.id,
                database = %request.database_name,
                error = %err,
                "could not drop database after failed import"
            );
        }
    }

    async fn report(&self, request: &DbRequest, status: StatusCode, message: impl Into<String>) {
        let update = StatusUpdate {
            id: request.id,
            status,
            message: message.into(),
        };
        info!(id = update.id, status = %update.status, message = %update.message, "import status");
        self.reporter.report(update).await;
    }
}
