//! Dump fetcher for HTTP(S) URLs and agent-local paths.

use crate::import::domain::{ImportError, ImportResult};
use crate::import::ports::DumpFetcher;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};

const PROBE_TIMEOUT: Duration = Duration::from_secs(30);
const FALLBACK_FILE_NAME: &str = "dump";

/// Downloads dumps over HTTP, or copies them when the location is a local
/// path or `file://` URL.
#[derive(Debug, Clone)]
pub struct HttpDumpFetcher {
    client: reqwest::Client,
}

impl HttpDumpFetcher {
    /// Creates a fetcher whose connections time out after `connect_timeout`.
    ///
    /// # Errors
    ///
    /// Returns [`ImportError::Download`] when the HTTP client cannot be
    /// built.
    pub fn new(connect_timeout: Duration) -> ImportResult<Self> {
        let client = reqwest::Client::builder()
            .connect_timeout(connect_timeout)
            .build()
            .map_err(|err| ImportError::Download(err.to_string()))?;
        Ok(Self { client })
    }

    async fn download(&self, url: &str, directory: &Path) -> ImportResult<PathBuf> {
        let mut response = self
            .client
            .get(url)
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(|err| ImportError::Download(err.to_string()))?;

        let target = directory.join(remote_file_name(response.url()));
        let mut file = tokio::fs::File::create(&target).await?;
        while let Some(chunk) = response
            .chunk()
            .await
            .map_err(|err| ImportError::Download(err.to_string()))?
        {
            file.write_all(&chunk).await?;
        }
        file.flush().await?;
        debug!(%url, path = %target.display(), "downloaded dump");
        Ok(target)
    }
}

impl Default for HttpDumpFetcher {
    fn default() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl DumpFetcher for HttpDumpFetcher {
    async fn exists(&self, location: &str) -> bool {
        if is_remote(location) {
            match self
                .client
                .get(location)
                .timeout(PROBE_TIMEOUT)
                .send()
                .await
            {
                Ok(response) => response.status().is_success(),
                Err(err) => {
                    warn!(%location, error = %err, "dump location is unreachable");
                    false
                }
            }
        } else {
            tokio::fs::metadata(local_path(location))
                .await
                .is_ok_and(|meta| meta.is_file())
        }
    }

    async fn fetch(&self, location: &str, directory: &Path) -> ImportResult<PathBuf> {
        if is_remote(location) {
            return self.download(location, directory).await;
        }
        let source = local_path(location);
        let name = source
            .file_name()
            .ok_or_else(|| ImportError::Download(format!("'{location}' has no file name")))?;
        let target = directory.join(name);
        tokio::fs::copy(&source, &target)
            .await
            .map_err(|err| ImportError::Download(format!("{location}: {err}")))?;
        Ok(target)
    }
}

fn is_remote(location: &str) -> bool {
    let lower = location.to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

fn local_path(location: &str) -> PathBuf {
    PathBuf::from(location.strip_prefix("file://").unwrap_or(location))
}

fn remote_file_name(url: &reqwest::Url) -> String {
    url.path_segments()
        .and_then(|mut segments| segments.next_back())
        .filter(|segment| !segment.is_empty())
        .map_or_else(|| FALLBACK_FILE_NAME.to_owned(), ToOwned::to_owned)
}
