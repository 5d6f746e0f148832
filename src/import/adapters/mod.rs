//! Import pipeline adapters.

mod extract;
mod fetcher;
mod memory;

pub use extract::extract_archive;
pub use fetcher::HttpDumpFetcher;
pub use memory::RecordingStatusReporter;
