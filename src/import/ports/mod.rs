//! Import pipeline ports.

mod fetcher;
mod reporter;

pub use fetcher::DumpFetcher;
pub use reporter::StatusReporter;
