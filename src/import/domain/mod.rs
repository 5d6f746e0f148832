//! Import domain types.

mod archive;
mod error;

pub use archive::ArchiveFormat;
pub use error::{ImportError, ImportResult};
