//! Import orchestration services.

mod pipeline;
mod queue;

pub use pipeline::ImportPipeline;
pub use queue::{ImportQueue, ImportSlot, QueueError};
