//! Agent client adapters.

mod http;
mod loopback;

pub use http::HttpAgentClient;
pub use loopback::LoopbackAgentClient;
