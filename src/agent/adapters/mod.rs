//! Router link adapters.

mod http;
mod memory;

pub use http::HttpServerLink;
pub use memory::InMemoryServerLink;
