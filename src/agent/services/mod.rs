//! Agent background services.

mod keepalive;

pub use keepalive::KeepAlive;
