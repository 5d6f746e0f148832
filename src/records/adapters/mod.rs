//! Adapter implementations for record persistence and migration ports.

pub mod memory;
pub mod postgres;
