//! Periodic expiry sweep over provisioning records.
//!
//! Expired databases are dropped at their agent and their records removed;
//! records about to expire are flagged as scheduled for removal.

mod sweeper;

pub use sweeper::{ExpirySweeper, REMOVAL_WARNING_WINDOW, SweepDeps, SweepReport};

#[cfg(test)]
mod tests;
