//! Agent identity and descriptor types.

mod agent;
mod error;
mod name;

pub use agent::{Agent, AgentRegistration};
pub use error::AgentDomainError;
pub use name::ShortName;
