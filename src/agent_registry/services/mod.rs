//! Agent registry services.

mod ids;
mod liveness;
mod registration;
mod registry;

pub use ids::IdGenerator;
pub use liveness::{LivenessMonitor, LivenessReport};
pub use registration::{AgentRegistrationService, RegistrationError};
pub use registry::AgentRegistry;
