//! axum surface of the router.
//!
//! Agent-facing routes (`/register`, `/unregister`, `/status`) take no
//! caller identity; every `/api` route requires one.

mod agents;
mod databases;
pub mod errors;
pub mod extract;
pub mod views;

use crate::agent_registry::services::AgentRegistrationService;
use crate::server::ProvisioningService;
use axum::Router;
use axum::middleware;
use axum::routing::{get, post, put};
use mockable::DefaultClock;
use std::sync::Arc;

pub use errors::ApiError;
pub use extract::{Caller, ObservedAddr};
pub use views::RecordView;

/// Services shared by every handler.
pub struct AppState {
    /// Client-facing provisioning.
    pub provisioning: ProvisioningService<DefaultClock>,
    /// Agent admission.
    pub registration: AgentRegistrationService<DefaultClock>,
}

/// Builds the router's HTTP application.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/alive", get(agents::alive))
        .route("/register", post(agents::register))
        .route("/unregister", post(agents::unregister))
        .route("/status", post(agents::status))
        .route("/api/agents", get(agents::list_agents))
        .route("/api/agents/{agent}", get(agents::get_agent))
        .route(
            "/api/agents/{agent}/databases",
            get(databases::list_for_agent),
        )
        .route(
            "/api/agents/{agent}/databases/{dbname}",
            get(databases::get_by_agent_and_name),
        )
        .route(
            "/api/databases",
            post(databases::create).get(databases::list_visible),
        )
        .route("/api/databases/import", post(databases::import))
        .route(
            "/api/databases/{id}",
            get(databases::get_by_id).delete(databases::delete),
        )
        .route("/api/databases/{id}/access", get(databases::access_info))
        .route(
            "/api/databases/{id}/visibility/{visibility}",
            put(databases::set_visibility),
        )
        .route(
            "/api/databases/{id}/expiry/{amount}/{unit}",
            put(databases::extend_expiry),
        )
        .route("/api/safe-to-restart", get(databases::safe_to_restart))
        .layer(middleware::from_fn(crate::telemetry::access_log))
        .with_state(state)
}
