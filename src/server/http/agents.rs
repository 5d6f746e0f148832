//! Agent-facing and agent listing handlers.

use super::{ApiError, AppState, Caller, ObservedAddr};
use crate::agent_registry::domain::Agent;
use crate::protocol::{AgentDescriptor, Message, RegisterResponse, StatusUpdate};
use crate::status::StatusCode;
use axum::Json;
use axum::extract::{Path, State};
use std::sync::Arc;
use tracing::info;

/// `GET /alive`
pub(super) async fn alive() -> Json<Message> {
    Json(Message::new(StatusCode::SUCCESS, "alive"))
}

/// `POST /register`
pub(super) async fn register(
    State(state): State<Arc<AppState>>,
    ObservedAddr(peer): ObservedAddr,
    Json(descriptor): Json<AgentDescriptor>,
) -> Result<Json<RegisterResponse>, ApiError> {
    let response = state.registration.register(&descriptor, peer)?;
    Ok(Json(response))
}

/// `POST /unregister`
pub(super) async fn unregister(
    State(state): State<Arc<AppState>>,
    Json(descriptor): Json<AgentDescriptor>,
) -> Result<Json<Message>, ApiError> {
    let agent = state.registration.unregister(&descriptor)?;
    Ok(Json(Message::new(
        StatusCode::SUCCESS,
        format!("agent {} unregistered", agent.short_name()),
    )))
}

/// `POST /status`: unknown record IDs are acknowledged and dropped.
pub(super) async fn status(
    State(state): State<Arc<AppState>>,
    Json(update): Json<StatusUpdate>,
) -> Result<Json<Message>, ApiError> {
    let id = update.id;
    let status = update.status;
    let applied = state.provisioning.apply_status(update).await?;
    if applied {
        info!(id, %status, "status updated");
        Ok(Json(Message::new(StatusCode::SUCCESS, "status updated")))
    } else {
        Ok(Json(Message::new(StatusCode::NOT_FOUND, "unknown record")))
    }
}

/// `GET /api/agents`
pub(super) async fn list_agents(
    State(state): State<Arc<AppState>>,
    _caller: Caller,
) -> Json<Vec<Agent>> {
    Json(state.provisioning.agents())
}

/// `GET /api/agents/{agent}`
pub(super) async fn get_agent(
    State(state): State<Arc<AppState>>,
    _caller: Caller,
    Path(agent): Path<String>,
) -> Result<Json<Agent>, ApiError> {
    Ok(Json(state.provisioning.agent(&agent)?))
}
