//! Client handlers for provisioned databases.

use super::views::{RecordView, record_views};
use super::{ApiError, AppState, Caller};
use crate::protocol::Message;
use crate::records::domain::{ExpiryExtension, ExpiryUnit, RecordId, Visibility};
use crate::server::{AccessInfo, ClientRequest, RestartReport};
use crate::status::StatusCode;
use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode as HttpStatus;
use std::sync::Arc;

/// `POST /api/databases`
pub(super) async fn create(
    State(state): State<Arc<AppState>>,
    caller: Caller,
    Json(request): Json<ClientRequest>,
) -> Result<(HttpStatus, Json<RecordView>), ApiError> {
    let record = state.provisioning.create(caller.as_str(), request).await?;
    Ok((HttpStatus::CREATED, Json(RecordView::from(&record))))
}

/// `POST /api/databases/import`
pub(super) async fn import(
    State(state): State<Arc<AppState>>,
    caller: Caller,
    Json(request): Json<ClientRequest>,
) -> Result<(HttpStatus, Json<RecordView>), ApiError> {
    let record = state.provisioning.import(caller.as_str(), request).await?;
    Ok((HttpStatus::ACCEPTED, Json(RecordView::from(&record))))
}

/// `GET /api/databases`
pub(super) async fn list_visible(
    State(state): State<Arc<AppState>>,
    caller: Caller,
) -> Result<Json<Vec<RecordView>>, ApiError> {
    let records = state.provisioning.list_visible(caller.as_str()).await?;
    Ok(Json(record_views(&records)))
}

/// `GET /api/agents/{agent}/databases`
pub(super) async fn list_for_agent(
    State(state): State<Arc<AppState>>,
    caller: Caller,
    Path(agent): Path<String>,
) -> Result<Json<Vec<RecordView>>, ApiError> {
    let records = state
        .provisioning
        .list_for_agent(caller.as_str(), &agent)
        .await?;
    Ok(Json(record_views(&records)))
}

/// `GET /api/agents/{agent}/databases/{dbname}`
pub(super) async fn get_by_agent_and_name(
    State(state): State<Arc<AppState>>,
    caller: Caller,
    Path((agent, dbname)): Path<(String, String)>,
) -> Result<Json<RecordView>, ApiError> {
    let record = state
        .provisioning
        .get_by_agent_and_name(caller.as_str(), &agent, &dbname)
        .await?;
    Ok(Json(RecordView::from(&record)))
}

/// `GET /api/databases/{id}`
pub(super) async fn get_by_id(
    State(state): State<Arc<AppState>>,
    caller: Caller,
    Path(id): Path<u64>,
) -> Result<Json<RecordView>, ApiError> {
    let record = state
        .provisioning
        .get(caller.as_str(), RecordId::new(id))
        .await?;
    Ok(Json(RecordView::from(&record)))
}

/// `GET /api/databases/{id}/access`
pub(super) async fn access_info(
    State(state): State<Arc<AppState>>,
    caller: Caller,
    Path(id): Path<u64>,
) -> Result<Json<AccessInfo>, ApiError> {
    let info = state
        .provisioning
        .access_info(caller.as_str(), RecordId::new(id))
        .await?;
    Ok(Json(info))
}

/// `DELETE /api/databases/{id}`
pub(super) async fn delete(
    State(state): State<Arc<AppState>>,
    caller: Caller,
    Path(id): Path<u64>,
) -> Result<Json<Message>, ApiError> {
    state
        .provisioning
        .delete(caller.as_str(), RecordId::new(id))
        .await?;
    Ok(Json(Message::new(StatusCode::SUCCESS, "database dropped")))
}

/// `PUT /api/databases/{id}/visibility/{visibility}`
pub(super) async fn set_visibility(
    State(state): State<Arc<AppState>>,
    caller: Caller,
    Path((id, visibility)): Path<(u64, String)>,
) -> Result<Json<RecordView>, ApiError> {
    let parsed = Visibility::try_from(visibility.as_str())
        .map_err(|err| ApiError::bad_request(err.to_string()))?;
    let record = state
        .provisioning
        .set_visibility(caller.as_str(), RecordId::new(id), parsed)
        .await?;
    Ok(Json(RecordView::from(&record)))
}

/// `PUT /api/databases/{id}/expiry/{amount}/{unit}`
pub(super) async fn extend_expiry(
    State(state): State<Arc<AppState>>,
    caller: Caller,
    Path((id, amount, unit)): Path<(u64, u32, String)>,
) -> Result<Json<RecordView>, ApiError> {
    let parsed_unit =
        ExpiryUnit::try_from(unit.as_str()).map_err(|err| ApiError::bad_request(err.to_string()))?;
    let extension = ExpiryExtension::new(amount, parsed_unit)
        .map_err(|err| ApiError::bad_request(err.to_string()))?;
    let record = state
        .provisioning
        .extend_expiry(caller.as_str(), RecordId::new(id), extension)
        .await?;
    Ok(Json(RecordView::from(&record)))
}

/// `GET /api/safe-to-restart`
pub(super) async fn safe_to_restart(
    State(state): State<Arc<AppState>>,
) -> Result<Json<RestartReport>, ApiError> {
    Ok(Json(state.provisioning.safe_to_restart().await?))
}
