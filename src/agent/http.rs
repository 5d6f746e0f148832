//! HTTP interface of an agent.
//!
//! Every provisioning endpoint answers with a [`Message`]; its status code
//! carries the outcome and the HTTP status mirrors it.

use crate::import::ports::DumpFetcher;
use crate::import::services::ImportQueue;
use crate::protocol::{DatabaseList, Message, WhoAmI};
use crate::status::StatusCode;
use crate::vendor::domain::{DbRequest, OperationKind, RequestField};
use crate::vendor::ports::{VendorAdapter, VendorError};
use axum::extract::State;
use axum::http::StatusCode as HttpStatus;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router, middleware};
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

type Reply = (HttpStatus, Json<Message>);

/// Collaborators shared by the agent's handlers.
pub struct AgentState {
    adapter: Arc<dyn VendorAdapter>,
    fetcher: Arc<dyn DumpFetcher>,
    queue: ImportQueue,
    database_version: String,
    started: Instant,
}

impl AgentState {
    /// Bundles the handler collaborators; uptime counts from now.
    #[must_use]
    pub fn new(
        adapter: Arc<dyn VendorAdapter>,
        fetcher: Arc<dyn DumpFetcher>,
        queue: ImportQueue,
        database_version: impl Into<String>,
    ) -> Self {
        Self {
            adapter,
            fetcher,
            queue,
            database_version: database_version.into(),
            started: Instant::now(),
        }
    }
}

/// Builds the agent's HTTP application.
pub fn router(state: Arc<AgentState>) -> Router {
    Router::new()
        .route("/alive", get(alive))
        .route("/heartbeat", get(heartbeat))
        .route("/whoami", get(whoami))
        .route("/list-databases", get(list_databases))
        .route("/create-database", post(create_database))
        .route("/drop-database", post(drop_database))
        .route("/import-database", post(import_database))
        .layer(middleware::from_fn(crate::telemetry::access_log))
        .with_state(state)
}

fn reply(http: HttpStatus, status: StatusCode, message: impl Into<String>) -> Reply {
    (http, Json(Message::new(status, message)))
}

fn missing_fields(adapter: &dyn VendorAdapter, request: &DbRequest, kind: OperationKind) -> Option<Reply> {
    let missing: Vec<&str> = request
        .missing_fields(adapter.required_fields(kind))
        .into_iter()
        .map(RequestField::as_str)
        .collect();
    (!missing.is_empty()).then(|| {
        reply(
            HttpStatus::BAD_REQUEST,
            StatusCode::MISSING_PARAMETERS,
            format!("missing {}", missing.join(", ")),
        )
    })
}

fn creation_failure(request: &DbRequest, err: &VendorError) -> Reply {
    warn!(id = request.id, database = %request.database_name, error = %err, "create failed");
    match err {
        VendorError::AlreadyExists { .. } => {
            reply(HttpStatus::CONFLICT, StatusCode::ALREADY_EXISTS, err.to_string())
        }
        VendorError::Validation(_) => {
            reply(HttpStatus::BAD_REQUEST, StatusCode::CLIENT_ERROR, err.to_string())
        }
        _ => reply(
            HttpStatus::INTERNAL_SERVER_ERROR,
            StatusCode::CREATE_DATABASE_FAILED,
            format!("creating database failed: {err}"),
        ),
    }
}

async fn alive() -> Reply {
    reply(HttpStatus::OK, StatusCode::SUCCESS, "alive")
}

async fn heartbeat(State(state): State<Arc<AgentState>>) -> Reply {
    match state.adapter.alive().await {
        Ok(()) => reply(HttpStatus::OK, StatusCode::SUCCESS, "still alive"),
        Err(err) => {
            warn!(error = %err, "database failed the heartbeat probe");
            reply(
                HttpStatus::SERVICE_UNAVAILABLE,
                StatusCode::SERVER_ERROR,
                err.to_string(),
            )
        }
    }
}

async fn whoami(State(state): State<Arc<AgentState>>) -> Json<WhoAmI> {
    Json(WhoAmI {
        database_vendor: state.adapter.vendor(),
        database_version: state.database_version.clone(),
        agent_version: env!("CARGO_PKG_VERSION").to_owned(),
        uptime_seconds: state.started.elapsed().as_secs(),
    })
}

async fn list_databases(State(state): State<Arc<AgentState>>) -> Response {
    match state.adapter.list_databases().await {
        Ok(databases) => Json(DatabaseList {
            status: StatusCode::SUCCESS,
            message: databases,
        })
        .into_response(),
        Err(err) => reply(
            HttpStatus::INTERNAL_SERVER_ERROR,
            StatusCode::LIST_DATABASE_FAILED,
            format!("listing databases failed: {err}"),
        )
        .into_response(),
    }
}

async fn create_database(
    State(state): State<Arc<AgentState>>,
    Json(request): Json<DbRequest>,
) -> Reply {
    if let Some(rejected) = missing_fields(state.adapter.as_ref(), &request, OperationKind::Create) {
        return rejected;
    }
    match state.adapter.create_database(&request).await {
        Ok(()) => {
            info!(id = request.id, database = %request.database_name, "database created");
            reply(HttpStatus::OK, StatusCode::SUCCESS, "database and user created")
        }
        Err(err) => creation_failure(&request, &err),
    }
}

async fn drop_database(
    State(state): State<Arc<AgentState>>,
    Json(request): Json<DbRequest>,
) -> Reply {
    if let Some(rejected) = missing_fields(state.adapter.as_ref(), &request, OperationKind::Drop) {
        return rejected;
    }
    match state.adapter.drop_database(&request).await {
        Ok(()) => {
            info!(id = request.id, database = %request.database_name, "database dropped");
            reply(HttpStatus::OK, StatusCode::SUCCESS, "database and user dropped")
        }
        Err(err) => {
            warn!(id = request.id, database = %request.database_name, error = %err, "drop failed");
            reply(
                HttpStatus::INTERNAL_SERVER_ERROR,
                StatusCode::DROP_DATABASE_FAILED,
                format!("dropping database failed: {err}"),
            )
        }
    }
}

/// Creates the database, then queues the import and answers `Accepted`.
///
/// The dump location is probed and a queue slot reserved first, so a
/// refused import never leaves a database behind.
async fn import_database(
    State(state): State<Arc<AgentState>>,
    Json(request): Json<DbRequest>,
) -> Reply {
    if let Some(rejected) = missing_fields(state.adapter.as_ref(), &request, OperationKind::Import) {
        return rejected;
    }
    if !state.fetcher.exists(&request.dump_location).await {
        return reply(
            HttpStatus::NOT_FOUND,
            StatusCode::NOT_FOUND,
            "dump file does not exist or is not reachable",
        );
    }
    let slot = match state.queue.try_reserve() {
        Ok(slot) => slot,
        Err(err) => {
            warn!(id = request.id, error = %err, "import refused");
            return reply(
                HttpStatus::SERVICE_UNAVAILABLE,
                StatusCode::SERVER_ERROR,
                err.to_string(),
            );
        }
    };
    if let Err(err) = state.adapter.create_database(&request).await {
        return creation_failure(&request, &err);
    }

    info!(id = request.id, database = %request.database_name, "import accepted");
    slot.submit(request);
    reply(
        HttpStatus::OK,
        StatusCode::ACCEPTED,
        "request understood, starting import",
    )
}
