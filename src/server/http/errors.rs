//! HTTP error envelope for router handlers.

use crate::agent_registry::services::RegistrationError;
use crate::server::ProvisioningError;
use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use serde_json::Value;

/// Error body: a machine-readable code, a message and optional details.
#[derive(Clone, Debug, Serialize)]
pub struct ErrorBody {
    /// Stable error code.
    pub code: &'static str,
    /// Human-readable message.
    pub message: String,
    /// Structured context, such as the agent's status code.
    pub details: Option<Value>,
}

/// Message and details of an [`ApiError`].
#[derive(Clone, Debug)]
pub struct ErrorState {
    message: String,
    details: Option<Value>,
}

impl ErrorState {
    fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            details: None,
        }
    }
}

#[derive(Clone, Debug, Serialize)]
struct ErrorEnvelope {
    request_id: String,
    error: ErrorBody,
}

/// Error returned by router handlers.
#[derive(Debug)]
pub enum ApiError {
    /// 400: malformed or incomplete request.
    BadRequest(ErrorState),
    /// 401: no caller identity.
    Unauthorized(ErrorState),
    /// 403: the caller may not access the record.
    Forbidden(ErrorState),
    /// 404: unknown agent or record.
    NotFound(ErrorState),
    /// 409: the database already exists.
    Conflict(ErrorState),
    /// 502: the agent reported a failure.
    BadGateway(ErrorState),
    /// 503: the record store or agent is unreachable.
    Unavailable(ErrorState),
    /// 500: anything else.
    Internal(ErrorState),
}

impl ApiError {
    /// Creates a 400 error.
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest(ErrorState::new(message))
    }

    /// Creates a 401 error.
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::Unauthorized(ErrorState::new(message))
    }

    /// Creates a 403 error.
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::Forbidden(ErrorState::new(message))
    }

    /// Creates a 404 error.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(ErrorState::new(message))
    }

    /// Creates a 409 error.
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict(ErrorState::new(message))
    }

    /// Creates a 502 error.
    pub fn bad_gateway(message: impl Into<String>) -> Self {
        Self::BadGateway(ErrorState::new(message))
    }

    /// Creates a 503 error.
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable(ErrorState::new(message))
    }

    /// Creates a 500 error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(ErrorState::new(message))
    }

    /// Attaches structured details.
    #[must_use]
    pub fn with_details(mut self, details: Value) -> Self {
        match &mut self {
            Self::BadRequest(s)
            | Self::Unauthorized(s)
            | Self::Forbidden(s)
            | Self::NotFound(s)
            | Self::Conflict(s)
            | Self::BadGateway(s)
            | Self::Unavailable(s)
            | Self::Internal(s) => s.details = Some(details),
        }
        self
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, state) = match self {
            Self::BadRequest(s) => (StatusCode::BAD_REQUEST, "invalid_argument", s),
            Self::Unauthorized(s) => (StatusCode::UNAUTHORIZED, "unauthorized", s),
            Self::Forbidden(s) => (StatusCode::FORBIDDEN, "access_denied", s),
            Self::NotFound(s) => (StatusCode::NOT_FOUND, "not_found", s),
            Self::Conflict(s) => (StatusCode::CONFLICT, "already_exists", s),
            Self::BadGateway(s) => (StatusCode::BAD_GATEWAY, "agent_error", s),
            Self::Unavailable(s) => (StatusCode::SERVICE_UNAVAILABLE, "unavailable", s),
            Self::Internal(s) => (StatusCode::INTERNAL_SERVER_ERROR, "internal", s),
        };
        let body = ErrorEnvelope {
            request_id: uuid::Uuid::new_v4().to_string(),
            error: ErrorBody {
                code,
                message: state.message,
                details: state.details,
            },
        };
        (status, Json(body)).into_response()
    }
}

impl From<ProvisioningError> for ApiError {
    fn from(err: ProvisioningError) -> Self {
        match err {
            ProvisioningError::Validation(message) => Self::bad_request(message),
            ProvisioningError::NotFound(_) => Self::not_found(err.to_string()),
            ProvisioningError::AlreadyExists(message) => Self::conflict(message),
            ProvisioningError::AccessDenied => Self::forbidden(err.to_string()),
            ProvisioningError::ExternalTool { status, message } => Self::bad_gateway(message)
                .with_details(serde_json::json!({
                    "status": status.code(),
                    "label": status.label(),
                })),
            ProvisioningError::BackendUnavailable(_) => Self::unavailable(err.to_string()),
            ProvisioningError::Store(_) => Self::internal(err.to_string()),
        }
    }
}

impl From<RegistrationError> for ApiError {
    fn from(err: RegistrationError) -> Self {
        match err {
            RegistrationError::Domain(_) => Self::bad_request(err.to_string()),
            RegistrationError::NotRegistered(_) => Self::not_found(err.to_string()),
        }
    }
}
