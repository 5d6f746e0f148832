//! Logging set-up shared by both binaries.

use axum::extract::Request;
use axum::http::Method;
use axum::middleware::Next;
use axum::response::Response;
use std::time::Instant;
use tracing::info;
use tracing_subscriber::util::TryInitError;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Paths polled by probes; their requests are not logged.
const QUIET_PATHS: [&str; 2] = ["/alive", "/heartbeat"];

/// Installs the global subscriber. `RUST_LOG` wins over `default_level`.
///
/// # Errors
///
/// Returns [`TryInitError`] when a subscriber is already installed.
pub fn init(default_level: &str) -> Result<(), TryInitError> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .try_init()
}

/// Access-log middleware: method, path, status and latency of every request
/// except liveness probes.
pub async fn access_log(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_owned();
    if method == Method::GET && QUIET_PATHS.contains(&path.as_str()) {
        return next.run(request).await;
    }

    let started = Instant::now();
    let response = next.run(request).await;
    info!(
        %method,
        %path,
        status = response.status().as_u16(),
        elapsed_ms = started.elapsed().as_millis(),
        "request"
    );
    response
}
