//! reqwest-backed router link.

use crate::agent::ports::{ServerLink, ServerLinkError, ServerLinkResult};
use crate::import::ports::StatusReporter;
use crate::protocol::{AgentDescriptor, RegisterResponse, StatusUpdate};
use async_trait::async_trait;
use std::time::Duration;
use tracing::{debug, warn};

/// Talks to the router over HTTP: registration and status callbacks.
#[derive(Debug, Clone)]
pub struct HttpServerLink {
    client: reqwest::Client,
    base_url: String,
}

impl HttpServerLink {
    /// Creates a link to the router at `base_url` whose requests time out
    /// after `timeout`.
    ///
    /// # Errors
    ///
    /// Returns the builder error when the TLS backend cannot be initialised.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_owned(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{path}", self.base_url)
    }

    async fn post<B: serde::Serialize + Sync>(
        &self,
        path: &str,
        body: &B,
    ) -> ServerLinkResult<reqwest::Response> {
        let response = self
            .client
            .post(self.url(path))
            .json(body)
            .send()
            .await
            .map_err(ServerLinkError::unreachable)?;
        let status = response.status();
        if status.is_success() {
            Ok(response)
        } else {
            let text = response.text().await.unwrap_or_default();
            Err(ServerLinkError::Rejected {
                status: status.as_u16(),
                body: text,
            })
        }
    }
}

#[async_trait]
impl ServerLink for HttpServerLink {
    async fn register(&self, descriptor: &AgentDescriptor) -> ServerLinkResult<RegisterResponse> {
        self.post("register", descriptor)
            .await?
            .json::<RegisterResponse>()
            .await
            .map_err(ServerLinkError::unreachable)
    }

    async fn unregister(&self, descriptor: &AgentDescriptor) -> ServerLinkResult<()> {
        let leaving = AgentDescriptor {
            up: false,
            ..descriptor.clone()
        };
        self.post("unregister", &leaving).await.map(|_| ())
    }
}

#[async_trait]
impl StatusReporter for HttpServerLink {
    async fn report(&self, update: StatusUpdate) {
        let id = update.id;
        match self.post("status", &update).await {
            Ok(_) => debug!(id, status = %update.status, "status delivered"),
            Err(err) => warn!(id, status = %update.status, error = %err, "status update lost"),
        }
    }
}
