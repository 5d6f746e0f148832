//! HTTP agent client.

use crate::agent_registry::domain::Agent;
use crate::agent_registry::ports::{AgentClient, AgentClientError, AgentClientResult};
use crate::protocol::Message;
use crate::vendor::domain::DbRequest;
use async_trait::async_trait;
use std::time::Duration;
use tracing::debug;

/// Calls agents over HTTP with JSON bodies.
#[derive(Debug, Clone)]
pub struct HttpAgentClient {
    client: reqwest::Client,
}

impl HttpAgentClient {
    /// Creates a client whose requests time out after `timeout`.
    ///
    /// # Errors
    ///
    /// Returns the builder error when the TLS backend cannot be initialised.
    pub fn new(timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { client })
    }

    async fn post(&self, agent: &Agent, path: &str, request: &DbRequest) -> AgentClientResult<Message> {
        let url = agent.url(path);
        debug!(%url, id = request.id, "calling agent");
        let response = self
            .client
            .post(&url)
            .json(request)
            .send()
            .await
            .map_err(|err| AgentClientError::unreachable(agent, err))?;
        let status = response.status();
        response
            .json::<Message>()
            .await
            .map_err(|err| AgentClientError::InvalidResponse {
                agent: agent.short_name().to_string(),
                detail: format!("HTTP {status}: {err}"),
            })
    }
}

#[async_trait]
impl AgentClient for HttpAgentClient {
    async fn create_database(
        &self,
        agent: &Agent,
        request: &DbRequest,
    ) -> AgentClientResult<Message> {
        self.post(agent, "create-database", request).await
    }

    async fn import_database(
        &self,
        agent: &Agent,
        request: &DbRequest,
    ) -> AgentClientResult<Message> {
        self.post(agent, "import-database", request).await
    }

    async fn drop_database(&self, agent: &Agent, request: &DbRequest) -> AgentClientResult<Message> {
        self.post(agent, "drop-database", request).await
    }

    async fn heartbeat(&self, agent: &Agent) -> AgentClientResult<()> {
        let response = self
            .client
            .get(agent.url("heartbeat"))
            .send()
            .await
            .map_err(|err| AgentClientError::unreachable(agent, err))?;
        if response.status().is_success() {
            Ok(())
        } else {
            Err(AgentClientError::InvalidResponse {
                agent: agent.short_name().to_string(),
                detail: format!("heartbeat returned HTTP {}", response.status()),
            })
        }
    }
}
