//! In-process agent client for tests and single-host setups.

use crate::agent_registry::domain::Agent;
use crate::agent_registry::ports::{AgentClient, AgentClientError, AgentClientResult};
use crate::protocol::Message;
use crate::status::StatusCode;
use crate::vendor::domain::DbRequest;
use crate::vendor::ports::{VendorAdapter, VendorError};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, PoisonError, RwLock};

/// Routes agent calls straight to vendor adapters in the same process.
///
/// Imports only create the database and answer `Accepted`; no pipeline runs.
#[derive(Clone, Default)]
pub struct LoopbackAgentClient {
    adapters: Arc<RwLock<HashMap<String, Arc<dyn VendorAdapter>>>>,
    unreachable: Arc<RwLock<HashSet<String>>>,
    calls: Arc<RwLock<Vec<(String, DbRequest)>>>,
}

impl LoopbackAgentClient {
    /// Creates a client with no agents attached.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Attaches `adapter` as the agent named `short_name`.
    pub fn attach(&self, short_name: &str, adapter: Arc<dyn VendorAdapter>) {
        self.adapters
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(short_name.to_owned(), adapter);
    }

    /// Makes every call to `short_name` fail as unreachable, or not.
    pub fn set_unreachable(&self, short_name: &str, unreachable: bool) {
        let mut names = self
            .unreachable
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        if unreachable {
            names.insert(short_name.to_owned());
        } else {
            names.remove(short_name);
        }
    }

    /// Returns every `(operation, request)` pair received.
    #[must_use]
    pub fn calls(&self) -> Vec<(String, DbRequest)> {
        self.calls
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn adapter(&self, agent: &Agent) -> AgentClientResult<Arc<dyn VendorAdapter>> {
        let name = agent.short_name().as_str();
        let down = self
            .unreachable
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(name);
        let adapter = self
            .adapters
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
            .cloned();
        match adapter {
            Some(found) if !down => Ok(found),
            _ => Err(AgentClientError::unreachable(
                agent,
                std::io::Error::from(std::io::ErrorKind::ConnectionRefused),
            )),
        }
    }

    fn record(&self, operation: &str, request: &DbRequest) {
        self.calls
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push((operation.to_owned(), request.clone()));
    }
}

fn reply(result: Result<(), VendorError>, success: Message, failure: StatusCode) -> Message {
    match result {
        Ok(()) => success,
        Err(VendorError::AlreadyExists { object }) => {
            Message::new(StatusCode::ALREADY_EXISTS, format!("{object} already exists"))
        }
        Err(err) => Message::new(failure, err.to_string()),
    }
}

#[async_trait]
impl AgentClient for LoopbackAgentClient {
    async fn create_database(
        &self,
        agent: &Agent,
        request: &DbRequest,
    ) -> AgentClientResult<Message> {
        let adapter = self.adapter(agent)?;
        self.record("create", request);
        Ok(reply(
            adapter.create_database(request).await,
            Message::new(StatusCode::SUCCESS, "database created"),
            StatusCode::CREATE_DATABASE_FAILED,
        ))
    }

    async fn import_database(
        &self,
        agent: &Agent,
        request: &DbRequest,
    ) -> AgentClientResult<Message> {
        let adapter = self.adapter(agent)?;
        self.record("import", request);
        Ok(reply(
            adapter.create_database(request).await,
            Message::new(StatusCode::ACCEPTED, "import queued"),
            StatusCode::CREATE_DATABASE_FAILED,
        ))
    }

    async fn drop_database(&self, agent: &Agent, request: &DbRequest) -> AgentClientResult<Message> {
        let adapter = self.adapter(agent)?;
        self.record("drop", request);
        Ok(reply(
            adapter.drop_database(request).await,
            Message::new(StatusCode::SUCCESS, "database dropped"),
            StatusCode::DROP_DATABASE_FAILED,
        ))
    }

    async fn heartbeat(&self, agent: &Agent) -> AgentClientResult<()> {
        self.adapter(agent).map(|_| ())
    }
}
