//! Process-local agent registry.

use crate::agent_registry::domain::{Agent, ShortName};
use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

/// Concurrent map of live agents keyed by short name.
#[derive(Debug, Default)]
pub struct AgentRegistry {
    agents: RwLock<HashMap<ShortName, Agent>>,
}

impl AgentRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces the agent under its short name, returning the
    /// previous entry.
    pub fn upsert(&self, agent: Agent) -> Option<Agent> {
        self.agents
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(agent.short_name().clone(), agent)
    }

    /// Admits a registration under one write guard. A name seen before keeps
    /// its identifier and token; a new name takes the identifier from
    /// `next_id`. Returns the stored agent and whether the name was new.
    pub fn admit(&self, mut agent: Agent, next_id: impl FnOnce() -> u64) -> (Agent, bool) {
        let mut agents = self.agents.write().unwrap_or_else(PoisonError::into_inner);
        let first = match agents.get(agent.short_name()) {
            Some(earlier) => {
                agent.keep_identity(earlier);
                false
            }
            None => {
                agent.assign_id(next_id());
                true
            }
        };
        agents.insert(agent.short_name().clone(), agent.clone());
        (agent, first)
    }

    /// Looks up an agent by short name.
    #[must_use]
    pub fn get(&self, short_name: &str) -> Option<Agent> {
        let key = ShortName::new(short_name).ok()?;
        self.agents
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&key)
            .cloned()
    }

    /// Looks up an agent that is currently up.
    #[must_use]
    pub fn get_live(&self, short_name: &str) -> Option<Agent> {
        self.get(short_name).filter(Agent::is_up)
    }

    /// Returns `true` when an agent is registered under `short_name`.
    #[must_use]
    pub fn exists(&self, short_name: &str) -> bool {
        ShortName::new(short_name).is_ok_and(|key| {
            self.agents
                .read()
                .unwrap_or_else(PoisonError::into_inner)
                .contains_key(&key)
        })
    }

    /// Removes an agent, returning it if it was registered.
    pub fn remove(&self, short_name: &str) -> Option<Agent> {
        let key = ShortName::new(short_name).ok()?;
        self.agents
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&key)
    }

    /// Sets the liveness flag of an agent; returns `false` when unknown.
    pub fn set_up(&self, short_name: &ShortName, up: bool) -> bool {
        self.agents
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .get_mut(short_name)
            .is_some_and(|agent| {
                agent.set_up(up);
                true
            })
    }

    /// Returns every agent ordered by short name.
    #[must_use]
    pub fn list(&self) -> Vec<Agent> {
        let mut agents: Vec<Agent> = self
            .agents
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .cloned()
            .collect();
        agents.sort_by(|a, b| a.short_name().cmp(b.short_name()));
        agents
    }

    /// Returns the number of registered agents.
    #[must_use]
    pub fn len(&self) -> usize {
        self.agents
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Returns `true` when no agent is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
