//! Periodic agent liveness sweep.

use super::AgentRegistry;
use crate::agent_registry::domain::ShortName;
use crate::agent_registry::ports::AgentClient;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::JoinSet;
use tracing::{info, warn};

/// Outcome of one liveness sweep.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LivenessReport {
    /// Agents that answered.
    pub up: Vec<ShortName>,
    /// Agents that failed the probe and were marked down.
    pub down: Vec<ShortName>,
    /// Agents removed after too many consecutive failures.
    pub evicted: Vec<ShortName>,
}

/// Probes every registered agent and evicts the persistently unreachable.
pub struct LivenessMonitor {
    registry: Arc<AgentRegistry>,
    client: Arc<dyn AgentClient>,
    eviction_threshold: u32,
    failures: Mutex<HashMap<ShortName, u32>>,
}

impl LivenessMonitor {
    /// Creates a monitor that evicts after `eviction_threshold` consecutive
    /// failed probes.
    #[must_use]
    pub fn new(
        registry: Arc<AgentRegistry>,
        client: Arc<dyn AgentClient>,
        eviction_threshold: u32,
    ) -> Self {
        Self {
            registry,
            client,
            eviction_threshold: eviction_threshold.max(1),
            failures: Mutex::new(HashMap::new()),
        }
    }

    /// Probes every agent once. Heartbeats run concurrently and no lock is
    /// held while they are in flight.
    pub async fn sweep(&self) -> LivenessReport {
        let mut probes = JoinSet::new();
        for agent in self.registry.list() {
            let client = Arc::clone(&self.client);
            probes.spawn(async move {
                let outcome = client.heartbeat(&agent).await;
                (agent, outcome)
            });
        }

        let mut outcomes = Vec::with_capacity(probes.len());
        while let Some(joined) = probes.join_next().await {
            match joined {
                Ok(outcome) => outcomes.push(outcome),
                Err(err) => warn!(error = %err, "heartbeat task failed"),
            }
        }
        outcomes.sort_by(|(a, _), (b, _)| a.short_name().cmp(b.short_name()));

        let mut report = LivenessReport::default();
        let mut failures = self.failures.lock().await;
        for (agent, outcome) in outcomes {
            let name = agent.short_name().clone();
            match outcome {
                Ok(()) => {
                    failures.remove(&name);
                    if !agent.is_up() {
                        info!(agent = %name, "agent is reachable again");
                    }
                    self.registry.set_up(&name, true);
                    report.up.push(name);
                }
                Err(err) => {
                    let count = failures.entry(name.clone()).or_insert(0);
                    *count += 1;
                    if *count >= self.eviction_threshold {
                        warn!(agent = %name, failures = *count, error = %err, "evicting unreachable agent");
                        failures.remove(&name);
                        self.registry.remove(name.as_str());
                        report.evicted.push(name);
                    } else {
                        warn!(agent = %name, failures = *count, error = %err, "agent missed a heartbeat");
                        self.registry.set_up(&name, false);
                        report.down.push(name);
                    }
                }
            }
        }

        failures.retain(|name, _| self.registry.get(name.as_str()).is_some());
        report
    }

    /// Sweeps every `interval` until the task is cancelled.
    pub async fn run(self: Arc<Self>, interval: Duration) {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            self.sweep().await;
        }
    }
}
