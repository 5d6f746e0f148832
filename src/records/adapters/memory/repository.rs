//! In-memory repository for provisioning records.

use crate::records::{
    domain::{ProvisioningRecord, RecordId, Visibility},
    ports::{RecordRepository, RecordStoreError, RecordStoreResult},
};
use crate::status::StatusCode;
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::{Arc, PoisonError, RwLock};

/// Thread-safe in-memory record repository.
///
/// IDs are assigned from a counter starting at 1. The store can be switched
/// off with [`InMemoryRecordRepository::set_available`] to exercise the
/// liveness gate.
#[derive(Debug, Clone)]
pub struct InMemoryRecordRepository {
    state: Arc<RwLock<InMemoryRecordState>>,
}

#[derive(Debug)]
struct InMemoryRecordState {
    records: BTreeMap<RecordId, ProvisioningRecord>,
    next_id: u64,
    available: bool,
}

impl Default for InMemoryRecordRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryRecordRepository {
    /// Creates an empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: Arc::new(RwLock::new(InMemoryRecordState {
                records: BTreeMap::new(),
                next_id: 1,
                available: true,
            })),
        }
    }

    /// Marks the store reachable or unreachable.
    pub fn set_available(&self, available: bool) {
        self.state
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .available = available;
    }

    fn read<T>(&self, f: impl FnOnce(&InMemoryRecordState) -> T) -> RecordStoreResult<T> {
        let state = self.state.read().map_err(|err| {
            RecordStoreError::persistence(std::io::Error::other(err.to_string()))
        })?;
        ensure_available(&state)?;
        Ok(f(&state))
    }

    fn write<T>(
        &self,
        f: impl FnOnce(&mut InMemoryRecordState) -> RecordStoreResult<T>,
    ) -> RecordStoreResult<T> {
        let mut state = self.state.write().map_err(|err| {
            RecordStoreError::persistence(std::io::Error::other(err.to_string()))
        })?;
        ensure_available(&state)?;
        f(&mut state)
    }

    fn collect(
        &self,
        keep: impl Fn(&ProvisioningRecord) -> bool,
    ) -> RecordStoreResult<Vec<ProvisioningRecord>> {
        self.read(|state| {
            state
                .records
                .values()
                .rev()
                .filter(|record| keep(record))
                .cloned()
                .collect()
        })
    }
}

impl InMemoryRecordState {
    fn insert(&mut self, record: &ProvisioningRecord) -> RecordId {
        let id = RecordId::new(self.next_id);
        self.next_id += 1;
        self.records.insert(id, record.clone().with_id(id));
        id
    }
}

fn ensure_available(state: &InMemoryRecordState) -> RecordStoreResult<()> {
    if state.available {
        Ok(())
    } else {
        Err(RecordStoreError::unavailable(std::io::Error::new(
            std::io::ErrorKind::NotConnected,
            "in-memory record store switched off",
        )))
    }
}

#[async_trait]
impl RecordRepository for InMemoryRecordRepository {
    async fn alive(&self) -> RecordStoreResult<()> {
        self.read(|_| ())
    }

    async fn fetch_by_id(&self, id: RecordId) -> RecordStoreResult<Option<ProvisioningRecord>> {
        self.read(|state| state.records.get(&id).cloned())
    }

    async fn fetch_by_creator(&self, creator: &str) -> RecordStoreResult<Vec<ProvisioningRecord>> {
        self.collect(|record| {
            record.creator() == creator && record.visibility() == Visibility::Private
        })
    }

    async fn fetch_public(&self) -> RecordStoreResult<Vec<ProvisioningRecord>> {
        self.collect(|record| record.visibility() == Visibility::Public)
    }

    async fn fetch_all(&self) -> RecordStoreResult<Vec<ProvisioningRecord>> {
        self.collect(|_| true)
    }

    async fn fetch_by_agent(&self, agent: &str) -> RecordStoreResult<Vec<ProvisioningRecord>> {
        self.collect(|record| record.agent_name() == agent)
    }

    async fn fetch_by_agent_and_name(
        &self,
        agent: &str,
        database_name: &str,
    ) -> RecordStoreResult<Option<ProvisioningRecord>> {
        self.read(|state| {
            state
                .records
                .values()
                .rev()
                .find(|record| {
                    record.agent_name() == agent && record.database_name() == database_name
                })
                .cloned()
        })
    }

    async fn insert(&self, record: &ProvisioningRecord) -> RecordStoreResult<RecordId> {
        self.write(|state| Ok(state.insert(record)))
    }

    async fn update(&self, record: &ProvisioningRecord) -> RecordStoreResult<RecordId> {
        self.write(|state| match record.id() {
            Some(id) if state.records.contains_key(&id) => {
                state.records.insert(id, record.clone());
                Ok(id)
            }
            _ => Ok(state.insert(record)),
        })
    }

    async fn update_status(
        &self,
        id: RecordId,
        status: StatusCode,
        message: Option<&str>,
    ) -> RecordStoreResult<()> {
        self.write(|state| {
            let record = state
                .records
                .get_mut(&id)
                .ok_or(RecordStoreError::NotFound(id))?;
            match message {
                Some(text) => record.set_status(status, text),
                None => record.set_status_code(status),
            }
            Ok(())
        })
    }

    async fn delete(&self, id: RecordId) -> RecordStoreResult<()> {
        self.write(|state| {
            state
                .records
                .remove(&id)
                .map(|_| ())
                .ok_or(RecordStoreError::NotFound(id))
        })
    }
}
