//! Entry Repository Adapter
//!
//! Memory-backed implementation of the `EntryRepository` port. Ids are
//! handed out by an atomic counter, bulk updates validate every transition
//! before applying any, and transactions stage their rows privately so
//! nothing becomes visible before commit.

use crate::domain::{
    EntryId, EntryQuery, EntryStatus, EntryUpdate, NewEntry, RaffleEntry, RaffleError,
};
use crate::ports::outbound::{EntryRepository, EntryTransaction};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;
use tracing::debug;

#[derive(Default)]
struct Store {
    rows: BTreeMap<EntryId, RaffleEntry>,
}

/// In-memory entry repository.
///
/// Clones share the same underlying store, so a test can keep a handle
/// while the service owns another.
#[derive(Clone, Default)]
pub struct InMemoryEntryRepository {
    store: Arc<Mutex<Store>>,
    next_id: Arc<AtomicI64>,
}

impl InMemoryEntryRepository {
    /// Create an empty repository. Ids start at 1.
    pub fn new() -> Self {
        Self {
            store: Arc::new(Mutex::new(Store::default())),
            next_id: Arc::new(AtomicI64::new(1)),
        }
    }

    /// Total number of stored entries, regardless of status.
    pub fn len(&self) -> usize {
        self.store.lock().rows.len()
    }

    /// True when nothing has been committed yet.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl EntryRepository for InMemoryEntryRepository {
    async fn find_many(&self, query: &EntryQuery) -> Result<Vec<RaffleEntry>, RaffleError> {
        let store = self.store.lock();
        Ok(store
            .rows
            .values()
            .filter(|entry| query.matches(entry))
            .cloned()
            .collect())
    }

    async fn count(&self, query: &EntryQuery) -> Result<u64, RaffleError> {
        let store = self.store.lock();
        Ok(store.rows.values().filter(|entry| query.matches(entry)).count() as u64)
    }

    async fn update_many(
        &self,
        query: &EntryQuery,
        change: EntryUpdate,
    ) -> Result<u64, RaffleError> {
        let mut store = self.store.lock();

        // Validate on clones first so the batch applies all-or-nothing.
        let mut staged = Vec::new();
        for entry in store.rows.values().filter(|entry| query.matches(entry)) {
            let mut updated = entry.clone();
            updated.apply(&change)?;
            staged.push(updated);
        }

        let affected = staged.len() as u64;
        for updated in staged {
            store.rows.insert(updated.id, updated);
        }
        Ok(affected)
    }

    async fn begin(&self) -> Result<Box<dyn EntryTransaction>, RaffleError> {
        Ok(Box::new(MemoryTransaction {
            store: Arc::clone(&self.store),
            next_id: Arc::clone(&self.next_id),
            staged: BTreeMap::new(),
        }))
    }
}

/// A staged write batch against the in-memory store.
///
/// Rows live only in `staged` until commit; a drop without commit (or an
/// explicit rollback) leaves the store untouched. Ids consumed by a rolled
/// back transaction are burned, keeping the sequence monotonic.
struct MemoryTransaction {
    store: Arc<Mutex<Store>>,
    next_id: Arc<AtomicI64>,
    staged: BTreeMap<EntryId, RaffleEntry>,
}

#[async_trait]
impl EntryTransaction for MemoryTransaction {
    async fn create(&mut self, entry: NewEntry) -> Result<RaffleEntry, RaffleError> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let created = RaffleEntry {
            id,
            client_id: entry.client_id,
            branch_id: entry.branch_id,
            receipt_key: entry.receipt_key,
            raffle_number: None,
            status: EntryStatus::Active,
        };
        self.staged.insert(id, created.clone());
        Ok(created)
    }

    async fn update(
        &mut self,
        id: EntryId,
        change: EntryUpdate,
    ) -> Result<RaffleEntry, RaffleError> {
        let entry = self.staged.get_mut(&id).ok_or_else(|| {
            RaffleError::Storage(format!("entry {id} is not part of this transaction"))
        })?;
        entry.apply(&change)?;
        Ok(entry.clone())
    }

    async fn commit(self: Box<Self>) -> Result<(), RaffleError> {
        let mut store = self.store.lock();
        let count = self.staged.len();
        for (id, entry) in self.staged {
            store.rows.insert(id, entry);
        }
        debug!("[raffle] committed {count} staged entries");
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> Result<(), RaffleError> {
        debug!("[raffle] rolled back {} staged entries", self.staged.len());
        Ok(())
    }
}
