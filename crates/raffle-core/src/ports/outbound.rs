//! # Outbound Ports
//!
//! Traits for the external collaborators the raffle engines depend on:
//! the entry repository, the client directory, and the remote receipt
//! source. All are injected into the service at construction.

use crate::domain::{
    Client, EntryId, EntryQuery, EntryUpdate, NewEntry, RaffleEntry, RaffleError, Receipt,
    ReceiptQuery,
};
use async_trait::async_trait;

/// Persistent store of raffle entries - outbound port.
///
/// Filters are conjunctive over their set fields. Conditional updates are
/// expressed through the filter: an `update_many` whose filter pins
/// `status` applies only to rows still in that status at write time, which
/// is the compare-and-set the draw and invalidation engines rely on.
#[async_trait]
pub trait EntryRepository: Send + Sync {
    /// Fetch all entries matching the filter.
    async fn find_many(&self, query: &EntryQuery) -> Result<Vec<RaffleEntry>, RaffleError>;

    /// Count entries matching the filter.
    async fn count(&self, query: &EntryQuery) -> Result<u64, RaffleError>;

    /// Apply one change to every matching entry, atomically. Returns the
    /// number of entries affected.
    async fn update_many(
        &self,
        query: &EntryQuery,
        change: EntryUpdate,
    ) -> Result<u64, RaffleError>;

    /// Open a transaction for a multi-step write sequence.
    async fn begin(&self) -> Result<Box<dyn EntryTransaction>, RaffleError>;
}

/// An open repository transaction.
///
/// Writes staged here are invisible to concurrent readers until `commit`.
/// Dropping an uncommitted transaction discards its staged writes, so an
/// early return on error can never leak partial entries.
#[async_trait]
pub trait EntryTransaction: Send {
    /// Create an entry with a fresh unique id, `Active` status, and no
    /// raffle number yet.
    async fn create(&mut self, entry: NewEntry) -> Result<RaffleEntry, RaffleError>;

    /// Apply a change to one entry within the transaction.
    async fn update(&mut self, id: EntryId, change: EntryUpdate)
        -> Result<RaffleEntry, RaffleError>;

    /// Make every staged write visible at once.
    async fn commit(self: Box<Self>) -> Result<(), RaffleError>;

    /// Discard every staged write.
    async fn rollback(self: Box<Self>) -> Result<(), RaffleError>;
}

/// Client registry - outbound port. Read-only.
#[async_trait]
pub trait ClientDirectory: Send + Sync {
    /// Resolve a tax id to its registered clients. Empty if none.
    async fn find_by_tax_id(&self, tax_id: &str) -> Result<Vec<Client>, RaffleError>;
}

/// Remote receipt system - outbound port.
///
/// Sessions wrap the underlying connection; the connection is released when
/// the session is dropped, on every exit path.
#[async_trait]
pub trait ReceiptSource: Send + Sync {
    /// Acquire a session against the receipt system.
    async fn acquire(&self) -> Result<Box<dyn ReceiptSession>, RaffleError>;
}

/// An open session against the receipt system.
#[async_trait]
pub trait ReceiptSession: Send {
    /// Run the query, returning at most `max_rows` rows. Tax ids come back
    /// as stored upstream; normalization is the caller's job.
    async fn fetch(
        &mut self,
        query: &ReceiptQuery,
        max_rows: usize,
    ) -> Result<Vec<Receipt>, RaffleError>;
}
