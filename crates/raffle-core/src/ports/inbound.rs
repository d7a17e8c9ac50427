//! # Inbound Ports
//!
//! API trait defining what the raffle subsystem can do. Inputs arrive
//! already parsed and validated; transport concerns live outside this core.

use crate::domain::{
    BranchId, EntryLookup, IssueRequest, RaffleEntry, RaffleError, Receipt, ReceiptQuery,
};
use async_trait::async_trait;

/// Raffle API - inbound port.
#[async_trait]
pub trait RaffleApi: Send + Sync {
    /// Issue raffle entries for a receipt: one entry per full value step,
    /// each with a unique public code, all created in one transaction.
    async fn issue(&self, request: IssueRequest) -> Result<Vec<RaffleEntry>, RaffleError>;

    /// Draw one winner uniformly at random among the branch's active
    /// entries and mark it `Drawn`.
    async fn draw(&self, branch_id: BranchId) -> Result<RaffleEntry, RaffleError>;

    /// Expire every active entry of the branch. Returns how many were
    /// transitioned.
    async fn invalidate(&self, branch_id: BranchId) -> Result<u64, RaffleError>;

    /// Fetch entries by caller-facing filter, including lookup by the
    /// owning client's tax id.
    async fn find_entries(&self, lookup: EntryLookup) -> Result<Vec<RaffleEntry>, RaffleError>;

    /// Query the external receipt system by key, or by number and series.
    /// Returned tax ids are normalized to digits only.
    async fn lookup_receipt(&self, query: ReceiptQuery) -> Result<Vec<Receipt>, RaffleError>;
}
