//! # Raffle Service
//!
//! The main service implementing the Raffle API.
//!
//! ## Architecture
//!
//! This service:
//! 1. Implements `RaffleApi` for issuance, draw, invalidation, and lookups
//! 2. Enforces the quota, uniqueness, and single-transition invariants
//! 3. Uses dependency injection for all external dependencies
//!
//! Same-receipt issuance is serialized through a sharded keyed lock so the
//! count-check/creation pair can never interleave for one receipt key.
//! Status changes race through conditional updates: an update filtered on
//! `Active` either wins the transition or affects nothing.

use crate::algorithms::{entry_quota, generate_raffle_code, pick_uniform};
use crate::domain::{
    BranchId, ClientId, EntryLookup, EntryQuery, EntryStatus, EntryUpdate, IssueRequest, NewEntry,
    RaffleConfig, RaffleEntry, RaffleError, Receipt, ReceiptQuery,
};
use crate::ports::inbound::RaffleApi;
use crate::ports::outbound::{ClientDirectory, EntryRepository, EntryTransaction, ReceiptSource};
use async_trait::async_trait;
use std::hash::{Hash, Hasher};
use tokio::sync::Mutex;
use tracing::{debug, info};

/// The Raffle Service.
///
/// Implements [`RaffleApi`] over an entry repository, a client directory,
/// and a receipt source.
pub struct RaffleService<R, C, S>
where
    R: EntryRepository,
    C: ClientDirectory,
    S: ReceiptSource,
{
    /// Entry persistence.
    entries: R,
    /// Client registry.
    clients: C,
    /// External receipt system.
    receipts: S,
    /// Service configuration.
    config: RaffleConfig,
    /// Sharded per-receipt-key issuance locks. A colliding key pair only
    /// over-serializes; correctness never depends on shard count.
    issuance_locks: Vec<Mutex<()>>,
}

impl<R, C, S> RaffleService<R, C, S>
where
    R: EntryRepository,
    C: ClientDirectory,
    S: ReceiptSource,
{
    /// Create a new Raffle Service with the given dependencies.
    pub fn new(entries: R, clients: C, receipts: S, config: RaffleConfig) -> Self {
        let shards = config.issuance_lock_shards.max(1);
        Self {
            entries,
            clients,
            receipts,
            config,
            issuance_locks: (0..shards).map(|_| Mutex::new(())).collect(),
        }
    }

    fn issuance_lock(&self, receipt_key: &str) -> &Mutex<()> {
        let mut hasher = std::collections::hash_map::DefaultHasher::new();
        receipt_key.hash(&mut hasher);
        let shard = (hasher.finish() as usize) % self.issuance_locks.len();
        &self.issuance_locks[shard]
    }

    /// Create `quota` entries and assign each its raffle number, all inside
    /// the caller's transaction.
    async fn create_entries(
        tx: &mut dyn EntryTransaction,
        request: &IssueRequest,
        client_id: ClientId,
        quota: u64,
    ) -> Result<Vec<RaffleEntry>, RaffleError> {
        let mut issued = Vec::with_capacity(quota as usize);
        for _ in 0..quota {
            let created = tx
                .create(NewEntry {
                    client_id,
                    branch_id: request.branch_code,
                    receipt_key: request.receipt_key.clone(),
                })
                .await?;
            let code = generate_raffle_code(created.id);
            let finalized = tx
                .update(created.id, EntryUpdate::set_raffle_number(code))
                .await?;
            issued.push(finalized);
        }
        Ok(issued)
    }
}

#[async_trait]
impl<R, C, S> RaffleApi for RaffleService<R, C, S>
where
    R: EntryRepository,
    C: ClientDirectory,
    S: ReceiptSource,
{
    async fn issue(&self, request: IssueRequest) -> Result<Vec<RaffleEntry>, RaffleError> {
        debug!(
            "[raffle] issuance requested for receipt {} at branch {}",
            request.receipt_key, request.branch_code
        );

        let quota = entry_quota(request.total_value_cents, self.config.entry_value_cents);
        if quota == 0 {
            return Err(RaffleError::BelowMinimumValue {
                total_value_cents: request.total_value_cents,
                minimum_cents: self.config.entry_value_cents,
            });
        }

        // Serializes the count-check/creation pair for this receipt key.
        let _guard = self.issuance_lock(&request.receipt_key).lock().await;

        let existing = self
            .entries
            .count(&EntryQuery::by_receipt_key(&request.receipt_key))
            .await?;
        if existing >= quota {
            return Err(RaffleError::AlreadyIssued {
                receipt_key: request.receipt_key,
            });
        }

        let clients = self.clients.find_by_tax_id(&request.tax_id).await?;
        let client = clients
            .into_iter()
            .next()
            .ok_or_else(|| RaffleError::ClientNotFound {
                tax_id: request.tax_id.clone(),
            })?;

        let mut tx = self.entries.begin().await?;
        match Self::create_entries(tx.as_mut(), &request, client.id, quota).await {
            Ok(issued) => {
                tx.commit().await?;
                info!(
                    "[raffle] issued {} entries for receipt {} at branch {}",
                    issued.len(),
                    request.receipt_key,
                    request.branch_code
                );
                Ok(issued)
            }
            Err(err) => {
                tx.rollback().await?;
                Err(err)
            }
        }
    }

    async fn draw(&self, branch_id: BranchId) -> Result<RaffleEntry, RaffleError> {
        debug!("[raffle] draw requested for branch {branch_id}");

        loop {
            let active = self
                .entries
                .find_many(&EntryQuery::active_in_branch(branch_id))
                .await?;
            let Some(candidate_id) = pick_uniform(&active).map(|entry| entry.id) else {
                return Err(RaffleError::NoActiveEntries { branch_id });
            };

            // Conditional on the entry still being Active at write time; a
            // concurrent draw or invalidation that got there first leaves
            // this update with nothing to do.
            let cas = EntryQuery {
                id: Some(candidate_id),
                status: Some(EntryStatus::Active),
                ..EntryQuery::default()
            };
            let affected = self
                .entries
                .update_many(&cas, EntryUpdate::set_status(EntryStatus::Drawn))
                .await?;

            if affected == 1 {
                let winner = self
                    .entries
                    .find_many(&EntryQuery::by_id(candidate_id))
                    .await?
                    .into_iter()
                    .next()
                    .ok_or_else(|| {
                        RaffleError::Storage(format!("drawn entry {candidate_id} disappeared"))
                    })?;
                info!(
                    "[raffle] entry {} ({:?}) drawn for branch {}",
                    winner.id, winner.raffle_number, branch_id
                );
                return Ok(winner);
            }

            debug!("[raffle] lost the draw race for entry {candidate_id}, re-reading");
        }
    }

    async fn invalidate(&self, branch_id: BranchId) -> Result<u64, RaffleError> {
        debug!("[raffle] invalidation requested for branch {branch_id}");

        let affected = self
            .entries
            .update_many(
                &EntryQuery::active_in_branch(branch_id),
                EntryUpdate::set_status(EntryStatus::Inactive),
            )
            .await?;

        if affected == 0 {
            return Err(RaffleError::NoActiveEntries { branch_id });
        }
        info!("[raffle] invalidated {affected} entries in branch {branch_id}");
        Ok(affected)
    }

    async fn find_entries(&self, lookup: EntryLookup) -> Result<Vec<RaffleEntry>, RaffleError> {
        let mut query = EntryQuery {
            id: lookup.id,
            branch_id: lookup.branch_id,
            client_id: lookup.client_id,
            raffle_number: lookup.raffle_number,
            ..EntryQuery::default()
        };

        if let Some(tax_id) = lookup.client_tax_id {
            let clients = self.clients.find_by_tax_id(&tax_id).await?;
            match clients.into_iter().next() {
                Some(client) => {
                    // Conjunctive with an explicit client_id filter.
                    if query.client_id.is_some_and(|id| id != client.id) {
                        return Ok(Vec::new());
                    }
                    query.client_id = Some(client.id);
                }
                None => return Ok(Vec::new()),
            }
        }

        self.entries.find_many(&query).await
    }

    async fn lookup_receipt(&self, query: ReceiptQuery) -> Result<Vec<Receipt>, RaffleError> {
        query.validate()?;

        let mut session = self.receipts.acquire().await?;
        let rows = session
            .fetch(&query, self.config.max_receipt_rows)
            .await?;
        // The session drops here (and on the `?` above), returning its
        // connection on every path.

        debug!("[raffle] receipt lookup returned {} rows", rows.len());
        Ok(rows.into_iter().map(Receipt::normalized).collect())
    }
}
