//! # Domain Entities
//!
//! Core entities and query types for the raffle subsystem.

use super::errors::{BranchId, ClientId, EntryId, RaffleError};
use super::value_objects::EntryStatus;
use serde::{Deserialize, Serialize};

/// One raffle participation unit, tied to a receipt and a client.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RaffleEntry {
    /// Unique identifier, assigned by the repository at creation.
    pub id: EntryId,
    /// Owning client.
    pub client_id: ClientId,
    /// Branch the entry belongs to.
    pub branch_id: BranchId,
    /// Source receipt key. Many entries may share one receipt.
    pub receipt_key: String,
    /// Public short code. Assigned exactly once, inside the issuance
    /// transaction; `None` is never visible outside it.
    pub raffle_number: Option<String>,
    /// Lifecycle status.
    pub status: EntryStatus,
}

impl RaffleEntry {
    /// Transition to a new status, rejecting moves out of terminal states.
    pub fn transition_to(&mut self, next: EntryStatus) -> Result<(), RaffleError> {
        if !self.status.can_transition_to(next) {
            return Err(RaffleError::InvalidTransition {
                from: format!("{:?}", self.status),
                to: format!("{:?}", next),
            });
        }
        self.status = next;
        Ok(())
    }

    /// Apply a partial update. The raffle number is write-once.
    pub fn apply(&mut self, change: &EntryUpdate) -> Result<(), RaffleError> {
        if let Some(number) = &change.raffle_number {
            if self.raffle_number.is_some() {
                return Err(RaffleError::Storage(format!(
                    "raffle number already assigned for entry {}",
                    self.id
                )));
            }
            self.raffle_number = Some(number.clone());
        }
        if let Some(status) = change.status {
            self.transition_to(status)?;
        }
        Ok(())
    }
}

/// Fields for creating an entry. Status starts `Active` and the raffle
/// number is assigned by a follow-up update in the same transaction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewEntry {
    /// Owning client.
    pub client_id: ClientId,
    /// Branch the entry belongs to.
    pub branch_id: BranchId,
    /// Source receipt key.
    pub receipt_key: String,
}

/// Partial update over an entry. Unset fields are left untouched.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EntryUpdate {
    /// New status, if changing.
    pub status: Option<EntryStatus>,
    /// Raffle number, if assigning.
    pub raffle_number: Option<String>,
}

impl EntryUpdate {
    /// Update that sets the status.
    pub fn set_status(status: EntryStatus) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }

    /// Update that assigns the raffle number.
    pub fn set_raffle_number(number: impl Into<String>) -> Self {
        Self {
            raffle_number: Some(number.into()),
            ..Self::default()
        }
    }
}

/// Repository filter over entries. All fields are optional and conjunctive.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EntryQuery {
    /// Match a single entry.
    pub id: Option<EntryId>,
    /// Match a branch.
    pub branch_id: Option<BranchId>,
    /// Match an owning client.
    pub client_id: Option<ClientId>,
    /// Match a source receipt.
    pub receipt_key: Option<String>,
    /// Match a public code.
    pub raffle_number: Option<String>,
    /// Match a lifecycle status.
    pub status: Option<EntryStatus>,
}

impl EntryQuery {
    /// All entries issued against one receipt.
    pub fn by_receipt_key(receipt_key: impl Into<String>) -> Self {
        Self {
            receipt_key: Some(receipt_key.into()),
            ..Self::default()
        }
    }

    /// A single entry by id.
    pub fn by_id(id: EntryId) -> Self {
        Self {
            id: Some(id),
            ..Self::default()
        }
    }

    /// All `Active` entries of a branch: the draw/invalidation candidate set.
    pub fn active_in_branch(branch_id: BranchId) -> Self {
        Self {
            branch_id: Some(branch_id),
            status: Some(EntryStatus::Active),
            ..Self::default()
        }
    }

    /// Check an entry against every set field.
    pub fn matches(&self, entry: &RaffleEntry) -> bool {
        self.id.map_or(true, |id| entry.id == id)
            && self.branch_id.map_or(true, |b| entry.branch_id == b)
            && self.client_id.map_or(true, |c| entry.client_id == c)
            && self
                .receipt_key
                .as_ref()
                .map_or(true, |k| entry.receipt_key == *k)
            && self
                .raffle_number
                .as_ref()
                .map_or(true, |n| entry.raffle_number.as_deref() == Some(n.as_str()))
            && self.status.map_or(true, |s| entry.status == s)
    }
}

/// Caller-facing entry filter. `client_tax_id` is resolved through the
/// client directory before reaching the repository.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EntryLookup {
    /// Match a single entry.
    pub id: Option<EntryId>,
    /// Match a branch.
    pub branch_id: Option<BranchId>,
    /// Match an owning client.
    pub client_id: Option<ClientId>,
    /// Match a public code.
    pub raffle_number: Option<String>,
    /// Match entries owned by the client registered under this tax id.
    pub client_tax_id: Option<String>,
}

/// A registered client, keyed externally by tax id. Read-only here.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Client {
    /// Client identifier.
    pub id: ClientId,
    /// Tax id, digits only.
    pub tax_id: String,
}

/// A receipt row from the external tabular source. Read-only here.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Receipt {
    /// Issuing branch.
    pub branch_code: BranchId,
    /// Buyer tax id as stored upstream; may carry punctuation.
    pub tax_id: String,
    /// Unique receipt key.
    pub receipt_key: String,
    /// Receipt total, in cents.
    pub total_value_cents: u64,
}

impl Receipt {
    /// Strip every non-digit character from the tax id.
    pub fn normalized(mut self) -> Self {
        self.tax_id.retain(|c| c.is_ascii_digit());
        self
    }
}

/// Lookup criteria against the external receipt source.
///
/// The key alone is sufficient; number and series are only usable together.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ReceiptQuery {
    /// Unique receipt key.
    pub key: Option<String>,
    /// Receipt number. Requires `series`.
    pub number: Option<u32>,
    /// Receipt series. Requires `number`.
    pub series: Option<u32>,
}

impl ReceiptQuery {
    /// Lookup by receipt key.
    pub fn by_key(key: impl Into<String>) -> Self {
        Self {
            key: Some(key.into()),
            ..Self::default()
        }
    }

    /// Lookup by number and series.
    pub fn by_number_and_series(number: u32, series: u32) -> Self {
        Self {
            number: Some(number),
            series: Some(series),
            ..Self::default()
        }
    }

    /// Reject queries without enough identifying fields.
    pub fn validate(&self) -> Result<(), RaffleError> {
        if self.key.is_some() || (self.number.is_some() && self.series.is_some()) {
            Ok(())
        } else {
            Err(RaffleError::InsufficientCriteria)
        }
    }
}

/// A validated issuance request. Inputs arrive already parsed; this core
/// does not own request schemas.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IssueRequest {
    /// Source receipt key.
    pub receipt_key: String,
    /// Branch the receipt was issued by.
    pub branch_code: BranchId,
    /// Buyer tax id, digits only.
    pub tax_id: String,
    /// Receipt total, in cents.
    pub total_value_cents: u64,
}
