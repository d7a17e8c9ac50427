//! # Domain Value Objects
//!
//! Immutable value types for the raffle subsystem.

use serde::{Deserialize, Serialize};

/// Raffle entry state machine.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntryStatus {
    /// Eligible for draws and invalidation sweeps.
    #[default]
    Active,
    /// Selected as a winner. Terminal.
    Drawn,
    /// Expired by a branch invalidation. Terminal.
    Inactive,
}

impl EntryStatus {
    /// Check if transition is valid.
    pub fn can_transition_to(&self, next: EntryStatus) -> bool {
        match (self, next) {
            (Self::Active, Self::Drawn) => true,
            (Self::Active, Self::Inactive) => true,
            _ => false,
        }
    }

    /// Check if terminal state.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Drawn | Self::Inactive)
    }
}

/// Raffle configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RaffleConfig {
    /// Receipt value (in cents) buying one entry. Quota is the floor
    /// division of the receipt total by this step.
    pub entry_value_cents: u64,
    /// Result-size cap on external receipt lookups.
    pub max_receipt_rows: usize,
    /// Shard count of the per-receipt-key issuance lock.
    pub issuance_lock_shards: usize,
}

impl Default for RaffleConfig {
    fn default() -> Self {
        Self {
            entry_value_cents: 5_000, // R$ 50.00 per entry
            max_receipt_rows: 250,
            issuance_lock_shards: 64,
        }
    }
}
