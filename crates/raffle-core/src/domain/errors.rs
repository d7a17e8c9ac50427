//! # Domain Errors
//!
//! Error types for the raffle subsystem. Every message is written to be
//! shown to an end user as-is.

use thiserror::Error;

/// Repository-assigned entry identifier.
pub type EntryId = i64;

/// Client identifier.
pub type ClientId = i64;

/// Branch (store/location) identifier.
pub type BranchId = i32;

/// Raffle error types.
#[derive(Debug, Error)]
pub enum RaffleError {
    /// Receipt total is too small for even one entry.
    #[error("Receipt total of {total_value_cents} cents is below the {minimum_cents}-cent minimum for a raffle entry")]
    BelowMinimumValue {
        /// Receipt total, in cents.
        total_value_cents: u64,
        /// Value of one entry, in cents.
        minimum_cents: u64,
    },

    /// Entry quota for this receipt is already met.
    #[error("Raffle entries have already been issued for receipt {receipt_key}")]
    AlreadyIssued {
        /// The receipt key that was re-submitted.
        receipt_key: String,
    },

    /// No client registered under the tax id.
    #[error("No client registered for tax id {tax_id}")]
    ClientNotFound {
        /// The tax id that was looked up.
        tax_id: String,
    },

    /// Draw or invalidation attempted with nothing eligible.
    #[error("No active raffle entries for branch {branch_id}")]
    NoActiveEntries {
        /// The branch that was targeted.
        branch_id: BranchId,
    },

    /// Receipt lookup called without enough identifying fields.
    #[error("Receipt lookup requires the receipt key, or both the receipt number and the series")]
    InsufficientCriteria,

    /// The external receipt source failed or was unreachable.
    #[error("Receipt lookup failed: {0}")]
    LookupFailure(String),

    /// Entry status transition rejected by the state machine.
    #[error("Invalid entry transition: {from} -> {to}")]
    InvalidTransition {
        /// Current status.
        from: String,
        /// Attempted status.
        to: String,
    },

    /// Repository error.
    #[error("Storage error: {0}")]
    Storage(String),
}
