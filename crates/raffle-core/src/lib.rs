//! # Raffle Core
//!
//! Receipt-driven raffle issuance, draw, and invalidation.
//!
//! **Architecture:** Hexagonal (DDD + Ports/Adapters)
//!
//! ## Purpose
//!
//! Converts a retail receipt's value into a deterministic number of raffle
//! entries, gives each a unique public code, and manages the per-branch
//! lifecycle of those entries:
//! - One entry per full value step of the receipt total
//! - SHA-256-derived 8-character public codes
//! - Uniform random draws and bulk invalidation, scoped to a branch
//!
//! ## Domain Invariants
//!
//! | Invariant | Enforcement Location |
//! |-----------|----------------------|
//! | Entries per receipt never exceed the value quota | `service.rs` - count check under the keyed issuance lock |
//! | Raffle numbers are unique and derived only from the entry id | `algorithms/raffle_code.rs` |
//! | At most one `Active -> Drawn` transition per draw | `service.rs` - status-conditioned update |
//! | Invalidation never touches `Drawn` entries | `domain/value_objects.rs` - `EntryStatus::can_transition_to` |
//! | Issuance is all-or-nothing | `ports/outbound.rs` - `EntryTransaction` contract |
//!
//! ## Entry Lifecycle
//!
//! ```text
//! [ACTIVE] ──draw──→ [DRAWN]        (single entry, uniform random)
//!     │
//!     └──invalidate──→ [INACTIVE]   (bulk, per branch)
//! ```
//!
//! Both terminal states are final: no transition leaves `DRAWN` or
//! `INACTIVE`.
//!
//! ## Module Structure
//!
//! ```text
//! raffle-core/
//! ├── domain/       # RaffleEntry, EntryStatus, queries, errors
//! ├── algorithms/   # Code derivation, quota, uniform selection
//! ├── ports/        # RaffleApi, EntryRepository, ClientDirectory, ReceiptSource
//! ├── adapters/     # Memory-backed reference implementations
//! └── service.rs    # RaffleService wiring the engines together
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod adapters;
pub mod algorithms;
pub mod domain;
pub mod ports;
pub mod service;

// Re-exports
pub use adapters::{
    InMemoryClientDirectory, InMemoryEntryRepository, ReceiptRow, TabularReceiptSource,
};
pub use algorithms::{entry_quota, generate_raffle_code, pick_uniform, RAFFLE_CODE_LEN};
pub use domain::{
    BranchId, Client, ClientId, EntryId, EntryLookup, EntryQuery, EntryStatus, EntryUpdate,
    IssueRequest, NewEntry, RaffleConfig, RaffleEntry, RaffleError, Receipt, ReceiptQuery,
};
pub use ports::{
    ClientDirectory, EntryRepository, EntryTransaction, RaffleApi, ReceiptSession, ReceiptSource,
};
pub use service::RaffleService;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
