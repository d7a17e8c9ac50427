//! # Entry Quota
//!
//! Converts a receipt total into the number of entries it is entitled to.

/// Number of entries a receipt buys: floor of the total over the per-entry
/// step. A zero step yields zero entries rather than panicking.
pub fn entry_quota(total_value_cents: u64, entry_value_cents: u64) -> u64 {
    total_value_cents
        .checked_div(entry_value_cents)
        .unwrap_or(0)
}
