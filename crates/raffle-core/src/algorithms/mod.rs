//! # Algorithms Module
//!
//! Pure functions backing the raffle engines: code derivation, quota
//! computation, and uniform winner selection.

pub mod quota;
pub mod raffle_code;
pub mod selection;

pub use quota::entry_quota;
pub use raffle_code::{generate_raffle_code, RAFFLE_CODE_LEN};
pub use selection::pick_uniform;
