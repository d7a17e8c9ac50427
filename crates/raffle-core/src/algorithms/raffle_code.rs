//! # Raffle Code Derivation
//!
//! Derives the public short code of an entry from its repository id.

use crate::domain::EntryId;
use sha2::{Digest, Sha256};

/// Length of the public code, in hex characters.
pub const RAFFLE_CODE_LEN: usize = 8;

/// Derive the public raffle code for an entry id.
///
/// SHA-256 over the decimal string of `id`, truncated to the first
/// [`RAFFLE_CODE_LEN`] hex characters, uppercased. Deterministic: the same
/// id always yields the same code. Ids are sequential and
/// repository-controlled, so truncation collisions are not a practical
/// concern for the id ranges in play.
pub fn generate_raffle_code(id: EntryId) -> String {
    let digest = Sha256::digest(id.to_string().as_bytes());
    hex::encode(&digest[..RAFFLE_CODE_LEN / 2]).to_uppercase()
}
