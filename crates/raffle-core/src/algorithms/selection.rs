//! # Uniform Selection
//!
//! Unweighted random pick over a candidate set. Statistical uniformity is
//! all the draw requires; this is not a cryptographic sampler.

use rand::Rng;

/// Pick one element uniformly at random. `None` on an empty slice.
pub fn pick_uniform<T>(items: &[T]) -> Option<&T> {
    if items.is_empty() {
        return None;
    }
    let index = rand::thread_rng().gen_range(0..items.len());
    items.get(index)
}
