//! Hashing of metacommunity state for reproducibility checks.
//!
//! Uses FNV-1a over the exact bit patterns of the state. Not
//! cryptographically secure; two runs from the same seed must produce
//! the same hash, and almost any divergence changes it.

use sylva_core::OdeSystem;

use crate::metacommunity::Metacommunity;

const FNV_OFFSET: u64 = 0xcbf29ce484222325;
const FNV_PRIME: u64 = 0x00000100000001B3;

#[inline]
fn fnv1a_u64(mut hash: u64, v: u64) -> u64 {
    for &b in &v.to_le_bytes() {
        hash = (hash ^ u64::from(b)).wrapping_mul(FNV_PRIME);
    }
    hash
}

/// Hash the global age, then per patch (in index order): the patch
/// index, its age, its per-species counts and its packed state vector.
pub fn state_hash(community: &Metacommunity) -> u64 {
    let mut hash = fnv1a_u64(FNV_OFFSET, community.age().to_bits());
    for (index, patch) in community.patches().iter().enumerate() {
        hash = fnv1a_u64(hash, index as u64);
        hash = fnv1a_u64(hash, patch.age().to_bits());
        for n in patch.n_individuals() {
            hash = fnv1a_u64(hash, u64::from(n));
        }
        for v in patch.ode_state() {
            hash = fnv1a_u64(hash, v.to_bits());
        }
    }
    hash
}
