//! Seed redistribution across patches.
//!
//! Every seed lands in one of `n` patches chosen uniformly and
//! independently. The per-patch counts are therefore multinomial, which
//! is sampled exactly as a chain of binomials: patch `k` of the `j`
//! patches not yet visited receives `Binomial(remaining, 1/j)` seeds.
//! The last patch has `p = 1` and takes whatever remains, so no seed is
//! ever created or lost.

use rand::Rng;
use rand_distr::{Binomial, Distribution};

/// Draw from `Binomial(n, p)`, treating `p <= 0` (or NaN) as 0 and
/// `p >= 1` as 1 without consuming randomness.
pub fn binomial<R: Rng + ?Sized>(n: u64, p: f64, rng: &mut R) -> u64 {
    if n == 0 || p.is_nan() || p <= 0.0 {
        return 0;
    }
    if p >= 1.0 {
        return n;
    }
    let dist = Binomial::new(n, p).expect("p checked to lie in (0, 1)");
    dist.sample(rng)
}

/// Allocate per-species seed totals across `n_patches` patches.
///
/// Returns one per-species count vector per patch, in patch order.
/// For every species the counts sum to `seeds[species]` exactly.
///
/// # Panics
///
/// Panics if `n_patches` is zero.
pub fn allocate_seeds<R: Rng + ?Sized>(seeds: &[u64], n_patches: usize, rng: &mut R) -> Vec<Vec<u64>> {
    assert!(n_patches > 0, "cannot allocate seeds to zero patches");
    let mut remaining = seeds.to_vec();
    let mut allocation = Vec::with_capacity(n_patches);
    for k in 0..n_patches {
        let j = n_patches - k;
        let p = 1.0 / j as f64;
        let mut here = Vec::with_capacity(remaining.len());
        for left in remaining.iter_mut() {
            let drawn = binomial(*left, p, rng);
            *left -= drawn;
            here.push(drawn);
        }
        allocation.push(here);
    }
    debug_assert!(remaining.iter().all(|&r| r == 0));
    allocation
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn single_patch_takes_everything() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        assert_eq!(allocate_seeds(&[10, 0, 4], 1, &mut rng), vec![vec![10, 0, 4]]);
    }

    #[test]
    fn no_seeds_allocates_zeros() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let alloc = allocate_seeds(&[0, 0], 4, &mut rng);
        assert_eq!(alloc, vec![vec![0, 0]; 4]);
    }

    #[test]
    fn binomial_edge_probabilities() {
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        assert_eq!(binomial(10, 0.0, &mut rng), 0);
        assert_eq!(binomial(10, f64::NAN, &mut rng), 0);
        assert_eq!(binomial(10, 1.0, &mut rng), 10);
        assert_eq!(binomial(0, 0.5, &mut rng), 0);
        assert!(binomial(10, 0.5, &mut rng) <= 10);
    }

    #[test]
    fn same_seed_same_split() {
        let a = allocate_seeds(&[1000, 37], 5, &mut ChaCha8Rng::seed_from_u64(11));
        let b = allocate_seeds(&[1000, 37], 5, &mut ChaCha8Rng::seed_from_u64(11));
        assert_eq!(a, b);
    }

    #[test]
    fn allocation_is_roughly_uniform() {
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let alloc = allocate_seeds(&[100_000], 4, &mut rng);
        for patch in &alloc {
            assert!((patch[0] as f64 - 25_000.0).abs() < 1_000.0, "{alloc:?}");
        }
    }

    #[test]
    fn totals_beyond_u32_are_conserved() {
        let total = u64::from(u32::MAX) * 3;
        let alloc = allocate_seeds(&[total], 3, &mut ChaCha8Rng::seed_from_u64(2));
        assert_eq!(alloc.iter().map(|patch| patch[0]).sum::<u64>(), total);
    }

    proptest! {
        #[test]
        fn allocation_conserves_every_species(
            seeds in prop::collection::vec(0u64..5_000, 0..6),
            n_patches in 1usize..12,
            rng_seed in any::<u64>(),
        ) {
            let mut rng = ChaCha8Rng::seed_from_u64(rng_seed);
            let alloc = allocate_seeds(&seeds, n_patches, &mut rng);
            prop_assert_eq!(alloc.len(), n_patches);
            for (species, &total) in seeds.iter().enumerate() {
                let sum: u64 = alloc.iter().map(|patch| patch[species]).sum();
                prop_assert_eq!(sum, total);
            }
        }
    }
}
