use rand::distributions::{Distribution as _, WeightedIndex};
use rand::Rng;

use crate::booster_engine::error::DrawError;

/// Reject pools the sampler (or the explorer) cannot draw `k` items from.
pub fn check_draw(weights: impl IntoIterator<Item = u32>, k: usize) -> Result<usize, DrawError> {
    let mut available = 0usize;
    for (index, weight) in weights.into_iter().enumerate() {
        if weight == 0 {
            return Err(DrawError::NonPositiveWeight { index });
        }
        available += 1;
    }
    if k > available {
        return Err(DrawError::Oversized { requested: k, available });
    }
    Ok(available)
}

/// Draw `k` distinct items from `pool` without replacement.
///
/// Each step picks among the items not yet drawn with probability
/// proportional to their weight, then zeroes the drawn item's weight. The
/// pool is indexed in the order given, so a fixed seed and a fixed pool order
/// reproduce the same sequence. Equal weights get no secondary ordering; only
/// the random draw separates them.
pub fn sample<T: Clone, R: Rng + ?Sized>(
    pool: &[(T, u32)],
    k: usize,
    rng: &mut R,
) -> Result<Vec<T>, DrawError> {
    check_draw(pool.iter().map(|(_, w)| *w), k)?;
    if k == 0 {
        return Ok(Vec::new());
    }

    let mut weighted = WeightedIndex::new(pool.iter().map(|(_, w)| u64::from(*w)))?;
    let mut drawn = Vec::with_capacity(k);

    for step in 0..k {
        let index = weighted.sample(rng);
        drawn.push(pool[index].0.clone());
        // The last pick would leave nothing to weigh.
        if step + 1 < k {
            weighted.update_weights(&[(index, &0)])?;
        }
    }

    Ok(drawn)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use std::collections::HashSet;

    fn pool_of(weights: &[u32]) -> Vec<(usize, u32)> {
        weights.iter().copied().enumerate().collect()
    }

    #[test]
    fn oversized_draw_is_rejected() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let err = sample(&pool_of(&[1, 1, 1]), 5, &mut rng).unwrap_err();
        assert_eq!(err, DrawError::Oversized { requested: 5, available: 3 });
    }

    #[test]
    fn zero_weight_is_rejected_even_for_small_draws() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let err = sample(&pool_of(&[4, 0, 2]), 1, &mut rng).unwrap_err();
        assert_eq!(err, DrawError::NonPositiveWeight { index: 1 });
    }

    #[test]
    fn empty_draw_from_empty_pool_is_fine() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let out = sample::<usize, _>(&[], 0, &mut rng).unwrap();
        assert!(out.is_empty());
    }

    #[test]
    fn weight_fidelity_one_to_three() {
        // {A:1, B:3}, one card per trial, independent seeds.
        let pool = [("A", 1u32), ("B", 3u32)];
        let (mut a, mut b) = (0u32, 0u32);
        for seed in 0..20_000u64 {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            match sample(&pool, 1, &mut rng).unwrap()[0] {
                "A" => a += 1,
                _   => b += 1,
            }
        }
        let ratio = f64::from(b) / f64::from(a);
        assert!((ratio - 3.0).abs() < 0.3, "B:A ratio {ratio:.3} too far from 3 ({b}/{a})");
    }

    #[test]
    fn drawn_item_is_not_drawn_again() {
        // After the heavy item goes, the two light ones share the rest.
        let pool = pool_of(&[1, 1, 1_000]);
        for seed in 0..200u64 {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let mut out = sample(&pool, 3, &mut rng).unwrap();
            out.sort_unstable();
            assert_eq!(out, vec![0, 1, 2], "seed={seed}");
        }
    }

    #[test]
    fn weights_summing_past_u32_are_fine() {
        let pool = pool_of(&[u32::MAX, u32::MAX, 1]);
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        assert_eq!(sample(&pool, 2, &mut rng).unwrap().len(), 2);
    }

    #[test]
    fn heavy_item_is_usually_drawn_first() {
        let pool = pool_of(&[1, 1, 98]);
        let first_heavy = (0..1_000u64)
            .filter(|&seed| {
                let mut rng = ChaCha8Rng::seed_from_u64(seed);
                sample(&pool, 3, &mut rng).unwrap()[0] == 2
            })
            .count();
        assert!(first_heavy > 950, "heavy item led only {first_heavy}/1000 draws");
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 256,
            ..ProptestConfig::default()
        })]

        /// No item is ever returned twice.
        #[test]
        fn never_returns_duplicates(
            weights in prop::collection::vec(1u32..50, 1..40),
            k_seed in any::<usize>(),
            seed in any::<u64>(),
        ) {
            let pool = pool_of(&weights);
            let k = k_seed % (pool.len() + 1);
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let out = sample(&pool, k, &mut rng).unwrap();
            prop_assert_eq!(out.len(), k);
            let unique: HashSet<usize> = out.iter().copied().collect();
            prop_assert_eq!(unique.len(), k);
        }

        /// Drawing the whole pool yields a permutation of it.
        #[test]
        fn exhaustive_draw_returns_every_item_once(
            weights in prop::collection::vec(1u32..1_000, 1..30),
            seed in any::<u64>(),
        ) {
            let pool = pool_of(&weights);
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let mut out = sample(&pool, pool.len(), &mut rng).unwrap();
            out.sort_unstable();
            prop_assert_eq!(out, (0..pool.len()).collect::<Vec<_>>());
        }

        /// Same seed, same pool order, same output.
        #[test]
        fn seeded_draws_are_reproducible(
            weights in prop::collection::vec(1u32..20, 2..20),
            seed in any::<u64>(),
        ) {
            let pool = pool_of(&weights);
            let k = pool.len() / 2;
            let a = sample(&pool, k, &mut ChaCha8Rng::seed_from_u64(seed)).unwrap();
            let b = sample(&pool, k, &mut ChaCha8Rng::seed_from_u64(seed)).unwrap();
            prop_assert_eq!(a, b);
        }
    }
}
