use rand::Rng;
use tracing::debug;

use crate::booster_engine::{
    error::{EngineError, Result},
    models::{Product, Variant},
    sampler::sample,
};

/// Pick one variant of `product`, weighted by `variant.weight`.
///
/// A product without variants is an import defect and surfaces as
/// [`EngineError::NoVariants`].
pub fn select_variant<'p, R: Rng + ?Sized>(product: &'p Product, rng: &mut R) -> Result<&'p Variant> {
    let pool: Vec<(&Variant, u32)> = product.variants.iter().map(|v| (v, v.weight)).collect();
    if pool.is_empty() {
        return Err(EngineError::NoVariants { product: product.id.clone() });
    }

    let picked = sample(&pool, 1, rng).map_err(|source| EngineError::InvalidDraw {
        context: format!("variants of '{}'", product.id),
        source,
    })?;

    let variant = picked
        .into_iter()
        .next()
        .ok_or_else(|| EngineError::NoVariants { product: product.id.clone() })?;
    debug!(product = %product.id, variant = variant.index, weight = variant.weight, "variant selected");
    Ok(variant)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::booster_engine::{
        error::DrawError,
        models::{ProductId, SlotSpec},
    };
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn product(weights: &[u32]) -> Product {
        Product {
            id: ProductId::new("tst", "play"),
            variants: weights
                .iter()
                .enumerate()
                .map(|(index, &weight)| Variant { index, weight, slots: vec![SlotSpec::new("common", 1)] })
                .collect(),
        }
    }

    #[test]
    fn no_variants_is_an_error() {
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let err = select_variant(&product(&[]), &mut rng).unwrap_err();
        assert!(matches!(err, EngineError::NoVariants { .. }), "got {err:?}");
    }

    #[test]
    fn zero_weight_variant_is_a_malformed_weight() {
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let err = select_variant(&product(&[2, 0]), &mut rng).unwrap_err();
        assert!(matches!(
            err,
            EngineError::InvalidDraw { source: DrawError::NonPositiveWeight { index: 1 }, .. }
        ));
    }

    #[test]
    fn single_variant_is_always_chosen() {
        let p = product(&[9]);
        for seed in 0..50 {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            assert_eq!(select_variant(&p, &mut rng).unwrap().index, 0);
        }
    }

    #[test]
    fn variants_follow_one_to_four_weighting() {
        let p = product(&[1, 4]);
        let second = (0..5_000u64)
            .filter(|&seed| {
                let mut rng = ChaCha8Rng::seed_from_u64(seed);
                select_variant(&p, &mut rng).unwrap().index == 1
            })
            .count();
        assert!((3_850..=4_150).contains(&second), "second variant chosen {second}/5000 times");
    }
}
