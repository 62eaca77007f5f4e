//! Closed-form pull rates for a product, computed without drawing.
//!
//! A slot drawing `k` cards from a sheet without replacement picks each card
//! in turn with probability proportional to its weight among the cards left.
//! That process is the same as giving every card an exponential clock with
//! rate equal to its weight and taking the first `k` to ring. A card of
//! weight `w` is therefore drawn exactly when fewer than `k` other clocks
//! ring before its own:
//!
//! ```text
//! P(drawn) = ∫₀^∞ w·e^(−w·t) · P(N(t) < k) dt,   N(t) = #{ j ≠ i : clock j < t }
//! ```
//!
//! `P(N(t) < k)` is a Poisson-binomial tail over the other cards, built from
//! one binomial factor per weight class. After substituting `t = eˣ` the
//! integrand is analytic and decays at both ends, so the trapezoid rule on
//! a fixed grid converges to double precision. `k = 1`, equal weights, and
//! empty or exhaustive draws take their direct forms (`w / W`, `k / n`, 0, 1).
//!
//! Every figure is accumulated in a fixed order over ordered maps, so a table
//! is bit-for-bit reproducible for a given configuration.

use std::collections::BTreeMap;
use tracing::{debug, instrument, warn};

use crate::booster_engine::{
    error::{DrawError, EngineError, Result},
    models::{
        CardId, CardProbability, ProbabilityTable, ProductId, SheetCard, SheetSummary, VariantShare,
    },
    resolver::{resolve_slot, ResolvedSheet},
    sampler::check_draw,
    store::ConfigStore,
};

/// Grid spacing in `ln t`.
const STEP: f64 = 0.1;
/// Integrand mass left of the grid is at most this, for every class.
const LEFT_TAIL: f64 = 1e-18;
/// `w·t` at the right edge; `w·t·e^(−w·t)` is below 1e-24 past it.
const RIGHT_EDGE: f64 = 60.0;

/// Probability that a card of each weight is among `k` cards drawn without
/// replacement from a pool with the given weights. Keyed by weight.
pub fn inclusion_probabilities(weights: &[u32], k: usize) -> std::result::Result<BTreeMap<u32, f64>, DrawError> {
    let n = check_draw(weights.iter().copied(), k)?;

    let mut classes: BTreeMap<u32, u32> = BTreeMap::new();
    for &w in weights {
        *classes.entry(w).or_insert(0) += 1;
    }

    if k == 0 || k == n {
        let p = if k == 0 { 0.0 } else { 1.0 };
        return Ok(classes.keys().map(|&w| (w, p)).collect());
    }
    if classes.len() == 1 {
        let p = k as f64 / n as f64;
        return Ok(classes.keys().map(|&w| (w, p)).collect());
    }
    if k == 1 {
        let total: f64 = weights.iter().map(|&w| f64::from(w)).sum();
        return Ok(classes.keys().map(|&w| (w, f64::from(w) / total)).collect());
    }

    let classes: Vec<(u32, u32)> = classes.into_iter().collect();
    Ok(race(&classes, k))
}

/// Trapezoid rule over `x = ln t` for every class at once. `classes` is
/// sorted by weight, has at least two entries, and `2 ≤ k < n`.
fn race(classes: &[(u32, u32)], k: usize) -> BTreeMap<u32, f64> {
    let lightest = f64::from(classes[0].0);
    let heaviest = f64::from(classes[classes.len() - 1].0);
    let lo = (LEFT_TAIL / heaviest).ln();
    let hi = (RIGHT_EDGE / lightest).ln();
    let steps = ((hi - lo) / STEP).ceil() as usize;

    let unit = {
        let mut u = vec![0.0; k];
        u[0] = 1.0;
        u
    };
    let mut sums = vec![0.0f64; classes.len()];

    for s in 0..=steps {
        let t = (lo + s as f64 * STEP).exp();
        let factors: Vec<Vec<f64>> = classes.iter().map(|&(w, c)| binomial(c, w, t, k)).collect();

        // prefix[a] covers classes before a, suffix[a] classes from a on.
        let mut prefix = Vec::with_capacity(factors.len() + 1);
        prefix.push(unit.clone());
        for f in &factors {
            let next = convolve(&prefix[prefix.len() - 1], f, k);
            prefix.push(next);
        }
        let mut suffix = vec![unit.clone(); factors.len() + 1];
        for a in (0..factors.len()).rev() {
            suffix[a] = convolve(&suffix[a + 1], &factors[a], k);
        }

        for (a, &(w, c)) in classes.iter().enumerate() {
            let others = convolve(
                &convolve(&prefix[a], &suffix[a + 1], k),
                &binomial(c - 1, w, t, k),
                k,
            );
            let below_k: f64 = others.iter().sum();
            let wt = f64::from(w) * t;
            sums[a] += wt * (-wt).exp() * below_k;
        }
    }

    classes
        .iter()
        .zip(sums)
        .map(|(&(w, _), sum)| (w, (sum * STEP).clamp(0.0, 1.0)))
        .collect()
}

/// `P(m of count cards with weight w have rung by t)` for `m < k`.
fn binomial(count: u32, weight: u32, t: f64, k: usize) -> Vec<f64> {
    let x = f64::from(weight) * t;
    let (rung, quiet) = (-(-x).exp_m1(), (-x).exp());
    let mut out = vec![0.0; k];
    let mut coef = 1.0;
    for m in 0..=(count as usize).min(k - 1) {
        out[m] = coef * rung.powi(m as i32) * quiet.powi((count as usize - m) as i32);
        coef *= (count as usize - m) as f64 / (m + 1) as f64;
    }
    out
}

/// Product of two count distributions, truncated to counts below `k`.
fn convolve(a: &[f64], b: &[f64], k: usize) -> Vec<f64> {
    let mut out = vec![0.0; k];
    for (i, &x) in a.iter().enumerate() {
        if x == 0.0 {
            continue;
        }
        for (j, &y) in b.iter().take(k - i).enumerate() {
            out[i + j] += x * y;
        }
    }
    out
}

// ---------------------------------------------------------------------------
// Product-level table
// ---------------------------------------------------------------------------

pub struct DistributionExplorer<'a> {
    config: &'a dyn ConfigStore,
}

impl<'a> DistributionExplorer<'a> {
    pub fn new(config: &'a dyn ConfigStore) -> Self {
        DistributionExplorer { config }
    }

    /// Per-card probability of appearing in one pack of `product`.
    ///
    /// Each slot contributes `P(variant) × P(card drawn | slot)`; contributions
    /// from every slot and variant that can produce the card are summed, so a
    /// card reachable from several slots reports its expected copies per pack.
    #[instrument(skip_all, fields(product = %product))]
    pub fn compute_distribution(&self, product: &ProductId) -> Result<ProbabilityTable> {
        self.build(product).inspect_err(|err| warn!(error = %err, "distribution aborted"))
    }

    fn build(&self, product_id: &ProductId) -> Result<ProbabilityTable> {
        let product = self
            .config
            .get_product(product_id)
            .ok_or_else(|| EngineError::ProductNotFound { product: product_id.clone() })?;
        if product.variants.is_empty() {
            return Err(EngineError::NoVariants { product: product.id.clone() });
        }
        check_draw(product.variants.iter().map(|v| v.weight), 1).map_err(|source| EngineError::InvalidDraw {
            context: format!("variants of '{}'", product.id),
            source,
        })?;

        let total = product.total_weight();
        let mut variants = Vec::with_capacity(product.variants.len());
        let mut sheets: BTreeMap<(String, String), SheetSummary> = BTreeMap::new();
        let mut cards: BTreeMap<CardId, f64> = BTreeMap::new();

        for variant in &product.variants {
            let fraction = f64::from(variant.weight) / total as f64;
            variants.push(VariantShare {
                variant_index: variant.index,
                weight: variant.weight,
                fraction,
                contents: variant.slots.clone(),
            });

            for slot in &variant.slots {
                let sheet = resolve_slot(self.config, &product.id, slot)?;
                let inclusion = self.slot_inclusion(&product.id, &sheet, slot.card_count as usize)?;

                let summary = sheets
                    .entry((sheet.scope.set_code.clone(), sheet.name.clone()))
                    .or_insert_with(|| summarize(&sheet));
                for entry in &mut summary.cards {
                    let p = inclusion.get(&entry.weight).copied().unwrap_or(0.0);
                    entry.inclusion.insert(slot.card_count, p);
                }

                for (card, weight) in &sheet.pool {
                    let p = inclusion.get(weight).copied().unwrap_or(0.0);
                    *cards.entry(card.clone()).or_insert(0.0) += fraction * p;
                }
            }
        }

        debug!(variants = variants.len(), sheets = sheets.len(), cards = cards.len(), "distribution computed");
        Ok(ProbabilityTable {
            product: product.id,
            total_weight: total,
            variants,
            sheets: sheets.into_values().collect(),
            cards: cards
                .into_iter()
                .map(|(card_id, probability)| CardProbability { card_id, probability })
                .collect(),
        })
    }

    fn slot_inclusion(&self, product: &ProductId, sheet: &ResolvedSheet, k: usize) -> Result<BTreeMap<u32, f64>> {
        let weights: Vec<u32> = sheet.pool.iter().map(|(_, w)| *w).collect();
        inclusion_probabilities(&weights, k).map_err(|source| EngineError::InvalidDraw {
            context: format!("sheet '{}' ({}) for '{}'", sheet.name, sheet.scope, product),
            source,
        })
    }
}

fn summarize(sheet: &ResolvedSheet) -> SheetSummary {
    SheetSummary {
        set_code: sheet.scope.set_code.clone(),
        name: sheet.name.clone(),
        foil: sheet.foil,
        card_count: sheet.pool.len(),
        total_weight: sheet.total_weight(),
        cards: sheet
            .pool
            .iter()
            .map(|(card_id, weight)| SheetCard {
                card_id: card_id.clone(),
                weight: *weight,
                inclusion: BTreeMap::new(),
            })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-12
    }

    /// Sum over every ordered draw sequence. Only for tiny pools.
    fn enumerate(weights: &[u32], k: usize) -> Vec<f64> {
        fn walk(weights: &[u32], k: usize, taken: &mut Vec<usize>, p: f64, left: f64, out: &mut [f64]) {
            if taken.len() == k {
                for &i in taken.iter() {
                    out[i] += p;
                }
                return;
            }
            for i in 0..weights.len() {
                if taken.contains(&i) {
                    continue;
                }
                let w = f64::from(weights[i]);
                taken.push(i);
                walk(weights, k, taken, p * w / left, left - w, out);
                taken.pop();
            }
        }
        let mut out = vec![0.0; weights.len()];
        let total = weights.iter().map(|&w| f64::from(w)).sum();
        walk(weights, k, &mut Vec::new(), 1.0, total, &mut out);
        out
    }

    #[test]
    fn single_draw_is_weight_over_total() {
        let inc = inclusion_probabilities(&[1, 3], 1).unwrap();
        assert_eq!(inc[&1], 0.25);
        assert_eq!(inc[&3], 0.75);
    }

    #[test]
    fn two_equal_cards_single_draw_is_exactly_half() {
        let inc = inclusion_probabilities(&[1, 1], 1).unwrap();
        assert_eq!(inc[&1], 0.5);
    }

    #[test]
    fn equal_weights_are_hypergeometric() {
        let inc = inclusion_probabilities(&[10; 10], 3).unwrap();
        assert_eq!(inc[&10], 0.3);
    }

    #[test]
    fn unequal_weights_match_hand_enumeration() {
        // {1, 2, 3}, two draws: 5/12, 11/15, 17/20.
        let inc = inclusion_probabilities(&[1, 2, 3], 2).unwrap();
        assert!(close(inc[&1], 5.0 / 12.0), "w=1 got {}", inc[&1]);
        assert!(close(inc[&2], 11.0 / 15.0), "w=2 got {}", inc[&2]);
        assert!(close(inc[&3], 17.0 / 20.0), "w=3 got {}", inc[&3]);
    }

    #[test]
    fn mixed_pools_match_full_enumeration() {
        let cases: [(&[u32], usize); 5] = [
            (&[1, 1, 2, 5, 7], 3),
            (&[3, 1, 4, 1, 5, 9, 2, 6], 4),
            (&[10, 10, 10, 1, 2], 2),
            (&[1, 1, 1, 10_000], 2),
            (&[123_456, 654_321, 1, 7], 2),
        ];
        for (weights, k) in cases {
            let inc = inclusion_probabilities(weights, k).unwrap();
            for (w, want) in weights.iter().zip(enumerate(weights, k)) {
                assert!(close(inc[w], want), "{weights:?} k={k} w={w}: {} vs {want}", inc[w]);
            }
        }
    }

    #[test]
    fn inclusion_mass_equals_draw_count() {
        let weights = [1, 1, 2, 5, 5, 9, 20];
        let inc = inclusion_probabilities(&weights, 4).unwrap();
        let mass: f64 = weights.iter().map(|w| inc[w]).sum();
        assert!((mass - 4.0).abs() < 1e-12, "mass {mass}");
    }

    #[test]
    fn forty_distinct_weights_keep_full_mass() {
        let weights: Vec<u32> = (1..=40).collect();
        let inc = inclusion_probabilities(&weights, 5).unwrap();
        let mass: f64 = weights.iter().map(|w| inc[w]).sum();
        assert!((mass - 5.0).abs() < 1e-9, "mass {mass}");
        assert!(inc.values().zip(inc.values().skip(1)).all(|(a, b)| a < b), "not increasing in weight");
    }

    #[test]
    fn large_mixed_sheet_keeps_full_mass() {
        let mut weights = vec![1u32; 200];
        weights.extend([3; 50]);
        weights.extend([7; 10]);
        weights.extend(20..60);
        let inc = inclusion_probabilities(&weights, 10).unwrap();
        let mass: f64 = weights.iter().map(|w| inc[w]).sum();
        assert!((mass - 10.0).abs() < 1e-9, "mass {mass}");
    }

    #[test]
    fn exhaustive_and_empty_draws() {
        let all = inclusion_probabilities(&[1, 7, 7], 3).unwrap();
        assert_eq!(all[&1], 1.0);
        assert_eq!(all[&7], 1.0);
        let none = inclusion_probabilities(&[1, 7], 0).unwrap();
        assert_eq!(none[&7], 0.0);
    }

    #[test]
    fn infeasible_draws_are_rejected() {
        assert_eq!(
            inclusion_probabilities(&[1, 1, 1], 5).unwrap_err(),
            DrawError::Oversized { requested: 5, available: 3 }
        );
        assert_eq!(
            inclusion_probabilities(&[1, 0], 1).unwrap_err(),
            DrawError::NonPositiveWeight { index: 1 }
        );
    }
}
