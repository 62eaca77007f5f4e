use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::{debug, instrument, warn};

use crate::booster_engine::{
    config::EngineConfig,
    enricher::CardEnricher,
    error::{EngineError, Result},
    explorer::DistributionExplorer,
    models::{
        DrawnCard, Finish, GeneratedPack, PackRequest, PackSlot, ProbabilityTable, ProductId,
    },
    resolver::resolve_slot,
    sampler::sample,
    store::{CardLookup, ConfigStore, PriceLookup},
    variant::select_variant,
};

/// Largest seed handed out when the caller supplies none. Kept within 31
/// bits so the value survives a round trip through JavaScript numbers.
pub const MAX_FRESH_SEED: u64 = (1 << 31) - 1;

/// A new seed in `0..=MAX_FRESH_SEED`.
pub fn fresh_seed() -> u64 {
    rand::thread_rng().gen_range(0..=MAX_FRESH_SEED)
}

/// Opens packs and explores sheets for any product the stores know about.
///
/// Holds only shared references to read-only collaborators; one generator can
/// serve concurrent requests, each with its own RNG.
pub struct PackGenerator<'a> {
    config: &'a dyn ConfigStore,
    enricher: CardEnricher<'a>,
}

impl<'a> PackGenerator<'a> {
    pub fn new(config: &'a dyn ConfigStore, cards: &'a dyn CardLookup, prices: &'a dyn PriceLookup) -> Self {
        PackGenerator {
            config,
            enricher: CardEnricher::new(cards, prices),
        }
    }

    pub fn with_settings(mut self, settings: &EngineConfig) -> Self {
        self.enricher = self.enricher.with_image_base_url(settings.image_base_url.clone());
        self
    }

    /// Open one pack.
    ///
    /// Variant choice and every slot draw consume a single ChaCha8 stream
    /// seeded from `request.seed` (or a fresh seed, reported back), in slot
    /// declaration order. Any failure aborts the whole pack.
    #[instrument(skip_all, fields(product = %request.product, seed = ?request.seed))]
    pub fn generate_pack(&self, request: PackRequest) -> Result<GeneratedPack> {
        let seed = request.seed.unwrap_or_else(fresh_seed);
        self.assemble(&request.product, seed)
            .inspect_err(|err| warn!(error = %err, seed, "pack generation aborted"))
    }

    fn assemble(&self, product_id: &ProductId, seed: u64) -> Result<GeneratedPack> {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);

        let product = self
            .config
            .get_product(product_id)
            .ok_or_else(|| EngineError::ProductNotFound { product: product_id.clone() })?;
        let variant = select_variant(&product, &mut rng)?;

        let mut sheet_names = Vec::new();
        let mut drawn = Vec::new();
        for slot in &variant.slots {
            let sheet = resolve_slot(self.config, &product.id, slot)?;
            let picks = sample(&sheet.pool, slot.card_count as usize, &mut rng).map_err(|source| {
                EngineError::InvalidDraw {
                    context: format!("sheet '{}' ({}) for '{}'", sheet.name, sheet.scope, product.id),
                    source,
                }
            })?;
            debug!(sheet = %sheet.name, scope = %sheet.scope, drawn = picks.len(), "slot drawn");

            let finish = Finish::from_foil(sheet.foil);
            for card_id in picks {
                sheet_names.push(sheet.name.clone());
                drawn.push(DrawnCard { card_id, finish });
            }
        }

        let cards = self.enricher.enrich(&drawn)?;
        let slots = sheet_names
            .into_iter()
            .zip(cards)
            .map(|(sheet_name, card)| PackSlot { sheet_name, card })
            .collect();

        Ok(GeneratedPack {
            total_weight: product.total_weight(),
            product: product.id.clone(),
            variant_index: variant.index,
            variant_weight: variant.weight,
            seed,
            slots,
        })
    }

    /// Pull rates for every card of `product`. No randomness involved.
    pub fn compute_distribution(&self, product: &ProductId) -> Result<ProbabilityTable> {
        DistributionExplorer::new(self.config).compute_distribution(product)
    }

    /// `(code, name)` of every set with booster data, sorted by name.
    pub fn list_sets(&self) -> Vec<(String, String)> {
        self.config.list_sets()
    }

    pub fn list_products(&self, set_code: &str) -> Result<Vec<String>> {
        self.config.list_products(set_code).ok_or_else(|| EngineError::SetNotFound {
            set_code: set_code.trim().to_lowercase(),
        })
    }
}
