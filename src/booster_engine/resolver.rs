use crate::booster_engine::{
    error::{EngineError, Result},
    models::{CardId, ProductId, SlotSpec},
    store::ConfigStore,
};

/// A sheet expanded into a pool the sampler can draw from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedSheet {
    /// Where the sheet was found; differs from the product for overrides.
    pub scope: ProductId,
    pub name: String,
    pub foil: bool,
    /// Sorted by card id.
    pub pool: Vec<(CardId, u32)>,
}

impl ResolvedSheet {
    pub fn total_weight(&self) -> u64 {
        self.pool.iter().map(|(_, w)| u64::from(*w)).sum()
    }
}

/// The product a slot's sheet lives under: the slot's source set if it
/// names one, otherwise the requesting product itself.
pub fn sheet_scope(product: &ProductId, slot: &SlotSpec) -> ProductId {
    match &slot.source_set {
        Some(set) => product.with_set(set),
        None      => product.clone(),
    }
}

/// Look up `sheet_name` under `scope`. A missing sheet is never treated as
/// an empty pool.
pub fn resolve_sheet(store: &dyn ConfigStore, sheet_name: &str, scope: &ProductId) -> Result<ResolvedSheet> {
    let sheet = store.get_sheet(scope, sheet_name).ok_or_else(|| EngineError::SheetNotFound {
        sheet: sheet_name.to_owned(),
        scope: scope.clone(),
    })?;

    // Backends may hand back any ordering; the sampler needs a stable one.
    let mut pool: Vec<(CardId, u32)> = sheet.cards.into_iter().collect();
    pool.sort_by(|a, b| a.0.cmp(&b.0));

    Ok(ResolvedSheet { scope: scope.clone(), name: sheet.name, foil: sheet.foil, pool })
}

pub fn resolve_slot(store: &dyn ConfigStore, product: &ProductId, slot: &SlotSpec) -> Result<ResolvedSheet> {
    resolve_sheet(store, &slot.sheet_name, &sheet_scope(product, slot))
}
