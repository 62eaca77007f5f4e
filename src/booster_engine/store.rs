//! Read-only collaborator interfaces the engine consumes.
//!
//! Storage, card metadata and pricing live outside the engine. Anything that
//! implements these traits can back it: the bundled [`Catalog`], an indexed
//! file, or a relational store. Implementations are shared across request
//! threads, so they must tolerate concurrent reads.
//!
//! [`Catalog`]: crate::booster_engine::catalog::Catalog

use std::collections::HashMap;
use serde::Deserialize;

use crate::booster_engine::{
    error::Result,
    models::{CardId, CardRecord, Finish, Price, Product, ProductId, Sheet},
};

/// Booster configuration lookup. Misses return `None`, never an empty value.
pub trait ConfigStore: Send + Sync {
    fn get_product(&self, product: &ProductId) -> Option<Product>;

    /// Sheet `sheet_name` as scoped to `scope` (a product, or a source set
    /// paired with the requesting product type).
    fn get_sheet(&self, scope: &ProductId, sheet_name: &str) -> Option<Sheet>;

    /// `(code, name)` for every set with booster data, sorted by name.
    fn list_sets(&self) -> Vec<(String, String)>;

    /// Product types of a set, or `None` if the set is unknown.
    fn list_products(&self, set_code: &str) -> Option<Vec<String>>;
}

/// Local card metadata. No network fallback on a miss.
pub trait CardLookup: Send + Sync {
    fn resolve(&self, card_id: &CardId) -> Option<CardRecord>;
}

/// Current retail price. Absence is a normal answer.
pub trait PriceLookup: Send + Sync {
    fn current_price(&self, card_id: &CardId, finish: Finish) -> Option<Price>;
}

/// Price source that knows no prices.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoPrices;

impl PriceLookup for NoPrices {
    fn current_price(&self, _card_id: &CardId, _finish: Finish) -> Option<Price> {
        None
    }
}

#[derive(Deserialize)]
struct RawPrices {
    #[serde(default)]
    normal: Option<String>,
    #[serde(default)]
    foil: Option<String>,
}

/// In-memory price table keyed by card and finish.
#[derive(Debug, Clone, Default)]
pub struct PriceTable {
    prices: HashMap<(CardId, Finish), Price>,
}

impl PriceTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load `{ "<card id>": { "normal": "0.25", "foil": "1.10" } }`.
    /// Unparseable amounts are skipped.
    pub fn from_json(s: &str) -> Result<Self> {
        let raw: HashMap<String, RawPrices> = serde_json::from_str(s)?;
        let mut table = PriceTable::new();
        for (id, entry) in raw {
            let card_id = CardId::new(id);
            for (finish, amount) in [(Finish::Nonfoil, entry.normal), (Finish::Foil, entry.foil)] {
                if let Some(price) = amount.as_deref().and_then(Price::parse_dollars) {
                    table.insert(card_id.clone(), finish, price);
                }
            }
        }
        Ok(table)
    }

    pub fn insert(&mut self, card_id: CardId, finish: Finish, price: Price) {
        self.prices.insert((card_id, finish), price);
    }

    pub fn len(&self) -> usize {
        self.prices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prices.is_empty()
    }
}

impl PriceLookup for PriceTable {
    fn current_price(&self, card_id: &CardId, finish: Finish) -> Option<Price> {
        self.prices.get(&(card_id.clone(), finish)).copied()
    }
}
