//! In-memory configuration store built from MTGJSON-shaped booster data.
//!
//! The accepted document is the `AllPrintings.json` layout, trimmed to what
//! the engine reads:
//!
//! ```json
//! { "data": { "TST": {
//!     "name": "Test Set",
//!     "cards": [ { "uuid": "...", "name": "...", "number": "1", "rarity": "common",
//!                  "identifiers": { "scryfallId": "..." } } ],
//!     "booster": { "play": {
//!         "sheets":   { "common": { "foil": false, "cards": { "<uuid>": 10 } } },
//!         "boosters": [ { "weight": 7, "contents": { "common": 3 } } ]
//!     } }
//! } } }
//! ```
//!
//! A `contents` entry may also be `{ "count": 3, "sourceSet": "dom" }`, which
//! draws that sheet from the `dom` product of the same type.

use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::info;

use crate::booster_engine::{
    error::{EngineError, Result},
    models::{CardId, CardRecord, Product, ProductId, PurchaseUrls, Rarity, Sheet, SlotSpec, Variant},
    store::{CardLookup, ConfigStore},
};

// ---------------------------------------------------------------------------
// Wire shapes
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
struct RawCatalog {
    data: BTreeMap<String, RawSet>,
}

#[derive(Deserialize)]
struct RawSet {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    cards: Vec<RawCard>,
    #[serde(default)]
    booster: Option<BTreeMap<String, RawBooster>>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawCard {
    uuid: String,
    name: String,
    #[serde(default)]
    number: String,
    #[serde(default)]
    set_code: Option<String>,
    #[serde(default)]
    rarity: Option<String>,
    #[serde(default)]
    border_color: Option<String>,
    #[serde(default)]
    is_full_art: bool,
    #[serde(default)]
    frame_effects: Option<Vec<String>>,
    #[serde(default)]
    identifiers: RawIdentifiers,
    #[serde(default)]
    purchase_urls: RawPurchaseUrls,
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct RawIdentifiers {
    #[serde(default)]
    scryfall_id: Option<String>,
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct RawPurchaseUrls {
    #[serde(default)]
    card_kingdom: Option<String>,
    #[serde(default)]
    card_kingdom_foil: Option<String>,
}

#[derive(Deserialize)]
struct RawBooster {
    #[serde(default)]
    sheets: BTreeMap<String, RawSheet>,
    #[serde(default)]
    boosters: Vec<RawVariant>,
}

#[derive(Deserialize)]
struct RawSheet {
    #[serde(default)]
    foil: bool,
    #[serde(default)]
    cards: BTreeMap<String, u32>,
}

fn default_weight() -> u32 {
    1
}

#[derive(Deserialize)]
struct RawVariant {
    #[serde(default = "default_weight")]
    weight: u32,
    /// Kept as a JSON map so slot declaration order survives.
    #[serde(default)]
    contents: Map<String, Value>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawContent {
    Count(u32),
    Sourced {
        count: u32,
        #[serde(rename = "sourceSet")]
        source_set: String,
    },
}

// ---------------------------------------------------------------------------
// Catalog
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
struct ProductEntry {
    product: Product,
    sheets: BTreeMap<String, Sheet>,
}

#[derive(Debug, Clone)]
struct SetEntry {
    name: String,
    products: BTreeMap<String, ProductEntry>,
}

/// Immutable booster configuration and card metadata held in memory.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    sets: BTreeMap<String, SetEntry>,
    cards: HashMap<CardId, CardRecord>,
}

impl Catalog {
    pub fn from_json(s: &str) -> Result<Self> {
        let raw: RawCatalog = serde_json::from_str(s)?;
        let mut catalog = Catalog::default();

        for (code, set) in raw.data {
            let set_code = code.to_lowercase();

            for card in set.cards {
                let record = card_record(card, &set_code);
                catalog.cards.insert(record.card_id.clone(), record);
            }

            let mut products = BTreeMap::new();
            for (product_type, booster) in set.booster.unwrap_or_default() {
                let id = ProductId::new(&set_code, &product_type);
                let entry = product_entry(id.clone(), booster)?;
                products.insert(id.product_type, entry);
            }

            catalog.sets.insert(
                set_code.clone(),
                SetEntry { name: set.name.unwrap_or_else(|| set_code.to_uppercase()), products },
            );
        }

        info!(
            sets = catalog.sets.len(),
            cards = catalog.cards.len(),
            "booster catalog loaded"
        );
        Ok(catalog)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| EngineError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&text)
    }

    fn product_entry(&self, product: &ProductId) -> Option<&ProductEntry> {
        self.sets.get(&product.set_code)?.products.get(&product.product_type)
    }
}

fn card_record(card: RawCard, set_code: &str) -> CardRecord {
    CardRecord {
        card_id: CardId::new(card.uuid),
        name: card.name,
        set_code: card.set_code.map(|s| s.to_lowercase()).unwrap_or_else(|| set_code.to_owned()),
        collector_number: card.number,
        rarity: card.rarity.as_deref().map(Rarity::parse).unwrap_or(Rarity::Unknown),
        border_color: card.border_color.unwrap_or_else(|| "black".to_owned()),
        frame_effects: card.frame_effects.unwrap_or_default(),
        is_full_art: card.is_full_art,
        image_id: card.identifiers.scryfall_id.filter(|id| !id.is_empty()),
        purchase_urls: PurchaseUrls {
            nonfoil: card.purchase_urls.card_kingdom.filter(|url| !url.is_empty()),
            foil: card.purchase_urls.card_kingdom_foil.filter(|url| !url.is_empty()),
        },
    }
}

fn product_entry(id: ProductId, booster: RawBooster) -> Result<ProductEntry> {
    let sheets = booster
        .sheets
        .into_iter()
        .map(|(name, raw)| {
            let cards = raw.cards.into_iter().map(|(id, w)| (CardId::new(id), w)).collect();
            (name.clone(), Sheet { name, foil: raw.foil, cards })
        })
        .collect();

    let mut variants = Vec::with_capacity(booster.boosters.len());
    for (index, raw) in booster.boosters.into_iter().enumerate() {
        let mut slots = Vec::with_capacity(raw.contents.len());
        for (sheet_name, value) in raw.contents {
            let slot = match serde_json::from_value::<RawContent>(value)? {
                RawContent::Count(count) => SlotSpec::new(sheet_name, count),
                RawContent::Sourced { count, source_set } => {
                    SlotSpec::new(sheet_name, count).with_source_set(source_set)
                }
            };
            if slot.card_count == 0 {
                return Err(EngineError::EmptySlot { product: id.clone(), sheet: slot.sheet_name });
            }
            slots.push(slot);
        }
        variants.push(Variant { index, weight: raw.weight, slots });
    }

    Ok(ProductEntry { product: Product { id, variants }, sheets })
}

impl ConfigStore for Catalog {
    fn get_product(&self, product: &ProductId) -> Option<Product> {
        self.product_entry(product).map(|entry| entry.product.clone())
    }

    fn get_sheet(&self, scope: &ProductId, sheet_name: &str) -> Option<Sheet> {
        self.product_entry(scope)?.sheets.get(sheet_name).cloned()
    }

    fn list_sets(&self) -> Vec<(String, String)> {
        let mut sets: Vec<(String, String)> = self
            .sets
            .iter()
            .filter(|(_, set)| !set.products.is_empty())
            .map(|(code, set)| (code.clone(), set.name.clone()))
            .collect();
        sets.sort_by(|a, b| a.1.cmp(&b.1).then_with(|| a.0.cmp(&b.0)));
        sets
    }

    fn list_products(&self, set_code: &str) -> Option<Vec<String>> {
        let set = self.sets.get(&set_code.trim().to_lowercase())?;
        Some(set.products.keys().cloned().collect())
    }
}

impl CardLookup for Catalog {
    fn resolve(&self, card_id: &CardId) -> Option<CardRecord> {
        self.cards.get(card_id).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOC: &str = r#"{ "data": {
        "ABC": {
            "name": "Alpha Beta",
            "cards": [
                { "uuid": "u1", "name": "One", "number": "1", "rarity": "common",
                  "identifiers": { "scryfallId": "s1" },
                  "purchaseUrls": { "cardKingdom": "https://ck.com/one", "cardKingdomFoil": "" } },
                { "uuid": "u2", "name": "Two", "number": "2", "rarity": "mythic",
                  "borderColor": "borderless", "frameEffects": ["showcase"] }
            ],
            "booster": { "Draft": {
                "sheets": { "main": { "cards": { "u2": 1, "u1": 4 } } },
                "boosters": [
                    { "weight": 3, "contents": { "zeta": 1, "main": 2, "alpha": 1 } },
                    { "contents": { "main": { "count": 1, "sourceSet": "XYZ" } } }
                ]
            } }
        },
        "NOB": { "name": "No Boosters", "cards": [] }
    } }"#;

    #[test]
    fn contents_keep_declaration_order() {
        let catalog = Catalog::from_json(DOC).unwrap();
        let product = catalog.get_product(&ProductId::new("abc", "draft")).unwrap();
        let names: Vec<&str> =
            product.variants[0].slots.iter().map(|s| s.sheet_name.as_str()).collect();
        assert_eq!(names, ["zeta", "main", "alpha"]);
    }

    #[test]
    fn variant_weight_defaults_to_one_and_source_set_is_parsed() {
        let catalog = Catalog::from_json(DOC).unwrap();
        let product = catalog.get_product(&ProductId::new("ABC", "DRAFT")).unwrap();
        assert_eq!(product.variants[1].weight, 1);
        assert_eq!(product.variants[1].slots[0].source_set.as_deref(), Some("xyz"));
        assert_eq!(product.total_weight(), 4);
    }

    #[test]
    fn card_fields_are_mapped() {
        let catalog = Catalog::from_json(DOC).unwrap();
        let one = catalog.resolve(&CardId::new("u1")).unwrap();
        assert_eq!(one.set_code, "abc");
        assert_eq!(one.border_color, "black");
        assert_eq!(one.image_id.as_deref(), Some("s1"));
        assert_eq!(one.purchase_urls.nonfoil.as_deref(), Some("https://ck.com/one"));
        assert_eq!(one.purchase_urls.foil, None, "empty links are dropped");
        let two = catalog.resolve(&CardId::new("u2")).unwrap();
        assert_eq!(two.rarity, Rarity::Mythic);
        assert_eq!(two.frame_effects, vec!["showcase".to_owned()]);
        assert!(catalog.resolve(&CardId::new("missing")).is_none());
    }

    #[test]
    fn sets_without_boosters_are_not_listed() {
        let catalog = Catalog::from_json(DOC).unwrap();
        assert_eq!(catalog.list_sets(), vec![("abc".to_owned(), "Alpha Beta".to_owned())]);
        assert_eq!(catalog.list_products("ABC"), Some(vec!["draft".to_owned()]));
        assert_eq!(catalog.list_products("nob"), Some(vec![]));
        assert_eq!(catalog.list_products("zzz"), None);
    }

    #[test]
    fn negative_weight_is_rejected_at_load() {
        let doc = r#"{ "data": { "A": { "booster": { "p": {
            "sheets": { "s": { "cards": { "u": -1 } } }, "boosters": [] } } } } }"#;
        assert!(matches!(Catalog::from_json(doc), Err(EngineError::Catalog(_))));
    }

    #[test]
    fn zero_card_slot_is_rejected_at_load() {
        for contents in [r#"{ "s": 0 }"#, r#"{ "s": { "count": 0, "sourceSet": "B" } }"#] {
            let doc = format!(
                r#"{{ "data": {{ "A": {{ "booster": {{ "p": {{
                    "sheets": {{ "s": {{ "cards": {{ "u": 1 }} }} }},
                    "boosters": [ {{ "contents": {contents} }} ] }} }} }} }} }}"#
            );
            let err = Catalog::from_json(&doc).unwrap_err();
            match err {
                EngineError::EmptySlot { ref product, ref sheet } => {
                    assert_eq!(product, &ProductId::new("a", "p"));
                    assert_eq!(sheet, "s");
                    assert!(err.is_configuration_defect());
                }
                other => panic!("expected EmptySlot for {contents}, got {other:?}"),
            }
        }
    }
}
