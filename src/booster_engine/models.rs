use std::collections::BTreeMap;
use std::fmt;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Identifiers
// ---------------------------------------------------------------------------

/// A (set code, product type) pair such as `dom/draft` or `eoe/collector`.
///
/// Both halves are normalized to lower case on construction, so `"DOM"` and
/// `"dom"` name the same product.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ProductId {
    pub set_code: String,
    pub product_type: String,
}

impl ProductId {
    pub fn new(set_code: impl AsRef<str>, product_type: impl AsRef<str>) -> Self {
        ProductId {
            set_code: set_code.as_ref().trim().to_lowercase(),
            product_type: product_type.as_ref().trim().to_lowercase(),
        }
    }

    /// Same product type, different set. Used for source-set overrides.
    pub fn with_set(&self, set_code: impl AsRef<str>) -> Self {
        ProductId::new(set_code, &self.product_type)
    }
}

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.set_code, self.product_type)
    }
}

/// Opaque card key (an MTGJSON uuid in practice). Never a display name.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CardId(pub String);

impl CardId {
    pub fn new(id: impl Into<String>) -> Self {
        CardId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CardId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ---------------------------------------------------------------------------
// Product configuration (read-only reference data)
// ---------------------------------------------------------------------------

/// One draw instruction inside a variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotSpec {
    pub sheet_name: String,
    pub card_count: u32,
    /// Draw this sheet from another set's product instead of our own.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_set: Option<String>,
}

impl SlotSpec {
    pub fn new(sheet_name: impl Into<String>, card_count: u32) -> Self {
        SlotSpec { sheet_name: sheet_name.into(), card_count, source_set: None }
    }

    pub fn with_source_set(mut self, source_set: impl AsRef<str>) -> Self {
        self.source_set = Some(source_set.as_ref().trim().to_lowercase());
        self
    }
}

/// A structural configuration of a product, chosen with probability
/// `weight / Σ weights` among its siblings. Slots are kept in declaration order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Variant {
    pub index: usize,
    pub weight: u32,
    pub slots: Vec<SlotSpec>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub variants: Vec<Variant>,
}

impl Product {
    pub fn total_weight(&self) -> u64 {
        self.variants.iter().map(|v| u64::from(v.weight)).sum()
    }
}

/// A named weighted pool of cards. The `BTreeMap` keeps entries unique and
/// ordered by card id, which is the pool order the sampler sees.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sheet {
    pub name: String,
    pub foil: bool,
    pub cards: BTreeMap<CardId, u32>,
}

// ---------------------------------------------------------------------------
// Card records and display fields
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Finish {
    Nonfoil,
    Foil,
}

impl Finish {
    pub fn from_foil(foil: bool) -> Self {
        if foil { Finish::Foil } else { Finish::Nonfoil }
    }

    pub fn is_foil(self) -> bool {
        matches!(self, Finish::Foil)
    }
}

impl fmt::Display for Finish {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Finish::Nonfoil => write!(f, "nonfoil"),
            Finish::Foil    => write!(f, "foil"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Rarity {
    Common,
    Uncommon,
    Rare,
    Mythic,
    Special,
    Bonus,
    Unknown,
}

impl Rarity {
    pub fn parse(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "common"   => Rarity::Common,
            "uncommon" => Rarity::Uncommon,
            "rare"     => Rarity::Rare,
            "mythic"   => Rarity::Mythic,
            "special"  => Rarity::Special,
            "bonus"    => Rarity::Bonus,
            _          => Rarity::Unknown,
        }
    }

    /// Presentation order inside an opened pack: commons first, mythics last.
    /// Anything unusual sorts with the uncommons.
    pub fn display_rank(self) -> u8 {
        match self {
            Rarity::Common => 0,
            Rarity::Rare   => 2,
            Rarity::Mythic => 3,
            _              => 1,
        }
    }
}

impl fmt::Display for Rarity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Rarity::Common   => "common",
            Rarity::Uncommon => "uncommon",
            Rarity::Rare     => "rare",
            Rarity::Mythic   => "mythic",
            Rarity::Special  => "special",
            Rarity::Bonus    => "bonus",
            Rarity::Unknown  => "unknown",
        };
        write!(f, "{}", s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Treatment {
    Borderless,
    Showcase,
    ExtendedArt,
    FullArt,
}

impl fmt::Display for Treatment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Treatment::Borderless  => write!(f, "borderless"),
            Treatment::Showcase    => write!(f, "showcase"),
            Treatment::ExtendedArt => write!(f, "extended art"),
            Treatment::FullArt     => write!(f, "full art"),
        }
    }
}

/// Raw display data for one printing, as returned by the card lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardRecord {
    pub card_id: CardId,
    pub name: String,
    pub set_code: String,
    pub collector_number: String,
    pub rarity: Rarity,
    pub border_color: String,
    pub frame_effects: Vec<String>,
    pub is_full_art: bool,
    /// Key of the card's image (a Scryfall id), if it has one.
    pub image_id: Option<String>,
    #[serde(default)]
    pub purchase_urls: PurchaseUrls,
}

/// Retailer links for one printing, per finish.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PurchaseUrls {
    pub nonfoil: Option<String>,
    pub foil: Option<String>,
}

impl PurchaseUrls {
    /// The link for `finish`; foils fall back to the nonfoil link.
    pub fn for_finish(&self, finish: Finish) -> Option<&str> {
        match finish {
            Finish::Foil    => self.foil.as_deref().or(self.nonfoil.as_deref()),
            Finish::Nonfoil => self.nonfoil.as_deref(),
        }
    }
}

/// Retail price in US cents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Price(pub u64);

impl Price {
    /// Parse a decimal dollar amount such as `"1.23"` or `"4"`.
    pub fn parse_dollars(s: &str) -> Option<Self> {
        let dollars: f64 = s.trim().parse().ok()?;
        if !dollars.is_finite() || dollars < 0.0 {
            return None;
        }
        Some(Price((dollars * 100.0).round() as u64))
    }

    pub fn cents(self) -> u64 {
        self.0
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "${}.{:02}", self.0 / 100, self.0 % 100)
    }
}

/// A drawn card identifier plus the finish implied by its sheet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DrawnCard {
    pub card_id: CardId,
    pub finish: Finish,
}

/// A card ready for display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedCard {
    pub card_id: CardId,
    pub name: String,
    pub set_code: String,
    pub collector_number: String,
    pub rarity: Rarity,
    pub finish: Finish,
    pub treatments: Vec<Treatment>,
    pub image_uri: Option<String>,
    pub price: Option<Price>,
    pub purchase_url: Option<String>,
}

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackRequest {
    pub product: ProductId,
    /// `None` draws a fresh seed, which is reported back in the pack.
    pub seed: Option<u64>,
}

impl PackRequest {
    pub fn new(set_code: impl AsRef<str>, product_type: impl AsRef<str>) -> Self {
        PackRequest { product: ProductId::new(set_code, product_type), seed: None }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PackSlot {
    pub sheet_name: String,
    pub card: ResolvedCard,
}

/// One opened pack. Replaying `seed` against the same product yields the
/// same pack.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratedPack {
    pub product: ProductId,
    pub variant_index: usize,
    pub variant_weight: u32,
    /// Sum of all sibling variant weights.
    pub total_weight: u64,
    pub seed: u64,
    /// In slot declaration order.
    pub slots: Vec<PackSlot>,
}

impl GeneratedPack {
    pub fn cards(&self) -> impl Iterator<Item = &ResolvedCard> + '_ {
        self.slots.iter().map(|slot| &slot.card)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariantShare {
    pub variant_index: usize,
    pub weight: u32,
    pub fraction: f64,
    pub contents: Vec<SlotSpec>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SheetSummary {
    /// Set the sheet was resolved under (differs from the product's own set
    /// for source-set overrides).
    pub set_code: String,
    pub name: String,
    pub foil: bool,
    pub card_count: usize,
    pub total_weight: u64,
    /// Ordered by card id.
    pub cards: Vec<SheetCard>,
}

/// One entry of a sheet, with its chance of being drawn for every slot size
/// the product takes from this sheet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SheetCard {
    pub card_id: CardId,
    pub weight: u32,
    /// Cards drawn by the slot → probability this card is among them.
    pub inclusion: BTreeMap<u32, f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CardProbability {
    pub card_id: CardId,
    pub probability: f64,
}

/// Per-card pull rates for one product, aggregated over its variants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProbabilityTable {
    pub product: ProductId,
    pub total_weight: u64,
    pub variants: Vec<VariantShare>,
    pub sheets: Vec<SheetSummary>,
    /// Ordered by card id.
    pub cards: Vec<CardProbability>,
}

impl ProbabilityTable {
    pub fn probability_of(&self, card_id: &CardId) -> Option<f64> {
        self.cards
            .iter()
            .find(|c| &c.card_id == card_id)
            .map(|c| c.probability)
    }
}
