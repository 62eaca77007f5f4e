use crate::booster_engine::{
    error::{EngineError, Result},
    models::{CardRecord, DrawnCard, ResolvedCard, Treatment},
    store::{CardLookup, PriceLookup},
};

pub const DEFAULT_IMAGE_BASE_URL: &str = "https://cards.scryfall.io/normal/front";

/// Attaches display fields and prices to drawn card identifiers.
pub struct CardEnricher<'a> {
    cards: &'a dyn CardLookup,
    prices: &'a dyn PriceLookup,
    image_base_url: String,
}

impl<'a> CardEnricher<'a> {
    pub fn new(cards: &'a dyn CardLookup, prices: &'a dyn PriceLookup) -> Self {
        CardEnricher { cards, prices, image_base_url: DEFAULT_IMAGE_BASE_URL.to_owned() }
    }

    pub fn with_image_base_url(mut self, base: impl Into<String>) -> Self {
        self.image_base_url = base.into();
        self
    }

    /// Resolve every card, in order. The first lookup miss fails the whole
    /// batch; no placeholder cards are produced.
    pub fn enrich(&self, drawn: &[DrawnCard]) -> Result<Vec<ResolvedCard>> {
        drawn
            .iter()
            .map(|card| {
                let record = self
                    .cards
                    .resolve(&card.card_id)
                    .ok_or_else(|| EngineError::UnresolvedCard { card_id: card.card_id.clone() })?;
                let price = self.prices.current_price(&card.card_id, card.finish);
                Ok(ResolvedCard {
                    image_uri: record
                        .image_id
                        .as_deref()
                        .and_then(|id| image_uri(&self.image_base_url, id)),
                    treatments: treatments(&record),
                    purchase_url: record.purchase_urls.for_finish(card.finish).map(str::to_owned),
                    card_id: record.card_id,
                    name: record.name,
                    set_code: record.set_code,
                    collector_number: record.collector_number,
                    rarity: record.rarity,
                    finish: card.finish,
                    price,
                })
            })
            .collect()
    }
}

/// `{base}/{a}/{b}/{id}.jpg`, where `a` and `b` are the first two characters
/// of the image id. Ids shorter than two characters have no image.
pub fn image_uri(base: &str, image_id: &str) -> Option<String> {
    let mut chars = image_id.chars();
    let (a, b) = (chars.next()?, chars.next()?);
    Some(format!("{}/{a}/{b}/{image_id}.jpg", base.trim_end_matches('/')))
}

pub fn treatments(record: &CardRecord) -> Vec<Treatment> {
    let mut out = Vec::new();
    if record.border_color.eq_ignore_ascii_case("borderless") {
        out.push(Treatment::Borderless);
    }
    let has_effect = |effect: &str| record.frame_effects.iter().any(|e| e.eq_ignore_ascii_case(effect));
    if has_effect("showcase") {
        out.push(Treatment::Showcase);
    }
    if has_effect("extendedart") {
        out.push(Treatment::ExtendedArt);
    }
    if record.is_full_art {
        out.push(Treatment::FullArt);
    }
    out
}
