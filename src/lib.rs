//! # booster_gen
//!
//! An offline, deterministic booster pack simulator for trading-card products.
//!
//! Products are described by structured configuration: each product has one
//! or more weighted *variants*, each variant lists *slots* ("draw 3 cards from
//! the `common` sheet"), and each *sheet* is a weighted pool of card ids. The
//! engine opens packs from that configuration and, separately, computes the
//! exact probability of pulling every card without drawing anything.
//!
//! ## How it works
//!
//! 1. Load configuration into something that implements [`ConfigStore`] and
//!    [`CardLookup`]. The bundled [`Catalog`] reads MTGJSON-shaped JSON.
//! 2. Build a [`PackGenerator`] over those stores plus a [`PriceLookup`].
//! 3. Call [`PackGenerator::generate_pack`] with a [`PackRequest`]. The engine
//!    picks a variant by weight, resolves every slot's sheet (following
//!    source-set overrides), draws without replacement, and enriches the
//!    drawn ids into display cards.
//! 4. Or call [`PackGenerator::compute_distribution`] for the per-card pull
//!    rates behind an "explore sheets" view.
//!
//! ## Key features
//!
//! - **Replayable**: every pack carries the seed it was drawn from. Passing
//!   that seed back reproduces the identical pack, which is what share links rely on.
//! - **Exact pull rates**: the explorer computes inclusion probabilities
//!   analytically for sheets of any size, never by simulation.
//! - **No fallbacks**: missing sheets, infeasible draws and unknown cards fail
//!   the request; a short or placeholder pack is never returned.
//!
//! ## Quick start
//!
//! ```rust
//! use booster_gen::{Catalog, NoPrices, PackGenerator, PackRequest, ProductId};
//!
//! let catalog = Catalog::from_json(r#"{ "data": { "TST": {
//!     "name": "Test Set",
//!     "cards": [
//!         { "uuid": "c1", "name": "Plains", "number": "1", "rarity": "common" },
//!         { "uuid": "c2", "name": "Island", "number": "2", "rarity": "common" }
//!     ],
//!     "booster": { "play": {
//!         "sheets": { "common": { "cards": { "c1": 1, "c2": 1 } } },
//!         "boosters": [ { "weight": 1, "contents": { "common": 1 } } ]
//!     } }
//! } } }"#).unwrap();
//!
//! let generator = PackGenerator::new(&catalog, &catalog, &NoPrices);
//!
//! let pack = generator.generate_pack(PackRequest::new("tst", "play").with_seed(42)).unwrap();
//! assert_eq!(pack.slots.len(), 1);
//! assert_eq!(pack.seed, 42);
//!
//! let table = generator.compute_distribution(&ProductId::new("tst", "play")).unwrap();
//! assert_eq!(table.cards[0].probability, 0.5);
//! ```

pub mod booster_engine;

// Convenience re-exports so callers can use `booster_gen::PackGenerator`
// directly without reaching into `booster_engine::`.
pub use booster_engine::{
    distribution_response, pack_response, CardId, CardLookup, Catalog, ConfigStore,
    DistributionExplorer, DrawError, EngineConfig, EngineError, Finish, GeneratedPack, NoPrices,
    PackGenerator, PackRequest, PackSlot, Price, PriceLookup, PriceTable, ProbabilityTable,
    ProductId, Rarity, ResolvedCard, SlotSpec,
};
