//! Core booster engine: configuration model, weighted draws, pack assembly,
//! and exact pull rates.
//!
//! ## Module overview
//!
//! | Module        | Purpose |
//! |---------------|---------|
//! | `models`      | Shared types: product ids, variants, sheets, cards, packs, tables |
//! | `error`       | `EngineError` / `DrawError` taxonomy |
//! | `store`       | Read-only collaborator traits (config, card, price lookups) |
//! | `catalog`     | In-memory store built from MTGJSON-shaped booster data |
//! | `config`      | `EngineConfig`, loaded from TOML |
//! | `sampler`     | Weighted draws without replacement from a seeded RNG |
//! | `variant`     | Weighted choice of one product variant |
//! | `resolver`    | Slot → concrete card pool, honoring source-set overrides |
//! | `enricher`    | Card ids → display records with treatments, images and prices |
//! | `generator`   | `PackGenerator`: opens packs, lists products, explores sheets |
//! | `explorer`    | Exact per-card pull probabilities and sheet contents, no sampling |
//! | `web_adapter` | JSON response bodies for the HTTP layer |

pub mod catalog;
pub mod config;
pub mod enricher;
pub mod error;
pub mod explorer;
pub mod generator;
pub mod models;
pub mod resolver;
pub mod sampler;
pub mod store;
pub mod variant;
pub mod web_adapter;

// Re-export the public API surface so callers can use
// `booster_engine::PackGenerator` without reaching into sub-modules.
pub use catalog::Catalog;
pub use config::EngineConfig;
pub use error::{DrawError, EngineError, Result};
pub use explorer::DistributionExplorer;
pub use generator::{fresh_seed, PackGenerator};
pub use models::{
    CardId, CardProbability, CardRecord, Finish, GeneratedPack, PackRequest, PackSlot, Price,
    ProbabilityTable, Product, ProductId, PurchaseUrls, Rarity, ResolvedCard, Sheet, SheetCard,
    SheetSummary, SlotSpec, Treatment, Variant, VariantShare,
};
pub use store::{CardLookup, ConfigStore, NoPrices, PriceLookup, PriceTable};
pub use web_adapter::{distribution_response, pack_response};
