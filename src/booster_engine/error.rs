use std::path::PathBuf;
use rand::distributions::WeightedError;
use thiserror::Error;

use crate::booster_engine::models::{CardId, ProductId};

/// Why a weighted draw could not be performed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DrawError {
    #[error("requested {requested} cards from a pool of {available}")]
    Oversized { requested: usize, available: usize },

    #[error("pool entry {index} has a non-positive weight")]
    NonPositiveWeight { index: usize },

    #[error("unusable weights: {0}")]
    Weights(#[from] WeightedError),
}

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("product '{product}' not found")]
    ProductNotFound { product: ProductId },

    #[error("set '{set_code}' not found")]
    SetNotFound { set_code: String },

    #[error("product '{product}' has no variants defined")]
    NoVariants { product: ProductId },

    #[error("slot '{sheet}' of '{product}' draws no cards")]
    EmptySlot { product: ProductId, sheet: String },

    #[error("sheet '{sheet}' not found for '{scope}'")]
    SheetNotFound { sheet: String, scope: ProductId },

    #[error("invalid draw from {context}: {source}")]
    InvalidDraw {
        context: String,
        #[source]
        source: DrawError,
    },

    #[error("card '{card_id}' is not in local card data")]
    UnresolvedCard { card_id: CardId },

    #[error("catalog parse error: {0}")]
    Catalog(#[from] serde_json::Error),

    #[error("configuration error: {0}")]
    Config(#[from] toml::de::Error),

    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl EngineError {
    /// True for errors caused by bad imported reference data rather than by
    /// the caller's request.
    pub fn is_configuration_defect(&self) -> bool {
        matches!(
            self,
            EngineError::NoVariants { .. }
                | EngineError::EmptySlot { .. }
                | EngineError::SheetNotFound { .. }
                | EngineError::InvalidDraw { .. }
                | EngineError::UnresolvedCard { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, EngineError>;
