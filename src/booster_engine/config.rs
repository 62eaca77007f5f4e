use std::path::{Path, PathBuf};
use serde::{Deserialize, Serialize};

use crate::booster_engine::{
    enricher::DEFAULT_IMAGE_BASE_URL,
    error::{EngineError, Result},
};

/// Engine settings, read from TOML. Every field has a default, so an empty
/// document is a valid configuration.
///
/// ```toml
/// catalog_path = "data/AllPrintings.json"
/// image_base_url = "https://cards.scryfall.io/normal/front"
/// default_product = "play"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub catalog_path: Option<PathBuf>,
    pub image_base_url: String,
    pub default_product: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            catalog_path: None,
            image_base_url: DEFAULT_IMAGE_BASE_URL.to_owned(),
            default_product: "play".to_owned(),
        }
    }
}

impl EngineConfig {
    pub fn from_toml(s: &str) -> Result<Self> {
        Ok(toml::from_str(s)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| EngineError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_gives_defaults() {
        assert_eq!(EngineConfig::from_toml("").unwrap(), EngineConfig::default());
    }

    #[test]
    fn fields_override_defaults() {
        let cfg = EngineConfig::from_toml(
            "catalog_path = \"cat.json\"\ndefault_product = \"draft\"\n",
        )
        .unwrap();
        assert_eq!(cfg.catalog_path, Some(PathBuf::from("cat.json")));
        assert_eq!(cfg.default_product, "draft");
        assert_eq!(cfg.image_base_url, DEFAULT_IMAGE_BASE_URL);
    }

    #[test]
    fn wrong_type_is_a_config_error() {
        let err = EngineConfig::from_toml("default_product = 5").unwrap_err();
        assert!(matches!(err, EngineError::Config(_)));
    }

    #[test]
    fn retired_explorer_budget_key_is_ignored() {
        let cfg = EngineConfig::from_toml("max_exact_states = 250000\n").unwrap();
        assert_eq!(cfg, EngineConfig::default());
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = EngineConfig::load("/definitely/not/here.toml").unwrap_err();
        assert!(matches!(err, EngineError::Io { .. }));
    }
}
