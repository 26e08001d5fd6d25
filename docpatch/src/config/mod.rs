// Engine configuration - block keys, id strategy and block-type allow-lists

use crate::error::{DocPatchError, Result};
use crate::path::{parse_patch_path, PatchPath};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Settings threaded through a [`crate::PatchEngine`].
///
/// Every field has a default, so an empty YAML document is a valid config.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Key holding a block's identity
    pub block_id_key: String,
    /// Key holding a block's type discriminator
    pub block_type_key: String,
    /// How ids are minted for blocks added without one
    pub id_strategy: IdStrategy,
    /// Block types accepted per block-list path, e.g. `layout: [hero, photo]`.
    /// Lists without an entry accept any non-empty type.
    pub allowed_block_types: HashMap<String, Vec<String>>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            block_id_key: "id".into(),
            block_type_key: "type".into(),
            id_strategy: IdStrategy::default(),
            allowed_block_types: HashMap::new(),
        }
    }
}

/// Strategy for generating block ids
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IdStrategy {
    /// `<type>_<n>` with the lowest free `n`; deterministic
    #[default]
    Sequential,
    Ulid,
    Uuid,
    Nanoid,
}

impl EngineConfig {
    /// Check the config for values the engine cannot work with.
    pub fn validate(&self) -> Result<()> {
        if self.block_id_key.is_empty() {
            return Err(DocPatchError::Config("block_id_key must not be empty".into()));
        }
        if self.block_type_key.is_empty() {
            return Err(DocPatchError::Config("block_type_key must not be empty".into()));
        }
        if self.block_id_key == self.block_type_key {
            return Err(DocPatchError::Config(format!(
                "block_id_key and block_type_key must differ (both are '{}')",
                self.block_id_key
            )));
        }

        for (raw, types) in &self.allowed_block_types {
            parse_patch_path(raw).map_err(|e| {
                DocPatchError::Config(format!("allowed_block_types key '{raw}': {}", e.message))
            })?;
            if types.iter().any(|t| t.trim().is_empty()) {
                return Err(DocPatchError::Config(format!(
                    "allowed_block_types for '{raw}' contains an empty type"
                )));
            }
        }

        Ok(())
    }

    /// Allowed block types for the block list at `container`, if restricted.
    pub fn allowed_block_types_for(&self, container: &PatchPath) -> Option<&[String]> {
        self.allowed_block_types
            .iter()
            .find(|(raw, _)| parse_patch_path(raw).map_or(false, |p| p == *container))
            .map(|(_, types)| types.as_slice())
    }
}

/// Parse an engine config from a YAML string and validate it
pub fn parse_config_str(content: &str) -> Result<EngineConfig> {
    let config: EngineConfig = if content.trim().is_empty() {
        EngineConfig::default()
    } else {
        serde_yaml::from_str(content)?
    };
    config.validate()?;
    Ok(config)
}
