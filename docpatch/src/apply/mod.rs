// Batch orchestration - folding a patch list over a document snapshot

use crate::array;
use crate::block;
use crate::config::EngineConfig;
use crate::document::{Document, Value};
use crate::error::{PatchError, Result};
use crate::field;
use crate::patch::DocumentPatch;
use crate::path::parse_patch_path;
use serde::{Deserialize, Serialize};

/// Outcome of applying a batch.
///
/// `document` reflects every patch that succeeded, in order; `errors` holds
/// one entry per patch that did not.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApplyPatchesResult {
    pub document: Document,
    pub errors: Vec<PatchError>,
}

impl ApplyPatchesResult {
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }

    /// All-or-nothing view: the document only if every patch applied.
    pub fn into_atomic(self) -> std::result::Result<Document, Vec<PatchError>> {
        if self.errors.is_empty() {
            Ok(self.document)
        } else {
            Err(self.errors)
        }
    }
}

/// Applies patch batches with an explicit configuration.
#[derive(Debug, Clone, Default)]
pub struct PatchEngine {
    config: EngineConfig,
}

impl PatchEngine {
    pub fn new(config: EngineConfig) -> Self {
        PatchEngine { config }
    }

    /// Build an engine from a YAML config string.
    pub fn from_config_str(content: &str) -> Result<Self> {
        Ok(PatchEngine::new(crate::config::parse_config_str(content)?))
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Apply `patches` in order, best effort.
    ///
    /// Each patch runs against a cheap copy of the current snapshot; the copy
    /// replaces the snapshot only if the patch succeeds, so a failing patch
    /// leaves no trace beyond its error.
    pub fn apply(&self, document: &Document, patches: &[DocumentPatch]) -> ApplyPatchesResult {
        let mut current = document.clone();
        let mut errors = Vec::new();

        for (index, patch) in patches.iter().enumerate() {
            let mut next = current.clone();
            match self.apply_one(next.root_mut(), patch) {
                Ok(()) => {
                    log::debug!("Applied patch #{index} {} at '{}'", patch.kind(), patch.path());
                    current = next;
                }
                Err(e) => {
                    let e = e.for_patch(index, patch.path());
                    log::warn!("Rejected patch #{index} {}: {e}", patch.kind());
                    errors.push(e);
                }
            }
        }

        if !errors.is_empty() {
            log::debug!(
                "Batch finished: {} applied, {} rejected",
                patches.len() - errors.len(),
                errors.len()
            );
        }

        ApplyPatchesResult {
            document: current,
            errors,
        }
    }

    fn apply_one(&self, root: &mut Value, patch: &DocumentPatch) -> std::result::Result<(), PatchError> {
        let path = parse_patch_path(patch.path())?;
        let config = &self.config;

        match patch {
            DocumentPatch::FieldSet { value, .. } => field::set(root, &path, value.clone()),
            DocumentPatch::FieldClear { .. } => field::clear(root, &path),
            DocumentPatch::ArrayInsert { index, value, .. } => {
                array::insert(root, &path, *index, value.clone())
            }
            DocumentPatch::ArrayRemove { index, .. } => array::remove(root, &path, *index),
            DocumentPatch::ArrayMove {
                from_index,
                to_index,
                ..
            } => array::move_item(root, &path, *from_index, *to_index),
            DocumentPatch::ArrayUpdateItem { index, value, .. } => {
                array::update_item(root, &path, *index, value.clone())
            }
            DocumentPatch::BlockAdd {
                block_type,
                value,
                position,
                ..
            } => block::add(root, config, &path, block_type, value.clone(), position),
            DocumentPatch::BlockRemove { block_id, .. } => {
                block::remove(root, config, &path, block_id)
            }
            DocumentPatch::BlockMove {
                block_id, to_index, ..
            } => block::move_block(root, config, &path, block_id, *to_index),
            DocumentPatch::BlockUpdateField {
                block_id,
                field_path,
                value,
                ..
            } => block::update_field(root, config, &path, block_id, field_path, value.clone()),
        }
    }
}

/// Apply a batch with the default engine configuration.
pub fn apply_patches(document: &Document, patches: &[DocumentPatch]) -> ApplyPatchesResult {
    PatchEngine::default().apply(document, patches)
}
