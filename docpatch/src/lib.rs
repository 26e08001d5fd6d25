//! Typed, path-addressed patches for structured content documents.
//!
//! A batch of [`DocumentPatch`]es is applied to an immutable [`Document`]
//! snapshot with [`apply_patches`] (or a configured [`PatchEngine`]). Each
//! patch either applies fully or is reported in the result's `errors`; the
//! returned document is always well formed.
//!
//! ```
//! use docpatch::{apply_patches, Document, DocumentPatch};
//!
//! let doc = Document::from(serde_json::json!({"title": "Old", "tags": ["a", "b", "c"]}));
//! let result = apply_patches(
//!     &doc,
//!     &[
//!         DocumentPatch::field_set("title", "New"),
//!         DocumentPatch::array_move("tags", 0, 2),
//!     ],
//! );
//!
//! assert!(result.is_ok());
//! assert_eq!(
//!     result.document.to_json(),
//!     serde_json::json!({"title": "New", "tags": ["b", "c", "a"]})
//! );
//! ```

pub mod apply;
pub mod array;
pub mod block;
pub mod config;
pub mod document;
pub mod error;
pub mod field;
pub mod patch;
pub mod path;
pub mod resolve;

pub use apply::{apply_patches, ApplyPatchesResult, PatchEngine};
pub use config::{parse_config_str, EngineConfig, IdStrategy};
pub use document::{Document, Map, Value, ValueKind};
pub use error::{DocPatchError, ErrorKind, PatchError, Result};
pub use patch::{parse_patches_json, parse_patches_yaml, BlockPosition, DocumentPatch};
pub use path::{parse_patch_path, PatchPath, PathStep};
pub use resolve::{resolve, Target};
