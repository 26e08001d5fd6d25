// Patch model - the closed set of document edits and their wire format

use crate::document::Value;
use crate::error::{DocPatchError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One typed edit against a document.
///
/// `path` always names the container being changed: the field's parent for
/// field patches, the array for array patches, the block list for block
/// patches. Paths are kept as strings so malformed ones fail per patch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum DocumentPatch {
    #[serde(rename = "field.set")]
    FieldSet { path: String, value: Value },

    #[serde(rename = "field.clear")]
    FieldClear { path: String },

    #[serde(rename = "array.insert")]
    ArrayInsert {
        path: String,
        index: usize,
        value: Value,
    },

    #[serde(rename = "array.remove")]
    ArrayRemove { path: String, index: usize },

    #[serde(rename = "array.move")]
    ArrayMove {
        path: String,
        #[serde(rename = "fromIndex")]
        from_index: usize,
        #[serde(rename = "toIndex")]
        to_index: usize,
    },

    #[serde(rename = "array.update-item")]
    ArrayUpdateItem {
        path: String,
        index: usize,
        value: Value,
    },

    #[serde(rename = "block.add")]
    BlockAdd {
        path: String,
        #[serde(rename = "blockType")]
        block_type: String,
        #[serde(default)]
        value: Value,
        #[serde(default)]
        position: BlockPosition,
    },

    #[serde(rename = "block.remove")]
    BlockRemove {
        path: String,
        #[serde(rename = "blockId")]
        block_id: String,
    },

    #[serde(rename = "block.move")]
    BlockMove {
        path: String,
        #[serde(rename = "blockId")]
        block_id: String,
        #[serde(rename = "toIndex")]
        to_index: usize,
    },

    #[serde(rename = "block.update-field")]
    BlockUpdateField {
        path: String,
        #[serde(rename = "blockId")]
        block_id: String,
        #[serde(rename = "fieldPath")]
        field_path: String,
        value: Value,
    },
}

impl DocumentPatch {
    pub fn field_set(path: impl Into<String>, value: impl Into<Value>) -> Self {
        DocumentPatch::FieldSet {
            path: path.into(),
            value: value.into(),
        }
    }

    pub fn field_clear(path: impl Into<String>) -> Self {
        DocumentPatch::FieldClear { path: path.into() }
    }

    pub fn array_insert(path: impl Into<String>, index: usize, value: impl Into<Value>) -> Self {
        DocumentPatch::ArrayInsert {
            path: path.into(),
            index,
            value: value.into(),
        }
    }

    pub fn array_remove(path: impl Into<String>, index: usize) -> Self {
        DocumentPatch::ArrayRemove {
            path: path.into(),
            index,
        }
    }

    pub fn array_move(path: impl Into<String>, from_index: usize, to_index: usize) -> Self {
        DocumentPatch::ArrayMove {
            path: path.into(),
            from_index,
            to_index,
        }
    }

    pub fn array_update_item(
        path: impl Into<String>,
        index: usize,
        value: impl Into<Value>,
    ) -> Self {
        DocumentPatch::ArrayUpdateItem {
            path: path.into(),
            index,
            value: value.into(),
        }
    }

    pub fn block_add(
        path: impl Into<String>,
        block_type: impl Into<String>,
        value: impl Into<Value>,
        position: BlockPosition,
    ) -> Self {
        DocumentPatch::BlockAdd {
            path: path.into(),
            block_type: block_type.into(),
            value: value.into(),
            position,
        }
    }

    pub fn block_remove(path: impl Into<String>, block_id: impl Into<String>) -> Self {
        DocumentPatch::BlockRemove {
            path: path.into(),
            block_id: block_id.into(),
        }
    }

    pub fn block_move(path: impl Into<String>, block_id: impl Into<String>, to_index: usize) -> Self {
        DocumentPatch::BlockMove {
            path: path.into(),
            block_id: block_id.into(),
            to_index,
        }
    }

    pub fn block_update_field(
        path: impl Into<String>,
        block_id: impl Into<String>,
        field_path: impl Into<String>,
        value: impl Into<Value>,
    ) -> Self {
        DocumentPatch::BlockUpdateField {
            path: path.into(),
            block_id: block_id.into(),
            field_path: field_path.into(),
            value: value.into(),
        }
    }

    /// The raw container path this patch addresses.
    pub fn path(&self) -> &str {
        match self {
            DocumentPatch::FieldSet { path, .. }
            | DocumentPatch::FieldClear { path }
            | DocumentPatch::ArrayInsert { path, .. }
            | DocumentPatch::ArrayRemove { path, .. }
            | DocumentPatch::ArrayMove { path, .. }
            | DocumentPatch::ArrayUpdateItem { path, .. }
            | DocumentPatch::BlockAdd { path, .. }
            | DocumentPatch::BlockRemove { path, .. }
            | DocumentPatch::BlockMove { path, .. }
            | DocumentPatch::BlockUpdateField { path, .. } => path,
        }
    }

    /// The wire tag of this patch, e.g. `array.move`.
    pub fn kind(&self) -> &'static str {
        match self {
            DocumentPatch::FieldSet { .. } => "field.set",
            DocumentPatch::FieldClear { .. } => "field.clear",
            DocumentPatch::ArrayInsert { .. } => "array.insert",
            DocumentPatch::ArrayRemove { .. } => "array.remove",
            DocumentPatch::ArrayMove { .. } => "array.move",
            DocumentPatch::ArrayUpdateItem { .. } => "array.update-item",
            DocumentPatch::BlockAdd { .. } => "block.add",
            DocumentPatch::BlockRemove { .. } => "block.remove",
            DocumentPatch::BlockMove { .. } => "block.move",
            DocumentPatch::BlockUpdateField { .. } => "block.update-field",
        }
    }
}

/// Where `block.add` places the new block.
///
/// Serialized as `"start"`, `"end"` or `"after:<blockId>"`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum BlockPosition {
    Start,
    #[default]
    End,
    After(String),
}

impl FromStr for BlockPosition {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "start" => Ok(BlockPosition::Start),
            "end" => Ok(BlockPosition::End),
            other => match other.strip_prefix("after:") {
                Some("") => Err("position 'after:' needs a block id".to_string()),
                Some(id) => Ok(BlockPosition::After(id.to_string())),
                None => Err(format!(
                    "unknown block position '{other}' (expected start, end or after:<id>)"
                )),
            },
        }
    }
}

impl TryFrom<String> for BlockPosition {
    type Error = String;

    fn try_from(value: String) -> std::result::Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<BlockPosition> for String {
    fn from(position: BlockPosition) -> Self {
        position.to_string()
    }
}

impl fmt::Display for BlockPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BlockPosition::Start => f.write_str("start"),
            BlockPosition::End => f.write_str("end"),
            BlockPosition::After(id) => write!(f, "after:{id}"),
        }
    }
}

/// Parse a JSON array of patches.
///
/// A malformed list is a hard error raised before any patch is applied;
/// the message names the offending entry.
pub fn parse_patches_json(content: &str) -> Result<Vec<DocumentPatch>> {
    let entries: Vec<serde_json::Value> = serde_json::from_str(content)?;
    entries
        .into_iter()
        .enumerate()
        .map(|(i, entry)| {
            serde_json::from_value(entry)
                .map_err(|e| DocPatchError::PatchList(format!("patch #{i}: {e}")))
        })
        .collect()
}

/// Parse a YAML sequence of patches.
pub fn parse_patches_yaml(content: &str) -> Result<Vec<DocumentPatch>> {
    let entries: Vec<serde_yaml::Value> = serde_yaml::from_str(content)?;
    entries
        .into_iter()
        .enumerate()
        .map(|(i, entry)| {
            serde_yaml::from_value(entry)
                .map_err(|e| DocPatchError::PatchList(format!("patch #{i}: {e}")))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_deserialize_every_kind() {
        let patches = parse_patches_json(
            r#"[
                {"kind": "field.set", "path": "title", "value": "New"},
                {"kind": "field.clear", "path": "subtitle"},
                {"kind": "array.insert", "path": "tags", "index": 0, "value": "a"},
                {"kind": "array.remove", "path": "tags", "index": 1},
                {"kind": "array.move", "path": "tags", "fromIndex": 0, "toIndex": 2},
                {"kind": "array.update-item", "path": "rows", "index": 0, "value": {"a": 1}},
                {"kind": "block.add", "path": "blocks", "blockType": "photo", "value": {"alt": "x"}, "position": "after:b1"},
                {"kind": "block.remove", "path": "blocks", "blockId": "b1"},
                {"kind": "block.move", "path": "blocks", "blockId": "b2", "toIndex": 0},
                {"kind": "block.update-field", "path": "blocks", "blockId": "b2", "fieldPath": "caption", "value": "Hi"}
            ]"#,
        )
        .unwrap();

        let kinds: Vec<_> = patches.iter().map(|p| p.kind()).collect();
        assert_eq!(
            kinds,
            vec![
                "field.set",
                "field.clear",
                "array.insert",
                "array.remove",
                "array.move",
                "array.update-item",
                "block.add",
                "block.remove",
                "block.move",
                "block.update-field",
            ]
        );
        assert_eq!(patches[4], DocumentPatch::array_move("tags", 0, 2));
        assert_eq!(
            patches[6],
            DocumentPatch::block_add(
                "blocks",
                "photo",
                json!({"alt": "x"}),
                BlockPosition::After("b1".into())
            )
        );
    }

    #[test]
    fn test_block_add_defaults() {
        let patches =
            parse_patches_json(r#"[{"kind": "block.add", "path": "blocks", "blockType": "divider"}]"#)
                .unwrap();
        assert_eq!(
            patches[0],
            DocumentPatch::BlockAdd {
                path: "blocks".into(),
                block_type: "divider".into(),
                value: Value::Null,
                position: BlockPosition::End,
            }
        );
    }

    #[test]
    fn test_serialize_uses_wire_names() {
        let patch = DocumentPatch::block_update_field("blocks", "b1", "caption", "Hi");
        let json = serde_json::to_value(&patch).unwrap();
        assert_eq!(
            json,
            json!({
                "kind": "block.update-field",
                "path": "blocks",
                "blockId": "b1",
                "fieldPath": "caption",
                "value": "Hi"
            })
        );
    }

    #[test]
    fn test_position_parsing() {
        assert_eq!("start".parse::<BlockPosition>(), Ok(BlockPosition::Start));
        assert_eq!("end".parse::<BlockPosition>(), Ok(BlockPosition::End));
        assert_eq!(
            "after:hero_1".parse::<BlockPosition>(),
            Ok(BlockPosition::After("hero_1".into()))
        );
        assert!("after:".parse::<BlockPosition>().is_err());
        assert!("middle".parse::<BlockPosition>().is_err());
        assert_eq!(BlockPosition::After("x".into()).to_string(), "after:x");
    }

    #[test]
    fn test_malformed_list_names_entry() {
        let err = parse_patches_json(
            r#"[{"kind": "field.set", "path": "a", "value": 1}, {"kind": "field.explode", "path": "a"}]"#,
        )
        .unwrap_err();
        match err {
            DocPatchError::PatchList(msg) => assert!(msg.starts_with("patch #1"), "{msg}"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_negative_index_rejected_up_front() {
        let err = parse_patches_json(r#"[{"kind": "array.remove", "path": "a", "index": -1}]"#)
            .unwrap_err();
        assert!(matches!(err, DocPatchError::PatchList(_)));
    }

    #[test]
    fn test_not_a_list() {
        let err = parse_patches_json(r#"{"kind": "field.clear", "path": "a"}"#).unwrap_err();
        assert!(matches!(err, DocPatchError::Json(_)));
    }

    #[test]
    fn test_parse_yaml_batch() {
        let patches = parse_patches_yaml(
            r#"
- kind: field.set
  path: seo.title
  value: { text: Hello, draft: true }
- kind: block.move
  path: layout
  blockId: hero_1
  toIndex: 2
"#,
        )
        .unwrap();
        assert_eq!(patches.len(), 2);
        assert_eq!(
            patches[0],
            DocumentPatch::field_set("seo.title", json!({"text": "Hello", "draft": true}))
        );
        assert_eq!(patches[1], DocumentPatch::block_move("layout", "hero_1", 2));
    }
}
