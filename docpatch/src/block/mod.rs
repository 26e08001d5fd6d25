// Block patches - identity-addressed edits to polymorphic block lists
//
// A block is an object element of a block list that carries an id and a type
// discriminator next to its own fields, e.g.
// `{"id": "photo_1", "type": "photo", "alt": "..."}`. The key names come from
// `EngineConfig`.

use crate::array::move_within;
use crate::config::{EngineConfig, IdStrategy};
use crate::document::{Map, Value};
use crate::error::PatchError;
use crate::field;
use crate::patch::BlockPosition;
use crate::path::{parse_patch_path, PatchPath, PathStep};
use crate::resolve::{resolve_container, resolve_container_mut};
use std::collections::HashSet;

/// Add a block of `block_type` built from the object `value`.
///
/// An id is generated when `value` carries none.
pub fn add(
    root: &mut Value,
    config: &EngineConfig,
    path: &PatchPath,
    block_type: &str,
    value: Value,
    position: &BlockPosition,
) -> Result<(), PatchError> {
    if block_type.trim().is_empty() {
        return Err(PatchError::type_mismatch(
            path.to_string(),
            "block type must be a non-empty string",
        ));
    }
    if let Some(allowed) = config.allowed_block_types_for(path) {
        if !allowed.iter().any(|t| t == block_type) {
            return Err(PatchError::type_mismatch(
                path.to_string(),
                format!("block type '{block_type}' is not allowed at '{path}' (allowed: {allowed:?})"),
            ));
        }
    }

    let fields = match value {
        Value::Object(fields) => fields,
        Value::Null => Default::default(),
        other => {
            return Err(PatchError::type_mismatch(
                path.to_string(),
                format!("block value must be an object, found {}", other.kind()),
            ))
        }
    };
    let supplied_id = supplied_id(&fields, config, path)?;

    let items = resolve_container(root, path)?;
    if let Some(id) = &supplied_id {
        if find_block(items, &config.block_id_key, id).is_some() {
            return Err(PatchError::type_mismatch(
                path.to_string(),
                format!("a block with id '{id}' already exists at '{path}'"),
            ));
        }
    }

    let at = match position {
        BlockPosition::Start => 0,
        BlockPosition::End => items.len(),
        BlockPosition::After(anchor) => {
            find_block(items, &config.block_id_key, anchor)
                .ok_or_else(|| missing_block(path, anchor))?
                + 1
        }
    };
    let id = match supplied_id {
        Some(id) => id,
        None => generate_block_id(config, block_type, items),
    };

    let mut block = Map::with_capacity(fields.len() + 2);
    block.insert(config.block_id_key.clone(), Value::String(id));
    block.insert(
        config.block_type_key.clone(),
        Value::String(block_type.to_string()),
    );
    for (key, entry) in fields.iter() {
        if *key != config.block_id_key && *key != config.block_type_key {
            block.insert(key.clone(), entry.clone());
        }
    }

    resolve_container_mut(root, path)?.insert(at, Value::object(block));
    Ok(())
}

/// Remove the block with `block_id`.
pub fn remove(
    root: &mut Value,
    config: &EngineConfig,
    path: &PatchPath,
    block_id: &str,
) -> Result<(), PatchError> {
    let index = locate(root, config, path, block_id)?;
    resolve_container_mut(root, path)?.remove(index);
    Ok(())
}

/// Move the block with `block_id` to `to_index` (remove-then-insert).
pub fn move_block(
    root: &mut Value,
    config: &EngineConfig,
    path: &PatchPath,
    block_id: &str,
    to_index: usize,
) -> Result<(), PatchError> {
    let index = locate(root, config, path, block_id)?;
    let len = resolve_container(root, path)?.len();
    if to_index >= len {
        return Err(PatchError::index_out_of_bounds(
            path.to_string(),
            format!("move to index {to_index} is outside 0..{len} for '{path}' (length {len})"),
        ));
    }
    if index != to_index {
        move_within(resolve_container_mut(root, path)?, index, to_index);
    }
    Ok(())
}

/// Set the field at `field_path` inside the block with `block_id`.
///
/// Block lookup and field resolution both run against the snapshot before
/// anything is written.
pub fn update_field(
    root: &mut Value,
    config: &EngineConfig,
    path: &PatchPath,
    block_id: &str,
    field_path: &str,
    value: Value,
) -> Result<(), PatchError> {
    let field_path = parse_patch_path(field_path)?;
    match field_path.first() {
        None => {
            return Err(PatchError::invalid_path(
                path.to_string(),
                "fieldPath must name a field inside the block",
            ))
        }
        Some(PathStep::Field(key))
            if *key == config.block_id_key || *key == config.block_type_key =>
        {
            return Err(PatchError::invalid_path(
                path.to_string(),
                format!("'{key}' identifies the block and cannot be updated"),
            ))
        }
        Some(_) => {}
    }

    let index = locate(root, config, path, block_id)?;
    field::check_set(&resolve_container(root, path)?[index], &field_path)
        .map_err(|e| scoped_to_block(e, path, block_id))?;

    let items = resolve_container_mut(root, path)?;
    field::set(&mut items[index], &field_path, value)
        .map_err(|e| scoped_to_block(e, path, block_id))
}

/// Position of the block with `id` in `items`, by linear scan.
pub fn find_block(items: &[Value], id_key: &str, id: &str) -> Option<usize> {
    items
        .iter()
        .position(|item| item.get(id_key).and_then(Value::as_str) == Some(id))
}

fn locate(
    root: &Value,
    config: &EngineConfig,
    path: &PatchPath,
    block_id: &str,
) -> Result<usize, PatchError> {
    let items = resolve_container(root, path)?;
    find_block(items, &config.block_id_key, block_id).ok_or_else(|| missing_block(path, block_id))
}

/// The id carried by a new block's value; missing, null and empty mean none.
fn supplied_id(
    fields: &Map,
    config: &EngineConfig,
    path: &PatchPath,
) -> Result<Option<String>, PatchError> {
    match fields.get(&config.block_id_key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(id)) if id.is_empty() => Ok(None),
        Some(Value::String(id)) => Ok(Some(id.clone())),
        Some(other) => Err(PatchError::type_mismatch(
            path.to_string(),
            format!(
                "block id '{}' must be a string, found {}",
                config.block_id_key,
                other.kind()
            ),
        )),
    }
}

/// Mint an id that no block in `items` uses yet.
fn generate_block_id(config: &EngineConfig, block_type: &str, items: &[Value]) -> String {
    let taken: HashSet<&str> = items
        .iter()
        .filter_map(|item| item.get(&config.block_id_key).and_then(Value::as_str))
        .collect();

    match config.id_strategy {
        IdStrategy::Sequential => (1..)
            .map(|n| format!("{block_type}_{n}"))
            .find(|id| !taken.contains(id.as_str()))
            .unwrap_or_default(),
        strategy => loop {
            let id = match strategy {
                IdStrategy::Ulid => ulid::Ulid::new().to_string().to_lowercase(),
                IdStrategy::Uuid => uuid::Uuid::new_v4().to_string(),
                _ => nanoid::nanoid!(),
            };
            if !taken.contains(id.as_str()) {
                break id;
            }
        },
    }
}

fn missing_block(path: &PatchPath, id: &str) -> PatchError {
    PatchError::block_not_found(
        path.to_string(),
        format!("no block with id '{id}' at '{path}'"),
    )
}

fn scoped_to_block(err: PatchError, path: &PatchPath, block_id: &str) -> PatchError {
    PatchError {
        message: format!("in block '{block_id}' at '{path}': {}", err.message),
        ..err
    }
}
