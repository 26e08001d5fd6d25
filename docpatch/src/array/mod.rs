// Array patches - positional edits to an ordered sequence

use crate::document::Value;
use crate::error::PatchError;
use crate::path::PatchPath;
use crate::resolve::{resolve_container, resolve_container_mut};
use std::sync::Arc;

/// Insert `value` at `index`, shifting later items. `index` may equal the length.
pub fn insert(
    root: &mut Value,
    path: &PatchPath,
    index: usize,
    value: Value,
) -> Result<(), PatchError> {
    let len = resolve_container(root, path)?.len();
    if index > len {
        return Err(out_of_bounds(path, "insert", index, len, true));
    }
    resolve_container_mut(root, path)?.insert(index, value);
    Ok(())
}

/// Remove the item at `index`, shifting later items down.
pub fn remove(root: &mut Value, path: &PatchPath, index: usize) -> Result<(), PatchError> {
    let len = resolve_container(root, path)?.len();
    if index >= len {
        return Err(out_of_bounds(path, "remove", index, len, false));
    }
    resolve_container_mut(root, path)?.remove(index);
    Ok(())
}

/// Move an item: remove it at `from`, then insert it at `to` in the shortened array.
pub fn move_item(
    root: &mut Value,
    path: &PatchPath,
    from: usize,
    to: usize,
) -> Result<(), PatchError> {
    let len = resolve_container(root, path)?.len();
    if from >= len {
        return Err(out_of_bounds(path, "move from", from, len, false));
    }
    if to >= len {
        return Err(out_of_bounds(path, "move to", to, len, false));
    }
    if from == to {
        return Ok(());
    }
    move_within(resolve_container_mut(root, path)?, from, to);
    Ok(())
}

/// Update the item at `index`.
///
/// Object items are shallow-merged with an object `value`; anything else is
/// replaced outright.
pub fn update_item(
    root: &mut Value,
    path: &PatchPath,
    index: usize,
    value: Value,
) -> Result<(), PatchError> {
    let len = resolve_container(root, path)?.len();
    if index >= len {
        return Err(out_of_bounds(path, "update", index, len, false));
    }
    let items = resolve_container_mut(root, path)?;
    merge_or_replace(&mut items[index], value);
    Ok(())
}

/// Remove-then-insert reorder. Both indices must already be in bounds.
pub(crate) fn move_within(items: &mut Vec<Value>, from: usize, to: usize) {
    let item = items.remove(from);
    items.insert(to, item);
}

fn merge_or_replace(existing: &mut Value, value: Value) {
    match (existing, value) {
        (Value::Object(current), Value::Object(patch)) => {
            let current = Arc::make_mut(current);
            for (key, field) in patch.iter() {
                current.insert(key.clone(), field.clone());
            }
        }
        (existing, value) => *existing = value,
    }
}

fn out_of_bounds(
    path: &PatchPath,
    op: &str,
    index: usize,
    len: usize,
    inclusive: bool,
) -> PatchError {
    let range = if inclusive {
        format!("0..={len}")
    } else {
        format!("0..{len}")
    };
    PatchError::index_out_of_bounds(
        path.to_string(),
        format!("{op} index {index} is outside {range} for '{path}' (length {len})"),
    )
}
