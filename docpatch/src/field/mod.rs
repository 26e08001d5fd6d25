// Field patches - set and clear a single addressed field

use crate::document::Value;
use crate::error::PatchError;
use crate::path::{PatchPath, PathStep};
use crate::resolve::{resolve, resolve_mut, Target};

/// Replace the value at `path`. Object values replace the whole subtree.
pub fn set(root: &mut Value, path: &PatchPath, value: Value) -> Result<(), PatchError> {
    check_set(root, path)?;
    resolve_mut(root, path)?.replace(value);
    Ok(())
}

/// Replace the value at `path` with null. The key must already exist.
pub fn clear(root: &mut Value, path: &PatchPath) -> Result<(), PatchError> {
    check_clear(root, path)?;
    resolve_mut(root, path)?.replace(Value::Null);
    Ok(())
}

/// Validate a `set` against the snapshot without writing anything.
pub(crate) fn check_set(root: &Value, path: &PatchPath) -> Result<(), PatchError> {
    let target = resolve(root, path)?;
    match target.get() {
        Some(existing) => reject_container(path, existing),
        None => check_index_in_bounds(path, &target),
    }
}

fn check_clear(root: &Value, path: &PatchPath) -> Result<(), PatchError> {
    let target = resolve(root, path)?;
    match (target.step, target.get()) {
        (_, Some(existing)) => reject_container(path, existing),
        (PathStep::Field(key), None) => Err(PatchError::field_not_found(
            path.to_string(),
            format!("field '{key}' does not exist"),
        )),
        (PathStep::Index(_), None) => check_index_in_bounds(path, &target),
    }
}

/// Arrays hold list or block content and are only changed by array/block patches.
fn reject_container(path: &PatchPath, existing: &Value) -> Result<(), PatchError> {
    if existing.is_array() {
        return Err(PatchError::type_mismatch(
            path.to_string(),
            format!("'{path}' holds an array; use array or block patches to change it"),
        ));
    }
    Ok(())
}

fn check_index_in_bounds(path: &PatchPath, target: &Target<'_>) -> Result<(), PatchError> {
    match (target.step, target.parent_len()) {
        (PathStep::Index(index), Some(len)) if *index >= len => {
            Err(PatchError::index_out_of_bounds(
                path.to_string(),
                format!("index {index} is out of bounds (length {len})"),
            ))
        }
        _ => Ok(()),
    }
}
