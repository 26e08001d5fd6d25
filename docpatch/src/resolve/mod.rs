// Path resolution - walking a document to the container a patch mutates

use crate::document::{Map, Value};
use crate::error::PatchError;
use crate::path::{PatchPath, PathStep};
use std::sync::Arc;

/// A resolved location: the immediate parent container plus the final step.
///
/// Produced by [`resolve`] without touching the document.
#[derive(Debug, Clone, Copy)]
pub struct Target<'a> {
    pub parent: &'a Value,
    pub step: &'a PathStep,
}

impl<'a> Target<'a> {
    /// The value currently stored at the target, if any.
    pub fn get(&self) -> Option<&'a Value> {
        match (self.step, self.parent) {
            (PathStep::Field(key), Value::Object(map)) => map.get(key),
            (PathStep::Index(index), Value::Array(items)) => items.get(*index),
            _ => None,
        }
    }

    /// Length of the parent when it is an array.
    pub fn parent_len(&self) -> Option<usize> {
        self.parent.as_array().map(|items| items.len())
    }
}

/// A writable location inside a document, handed to patch handlers.
///
/// The containers leading to it have already been unshared.
#[derive(Debug)]
pub enum Slot<'a> {
    Field { map: &'a mut Map, key: &'a str },
    Index { items: &'a mut Vec<Value>, index: usize },
}

impl<'a> Slot<'a> {
    /// Store `value` at the slot, returning what was there.
    ///
    /// Field slots insert the key when missing. Index slots must be in bounds.
    pub fn replace(self, value: Value) -> Option<Value> {
        match self {
            Slot::Field { map, key } => map.insert(key.to_string(), value),
            Slot::Index { items, index } => Some(std::mem::replace(&mut items[index], value)),
        }
    }
}

/// Resolve `path` to its parent container and final step.
///
/// Fails with `InvalidPath` for the root path, `PathNotFound` when an
/// intermediate container is missing and `TypeMismatch` when a step does
/// not fit the container it meets.
pub fn resolve<'a>(root: &'a Value, path: &'a PatchPath) -> Result<Target<'a>, PatchError> {
    let (last, parents) = path
        .split_last()
        .ok_or_else(|| PatchError::invalid_path("", "the document root has no parent container"))?;

    let mut current = root;
    for (depth, step) in parents.iter().enumerate() {
        current = step_into(current, step, path, depth)?;
    }
    check_container(current, last, path, parents.len())?;

    Ok(Target {
        parent: current,
        step: last,
    })
}

/// Copy-on-write counterpart of [`resolve`].
pub fn resolve_mut<'a>(root: &'a mut Value, path: &'a PatchPath) -> Result<Slot<'a>, PatchError> {
    let (last, parents) = path
        .split_last()
        .ok_or_else(|| PatchError::invalid_path("", "the document root has no parent container"))?;

    let mut current = root;
    for (depth, step) in parents.iter().enumerate() {
        current = step_into_mut(current, step, path, depth)?;
    }

    match (last, current) {
        (PathStep::Field(key), Value::Object(map)) => Ok(Slot::Field {
            map: Arc::make_mut(map),
            key,
        }),
        (PathStep::Index(index), Value::Array(items)) => Ok(Slot::Index {
            items: Arc::make_mut(items),
            index: *index,
        }),
        (_, Value::Null) => Err(missing_container(path, parents.len())),
        (step, other) => Err(step_mismatch(path, parents.len(), step, other)),
    }
}

/// Read the value at `path`, or `None` when any step is missing.
pub fn get<'a>(root: &'a Value, path: &PatchPath) -> Option<&'a Value> {
    let mut current = root;
    for step in path.steps() {
        current = match (step, current) {
            (PathStep::Field(key), Value::Object(map)) => map.get(key)?,
            (PathStep::Index(index), Value::Array(items)) => items.get(*index)?,
            _ => return None,
        };
    }
    Some(current)
}

/// Resolve the array that `path` itself points at.
pub fn resolve_container<'a>(root: &'a Value, path: &PatchPath) -> Result<&'a [Value], PatchError> {
    let mut current = root;
    for (depth, step) in path.steps().iter().enumerate() {
        current = step_into(current, step, path, depth)?;
    }
    match current {
        Value::Array(items) => Ok(items.as_slice()),
        other => Err(not_an_array(path, other)),
    }
}

/// Copy-on-write counterpart of [`resolve_container`].
pub fn resolve_container_mut<'a>(
    root: &'a mut Value,
    path: &PatchPath,
) -> Result<&'a mut Vec<Value>, PatchError> {
    let mut current = root;
    for (depth, step) in path.steps().iter().enumerate() {
        current = step_into_mut(current, step, path, depth)?;
    }
    match current {
        Value::Array(items) => Ok(Arc::make_mut(items)),
        other => Err(not_an_array(path, other)),
    }
}

fn not_an_array(path: &PatchPath, found: &Value) -> PatchError {
    PatchError::type_mismatch(
        path.to_string(),
        format!("expected an array at '{path}', found {}", found.kind()),
    )
}

/// Check that `step` can address a slot of `container`.
fn check_container(
    container: &Value,
    step: &PathStep,
    path: &PatchPath,
    depth: usize,
) -> Result<(), PatchError> {
    match (step, container) {
        (PathStep::Field(_), Value::Object(_)) | (PathStep::Index(_), Value::Array(_)) => Ok(()),
        (_, Value::Null) => Err(missing_container(path, depth)),
        (step, other) => Err(step_mismatch(path, depth, step, other)),
    }
}

fn step_into<'v>(
    current: &'v Value,
    step: &PathStep,
    path: &PatchPath,
    depth: usize,
) -> Result<&'v Value, PatchError> {
    check_container(current, step, path, depth)?;
    let next = match (step, current) {
        (PathStep::Field(key), Value::Object(map)) => map.get(key),
        (PathStep::Index(index), Value::Array(items)) => items.get(*index),
        _ => None,
    };
    next.ok_or_else(|| missing_container(path, depth + 1))
}

fn step_into_mut<'v>(
    current: &'v mut Value,
    step: &PathStep,
    path: &PatchPath,
    depth: usize,
) -> Result<&'v mut Value, PatchError> {
    check_container(current, step, path, depth)?;
    let found = match (step, &*current) {
        (PathStep::Field(key), Value::Object(map)) => map.contains_key(key),
        (PathStep::Index(index), Value::Array(items)) => *index < items.len(),
        _ => false,
    };
    if !found {
        return Err(missing_container(path, depth + 1));
    }

    let next = match (step, current) {
        (PathStep::Field(key), Value::Object(map)) => Arc::make_mut(map).get_mut(key),
        (PathStep::Index(index), Value::Array(items)) => Arc::make_mut(items).get_mut(*index),
        _ => None,
    };
    next.ok_or_else(|| missing_container(path, depth + 1))
}

fn missing_container(path: &PatchPath, depth: usize) -> PatchError {
    PatchError::path_not_found(
        path.to_string(),
        format!("no container at '{}'", path.prefix(depth)),
    )
}

fn step_mismatch(path: &PatchPath, depth: usize, step: &PathStep, found: &Value) -> PatchError {
    let expected = match step {
        PathStep::Field(_) => "an object",
        PathStep::Index(_) => "an array",
    };
    let at = path.prefix(depth);
    let location = if at.is_root() {
        "the document root".to_string()
    } else {
        format!("'{at}'")
    };
    PatchError::type_mismatch(
        path.to_string(),
        format!(
            "step '{step}' expects {expected} at {location}, found {}",
            found.kind()
        ),
    )
}
