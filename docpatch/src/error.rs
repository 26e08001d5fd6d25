use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Structural failure kinds a single patch can report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    InvalidPath,
    PathNotFound,
    TypeMismatch,
    IndexOutOfBounds,
    FieldNotFound,
    BlockNotFound,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::InvalidPath => "INVALID_PATH",
            ErrorKind::PathNotFound => "PATH_NOT_FOUND",
            ErrorKind::TypeMismatch => "TYPE_MISMATCH",
            ErrorKind::IndexOutOfBounds => "INDEX_OUT_OF_BOUNDS",
            ErrorKind::FieldNotFound => "FIELD_NOT_FOUND",
            ErrorKind::BlockNotFound => "BLOCK_NOT_FOUND",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Failure of one patch in a batch. Collected, never raised for the batch.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[error("{code} at '{path}': {message}")]
pub struct PatchError {
    pub path: String,
    pub message: String,
    pub code: ErrorKind,
    /// Position of the failing patch in its batch, set by the orchestrator.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index: Option<usize>,
}

impl PatchError {
    pub fn new(code: ErrorKind, path: impl Into<String>, message: impl Into<String>) -> Self {
        PatchError {
            path: path.into(),
            message: message.into(),
            code,
            index: None,
        }
    }

    pub fn invalid_path(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidPath, path, message)
    }

    pub fn path_not_found(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(ErrorKind::PathNotFound, path, message)
    }

    pub fn type_mismatch(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(ErrorKind::TypeMismatch, path, message)
    }

    pub fn index_out_of_bounds(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(ErrorKind::IndexOutOfBounds, path, message)
    }

    pub fn field_not_found(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(ErrorKind::FieldNotFound, path, message)
    }

    pub fn block_not_found(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(ErrorKind::BlockNotFound, path, message)
    }

    /// Re-attach the error to the patch that produced it.
    pub(crate) fn for_patch(mut self, index: usize, path: &str) -> Self {
        self.index = Some(index);
        self.path = path.to_string();
        self
    }
}

/// Hard failures raised before or outside batch orchestration.
#[derive(Error, Debug)]
pub enum DocPatchError {
    #[error("Invalid patch list: {0}")]
    PatchList(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error(transparent)]
    Patch(#[from] PatchError),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, DocPatchError>;
