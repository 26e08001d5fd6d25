// Patch paths - parsing `sections[2].title` style addresses into steps

use crate::error::PatchError;
use std::fmt;
use std::str::FromStr;

/// One navigation step of a patch path.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PathStep {
    /// Descend into an object by key
    Field(String),
    /// Descend into an array by zero-based position
    Index(usize),
}

impl fmt::Display for PathStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathStep::Field(name) => f.write_str(name),
            PathStep::Index(index) => write!(f, "[{index}]"),
        }
    }
}

/// A parsed, ordered sequence of navigation steps.
///
/// The empty path addresses the document root.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct PatchPath {
    steps: Vec<PathStep>,
}

impl PatchPath {
    pub fn root() -> Self {
        PatchPath { steps: Vec::new() }
    }

    pub fn new(steps: Vec<PathStep>) -> Self {
        PatchPath { steps }
    }

    /// Parse a path string such as `blocks[0].caption`.
    pub fn parse(raw: &str) -> Result<Self, PatchError> {
        parse_patch_path(raw)
    }

    pub fn steps(&self) -> &[PathStep] {
        &self.steps
    }

    pub fn is_root(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn first(&self) -> Option<&PathStep> {
        self.steps.first()
    }

    pub fn split_last(&self) -> Option<(&PathStep, &[PathStep])> {
        self.steps.split_last()
    }

    /// The path made of the first `len` steps.
    pub fn prefix(&self, len: usize) -> PatchPath {
        PatchPath {
            steps: self.steps[..len.min(self.steps.len())].to_vec(),
        }
    }

    pub fn child(&self, step: PathStep) -> PatchPath {
        let mut steps = self.steps.clone();
        steps.push(step);
        PatchPath { steps }
    }
}

impl fmt::Display for PatchPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, step) in self.steps.iter().enumerate() {
            if i > 0 && matches!(step, PathStep::Field(_)) {
                f.write_str(".")?;
            }
            write!(f, "{step}")?;
        }
        Ok(())
    }
}

impl FromStr for PatchPath {
    type Err = PatchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_patch_path(s)
    }
}

/// Parse a raw path string into a [`PatchPath`].
///
/// Segments are separated by `.`; each is a field name optionally followed
/// by bracketed indices (`items[0][1]`), or bare indices (`[3]`). Empty
/// segments, unbalanced brackets and non-numeric or negative indices fail
/// with `InvalidPath`.
pub fn parse_patch_path(raw: &str) -> Result<PatchPath, PatchError> {
    if raw.is_empty() {
        return Ok(PatchPath::root());
    }

    let mut steps = Vec::new();
    for segment in raw.split('.') {
        if segment.is_empty() {
            return Err(PatchError::invalid_path(raw, "empty path segment"));
        }

        let (name, mut rest) = match segment.find('[') {
            Some(pos) => segment.split_at(pos),
            None => (segment, ""),
        };

        if name.contains(']') {
            return Err(PatchError::invalid_path(
                raw,
                format!("unbalanced ']' in segment '{segment}'"),
            ));
        }
        if !name.is_empty() {
            steps.push(PathStep::Field(name.to_string()));
        }

        while !rest.is_empty() {
            let close = rest.find(']').ok_or_else(|| {
                PatchError::invalid_path(raw, format!("unbalanced '[' in segment '{segment}'"))
            })?;
            steps.push(PathStep::Index(parse_index(raw, &rest[1..close])?));

            rest = &rest[close + 1..];
            if !rest.is_empty() && !rest.starts_with('[') {
                return Err(PatchError::invalid_path(
                    raw,
                    format!("unexpected '{rest}' after index in segment '{segment}'"),
                ));
            }
        }
    }

    Ok(PatchPath { steps })
}

fn parse_index(raw: &str, inner: &str) -> Result<usize, PatchError> {
    if inner.is_empty() {
        return Err(PatchError::invalid_path(raw, "empty index '[]'"));
    }
    if inner.starts_with('-') {
        return Err(PatchError::invalid_path(
            raw,
            format!("negative index '[{inner}]'"),
        ));
    }
    if !inner.bytes().all(|b| b.is_ascii_digit()) {
        return Err(PatchError::invalid_path(
            raw,
            format!("index '[{inner}]' is not a non-negative integer"),
        ));
    }
    inner
        .parse::<usize>()
        .map_err(|_| PatchError::invalid_path(raw, format!("index '[{inner}]' is too large")))
}
