//! Sibling-index path addressing
//!
//! A node's position is identified by the sequence of sibling indices from
//! the root sequence down to the node. Paths are valid only against the tree
//! snapshot they were derived from: any structural mutation at or before a
//! given position invalidates paths for siblings at or after the affected
//! index. Callers re-derive paths from a fresh render after every mutation.

use std::fmt;
use std::str::FromStr;

use itertools::Itertools;

use crate::domain::error::{DomainError, DomainResult};

/// Ordered sequence of sibling indices from the root sequence to a node.
///
/// Rendered as dot-separated indices, e.g. `0.2.1`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct NodePath(Vec<usize>);

impl NodePath {
    pub fn new(indices: Vec<usize>) -> Self {
        Self(indices)
    }

    /// The empty path refers to the root sequence itself, not a node.
    pub fn root() -> Self {
        Self(Vec::new())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn indices(&self) -> &[usize] {
        &self.0
    }

    /// Path of the child at `index` below this node.
    pub fn child(&self, index: usize) -> Self {
        let mut indices = self.0.clone();
        indices.push(index);
        Self(indices)
    }

    /// Split into parent path and final sibling index.
    ///
    /// The empty path has no parent.
    pub fn split_last(&self) -> DomainResult<(NodePath, usize)> {
        match self.0.split_last() {
            Some((&last, parent)) => Ok((NodePath(parent.to_vec()), last)),
            None => Err(DomainError::InvalidPath(
                "root sequence has no parent".to_string(),
            )),
        }
    }
}

impl From<Vec<usize>> for NodePath {
    fn from(indices: Vec<usize>) -> Self {
        Self(indices)
    }
}

impl fmt::Display for NodePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            write!(f, "<root>")
        } else {
            write!(f, "{}", self.0.iter().join("."))
        }
    }
}

impl FromStr for NodePath {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(DomainError::InvalidPath("empty path string".to_string()));
        }
        let indices = trimmed
            .split('.')
            .map(|part| {
                part.trim().parse::<usize>().map_err(|_| {
                    DomainError::InvalidPath(format!("invalid path segment: {part:?}"))
                })
            })
            .collect::<DomainResult<Vec<usize>>>()?;
        Ok(NodePath(indices))
    }
}
