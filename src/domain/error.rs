//! Domain-level errors (no external dependencies)

use thiserror::Error;

use crate::domain::path::NodePath;

/// Domain errors represent taxonomy-logic violations.
/// These are independent of infrastructure concerns.
#[derive(Error, Debug)]
pub enum DomainError {
    /// Load-time failure: the input is not a usable taxonomy.
    /// Fatal to the session, no partial tree is constructed.
    #[error("malformed taxonomy input: {reason}")]
    MalformedInput { reason: String },

    /// A path did not resolve against the current tree snapshot.
    /// In correct operation this indicates a view/store desynchronization
    /// bug and must be surfaced, never swallowed.
    #[error("path not found: {0}")]
    PathNotFound(NodePath),

    /// A path is structurally unusable (e.g., the empty path has no parent).
    #[error("invalid path: {0}")]
    InvalidPath(String),

    /// User supplied an empty name where one is required. Recoverable:
    /// the operation aborts without mutation.
    #[error("name must not be empty")]
    EmptyName,

    #[error("serialization failed: {0}")]
    Serialize(String),
}

/// Result type for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;
