//! Rule configuration and transformation errors.

use thiserror::Error;

/// Errors raised while building or applying a routing rule.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuleError {
    /// A directory rule was built without a directory value.
    #[error("The directory string cannot be absent")]
    MissingDirectory,

    /// `process` was called with a path the rule does not match.
    #[error("Path {path:?} is outside directory {directory:?}")]
    PathOutsideDirectory { path: String, directory: String },
}

/// Result type for rule operations.
pub type RuleResult<T> = Result<T, RuleError>;
