//! Domain-level errors (no external dependencies)

use thiserror::Error;

/// Domain errors represent violations of the clustering and query contracts.
/// These are independent of I/O concerns.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DomainError {
    #[error("no species to build a tree from")]
    EmptyInput,

    #[error("label not found in tree: {0}")]
    LabelNotFound(String),

    #[error("duplicate label: {0}")]
    DuplicateLabel(String),

    #[error("no distance recorded between {a} and {b}")]
    MissingDistance { a: String, b: String },

    #[error("invalid distance {value} between {a} and {b}")]
    InvalidDistance { a: String, b: String, value: f64 },

    #[error("unknown distance metric: {0}")]
    UnknownMetric(String),
}

/// Result type for tree operations.
pub type TreeResult<T> = Result<T, DomainError>;
