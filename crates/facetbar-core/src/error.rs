//! Error types for facetbar.

use thiserror::Error;

/// Result type alias using facetbar's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for facetbar operations.
///
/// Tree building, flattening and predicate merging are total and never
/// return this type. It surfaces from term repositories and term file
/// loading, and the filter controller absorbs it into its "no terms" path.
#[derive(Error, Debug)]
pub enum Error {
    /// Term repository lookup failed
    #[error("Repository error: {0}")]
    Repository(String),

    /// Taxonomy not known to the repository
    #[error("Taxonomy not found: {0}")]
    TaxonomyNotFound(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// File I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}
