//! Catalog error model.

use thiserror::Error;

/// Result type used when building a suite catalog.
pub type CatalogResult<T> = Result<T, CatalogError>;

/// Failure to assemble a usable suite catalog.
///
/// These only surface at construction time. Once a catalog exists, every
/// lookup is infallible and unknown suites are handled by falling back to
/// the default suite.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CatalogError {
    /// A catalog needs at least one suite to have a default.
    #[error("suite catalog is empty")]
    Empty,

    /// Two definitions share the same identifier.
    #[error("duplicate suite identifier: {0}")]
    DuplicateSuite(String),

    /// An identifier cannot be used as a path segment.
    #[error("invalid suite identifier: {0}")]
    InvalidId(String),
}

impl CatalogError {
    pub fn duplicate(id: impl Into<String>) -> Self {
        Self::DuplicateSuite(id.into())
    }

    pub fn invalid_id(id: impl Into<String>) -> Self {
        Self::InvalidId(id.into())
    }
}
