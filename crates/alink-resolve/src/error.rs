//! Error types for link resolution.

use alink_store::StoreError;
use alink_types::TypeError;
use thiserror::Error;

/// Errors that can occur while resolving a link.
#[derive(Debug, Error)]
pub enum ResolveError {
    /// The link path does not exist in the object being edited.
    #[error("nothing at link path: {path}")]
    Unresolved { path: String },

    /// The store resolved the path but did not report a source version.
    #[error("link path resolved without a source version: {path}")]
    MissingSource { path: String },

    /// The link does not address metadata (for example a `files/` link).
    #[error("not a metadata link: {href}")]
    NotMetadata { href: String },

    /// A stored value could not be interpreted as a link or hash.
    #[error("invalid link: {0}")]
    Type(#[from] TypeError),

    /// The remote store failed the request.
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

/// Convenience type alias for resolver operations.
pub type ResolveResult<T> = std::result::Result<T, ResolveError>;
