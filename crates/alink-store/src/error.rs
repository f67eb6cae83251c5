use alink_types::{TypeError, VersionHash};

/// Errors from content store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// No version with this hash is known to the store.
    #[error("unknown version: {0}")]
    UnknownVersion(VersionHash),

    /// No object with this id exists in the library.
    #[error("unknown object {object_id} in library {library_id}")]
    UnknownObject {
        library_id: String,
        object_id: String,
    },

    /// A version with this hash already exists.
    #[error("version already exists: {0}")]
    VersionExists(VersionHash),

    /// The store refused to open a write transaction.
    #[error("edit denied for {object_id}: {reason}")]
    EditDenied { object_id: String, reason: String },

    /// The write token is unknown, finalized, or abandoned.
    #[error("unknown write token: {0}")]
    UnknownWriteToken(String),

    /// Link resolution exceeded the hop limit.
    #[error("link cycle while resolving {path}")]
    LinkCycle { path: String },

    /// A link stored in the metadata could not be parsed.
    #[error("malformed link: {0}")]
    MalformedLink(#[from] TypeError),

    /// The remote service failed the request.
    #[error("remote error: {0}")]
    Remote(String),

    /// Serialization or deserialization failure.
    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
