use thiserror::Error;

/// Errors produced by type operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid version hash: {0:?}")]
    InvalidVersionHash(String),

    #[error("not a link: {0}")]
    NotALink(String),

    #[error("malformed link path {path:?}: {reason}")]
    MalformedLinkPath { path: String, reason: String },
}
