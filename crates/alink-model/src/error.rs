use alink_resolve::ResolveError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("unknown collection: {0}")]
    UnknownCollection(String),

    #[error("collection {0} cannot hold a default entry")]
    DefaultNotSupported(String),

    #[error("unknown field: {0}")]
    UnknownField(String),

    #[error("invalid editor configuration: {0}")]
    Config(String),

    #[error("resolve error: {0}")]
    Resolve(#[from] ResolveError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type ModelResult<T> = Result<T, ModelError>;
