use thiserror::Error;

#[derive(Debug, Error)]
pub enum SdkError {
    #[error("object not found: {0}")]
    ObjectNotFound(String),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("store error: {0}")]
    Store(#[from] alink_store::StoreError),

    #[error("resolve error: {0}")]
    Resolve(#[from] alink_resolve::ResolveError),

    #[error("model error: {0}")]
    Model(#[from] alink_model::ModelError),

    #[error("save failed: {0}")]
    Save(#[from] alink_save::SaveError),

    #[error("internal error: {0}")]
    Internal(String),
}

pub type SdkResult<T> = Result<T, SdkError>;
