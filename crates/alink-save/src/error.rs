use alink_store::StoreError;

use crate::state::SaveState;

/// Errors from a save. Nothing is committed when any of these is returned,
/// and the save can be retried.
#[derive(Debug, thiserror::Error)]
pub enum SaveError {
    /// The store refused to open a transaction. No writes were issued.
    #[error("cannot open transaction: {0}")]
    Precondition(#[source] StoreError),

    /// A write failed. The transaction was abandoned.
    #[error("write step '{step}' failed: {source}")]
    Transaction {
        step: String,
        #[source]
        source: StoreError,
    },

    /// Finalizing the transaction failed.
    #[error("finalize failed: {0}")]
    Finalize(#[source] StoreError),

    /// A save was requested in a state that does not allow one.
    #[error("cannot save from state {0}")]
    InvalidState(SaveState),
}

impl SaveError {
    /// Label of the failed write step, if a write failed.
    pub fn step(&self) -> Option<&str> {
        match self {
            Self::Transaction { step, .. } => Some(step),
            _ => None,
        }
    }
}

/// Result alias for save operations.
pub type SaveResult<T> = Result<T, SaveError>;
