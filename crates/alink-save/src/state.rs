use std::fmt;

use serde::Serialize;

/// Where a save is in its lifecycle.
///
/// ```text
/// Idle -> TransactionOpen -> Writing -> Finalizing -> Committed
///              |               |            |
///              +---------------+------------+-----> Failed
/// ```
///
/// `Failed` ends the transaction but not the orchestrator: a new save
/// opens a fresh transaction.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SaveState {
    #[default]
    Idle,
    TransactionOpen,
    Writing,
    Finalizing,
    Committed,
    Failed,
}

impl SaveState {
    /// Whether a new save may start from this state.
    pub fn can_start(self) -> bool {
        matches!(self, Self::Idle | Self::Failed)
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Committed | Self::Failed)
    }

    /// Whether `self -> next` is a legal transition.
    pub fn can_transition_to(self, next: SaveState) -> bool {
        use SaveState::*;
        matches!(
            (self, next),
            (Idle | Failed, TransactionOpen)
                | (Idle | Failed, Failed)
                | (TransactionOpen, Writing)
                | (Writing, Finalizing)
                | (Finalizing, Committed)
                | (TransactionOpen | Writing | Finalizing, Failed)
        )
    }
}

impl fmt::Display for SaveState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::TransactionOpen => "transaction_open",
            Self::Writing => "writing",
            Self::Finalizing => "finalizing",
            Self::Committed => "committed",
            Self::Failed => "failed",
        };
        f.write_str(name)
    }
}
