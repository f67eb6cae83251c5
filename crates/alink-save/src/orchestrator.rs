use std::sync::Arc;
use std::time::{Duration, Instant};

use alink_model::AssetModel;
use alink_store::{CommitResult, ContentStore, WriteMode};
use tracing::{debug, info, warn};

use crate::error::{SaveError, SaveResult};
use crate::plan::{plan_writes, WriteStep};
use crate::state::SaveState;

// ---------------------------------------------------------------------------
// SaveReport
// ---------------------------------------------------------------------------

/// A write that was issued and accepted.
#[derive(Clone, Debug)]
pub struct StepRecord {
    pub label: String,
    pub mode: WriteMode,
    pub subtree: String,
    pub elapsed: Duration,
}

/// The outcome of a successful save.
#[derive(Clone, Debug)]
pub struct SaveReport {
    pub commit: CommitResult,
    /// Writes in issue order.
    pub steps: Vec<StepRecord>,
    pub elapsed: Duration,
}

// ---------------------------------------------------------------------------
// SaveOrchestrator
// ---------------------------------------------------------------------------

/// Writes an [`AssetModel`] back to the store in one staged transaction.
///
/// Writes are issued strictly one after another against the same token.
/// The first failure stops the save; the transaction is left unfinalized,
/// which discards it.
pub struct SaveOrchestrator<S: ?Sized> {
    store: Arc<S>,
    library_id: String,
    object_id: String,
    state: SaveState,
}

impl<S> SaveOrchestrator<S>
where
    S: ContentStore + ?Sized,
{
    pub fn new(store: Arc<S>, library_id: impl Into<String>, object_id: impl Into<String>) -> Self {
        Self {
            store,
            library_id: library_id.into(),
            object_id: object_id.into(),
            state: SaveState::Idle,
        }
    }

    pub fn state(&self) -> SaveState {
        self.state
    }

    pub fn object_id(&self) -> &str {
        &self.object_id
    }

    /// Plan and run the writes for `model`.
    pub async fn save(&mut self, model: &AssetModel) -> SaveResult<SaveReport> {
        let steps = plan_writes(model);
        self.execute(&steps).await
    }

    /// Run already planned writes.
    pub async fn execute(&mut self, steps: &[WriteStep]) -> SaveResult<SaveReport> {
        if !self.state.can_start() {
            return Err(SaveError::InvalidState(self.state));
        }
        let started = Instant::now();

        let token = match self.store.begin_edit(&self.library_id, &self.object_id).await {
            Ok(token) => token,
            Err(e) => {
                warn!(object_id = %self.object_id, error = %e, "store refused to open a transaction");
                self.transition(SaveState::Failed);
                return Err(SaveError::Precondition(e));
            }
        };
        self.transition(SaveState::TransactionOpen);
        debug!(object_id = %self.object_id, token = %token, steps = steps.len(), "opened save transaction");

        self.transition(SaveState::Writing);
        let mut records = Vec::with_capacity(steps.len());
        for step in steps {
            let step_start = Instant::now();
            if let Err(e) = self
                .store
                .write_metadata(&token, step.mode, &step.subtree, &step.value)
                .await
            {
                warn!(
                    object_id = %self.object_id,
                    step = %step.label,
                    subtree = %step.subtree,
                    error = %e,
                    "write failed, abandoning transaction"
                );
                self.transition(SaveState::Failed);
                return Err(SaveError::Transaction {
                    step: step.label.clone(),
                    source: e,
                });
            }
            debug!(step = %step.label, mode = %step.mode, subtree = %step.subtree, "wrote step");
            records.push(StepRecord {
                label: step.label.clone(),
                mode: step.mode,
                subtree: step.subtree.clone(),
                elapsed: step_start.elapsed(),
            });
        }

        self.transition(SaveState::Finalizing);
        let commit = match self.store.finalize(&token).await {
            Ok(commit) => commit,
            Err(e) => {
                warn!(object_id = %self.object_id, error = %e, "finalize failed");
                self.transition(SaveState::Failed);
                return Err(SaveError::Finalize(e));
            }
        };
        self.transition(SaveState::Committed);
        info!(
            object_id = %commit.object_id,
            hash = %commit.version_hash,
            steps = records.len(),
            "committed save"
        );

        Ok(SaveReport {
            commit,
            steps: records,
            elapsed: started.elapsed(),
        })
    }

    fn transition(&mut self, next: SaveState) {
        debug_assert!(
            self.state.can_transition_to(next),
            "illegal save transition {} -> {}",
            self.state,
            next
        );
        self.state = next;
    }
}

impl<S: ?Sized> std::fmt::Debug for SaveOrchestrator<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SaveOrchestrator")
            .field("library_id", &self.library_id)
            .field("object_id", &self.object_id)
            .field("state", &self.state)
            .finish()
    }
}
