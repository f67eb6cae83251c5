//! Bounded-concurrency batch resolution with per-item failure isolation.

use std::fmt::Display;
use std::future::Future;

use futures::stream::{self, StreamExt};
use tracing::warn;

use crate::error::{ResolveError, ResolveResult};

/// An item that could not be resolved.
#[derive(Debug)]
pub struct BatchFailure<K> {
    pub key: K,
    pub error: ResolveError,
}

/// Result of a batch: every item lands in exactly one of the two lists.
///
/// `resolved` is in completion order, not input order; callers that care
/// about order sort afterwards.
#[derive(Debug)]
pub struct BatchOutcome<K, T> {
    pub resolved: Vec<(K, T)>,
    pub failures: Vec<BatchFailure<K>>,
}

impl<K, T> BatchOutcome<K, T> {
    pub fn new() -> Self {
        Self {
            resolved: Vec::new(),
            failures: Vec::new(),
        }
    }

    /// Returns `true` if no item failed.
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }

    /// Total number of items processed.
    pub fn len(&self) -> usize {
        self.resolved.len() + self.failures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<K, T> Default for BatchOutcome<K, T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Run `resolve` over every key with at most `limit` futures in flight.
///
/// A failing item is logged and recorded; it never aborts the batch.
pub async fn resolve_bounded<K, T, F, Fut>(
    keys: impl IntoIterator<Item = K>,
    limit: usize,
    resolve: F,
) -> BatchOutcome<K, T>
where
    K: Clone + Display,
    F: Fn(K) -> Fut,
    Fut: Future<Output = ResolveResult<T>>,
{
    let mut outcome = BatchOutcome::new();
    let mut results = stream::iter(keys)
        .map(|key| {
            let pending = resolve(key.clone());
            async move { (key, pending.await) }
        })
        .buffer_unordered(limit.max(1));

    while let Some((key, result)) = results.next().await {
        match result {
            Ok(value) => outcome.resolved.push((key, value)),
            Err(error) => {
                warn!(key = %key, error = %error, "skipping unresolvable link");
                outcome.failures.push(BatchFailure { key, error });
            }
        }
    }
    outcome
}
