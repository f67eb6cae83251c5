use alink_types::VersionHash;
use async_trait::async_trait;
use serde_json::Value;

use crate::error::StoreResult;
use crate::types::{CommitResult, MetadataRef, WriteMode, WriteToken};

/// Remote content store consumed by the codec.
///
/// The store is treated as reliable but slow and rate-limited. All
/// implementations must satisfy these invariants:
/// - Metadata under a version hash never changes (content addressing).
/// - A write token isolates staged writes: nothing is visible to readers until
///   `finalize` succeeds, and an abandoned token is simply discarded.
/// - Writes against one token are issued sequentially by callers; concurrent
///   writes to the same token are undefined.
#[async_trait]
pub trait ContentStore: Send + Sync {
    /// Read the metadata subtree at `subtree` (slash-separated, `""` for the
    /// root).
    ///
    /// Returns `Ok(None)` if the subtree does not exist. With `resolve_links`
    /// set, a link at (or on the way to) the subtree is followed and the
    /// returned object carries `".": {"source": <hash>}` naming the version
    /// the data came from.
    async fn metadata(
        &self,
        reference: &MetadataRef,
        subtree: &str,
        resolve_links: bool,
    ) -> StoreResult<Option<Value>>;

    /// The latest version of the object that owns `hash`.
    async fn latest_version_hash(&self, hash: &VersionHash) -> StoreResult<VersionHash>;

    /// Open a staged-write transaction on an object.
    async fn begin_edit(&self, library_id: &str, object_id: &str) -> StoreResult<WriteToken>;

    /// Deep-merge `metadata` into the staged subtree.
    async fn merge_metadata(
        &self,
        token: &WriteToken,
        subtree: &str,
        metadata: &Value,
    ) -> StoreResult<()>;

    /// Replace the staged subtree with `metadata`.
    async fn replace_metadata(
        &self,
        token: &WriteToken,
        subtree: &str,
        metadata: &Value,
    ) -> StoreResult<()>;

    /// Commit the staged writes as a new version.
    async fn finalize(&self, token: &WriteToken) -> StoreResult<CommitResult>;

    /// Dispatch a write by mode.
    async fn write_metadata(
        &self,
        token: &WriteToken,
        mode: WriteMode,
        subtree: &str,
        metadata: &Value,
    ) -> StoreResult<()> {
        match mode {
            WriteMode::Merge => self.merge_metadata(token, subtree, metadata).await,
            WriteMode::Replace => self.replace_metadata(token, subtree, metadata).await,
        }
    }
}
