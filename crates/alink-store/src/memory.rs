//! In-memory content store for tests, fixtures and embedding.
//!
//! [`InMemoryContentStore`] keeps every committed version in a `HashMap`
//! behind a `RwLock` and implements the full [`ContentStore`] contract,
//! including link-following reads and staged-write transactions. It also
//! carries the knobs tests need: injected failures, artificial latency and
//! request counters.

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Duration;

use alink_types::link::{self, Link, PROPS_KEY};
use alink_types::{path, VersionHash};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::debug;

use crate::error::{StoreError, StoreResult};
use crate::traits::ContentStore;
use crate::tree;
use crate::types::{CommitResult, MetadataRef, WriteMode, WriteToken};

/// Maximum number of links followed by a single read.
const MAX_LINK_HOPS: usize = 16;

/// A store snapshot as loaded from a fixture file.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct StoreFixture {
    pub objects: Vec<FixtureObject>,
}

/// One object version in a fixture. Several entries with the same
/// `object_id` become successive versions of that object.
#[derive(Clone, Debug, Deserialize)]
pub struct FixtureObject {
    pub library_id: String,
    pub object_id: String,
    /// Explicit hash, so other fixture entries can link to it.
    #[serde(default)]
    pub version_hash: Option<VersionHash>,
    #[serde(default)]
    pub metadata: Value,
}

/// A write recorded against a transaction.
#[derive(Clone, Debug, PartialEq)]
pub struct WriteRecord {
    pub token: WriteToken,
    pub mode: WriteMode,
    pub subtree: String,
    pub value: Value,
}

#[derive(Debug)]
struct ObjectRecord {
    library_id: String,
    versions: Vec<VersionHash>,
}

#[derive(Debug)]
struct VersionRecord {
    object_id: String,
    metadata: Value,
}

#[derive(Debug)]
struct Draft {
    object_id: String,
    metadata: Value,
}

#[derive(Debug, Default)]
struct StoreState {
    objects: HashMap<String, ObjectRecord>,
    versions: HashMap<VersionHash, VersionRecord>,
    drafts: HashMap<WriteToken, Draft>,
    writes: Vec<WriteRecord>,
}

#[derive(Debug, Default)]
struct Faults {
    failing_versions: HashSet<VersionHash>,
    failing_subtrees: HashSet<String>,
    deny_edits: Option<String>,
    fail_finalize: bool,
}

/// In-memory implementation of [`ContentStore`].
#[derive(Debug, Default)]
pub struct InMemoryContentStore {
    state: RwLock<StoreState>,
    faults: RwLock<Faults>,
    latency: Option<Duration>,
    metadata_requests: AtomicUsize,
    latest_requests: AtomicUsize,
    in_flight: AtomicUsize,
    peak_in_flight: AtomicUsize,
}

impl InMemoryContentStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Delay every remote call by `latency`, to make concurrency observable.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Build a store from a fixture.
    pub fn from_fixture(fixture: StoreFixture) -> StoreResult<Self> {
        let store = Self::new();
        for object in fixture.objects {
            store.insert_version(
                &object.library_id,
                &object.object_id,
                object.version_hash,
                object.metadata,
            )?;
        }
        Ok(store)
    }

    /// Parse a JSON fixture and build a store from it.
    pub fn from_fixture_json(json: &str) -> StoreResult<Self> {
        let fixture: StoreFixture =
            serde_json::from_str(json).map_err(|e| StoreError::Serialization(e.to_string()))?;
        Self::from_fixture(fixture)
    }

    /// Commit `metadata` as the newest version of an object, creating the
    /// object if needed. Without an explicit hash one is derived from the
    /// content and the previous version.
    pub fn insert_version(
        &self,
        library_id: &str,
        object_id: &str,
        version_hash: Option<VersionHash>,
        metadata: Value,
    ) -> StoreResult<VersionHash> {
        let mut state = self.write_state();
        let previous = state
            .objects
            .get(object_id)
            .and_then(|record| record.versions.last().cloned());
        let hash = match version_hash {
            Some(hash) => hash,
            None => derive_version_hash(object_id, previous.as_ref(), &metadata)?,
        };
        if state.versions.contains_key(&hash) {
            return Err(StoreError::VersionExists(hash));
        }
        state.versions.insert(
            hash.clone(),
            VersionRecord {
                object_id: object_id.to_string(),
                metadata,
            },
        );
        state
            .objects
            .entry(object_id.to_string())
            .or_insert_with(|| ObjectRecord {
                library_id: library_id.to_string(),
                versions: Vec::new(),
            })
            .versions
            .push(hash.clone());
        Ok(hash)
    }

    /// Full metadata of a committed version.
    pub fn version_metadata(&self, hash: &VersionHash) -> Option<Value> {
        self.read_state()
            .versions
            .get(hash)
            .map(|record| record.metadata.clone())
    }

    /// Latest committed version of an object.
    pub fn latest_of(&self, object_id: &str) -> Option<VersionHash> {
        self.read_state()
            .objects
            .get(object_id)
            .and_then(|record| record.versions.last().cloned())
    }

    /// Every write issued so far, across all transactions, in issue order.
    pub fn writes(&self) -> Vec<WriteRecord> {
        self.read_state().writes.clone()
    }

    /// Number of transactions still open (neither finalized nor failed).
    pub fn open_transactions(&self) -> usize {
        self.read_state().drafts.len()
    }

    /// Make every read that touches `hash` fail.
    pub fn fail_reads_of(&self, hash: VersionHash) {
        self.write_faults().failing_versions.insert(hash);
    }

    /// Make every write to exactly `subtree` fail.
    pub fn fail_writes_to(&self, subtree: &str) {
        self.write_faults()
            .failing_subtrees
            .insert(path::join([subtree]));
    }

    /// Refuse to open transactions.
    pub fn deny_edits(&self, reason: impl Into<String>) {
        self.write_faults().deny_edits = Some(reason.into());
    }

    /// Make `finalize` fail.
    pub fn fail_finalize(&self) {
        self.write_faults().fail_finalize = true;
    }

    /// Drop every injected failure.
    pub fn clear_faults(&self) {
        *self.write_faults() = Faults::default();
    }

    /// Number of `metadata` calls served.
    pub fn metadata_requests(&self) -> usize {
        self.metadata_requests.load(Ordering::SeqCst)
    }

    /// Number of `latest_version_hash` calls served.
    pub fn latest_requests(&self) -> usize {
        self.latest_requests.load(Ordering::SeqCst)
    }

    /// Highest number of simultaneously in-flight calls observed.
    pub fn peak_concurrency(&self) -> usize {
        self.peak_in_flight.load(Ordering::SeqCst)
    }

    fn read_state(&self) -> RwLockReadGuard<'_, StoreState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_state(&self) -> RwLockWriteGuard<'_, StoreState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn read_faults(&self) -> RwLockReadGuard<'_, Faults> {
        self.faults.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_faults(&self) -> RwLockWriteGuard<'_, Faults> {
        self.faults.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Simulate a remote round trip: count it and apply latency.
    async fn round_trip(&self) -> InFlight<'_> {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_in_flight.fetch_max(now, Ordering::SeqCst);
        let guard = InFlight(&self.in_flight);
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
        guard
    }

    fn check_readable(&self, hash: &VersionHash) -> StoreResult<()> {
        if self.read_faults().failing_versions.contains(hash) {
            return Err(StoreError::Remote(format!("injected read failure for {hash}")));
        }
        Ok(())
    }

    fn resolve_ref(&self, state: &StoreState, reference: &MetadataRef) -> StoreResult<VersionHash> {
        match reference {
            MetadataRef::Version(hash) => {
                if !state.versions.contains_key(hash) {
                    return Err(StoreError::UnknownVersion(hash.clone()));
                }
                Ok(hash.clone())
            }
            MetadataRef::Object {
                library_id,
                object_id,
            } => state
                .objects
                .get(object_id)
                .filter(|record| &record.library_id == library_id)
                .and_then(|record| record.versions.last().cloned())
                .ok_or_else(|| StoreError::UnknownObject {
                    library_id: library_id.clone(),
                    object_id: object_id.clone(),
                }),
        }
    }

    /// Walk `subtree` from the root of `start`, following links that sit on
    /// the path (and the final node too, when `resolve_links` is set).
    /// Returns the version the data was found in together with the data.
    fn walk(
        &self,
        state: &StoreState,
        start: VersionHash,
        subtree: &str,
        resolve_links: bool,
    ) -> StoreResult<Option<(VersionHash, Value)>> {
        let mut version = start;
        let mut node = self.root_of(state, &version)?;
        let mut remaining: VecDeque<String> =
            path::segments(subtree).map(str::to_string).collect();
        let mut hops = 0;

        loop {
            if link::is_link(node) && (resolve_links || !remaining.is_empty()) {
                let target = Link::from_value(node)?;
                let Some(meta_path) = target.meta_path() else {
                    // File links cannot be descended into.
                    return Ok(remaining.is_empty().then(|| (version, node.clone())));
                };
                hops += 1;
                if hops > MAX_LINK_HOPS {
                    return Err(StoreError::LinkCycle {
                        path: subtree.to_string(),
                    });
                }
                if let Some(hash) = target.version_hash() {
                    version = hash.clone();
                }
                let prefix: Vec<&str> = path::segments(meta_path).collect();
                for segment in prefix.into_iter().rev() {
                    remaining.push_front(segment.to_string());
                }
                node = self.root_of(state, &version)?;
                continue;
            }
            match remaining.pop_front() {
                None => return Ok(Some((version, node.clone()))),
                Some(segment) => match tree::child(node, &segment) {
                    Some(next) => node = next,
                    None => return Ok(None),
                },
            }
        }
    }

    fn root_of<'a>(&self, state: &'a StoreState, hash: &VersionHash) -> StoreResult<&'a Value> {
        self.check_readable(hash)?;
        state
            .versions
            .get(hash)
            .map(|record| &record.metadata)
            .ok_or_else(|| StoreError::UnknownVersion(hash.clone()))
    }

    fn stage_write(
        &self,
        token: &WriteToken,
        mode: WriteMode,
        subtree: &str,
        value: &Value,
    ) -> StoreResult<()> {
        let subtree = path::join([subtree]);
        if self.read_faults().failing_subtrees.contains(&subtree) {
            return Err(StoreError::Remote(format!(
                "injected write failure for {subtree}"
            )));
        }
        let mut state = self.write_state();
        let draft = state
            .drafts
            .get_mut(token)
            .ok_or_else(|| StoreError::UnknownWriteToken(token.to_string()))?;
        match mode {
            WriteMode::Merge => tree::merge(&mut draft.metadata, &subtree, value),
            WriteMode::Replace => tree::replace(&mut draft.metadata, &subtree, value.clone()),
        }
        state.writes.push(WriteRecord {
            token: token.clone(),
            mode,
            subtree: subtree.clone(),
            value: value.clone(),
        });
        debug!(token = %token, %mode, subtree = %subtree, "staged write");
        Ok(())
    }
}

/// Decrements the in-flight gauge when a simulated round trip ends.
struct InFlight<'a>(&'a AtomicUsize);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

fn derive_version_hash(
    object_id: &str,
    previous: Option<&VersionHash>,
    metadata: &Value,
) -> StoreResult<VersionHash> {
    let bytes =
        serde_json::to_vec(metadata).map_err(|e| StoreError::Serialization(e.to_string()))?;
    let mut hasher = blake3::Hasher::new();
    hasher.update(b"alink-version-v1:");
    hasher.update(object_id.as_bytes());
    hasher.update(b":");
    if let Some(previous) = previous {
        hasher.update(previous.as_str().as_bytes());
    }
    hasher.update(b":");
    hasher.update(&bytes);
    let digest = hex::encode(&hasher.finalize().as_bytes()[..20]);
    Ok(VersionHash::new(format!("hq__{digest}"))?)
}

/// Attach `".": {"source": hash}` to resolved object data.
fn with_source(mut value: Value, source: &VersionHash) -> Value {
    if let Value::Object(map) = &mut value {
        let props = map
            .entry(PROPS_KEY.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
        if !props.is_object() {
            *props = Value::Object(Map::new());
        }
        if let Value::Object(props) = props {
            props.insert("source".into(), Value::String(source.to_string()));
        }
    }
    value
}

#[async_trait]
impl ContentStore for InMemoryContentStore {
    async fn metadata(
        &self,
        reference: &MetadataRef,
        subtree: &str,
        resolve_links: bool,
    ) -> StoreResult<Option<Value>> {
        let _in_flight = self.round_trip().await;
        self.metadata_requests.fetch_add(1, Ordering::SeqCst);
        let state = self.read_state();
        let start = self.resolve_ref(&state, reference)?;
        let found = self.walk(&state, start, subtree, resolve_links)?;
        Ok(found.map(|(source, value)| {
            if resolve_links {
                with_source(value, &source)
            } else {
                value
            }
        }))
    }

    async fn latest_version_hash(&self, hash: &VersionHash) -> StoreResult<VersionHash> {
        let _in_flight = self.round_trip().await;
        self.latest_requests.fetch_add(1, Ordering::SeqCst);
        self.check_readable(hash)?;
        let state = self.read_state();
        let record = state
            .versions
            .get(hash)
            .ok_or_else(|| StoreError::UnknownVersion(hash.clone()))?;
        state
            .objects
            .get(&record.object_id)
            .and_then(|object| object.versions.last().cloned())
            .ok_or_else(|| StoreError::UnknownVersion(hash.clone()))
    }

    async fn begin_edit(&self, library_id: &str, object_id: &str) -> StoreResult<WriteToken> {
        let _in_flight = self.round_trip().await;
        if let Some(reason) = self.read_faults().deny_edits.clone() {
            return Err(StoreError::EditDenied {
                object_id: object_id.to_string(),
                reason,
            });
        }
        let mut state = self.write_state();
        let latest = state
            .objects
            .get(object_id)
            .filter(|record| record.library_id == library_id)
            .and_then(|record| record.versions.last().cloned())
            .ok_or_else(|| StoreError::UnknownObject {
                library_id: library_id.to_string(),
                object_id: object_id.to_string(),
            })?;
        let metadata = state
            .versions
            .get(&latest)
            .map(|record| record.metadata.clone())
            .unwrap_or(Value::Object(Map::new()));
        let token = WriteToken::new(format!("tqw__{}", uuid::Uuid::now_v7().simple()));
        state.drafts.insert(
            token.clone(),
            Draft {
                object_id: object_id.to_string(),
                metadata,
            },
        );
        debug!(token = %token, object_id, "opened transaction");
        Ok(token)
    }

    async fn merge_metadata(
        &self,
        token: &WriteToken,
        subtree: &str,
        metadata: &Value,
    ) -> StoreResult<()> {
        let _in_flight = self.round_trip().await;
        self.stage_write(token, WriteMode::Merge, subtree, metadata)
    }

    async fn replace_metadata(
        &self,
        token: &WriteToken,
        subtree: &str,
        metadata: &Value,
    ) -> StoreResult<()> {
        let _in_flight = self.round_trip().await;
        self.stage_write(token, WriteMode::Replace, subtree, metadata)
    }

    async fn finalize(&self, token: &WriteToken) -> StoreResult<CommitResult> {
        let _in_flight = self.round_trip().await;
        if self.read_faults().fail_finalize {
            return Err(StoreError::Remote("injected finalize failure".into()));
        }
        let draft = self
            .write_state()
            .drafts
            .remove(token)
            .ok_or_else(|| StoreError::UnknownWriteToken(token.to_string()))?;
        let library_id = self
            .read_state()
            .objects
            .get(&draft.object_id)
            .map(|record| record.library_id.clone())
            .unwrap_or_default();
        let version_hash =
            self.insert_version(&library_id, &draft.object_id, None, draft.metadata)?;
        debug!(token = %token, hash = %version_hash, "finalized transaction");
        Ok(CommitResult {
            object_id: draft.object_id,
            version_hash,
        })
    }
}
