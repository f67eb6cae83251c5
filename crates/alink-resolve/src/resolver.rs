//! The session-scoped link resolver.

use std::sync::Arc;

use alink_store::{ContentStore, MetadataRef};
use alink_types::link::PROPS_KEY;
use alink_types::{path, AssetRef, Link, ResolvedTarget, VersionHash};
use serde_json::Value;
use tracing::{debug, instrument};

use crate::batch::{resolve_bounded, BatchOutcome};
use crate::cache::{CacheStats, SessionCache};
use crate::config::ResolverConfig;
use crate::error::{ResolveError, ResolveResult};

/// Resolves links found in one object version into [`AssetRef`]s.
///
/// A resolver is bound to the version being edited: relative links and link
/// paths are read inside it. Both lookups it performs are memoized for the
/// lifetime of the session (see [`SessionCache`]), and batch operations keep
/// at most [`ResolverConfig::max_concurrency`] remote calls in flight.
pub struct LinkResolver<S: ?Sized> {
    store: Arc<S>,
    current: VersionHash,
    config: ResolverConfig,
    cache: SessionCache,
}

impl<S: ContentStore + ?Sized> LinkResolver<S> {
    pub fn new(store: Arc<S>, current: VersionHash) -> Self {
        Self::with_config(store, current, ResolverConfig::default())
    }

    pub fn with_config(store: Arc<S>, current: VersionHash, config: ResolverConfig) -> Self {
        Self {
            store,
            current,
            config,
            cache: SessionCache::new(),
        }
    }

    /// The version links are resolved against.
    pub fn current_version(&self) -> &VersionHash {
        &self.current
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    /// Rebind to another version and drop every memoized entry.
    pub fn start_session(&mut self, current: VersionHash) {
        debug!(version = %current, "starting resolver session");
        self.current = current;
        self.cache.clear();
    }

    /// Drop every memoized entry.
    pub fn clear_caches(&self) {
        self.cache.clear();
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    /// A memoized target, without any remote call.
    pub fn cached_target(&self, hash: &VersionHash) -> Option<ResolvedTarget> {
        self.cache.cached_target(hash)
    }

    /// Resolve the link stored at `link_path` in the current version (for
    /// example `public/asset_metadata/titles/0`) to the hash it points at.
    pub async fn resolve_link_path(&self, link_path: &str) -> ResolveResult<VersionHash> {
        Ok(self.resolve_link_path_with_metadata(link_path).await?.0)
    }

    /// Resolve the link stored at `link_path` all the way to an entry.
    #[instrument(skip(self), level = "debug")]
    pub async fn resolve_path(&self, link_path: &str) -> ResolveResult<AssetRef> {
        let (hash, metadata) = self.resolve_link_path_with_metadata(link_path).await?;
        let target = self.target_from(&hash, metadata).await?;
        Ok(AssetRef::new(hash, target))
    }

    /// Resolve a parsed link.
    ///
    /// Relative links are read inside the current version. Absolute links
    /// name their target directly; the path is taken to address the target's
    /// asset metadata.
    pub async fn resolve(&self, link: &Link) -> ResolveResult<AssetRef> {
        let Some(meta_path) = link.meta_path() else {
            return Err(ResolveError::NotMetadata { href: link.href() });
        };
        match link.version_hash() {
            Some(hash) => {
                let target = self.target(hash).await?;
                Ok(AssetRef::new(hash.clone(), target))
            }
            None => self.resolve_path(meta_path).await,
        }
    }

    /// The summary of the object version `hash`.
    pub async fn target(&self, hash: &VersionHash) -> ResolveResult<ResolvedTarget> {
        self.target_from(hash, None).await
    }

    /// Resolve every link path with bounded concurrency. Failed paths are
    /// logged and reported, never fatal.
    pub async fn resolve_paths<I>(&self, link_paths: I) -> BatchOutcome<String, AssetRef>
    where
        I: IntoIterator<Item = String>,
    {
        resolve_bounded(link_paths, self.config.max_concurrency, |p| async move {
            self.resolve_path(&p).await
        })
        .await
    }

    /// Fetch the summaries of several versions with bounded concurrency.
    pub async fn targets<I>(&self, hashes: I) -> BatchOutcome<VersionHash, ResolvedTarget>
    where
        I: IntoIterator<Item = VersionHash>,
    {
        resolve_bounded(hashes, self.config.max_concurrency, |h| async move {
            self.target(&h).await
        })
        .await
    }

    /// Link-path lookup. When this call performed the fetch, the metadata
    /// the store returned is handed back so the target summary can be built
    /// without a second read.
    async fn resolve_link_path_with_metadata(
        &self,
        link_path: &str,
    ) -> ResolveResult<(VersionHash, Option<Value>)> {
        let link_path = path::join([link_path]);
        let cell = self.cache.link_cell(&link_path);
        let mut fetched = None;
        let slot = &mut fetched;
        let hash = cell
            .get_or_try_init(|| async move {
                let reference = MetadataRef::from(self.current.clone());
                let metadata = self
                    .store
                    .metadata(&reference, &link_path, true)
                    .await?
                    .ok_or_else(|| ResolveError::Unresolved {
                        path: link_path.clone(),
                    })?;
                let source = source_of(&metadata).ok_or_else(|| ResolveError::MissingSource {
                    path: link_path.clone(),
                })??;
                debug!(path = %link_path, source = %source, "resolved link path");
                *slot = Some(metadata);
                Ok::<_, ResolveError>(source)
            })
            .await?
            .clone();
        Ok((hash, fetched))
    }

    async fn target_from(
        &self,
        hash: &VersionHash,
        metadata: Option<Value>,
    ) -> ResolveResult<ResolvedTarget> {
        let cell = self.cache.target_cell(hash);
        let target = cell
            .get_or_try_init(|| async move {
                let metadata = match metadata {
                    Some(metadata) => metadata,
                    None => self
                        .store
                        .metadata(
                            &MetadataRef::from(hash.clone()),
                            &self.config.asset_metadata_path,
                            false,
                        )
                        .await?
                        .unwrap_or(Value::Null),
                };
                let latest = self.store.latest_version_hash(hash).await?;
                debug!(version = %hash, latest = %latest, "fetched target");
                Ok::<_, ResolveError>(ResolvedTarget::from_asset_metadata(&metadata, latest))
            })
            .await?;
        Ok(target.clone())
    }
}

impl<S: ?Sized> std::fmt::Debug for LinkResolver<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LinkResolver")
            .field("current", &self.current)
            .field("config", &self.config)
            .field("cache", &self.cache)
            .finish_non_exhaustive()
    }
}

/// The `"."."source"` hash the store attaches to resolved reads.
fn source_of(metadata: &Value) -> Option<ResolveResult<VersionHash>> {
    metadata
        .get(PROPS_KEY)
        .and_then(|props| props.get("source"))
        .and_then(Value::as_str)
        .map(|source| VersionHash::new(source).map_err(ResolveError::from))
}
