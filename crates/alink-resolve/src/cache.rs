//! Session-scoped memoization tables.
//!
//! Two independent tables: version hash → [`ResolvedTarget`] and link path →
//! [`VersionHash`]. Entries are never evicted: content addressing guarantees
//! that what a hash names never changes. Each entry is a shared
//! [`OnceCell`], so concurrent lookups of the same key wait on a single
//! remote fetch instead of issuing duplicates. A failed fetch leaves its cell
//! empty and the next lookup retries.
//!
//! The only invalidation point is [`SessionCache::clear`], called when a new
//! edit session starts.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use alink_types::{ResolvedTarget, VersionHash};
use tokio::sync::OnceCell;

/// Number of populated entries in each table.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub targets: usize,
    pub link_paths: usize,
}

/// The resolver's memoization tables.
#[derive(Debug, Default)]
pub struct SessionCache {
    targets: Mutex<HashMap<VersionHash, Arc<OnceCell<ResolvedTarget>>>>,
    link_hashes: Mutex<HashMap<String, Arc<OnceCell<VersionHash>>>>,
}

impl SessionCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// The cell for `hash`, created empty if absent.
    pub fn target_cell(&self, hash: &VersionHash) -> Arc<OnceCell<ResolvedTarget>> {
        let mut targets = self.targets.lock().unwrap_or_else(PoisonError::into_inner);
        targets.entry(hash.clone()).or_default().clone()
    }

    /// The cell for `path`, created empty if absent.
    pub fn link_cell(&self, path: &str) -> Arc<OnceCell<VersionHash>> {
        let mut links = self
            .link_hashes
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        links.entry(path.to_string()).or_default().clone()
    }

    /// A cached target, without fetching.
    pub fn cached_target(&self, hash: &VersionHash) -> Option<ResolvedTarget> {
        let targets = self.targets.lock().unwrap_or_else(PoisonError::into_inner);
        targets.get(hash).and_then(|cell| cell.get().cloned())
    }

    /// A cached link hash, without fetching.
    pub fn cached_link(&self, path: &str) -> Option<VersionHash> {
        let links = self
            .link_hashes
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        links.get(path).and_then(|cell| cell.get().cloned())
    }

    pub fn stats(&self) -> CacheStats {
        let targets = self.targets.lock().unwrap_or_else(PoisonError::into_inner);
        let links = self
            .link_hashes
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        CacheStats {
            targets: targets.values().filter(|cell| cell.initialized()).count(),
            link_paths: links.values().filter(|cell| cell.initialized()).count(),
        }
    }

    /// Drop every entry. In-flight lookups holding a cell finish against the
    /// detached cell and do not repopulate the tables.
    pub fn clear(&self) {
        self.targets
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
        self.link_hashes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}
