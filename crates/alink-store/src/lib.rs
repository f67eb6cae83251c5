//! Remote content store contract for the asset-link codec.
//!
//! The codec never talks to a concrete service directly: every read, version
//! lookup and staged write goes through the [`ContentStore`] trait. The store
//! is content-addressed: each committed version is identified by an immutable
//! [`VersionHash`](alink_types::VersionHash), and edits are staged under a
//! [`WriteToken`] until finalized into a new version.
//!
//! # Backends
//!
//! - [`InMemoryContentStore`] -- `HashMap`-based store for tests, fixtures and
//!   embedding, with failure injection and request accounting
//!
//! # Design Rules
//!
//! 1. Metadata under a version hash never changes.
//! 2. Staged writes are invisible until finalize; an abandoned token is
//!    discarded by the store, so no rollback call exists.
//! 3. Writes against one token are strictly sequential.

pub mod error;
pub mod memory;
pub mod traits;
pub mod tree;
pub mod types;

pub use error::{StoreError, StoreResult};
pub use memory::{FixtureObject, InMemoryContentStore, StoreFixture, WriteRecord};
pub use traits::ContentStore;
pub use types::{CommitResult, MetadataRef, WriteMode, WriteToken};
