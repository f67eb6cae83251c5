//! Link resolution for the asset-link codec.
//!
//! Collections store links; editors want titles, slugs and version status.
//! This crate turns one into the other against a [`ContentStore`], treating
//! the store as slow and rate-limited.
//!
//! # Architecture
//!
//! - **Memoization** is session-scoped and keyed twice: by version hash (the
//!   target summary) and by link path (the hash the link points at). Content
//!   addressing makes both safe to keep until the session ends.
//! - **Concurrent lookups** of the same key share a single remote fetch.
//! - **Batches** keep at most `max_concurrency` fetches in flight. A failing
//!   item is logged and reported alongside the successes; it never aborts
//!   the batch.
//!
//! # Modules
//!
//! - [`resolver`]: [`LinkResolver`], the entry point
//! - [`cache`]: [`SessionCache`] memoization tables
//! - [`batch`]: [`resolve_bounded`] and [`BatchOutcome`]
//! - [`config`]: [`ResolverConfig`]
//! - [`error`]: [`ResolveError`]
//!
//! [`ContentStore`]: alink_store::ContentStore

pub mod batch;
pub mod cache;
pub mod config;
pub mod error;
pub mod resolver;

pub use batch::{resolve_bounded, BatchFailure, BatchOutcome};
pub use cache::{CacheStats, SessionCache};
pub use config::ResolverConfig;
pub use error::{ResolveError, ResolveResult};
pub use resolver::LinkResolver;
