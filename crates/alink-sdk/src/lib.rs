//! Edit sessions over the asset-link codec.
//!
//! [`EditSession`] is the entry point for applications: it opens an object
//! version, decodes it into an [`AssetModel`], lets the caller mutate the
//! model, and saves it back in one staged transaction.
//!
//! ```rust,no_run
//! # async fn demo() -> Result<(), alink_sdk::SdkError> {
//! use std::sync::Arc;
//! use alink_sdk::{ClipList, EditSession, InMemoryContentStore, SessionConfig, SessionParams};
//!
//! let store = Arc::new(InMemoryContentStore::new());
//! let mut session = EditSession::open(
//!     store,
//!     SessionParams::latest("ilib_site", "iq__site"),
//!     SessionConfig::default(),
//! )
//! .await?;
//! session.model_mut().set_default(&ClipList::collection("titles"), 0)?;
//! let report = session.save().await?;
//! println!("saved as {}", report.commit.version_hash);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod session;

pub use config::{SessionConfig, SessionParams};
pub use error::{SdkError, SdkResult};
pub use session::EditSession;

// Re-export key types
pub use alink_model::{AssetModel, ClipList, EditorConfig, LoadReport};
pub use alink_save::{SaveReport, SaveState, WriteStep};
pub use alink_store::{ContentStore, InMemoryContentStore};
pub use alink_types::{AssetRef, VersionHash};
