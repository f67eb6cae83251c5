//! The editable asset model.
//!
//! [`AssetModel`] is the flat, in-memory view of one object's asset metadata:
//! built-in info, typed fields, credits, images, the gallery, playlists and
//! every configured collection of linked assets. [`loader::load`] builds it
//! from stored metadata; the save pipeline turns it back into writes.
//!
//! What the model contains is driven by [`EditorConfig`], loadable from TOML
//! or JSON.

pub mod config;
pub mod error;
pub mod loader;
pub mod model;

pub use config::{AssociatedAssetConfig, EditorConfig};
pub use error::{ModelError, ModelResult};
pub use loader::{load, LoadReport, SkippedEntry};
pub use model::{AssetCollection, AssetInfo, AssetModel, ClipList};
