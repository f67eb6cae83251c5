//! Foundation types for the asset-link codec.
//!
//! Every other `alink` crate depends on `alink-types`.
//!
//! # Key Types
//!
//! - [`VersionHash`]: Opaque content-addressed identifier of one object version
//! - [`Link`]: Pointer to a metadata subtree, relative or into a foreign version
//! - [`ResolvedTarget`]: Cached summary of a linked object
//! - [`AssetRef`]: One entry of an editable, ordered collection
//! - [`CollectionEncoding`]: The four historical on-disk collection shapes

pub mod collection;
pub mod error;
pub mod hash;
pub mod link;
pub mod path;
pub mod target;

pub use collection::{CollectionEncoding, CollectionSpec, DEFAULT_KEY};
pub use error::TypeError;
pub use hash::VersionHash;
pub use link::{is_link, order_from_value, Link, LinkTarget};
pub use target::{AssetRef, ResolvedTarget};
