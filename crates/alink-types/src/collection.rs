use std::fmt;

use serde::{Deserialize, Serialize};

use crate::path;

/// Reserved key of the default slot.
pub const DEFAULT_KEY: &str = "default";

/// The four on-disk shapes of a collection, selected by two independent
/// flags of the owning asset type.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CollectionEncoding {
    /// `[link, link, ...]`
    PlainArray,
    /// `{"default": link, "0": link, ...}`
    IndexedObject,
    /// `{"default": link, "<slug>": link{order}, ...}`
    SluggedObject,
    /// `{"default": {"<slug>": link}, "0": {"<slug>": link}, ...}`
    IndexedSluggedObject,
}

impl CollectionEncoding {
    pub fn from_flags(indexed: bool, slugged: bool) -> Self {
        match (indexed, slugged) {
            (false, false) => Self::PlainArray,
            (true, false) => Self::IndexedObject,
            (false, true) => Self::SluggedObject,
            (true, true) => Self::IndexedSluggedObject,
        }
    }

    pub fn is_indexed(self) -> bool {
        matches!(self, Self::IndexedObject | Self::IndexedSluggedObject)
    }

    pub fn is_slugged(self) -> bool {
        matches!(self, Self::SluggedObject | Self::IndexedSluggedObject)
    }

    /// Plain arrays have no key space and cannot hold a default slot.
    pub fn supports_default(self) -> bool {
        self != Self::PlainArray
    }
}

impl fmt::Display for CollectionEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::PlainArray => "plain-array",
            Self::IndexedObject => "indexed-object",
            Self::SluggedObject => "slugged-object",
            Self::IndexedSluggedObject => "indexed-slugged-object",
        };
        f.write_str(name)
    }
}

/// The part of an asset type the collection codec needs.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionSpec {
    /// Collection name, relative to `public/asset_metadata`
    /// (`titles`, or `playlists/<slug>/list`).
    pub name: String,
    #[serde(default)]
    pub indexed: bool,
    #[serde(default)]
    pub slugged: bool,
}

impl CollectionSpec {
    pub fn new(name: impl Into<String>, indexed: bool, slugged: bool) -> Self {
        Self {
            name: name.into(),
            indexed,
            slugged,
        }
    }

    pub fn encoding(&self) -> CollectionEncoding {
        CollectionEncoding::from_flags(self.indexed, self.slugged)
    }

    /// Subtree path of the collection inside the object.
    pub fn base_path(&self) -> String {
        path::join([path::ASSET_METADATA, &self.name])
    }

    /// Metadata path of one slug-keyed entry, as used by the synthesized
    /// default link of a slugged collection.
    pub fn entry_meta_path(&self, slug: &str) -> String {
        path::join(["meta", &self.base_path(), slug])
    }
}
