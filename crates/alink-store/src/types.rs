use std::fmt;

use alink_types::VersionHash;
use serde::{Deserialize, Serialize};

/// What a metadata read is addressed to.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MetadataRef {
    /// A specific immutable version.
    Version(VersionHash),
    /// The latest version of an object.
    Object {
        library_id: String,
        object_id: String,
    },
}

impl From<VersionHash> for MetadataRef {
    fn from(hash: VersionHash) -> Self {
        Self::Version(hash)
    }
}

impl From<&VersionHash> for MetadataRef {
    fn from(hash: &VersionHash) -> Self {
        Self::Version(hash.clone())
    }
}

impl fmt::Display for MetadataRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Version(hash) => write!(f, "{hash}"),
            Self::Object {
                library_id,
                object_id,
            } => write!(f, "{library_id}/{object_id}"),
        }
    }
}

/// Handle of an open staged-write transaction.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WriteToken(String);

impl WriteToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for WriteToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "WriteToken({})", self.0)
    }
}

impl fmt::Display for WriteToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// How a staged write combines with the existing subtree.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WriteMode {
    /// Deep-merge objects into the existing subtree.
    Merge,
    /// Replace the subtree wholesale.
    Replace,
}

impl fmt::Display for WriteMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Merge => f.write_str("merge"),
            Self::Replace => f.write_str("replace"),
        }
    }
}

/// Outcome of finalizing a transaction.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitResult {
    pub object_id: String,
    /// Hash of the newly committed version.
    pub version_hash: VersionHash,
}
