use serde::{Deserialize, Serialize};

/// Configuration for a [`LinkResolver`](crate::LinkResolver).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverConfig {
    /// Maximum number of remote fetches in flight during a batch.
    pub max_concurrency: usize,
    /// Subtree holding a target's summary metadata.
    pub asset_metadata_path: String,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            max_concurrency: 10,
            asset_metadata_path: alink_types::path::ASSET_METADATA.to_string(),
        }
    }
}
