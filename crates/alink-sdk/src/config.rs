use alink_model::EditorConfig;
use alink_resolve::ResolverConfig;
use alink_types::VersionHash;
use serde::{Deserialize, Serialize};

/// Which object an edit session works on.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionParams {
    pub library_id: String,
    pub object_id: String,
    /// Version to edit; the object's latest version when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version_hash: Option<VersionHash>,
}

impl SessionParams {
    pub fn latest(library_id: impl Into<String>, object_id: impl Into<String>) -> Self {
        Self {
            library_id: library_id.into(),
            object_id: object_id.into(),
            version_hash: None,
        }
    }

    pub fn at_version(mut self, version_hash: VersionHash) -> Self {
        self.version_hash = Some(version_hash);
        self
    }
}

/// Configuration of an edit session.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub resolver: ResolverConfig,
    pub editor: EditorConfig,
}

impl SessionConfig {
    pub fn with_editor(mut self, editor: EditorConfig) -> Self {
        self.editor = editor;
        self
    }

    pub fn with_max_concurrency(mut self, max_concurrency: usize) -> Self {
        self.resolver.max_concurrency = max_concurrency;
        self
    }
}
