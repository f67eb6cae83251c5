use std::path::Path;

use alink_codec::{FieldSpec, FieldType};
use alink_types::CollectionSpec;
use serde::{Deserialize, Serialize};

use crate::error::{ModelError, ModelResult};

/// One associated-asset collection (`titles`, `series`, ...).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssociatedAssetConfig {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default)]
    pub indexed: bool,
    #[serde(default)]
    pub slugged: bool,
    #[serde(default)]
    pub defaultable: bool,
    #[serde(default)]
    pub orderable: bool,
    /// Asset types offered when browsing for entries.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub asset_types: Option<Vec<String>>,
    /// Title types offered when browsing for entries.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title_types: Option<Vec<String>>,
    /// Title types of the edited object this collection is shown for.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub for_title_types: Option<Vec<String>>,
}

impl AssociatedAssetConfig {
    pub fn new(name: impl Into<String>, indexed: bool, slugged: bool) -> Self {
        Self {
            name: name.into(),
            label: None,
            indexed,
            slugged,
            defaultable: false,
            orderable: true,
            asset_types: None,
            title_types: None,
            for_title_types: None,
        }
    }

    pub fn spec(&self) -> CollectionSpec {
        CollectionSpec::new(self.name.clone(), self.indexed, self.slugged)
    }

    /// Whether entries may be flagged as the default.
    pub fn allows_default(&self) -> bool {
        self.defaultable && self.spec().encoding().supports_default()
    }

    pub fn applies_to(&self, title_type: &str) -> bool {
        self.for_title_types
            .as_ref()
            .map_or(true, |types| types.iter().any(|t| t == title_type))
    }

    fn with_label(mut self, label: &str) -> Self {
        self.label = Some(label.to_string());
        self
    }

    fn browsing(mut self, title_type: &str, for_title_types: &[&str]) -> Self {
        self.asset_types = Some(vec!["primary".to_string()]);
        self.title_types = Some(vec![title_type.to_string()]);
        self.for_title_types = Some(for_title_types.iter().map(|t| t.to_string()).collect());
        self
    }
}

/// Title configuration: which controls, fields and collections the editor
/// works with. Any key missing from a loaded file keeps its default.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    pub controls: Vec<String>,
    pub asset_types: Vec<String>,
    pub title_types: Vec<String>,
    pub info_fields: Vec<FieldSpec>,
    pub associated_assets: Vec<AssociatedAssetConfig>,
    pub default_image_keys: Vec<String>,
}

impl Default for EditorConfig {
    fn default() -> Self {
        let strings = |items: &[&str]| items.iter().map(|s| s.to_string()).collect::<Vec<_>>();
        let titles = AssociatedAssetConfig {
            defaultable: true,
            ..AssociatedAssetConfig::new("titles", true, true)
        };
        Self {
            controls: strings(&["credits", "gallery", "playlists"]),
            asset_types: strings(&["primary", "clip"]),
            title_types: strings(&["collection", "episode", "season", "series", "site", "title"]),
            info_fields: vec![
                FieldSpec::typed("release_date", FieldType::Date),
                FieldSpec::typed("synopsis", FieldType::Textarea),
                FieldSpec::new("copyright"),
                FieldSpec::new("creator"),
                FieldSpec::typed("runtime", FieldType::Integer),
            ],
            associated_assets: vec![
                titles.with_label("Titles"),
                AssociatedAssetConfig::new("series", true, true)
                    .with_label("Series")
                    .browsing("series", &["site", "collection"]),
                AssociatedAssetConfig::new("seasons", true, true)
                    .with_label("Seasons")
                    .browsing("season", &["series"]),
                AssociatedAssetConfig::new("episodes", true, true)
                    .with_label("Episodes")
                    .browsing("episode", &["season"]),
            ],
            default_image_keys: strings(&["portrait", "landscape"]),
        }
    }
}

impl EditorConfig {
    pub fn has_control(&self, control: &str) -> bool {
        self.controls.iter().any(|c| c == control)
    }

    pub fn associated(&self, name: &str) -> Option<&AssociatedAssetConfig> {
        self.associated_assets.iter().find(|a| a.name == name)
    }

    /// Collections shown for `title_type`. Every configured collection is
    /// still loaded and saved.
    pub fn relevant_associated_assets(&self, title_type: &str) -> Vec<&AssociatedAssetConfig> {
        self.associated_assets
            .iter()
            .filter(|a| a.applies_to(title_type))
            .collect()
    }

    /// Title type of a new object.
    pub fn default_title_type(&self) -> &str {
        self.title_types.first().map_or("", String::as_str)
    }

    /// Asset type of a new object.
    pub fn default_asset_type(&self) -> &str {
        self.asset_types.first().map_or("", String::as_str)
    }

    pub fn from_json_str(json: &str) -> ModelResult<Self> {
        serde_json::from_str(json).map_err(|e| ModelError::Config(e.to_string()))
    }

    pub fn from_toml_str(toml: &str) -> ModelResult<Self> {
        toml::from_str(toml).map_err(|e| ModelError::Config(e.to_string()))
    }

    /// Load from a `.toml` or `.json` file, chosen by extension.
    pub fn load(path: &Path) -> ModelResult<Self> {
        let text = std::fs::read_to_string(path)?;
        match path.extension().and_then(|e| e.to_str()) {
            Some("toml") => Self::from_toml_str(&text),
            Some("json") => Self::from_json_str(&text),
            other => Err(ModelError::Config(format!(
                "unsupported config format {:?} for {}",
                other.unwrap_or(""),
                path.display()
            ))),
        }
    }
}
