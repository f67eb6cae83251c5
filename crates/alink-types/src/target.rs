use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::hash::VersionHash;

/// Summary of a linked object, derived once per version hash.
///
/// Content addressing guarantees the metadata behind a hash never changes, so
/// a `ResolvedTarget` is immutable once built. `latest_version_hash` is looked
/// up separately and lets the editor flag links that have newer versions.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedTarget {
    /// External title identifier (`ip_title_id`).
    pub id: Option<String>,
    pub asset_type: Option<String>,
    pub title: Option<String>,
    pub display_title: Option<String>,
    pub slug: Option<String>,
    /// Whether the target has a default playout source.
    pub playable: bool,
    pub latest_version_hash: VersionHash,
}

impl ResolvedTarget {
    /// Build a summary from a target's `public/asset_metadata` subtree.
    ///
    /// `title` falls back to `display_title` and vice versa; empty strings
    /// count as absent.
    pub fn from_asset_metadata(metadata: &Value, latest_version_hash: VersionHash) -> Self {
        let text = |key: &str| {
            metadata
                .get(key)
                .and_then(Value::as_str)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        };
        let title = text("title");
        let display_title = text("display_title");
        let playable = metadata
            .get("sources")
            .and_then(|sources| sources.get("default"))
            .is_some_and(|default| !default.is_null());

        Self {
            id: text("ip_title_id"),
            asset_type: text("asset_type"),
            title: title.clone().or_else(|| display_title.clone()),
            display_title: display_title.or(title),
            slug: text("slug"),
            playable,
            latest_version_hash,
        }
    }
}

/// One entry of an editable collection.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetRef {
    /// The hash actually linked.
    pub version_hash: VersionHash,
    pub is_default: bool,
    #[serde(flatten)]
    pub target: ResolvedTarget,
}

impl AssetRef {
    pub fn new(version_hash: VersionHash, target: ResolvedTarget) -> Self {
        Self {
            version_hash,
            is_default: false,
            target,
        }
    }

    pub fn as_default(mut self) -> Self {
        self.is_default = true;
        self
    }

    /// Returns `true` if a newer version of the target exists.
    pub fn update_available(&self) -> bool {
        self.version_hash != self.target.latest_version_hash
    }

    /// Best human label: display title, then title, then the hash.
    pub fn label(&self) -> &str {
        self.target
            .display_title
            .as_deref()
            .or(self.target.title.as_deref())
            .unwrap_or(self.version_hash.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn hash(s: &str) -> VersionHash {
        VersionHash::new(s).unwrap()
    }

    #[test]
    fn summary_from_full_metadata() {
        let meta = json!({
            "ip_title_id": "T-100",
            "asset_type": "primary",
            "title": "The Title",
            "display_title": "The Display Title",
            "slug": "the-title",
            "sources": {"default": {"/": "./rep/playout"}}
        });
        let target = ResolvedTarget::from_asset_metadata(&meta, hash("hq__latest"));
        assert_eq!(target.id.as_deref(), Some("T-100"));
        assert_eq!(target.asset_type.as_deref(), Some("primary"));
        assert_eq!(target.title.as_deref(), Some("The Title"));
        assert_eq!(target.display_title.as_deref(), Some("The Display Title"));
        assert_eq!(target.slug.as_deref(), Some("the-title"));
        assert!(target.playable);
    }

    #[test]
    fn titles_fall_back_to_each_other() {
        let only_display = json!({"display_title": "Shown"});
        let t = ResolvedTarget::from_asset_metadata(&only_display, hash("hq__l"));
        assert_eq!(t.title.as_deref(), Some("Shown"));
        assert_eq!(t.display_title.as_deref(), Some("Shown"));

        let only_title = json!({"title": "Named", "display_title": ""});
        let t = ResolvedTarget::from_asset_metadata(&only_title, hash("hq__l"));
        assert_eq!(t.display_title.as_deref(), Some("Named"));
        assert!(!t.playable);
        assert!(t.slug.is_none());
    }

    #[test]
    fn update_available_compares_hashes() {
        let target = ResolvedTarget::from_asset_metadata(&json!({}), hash("hq__v2"));
        let stale = AssetRef::new(hash("hq__v1"), target.clone());
        assert!(stale.update_available());
        let fresh = AssetRef::new(hash("hq__v2"), target);
        assert!(!fresh.update_available());
        assert_eq!(fresh.label(), "hq__v2");
    }

    #[test]
    fn asset_ref_serializes_flat() {
        let target = ResolvedTarget::from_asset_metadata(&json!({"title": "A"}), hash("hq__a"));
        let asset = AssetRef::new(hash("hq__a"), target).as_default();
        let json = serde_json::to_value(&asset).unwrap();
        assert_eq!(json["version_hash"], "hq__a");
        assert_eq!(json["is_default"], true);
        assert_eq!(json["title"], "A");
        assert_eq!(json["latest_version_hash"], "hq__a");
    }
}
