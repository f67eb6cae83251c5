//! Turning an [`AssetModel`] into the ordered writes of one save.

use std::fmt;

use alink_codec::{collection, credits, media, playlist, scalar};
use alink_model::AssetModel;
use alink_store::WriteMode;
use alink_types::path::{self, ASSET_METADATA};
use serde::Serialize;
use serde_json::{Map, Value};

/// One staged write of a save.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct WriteStep {
    /// Short name used in logs and errors (`info`, `collection:titles`, ...).
    pub label: String,
    pub mode: WriteMode,
    /// Slash-separated subtree from the metadata root.
    pub subtree: String,
    pub value: Value,
}

impl WriteStep {
    fn merge(label: impl Into<String>, subtree: String, value: Value) -> Self {
        Self {
            label: label.into(),
            mode: WriteMode::Merge,
            subtree,
            value,
        }
    }

    fn replace(label: impl Into<String>, subtree: String, value: Value) -> Self {
        Self {
            label: label.into(),
            mode: WriteMode::Replace,
            subtree,
            value,
        }
    }
}

impl fmt::Display for WriteStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} ({})", self.mode, self.subtree, self.label)
    }
}

/// Plan every write needed to persist `model`, in issue order:
///
/// 1. info fields (merge into `info`)
/// 2. built-in and top-level fields (merge into the asset metadata root)
/// 3. each `list`/`multiselect` field (replace)
/// 4. credits (replace `info/talent`)
/// 5. each configured collection (replace)
/// 6. images, gallery, playlists (replace)
///
/// Every step is emitted on every save. Disabled controls still write back
/// the credits, gallery and playlists that were loaded.
pub fn plan_writes(model: &AssetModel) -> Vec<WriteStep> {
    let config = model.config();
    let current = model.current_version();
    let info = model.info();
    let at = |sub: &str| path::join([ASSET_METADATA, sub]);

    let encoded = scalar::encode(&config.info_fields, model.fields(), &info.title_type);
    let mut steps = vec![WriteStep::merge(
        "info",
        at("info"),
        Value::Object(encoded.nested),
    )];

    let mut top_level: Map<String, Value> = encoded.top_level;
    for (key, value) in [
        ("title", &info.title),
        ("display_title", &info.display_title),
        ("slug", &info.slug),
        ("ip_title_id", &info.ip_title_id),
        ("title_type", &info.title_type),
        ("asset_type", &info.asset_type),
    ] {
        top_level.insert(key.to_string(), Value::String(value.clone()));
    }
    steps.push(WriteStep::merge(
        "top_level",
        ASSET_METADATA.to_string(),
        Value::Object(top_level),
    ));

    for list in encoded.replace_lists {
        let subtree = if list.top_level {
            at(&list.name)
        } else {
            path::join([ASSET_METADATA, "info", list.name.as_str()])
        };
        steps.push(WriteStep::replace(
            format!("list:{}", list.name),
            subtree,
            list.value,
        ));
    }

    steps.push(WriteStep::replace(
        "credits",
        at("info/talent"),
        credits::encode(model.credits()),
    ));

    for entry in model.collections() {
        let spec = entry.config.spec();
        steps.push(WriteStep::replace(
            format!("collection:{}", spec.name),
            spec.base_path(),
            collection::encode(&spec, current, &entry.assets),
        ));
    }

    steps.push(WriteStep::replace(
        "images",
        at("images"),
        media::encode_images(model.images(), current),
    ));
    steps.push(WriteStep::replace(
        "gallery",
        at("gallery"),
        media::encode_gallery(model.gallery(), current),
    ));
    steps.push(WriteStep::replace(
        "playlists",
        at("playlists"),
        playlist::encode(model.playlists(), current),
    ));
    steps
}

#[cfg(test)]
mod tests {
    use super::*;
    use alink_codec::{FieldSpec, FieldType, FieldValue};
    use alink_model::{ClipList, EditorConfig};
    use alink_types::{AssetRef, ResolvedTarget, VersionHash};
    use serde_json::json;

    fn hash(s: &str) -> VersionHash {
        VersionHash::new(s).unwrap()
    }

    fn labels(steps: &[WriteStep]) -> Vec<&str> {
        steps.iter().map(|s| s.label.as_str()).collect()
    }

    #[test]
    fn default_plan_order() {
        let model = AssetModel::new(EditorConfig::default(), hash("hq__cur"));
        let steps = plan_writes(&model);
        assert_eq!(
            labels(&steps),
            [
                "info",
                "top_level",
                "credits",
                "collection:titles",
                "collection:series",
                "collection:seasons",
                "collection:episodes",
                "images",
                "gallery",
                "playlists",
            ]
        );
        assert_eq!(steps[0].mode, WriteMode::Merge);
        assert_eq!(steps[0].subtree, "public/asset_metadata/info");
        assert_eq!(steps[1].subtree, "public/asset_metadata");
        assert_eq!(steps[2].subtree, "public/asset_metadata/info/talent");
        assert!(steps[2..].iter().all(|s| s.mode == WriteMode::Replace));
    }

    #[test]
    fn routes_fields_and_lists() {
        let mut config = EditorConfig::default();
        config.info_fields = vec![
            FieldSpec::new("synopsis"),
            FieldSpec::new("rating").top_level(),
            FieldSpec::typed("genre", FieldType::Multiselect),
            FieldSpec::typed("tags", FieldType::List)
                .top_level()
                .with_fields(vec![FieldSpec::new("tag")]),
        ];
        let mut model = AssetModel::new(config, hash("hq__cur"));
        model.update_info("display_title", "The Show").unwrap();
        model.set_field("synopsis", FieldValue::text("s")).unwrap();
        model.set_field("rating", FieldValue::text("PG")).unwrap();
        model
            .set_field("genre", FieldValue::Value(json!(["drama"])))
            .unwrap();

        let steps = plan_writes(&model);
        assert_eq!(steps[0].value, json!({"synopsis": "s"}));
        assert_eq!(steps[1].value["rating"], json!("PG"));
        assert_eq!(steps[1].value["slug"], json!("the-show"));
        assert_eq!(steps[1].value["title_type"], json!("collection"));

        let genre = steps.iter().find(|s| s.label == "list:genre").unwrap();
        assert_eq!(genre.subtree, "public/asset_metadata/info/genre");
        assert_eq!(genre.value, json!(["drama"]));
        let tags = steps.iter().find(|s| s.label == "list:tags").unwrap();
        assert_eq!(tags.subtree, "public/asset_metadata/tags");
        assert_eq!(tags.value, json!([]));
    }

    #[test]
    fn disabled_controls_are_still_written() {
        let config = EditorConfig {
            controls: vec![],
            associated_assets: vec![],
            ..EditorConfig::default()
        };
        let mut model = AssetModel::new(config, hash("hq__cur"));
        model.add_credit_group();
        let steps = plan_writes(&model);
        assert_eq!(
            labels(&steps),
            ["info", "top_level", "credits", "images", "gallery", "playlists"]
        );
        assert_eq!(steps[2].value, credits::encode(model.credits()));
    }

    #[test]
    fn collections_encode_with_their_spec() {
        let mut model = AssetModel::new(EditorConfig::default(), hash("hq__cur"));
        let target = ResolvedTarget::from_asset_metadata(&json!({"slug": "alpha"}), hash("hq__a"));
        let titles = ClipList::collection("titles");
        model
            .insert_asset(&titles, AssetRef::new(hash("hq__a"), target))
            .unwrap();
        model.set_default(&titles, 0).unwrap();

        let steps = plan_writes(&model);
        let step = steps
            .iter()
            .find(|s| s.label == "collection:titles")
            .unwrap();
        assert_eq!(step.subtree, "public/asset_metadata/titles");
        assert_eq!(
            step.value["default"]["alpha"]["/"],
            json!("/qfab/hq__a/meta/public/asset_metadata")
        );
    }
}
