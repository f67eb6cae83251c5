//! Build an [`AssetModel`] from an object's stored asset metadata.

use alink_codec::{collection, credits, media, playlist, scalar, slugify, DecodeFailure};
use alink_resolve::LinkResolver;
use alink_store::ContentStore;
use alink_types::path;
use serde::Serialize;
use serde_json::Value;
use tracing::{info, warn};

use crate::config::EditorConfig;
use crate::model::{AssetInfo, AssetModel};

/// A linked entry left out of the loaded model.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SkippedEntry {
    /// Collection name, or `playlists`.
    pub collection: String,
    pub failure: DecodeFailure,
}

/// What loading could not decode. The model is usable either way.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct LoadReport {
    pub skipped: Vec<SkippedEntry>,
}

impl LoadReport {
    pub fn is_clean(&self) -> bool {
        self.skipped.is_empty()
    }

    fn extend(&mut self, collection: &str, failures: Vec<DecodeFailure>) {
        self.skipped
            .extend(failures.into_iter().map(|failure| SkippedEntry {
                collection: collection.to_string(),
                failure,
            }));
    }
}

/// Decode `asset_metadata` (the object's `public/asset_metadata` subtree)
/// into a model for the resolver's current version.
///
/// Collections are decoded one after another, each with the resolver's
/// bounded concurrency. Unresolvable entries are dropped and listed in the
/// report.
pub async fn load<S>(
    resolver: &LinkResolver<S>,
    asset_metadata: &Value,
    config: EditorConfig,
) -> (AssetModel, LoadReport)
where
    S: ContentStore + ?Sized,
{
    let current = resolver.current_version().clone();
    let mut report = LoadReport::default();
    let text = |key: &str| {
        asset_metadata
            .get(key)
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string()
    };

    let mut info = AssetInfo {
        title: text("title"),
        display_title: text("display_title"),
        slug: text("slug"),
        ip_title_id: text("ip_title_id"),
        title_type: text("title_type"),
        asset_type: text("asset_type"),
    };
    if info.slug.is_empty() {
        info.slug = slugify(&info.display_title);
    }
    if info.title_type.is_empty() {
        info.title_type = config.default_title_type().to_string();
    }
    if info.asset_type.is_empty() {
        info.asset_type = config.default_asset_type().to_string();
    }

    let stored_info = asset_metadata.get("info").unwrap_or(&Value::Null);
    let fields = scalar::decode(&config.info_fields, stored_info, Some(asset_metadata));
    let talent = credits::decode(stored_info.get("talent"));
    let images = media::decode_images(
        asset_metadata.get("images"),
        &current,
        &config.default_image_keys,
    );
    let gallery = media::decode_gallery(asset_metadata.get("gallery"), &current);

    let playlists = playlist::decode(
        resolver,
        asset_metadata.get("playlists"),
        &path::join([path::ASSET_METADATA, "playlists"]),
    )
    .await;
    report.extend("playlists", playlists.failures);

    let specs: Vec<_> = config
        .associated_assets
        .iter()
        .map(|a| (a.name.clone(), a.spec()))
        .collect();

    let mut model = AssetModel::new(config, current);
    model.set_loaded_info(info, fields);
    model.set_loaded_media(talent, images, gallery, playlists.playlists);

    for (name, spec) in specs {
        let decoded =
            collection::decode(resolver, asset_metadata.get(name.as_str()), &spec.base_path()).await;
        report.extend(&name, decoded.failures);
        model.set_loaded_collection(&name, decoded.assets);
    }

    if report.is_clean() {
        info!(version = %model.current_version(), "loaded asset model");
    } else {
        warn!(
            version = %model.current_version(),
            skipped = report.skipped.len(),
            "loaded asset model with unresolvable entries"
        );
    }
    (model, report)
}
