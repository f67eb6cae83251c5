//! Images and the image gallery.
//!
//! Both store file links in pairs: the file itself and its generated
//! thumbnail (`rep/thumbnail/files/<path>`). Only the file link is read back.

use std::collections::BTreeMap;

use alink_types::{path, Link, VersionHash};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use tracing::debug;

/// A named image slot (`portrait`, `landscape`, ...).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageEntry {
    pub image_key: String,
    pub image_path: Option<String>,
    /// Version holding the file.
    pub target_hash: VersionHash,
}

impl ImageEntry {
    /// An empty slot pointing at the object being edited.
    pub fn empty(image_key: impl Into<String>, current: &VersionHash) -> Self {
        Self {
            image_key: image_key.into(),
            image_path: None,
            target_hash: current.clone(),
        }
    }
}

/// One gallery image.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GalleryEntry {
    pub title: String,
    pub description: String,
    pub image_path: Option<String>,
    pub target_hash: VersionHash,
}

impl GalleryEntry {
    pub fn empty(current: &VersionHash) -> Self {
        Self {
            title: String::new(),
            description: String::new(),
            image_path: None,
            target_hash: current.clone(),
        }
    }
}

/// Read a `files/` link: the version holding the file and the file path.
/// Relative links point into `current`.
pub fn parse_file_link(value: &Value, current: &VersionHash) -> Option<(VersionHash, String)> {
    let link = Link::from_value(value).ok()?;
    let file = link.file_path()?.to_string();
    let hash = link.version_hash().unwrap_or(current).clone();
    Some((hash, file))
}

/// `{default, thumbnail}` link pair for a file.
pub fn file_links(current: &VersionHash, target: &VersionHash, file: &str) -> Value {
    json!({
        "default": Link::for_target(current, Some(target), path::join(["files", file])).to_value(),
        "thumbnail": Link::for_target(
            current,
            Some(target),
            path::join(["rep/thumbnail/files", file]),
        )
        .to_value(),
    })
}

// ---------------------------------------------------------------------------
// Images
// ---------------------------------------------------------------------------

/// Decode `images`. Every key in `default_keys` is present in the result
/// (empty if not stored); entries are sorted by key.
pub fn decode_images(
    raw: Option<&Value>,
    current: &VersionHash,
    default_keys: &[String],
) -> Vec<ImageEntry> {
    let mut images: Vec<ImageEntry> = raw
        .and_then(Value::as_object)
        .into_iter()
        .flatten()
        .filter_map(|(key, entry)| {
            let parsed = entry
                .get("default")
                .and_then(|link| parse_file_link(link, current));
            if parsed.is_none() {
                debug!(image = %key, "skipping image without a file link");
            }
            let (target_hash, image_path) = parsed?;
            Some(ImageEntry {
                image_key: key.clone(),
                image_path: Some(image_path),
                target_hash,
            })
        })
        .collect();

    for key in default_keys {
        if !images.iter().any(|image| &image.image_key == key) {
            images.push(ImageEntry::empty(key.clone(), current));
        }
    }
    images.sort_by(|a, b| a.image_key.cmp(&b.image_key));
    images
}

/// Encode images, skipping entries without a key or a path.
pub fn encode_images(images: &[ImageEntry], current: &VersionHash) -> Value {
    let mut out = Map::new();
    for image in images {
        let Some(file) = image.image_path.as_deref().filter(|p| !p.is_empty()) else {
            continue;
        };
        if image.image_key.is_empty() {
            continue;
        }
        out.insert(
            image.image_key.clone(),
            file_links(current, &image.target_hash, file),
        );
    }
    Value::Object(out)
}

// ---------------------------------------------------------------------------
// Gallery
// ---------------------------------------------------------------------------

/// Decode `gallery`, ordered by numeric key. Non-numeric keys and entries
/// without an image link are skipped.
pub fn decode_gallery(raw: Option<&Value>, current: &VersionHash) -> Vec<GalleryEntry> {
    let mut placed = BTreeMap::new();
    for (key, entry) in raw.and_then(Value::as_object).into_iter().flatten() {
        let Some(index) = path::parse_int_prefix(key) else {
            continue;
        };
        let Some((target_hash, image_path)) = entry
            .get("image")
            .and_then(|image| image.get("default"))
            .and_then(|link| parse_file_link(link, current))
        else {
            debug!(index = %key, "skipping gallery entry without an image");
            continue;
        };
        let text = |field: &str| {
            entry
                .get(field)
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string()
        };
        placed.insert(
            (index, key.clone()),
            GalleryEntry {
                title: text("title"),
                description: text("description"),
                image_path: Some(image_path),
                target_hash,
            },
        );
    }
    placed.into_values().collect()
}

/// Encode the gallery re-indexed from 0. Entries without a path are skipped
/// but still consume their index.
pub fn encode_gallery(gallery: &[GalleryEntry], current: &VersionHash) -> Value {
    let mut out = Map::new();
    for (index, entry) in gallery.iter().enumerate() {
        let Some(file) = entry.image_path.as_deref().filter(|p| !p.is_empty()) else {
            continue;
        };
        out.insert(
            index.to_string(),
            json!({
                "title": entry.title,
                "description": entry.description,
                "image": file_links(current, &entry.target_hash, file),
            }),
        );
    }
    Value::Object(out)
}
