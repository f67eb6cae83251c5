//! Playlists: named, slug-keyed collections of clips.
//!
//! Two stored layouts exist. The current one is keyed by playlist slug:
//!
//! ```json
//! {"trailers": {"name": "Trailers", "order": 0, "count": 2, "list": {...}}}
//! ```
//!
//! The legacy one is keyed by index, each value wrapping one slug:
//!
//! ```json
//! {"0": {"trailers": {...}}}
//! ```
//!
//! Both are decoded; encoding always writes the current layout.

use std::collections::{BTreeMap, HashSet};

use alink_resolve::LinkResolver;
use alink_store::ContentStore;
use alink_types::{order_from_value, path, AssetRef, CollectionSpec, VersionHash};
use serde::Serialize;
use serde_json::{json, Map, Value};
use tracing::debug;

use crate::collection::{self, DecodeFailure};

/// Slug given to a freshly added playlist.
pub const NEW_PLAYLIST_SLUG: &str = "New Playlist";

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Playlist {
    pub name: String,
    pub slug: String,
    pub clips: Vec<AssetRef>,
}

impl Playlist {
    pub fn new(slug: impl Into<String>) -> Self {
        Self {
            name: String::new(),
            slug: slug.into(),
            clips: Vec::new(),
        }
    }
}

impl Default for Playlist {
    fn default() -> Self {
        Self::new(NEW_PLAYLIST_SLUG)
    }
}

/// The collection spec a playlist's clip list is stored with.
pub fn clip_spec(slug: &str) -> CollectionSpec {
    CollectionSpec::new(format!("playlists/{slug}/list"), false, true)
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct DecodedPlaylists {
    pub playlists: Vec<Playlist>,
    pub failures: Vec<DecodeFailure>,
}

/// Decode the playlists stored at `base_path`.
///
/// Playlists are decoded one after another; each clip list resolves with
/// the resolver's bounded concurrency, so the overall bound holds.
pub async fn decode<S>(
    resolver: &LinkResolver<S>,
    raw: Option<&Value>,
    base_path: &str,
) -> DecodedPlaylists
where
    S: ContentStore + ?Sized,
{
    let Some(map) = raw.and_then(Value::as_object) else {
        return DecodedPlaylists::default();
    };
    let mut keys: Vec<&String> = map.keys().collect();
    keys.sort();

    let mut ordered = BTreeMap::new();
    let mut unordered = Vec::new();
    let mut failures = Vec::new();
    for key in keys {
        let stored = &map[key.as_str()];
        match path::parse_int_prefix(key) {
            None => {
                let decoded = collection::decode(
                    resolver,
                    stored.get("list"),
                    &path::join([base_path, key.as_str(), "list"]),
                )
                .await;
                failures.extend(decoded.failures);
                let playlist = Playlist {
                    name: stored
                        .get("name")
                        .and_then(Value::as_str)
                        .unwrap_or_default()
                        .to_string(),
                    slug: key.clone(),
                    clips: decoded.assets,
                };
                match stored.get("order").and_then(order_from_value) {
                    Some(order) if order >= 0 => {
                        ordered.insert((order, key.clone()), playlist);
                    }
                    _ => unordered.push(playlist),
                }
            }
            Some(index) => {
                let Some((slug, list)) = stored.as_object().and_then(|m| m.iter().next()) else {
                    debug!(index = %key, "skipping empty legacy playlist");
                    continue;
                };
                let link_path = path::join([base_path, key.as_str(), slug.as_str()]);
                let decoded = collection::decode(resolver, Some(list), &link_path).await;
                failures.extend(decoded.failures);
                ordered.insert(
                    (index, key.clone()),
                    Playlist {
                        name: slug.clone(),
                        slug: slug.clone(),
                        clips: decoded.assets,
                    },
                );
            }
        }
    }

    DecodedPlaylists {
        playlists: ordered.into_values().chain(unordered).collect(),
        failures,
    }
}

/// Encode playlists in the current layout. Playlists with an empty slug are
/// skipped; `order` is the position in `playlists`. A repeated slug is
/// suffixed (`-2`, `-3`) so no playlist overwrites another.
pub fn encode(playlists: &[Playlist], current: &VersionHash) -> Value {
    let mut out = Map::new();
    let mut used = HashSet::new();
    for (order, playlist) in playlists.iter().enumerate() {
        if playlist.slug.is_empty() {
            continue;
        }
        let slug = collection::unique_slug(&mut used, playlist.slug.clone(), "playlists");
        let name = if playlist.name.is_empty() {
            &playlist.slug
        } else {
            &playlist.name
        };
        let list = collection::encode(&clip_spec(&slug), current, &playlist.clips);
        out.insert(
            slug,
            json!({
                "name": name,
                "count": playlist.clips.len(),
                "order": order,
                "list": list,
            }),
        );
    }
    Value::Object(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use alink_store::InMemoryContentStore;
    use alink_types::ResolvedTarget;
    use std::sync::Arc;

    const BASE: &str = "public/asset_metadata/playlists";

    fn clip_meta(i: usize) -> Value {
        json!({"public": {"asset_metadata": {"title": format!("Clip {i}"), "slug": format!("clip-{i}")}}})
    }

    fn setup(n: usize) -> (Arc<InMemoryContentStore>, Vec<AssetRef>) {
        let store = InMemoryContentStore::new();
        let clips = (0..n)
            .map(|i| {
                let h = store
                    .insert_version("ilib_c", &format!("iq__c{i}"), None, clip_meta(i))
                    .unwrap();
                AssetRef::new(
                    h.clone(),
                    ResolvedTarget::from_asset_metadata(&clip_meta(i)["public"]["asset_metadata"], h),
                )
            })
            .collect();
        (Arc::new(store), clips)
    }

    fn commit(store: &Arc<InMemoryContentStore>, playlists: Value) -> LinkResolver<InMemoryContentStore> {
        let site = store
            .insert_version(
                "ilib_s",
                "iq__site",
                None,
                json!({"public": {"asset_metadata": {"playlists": playlists}}}),
            )
            .unwrap();
        LinkResolver::new(store.clone(), site)
    }

    fn link(h: &VersionHash) -> Value {
        json!({"/": format!("/qfab/{h}/meta/public/asset_metadata")})
    }

    #[test]
    fn encodes_current_layout() {
        let (_, clips) = setup(2);
        let current = VersionHash::new("hq__site").unwrap();
        let playlists = vec![
            Playlist {
                name: String::new(),
                slug: "trailers".into(),
                clips: vec![clips[0].clone().as_default(), clips[1].clone()],
            },
            Playlist::new(""),
            Playlist {
                name: "Extras".into(),
                slug: "extras".into(),
                clips: vec![],
            },
        ];
        let out = encode(&playlists, &current);
        assert_eq!(out.as_object().unwrap().len(), 2);
        assert_eq!(out["trailers"]["name"], json!("trailers"));
        assert_eq!(out["trailers"]["count"], json!(2));
        assert_eq!(out["trailers"]["order"], json!(0));
        assert_eq!(
            out["trailers"]["list"]["default"]["/"],
            json!("./meta/public/asset_metadata/playlists/trailers/list/clip-0")
        );
        assert_eq!(out["trailers"]["list"]["clip-1"]["order"], json!(1));
        assert_eq!(out["extras"]["order"], json!(2));
        assert_eq!(out["extras"]["list"], json!({}));
    }

    #[test]
    fn repeated_slugs_do_not_overwrite() {
        let (_, clips) = setup(2);
        let current = VersionHash::new("hq__site").unwrap();
        let playlists = vec![
            Playlist {
                name: "Trailers".into(),
                slug: "trailers".into(),
                clips: vec![clips[0].clone().as_default()],
            },
            Playlist {
                name: "More Trailers".into(),
                slug: "trailers".into(),
                clips: vec![clips[1].clone().as_default()],
            },
        ];
        let out = encode(&playlists, &current);
        assert_eq!(out.as_object().unwrap().len(), 2);
        assert_eq!(out["trailers"]["name"], json!("Trailers"));
        assert_eq!(out["trailers-2"]["name"], json!("More Trailers"));
        assert_eq!(out["trailers-2"]["order"], json!(1));
        assert_eq!(
            out["trailers-2"]["list"]["default"]["/"],
            json!("./meta/public/asset_metadata/playlists/trailers-2/list/clip-1")
        );
    }

    #[tokio::test]
    async fn round_trips_current_layout() {
        let (store, clips) = setup(3);
        let playlists = vec![
            Playlist {
                name: "Trailers".into(),
                slug: "trailers".into(),
                clips: vec![clips[2].clone().as_default(), clips[0].clone()],
            },
            Playlist {
                name: "Behind".into(),
                slug: "behind".into(),
                clips: vec![clips[1].clone()],
            },
        ];
        let raw = encode(&playlists, &VersionHash::new("hq__draft").unwrap());
        let resolver = commit(&store, raw.clone());

        let decoded = decode(&resolver, Some(&raw), BASE).await;
        assert!(decoded.failures.is_empty());
        let got: Vec<_> = decoded
            .playlists
            .iter()
            .map(|p| {
                (
                    p.slug.as_str(),
                    p.name.as_str(),
                    p.clips
                        .iter()
                        .map(|c| (c.version_hash.clone(), c.is_default))
                        .collect::<Vec<_>>(),
                )
            })
            .collect();
        assert_eq!(
            got,
            vec![
                (
                    "trailers",
                    "Trailers",
                    vec![
                        (clips[2].version_hash.clone(), true),
                        (clips[0].version_hash.clone(), false)
                    ]
                ),
                ("behind", "Behind", vec![(clips[1].version_hash.clone(), false)]),
            ]
        );
    }

    #[tokio::test]
    async fn decodes_legacy_layout_and_unordered_playlists() {
        let (store, clips) = setup(2);
        let raw = json!({
            "1": {"second": [link(&clips[1].version_hash)]},
            "0": {"first": [link(&clips[0].version_hash)]},
            "loose": {"name": "Loose", "list": {}},
        });
        let resolver = commit(&store, raw.clone());

        let decoded = decode(&resolver, Some(&raw), BASE).await;
        let slugs: Vec<_> = decoded.playlists.iter().map(|p| p.slug.as_str()).collect();
        assert_eq!(slugs, ["first", "second", "loose"]);
        assert_eq!(decoded.playlists[0].name, "first");
        assert_eq!(decoded.playlists[1].clips[0].version_hash, clips[1].version_hash);
        assert!(decoded.playlists[2].clips.is_empty());
    }

    #[tokio::test]
    async fn clip_failures_are_reported() {
        let (store, clips) = setup(2);
        store.fail_reads_of(clips[0].version_hash.clone());
        let raw = json!({"p": {"order": 0, "list": [link(&clips[0].version_hash), link(&clips[1].version_hash)]}});
        let resolver = commit(&store, raw.clone());

        let decoded = decode(&resolver, Some(&raw), BASE).await;
        assert_eq!(decoded.playlists[0].clips.len(), 1);
        assert_eq!(decoded.failures.len(), 1);
        assert_eq!(decoded.failures[0].link_path, format!("{BASE}/p/list/0"));
    }
}
