//! Collections of linked assets in their four stored encodings.
//!
//! | Encoding | Stored shape |
//! |---|---|
//! | `PlainArray` | `[link, ...]` |
//! | `IndexedObject` | `{"0": link, "1": link, "default": link}` |
//! | `SluggedObject` | `{slug: link+order, "default": ./.../<slug>}` |
//! | `IndexedSluggedObject` | `{"0": {slug: link}, "default": {slug: link}}` |
//!
//! Decoding accepts any of the four regardless of configuration; encoding is
//! driven by the collection's [`CollectionSpec`]. Both directions keep the
//! default entry first in memory.

use std::collections::{BTreeMap, HashMap, HashSet};

use alink_resolve::LinkResolver;
use alink_store::ContentStore;
use alink_types::link::ORDER_KEY;
use alink_types::{
    is_link, order_from_value, path, AssetRef, CollectionEncoding, CollectionSpec, Link,
    VersionHash, DEFAULT_KEY,
};
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::error::{kind_of, CodecError, CodecResult};
use crate::slug::slugify;

/// Path inside a target that collection links point at.
pub const TARGET_PATH: &str = "meta/public/asset_metadata";

/// An entry dropped from a decoded collection.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct DecodeFailure {
    /// Stored key of the entry (`""` when the whole collection was unusable).
    pub key: String,
    pub link_path: String,
    pub reason: String,
}

/// A decoded collection plus everything that had to be skipped.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DecodedCollection {
    pub assets: Vec<AssetRef>,
    pub failures: Vec<DecodeFailure>,
}

/// Where a decoded entry goes in the in-memory order.
#[derive(Clone, Debug, PartialEq, Eq)]
enum Placement {
    Default,
    Ordered(i64),
    Unordered,
}

/// One stored entry, before resolution.
#[derive(Clone, Debug, PartialEq, Eq)]
struct PendingEntry {
    key: String,
    link_path: String,
    placement: Placement,
}

/// Result of scanning a stored collection without touching the store.
#[derive(Debug, Default)]
struct Scan {
    entries: Vec<PendingEntry>,
    malformed: Vec<DecodeFailure>,
}

// ---------------------------------------------------------------------------
// Decode
// ---------------------------------------------------------------------------

/// Decode the collection stored at `base_path` (for example
/// `public/asset_metadata/titles`), whose raw value is `raw`.
///
/// Every entry is resolved through `resolver` with bounded concurrency.
/// Entries that fail to resolve are logged and reported in
/// [`DecodedCollection::failures`]; they never fail the decode.
pub async fn decode<S>(
    resolver: &LinkResolver<S>,
    raw: Option<&Value>,
    base_path: &str,
) -> DecodedCollection
where
    S: ContentStore + ?Sized,
{
    let Some(raw) = raw.filter(|raw| !raw.is_null()) else {
        return DecodedCollection::default();
    };
    let scan = match scan(raw, base_path) {
        Ok(scan) => scan,
        Err(e) => {
            warn!(path = %base_path, error = %e, "skipping unreadable collection");
            return DecodedCollection {
                assets: Vec::new(),
                failures: vec![DecodeFailure {
                    key: String::new(),
                    link_path: base_path.to_string(),
                    reason: e.to_string(),
                }],
            };
        }
    };

    let by_path: HashMap<&str, &PendingEntry> = scan
        .entries
        .iter()
        .map(|entry| (entry.link_path.as_str(), entry))
        .collect();
    let outcome = resolver
        .resolve_paths(scan.entries.iter().map(|entry| entry.link_path.clone()))
        .await;

    let mut default = None;
    let mut ordered: BTreeMap<(i64, String), AssetRef> = BTreeMap::new();
    let mut unordered = Vec::new();
    for (link_path, asset) in outcome.resolved {
        let Some(entry) = by_path.get(link_path.as_str()) else {
            continue;
        };
        match entry.placement {
            Placement::Default => default = Some(asset.as_default()),
            Placement::Ordered(index) => {
                ordered.insert((index, entry.key.clone()), asset);
            }
            Placement::Unordered => unordered.push(asset),
        }
    }

    let mut failures = scan.malformed;
    for failure in outcome.failures {
        let key = by_path
            .get(failure.key.as_str())
            .map(|entry| entry.key.clone())
            .unwrap_or_default();
        warn!(path = %base_path, key = %key, error = %failure.error, "dropping unresolvable entry");
        failures.push(DecodeFailure {
            key,
            link_path: failure.key,
            reason: failure.error.to_string(),
        });
    }

    let assets: Vec<AssetRef> = default
        .into_iter()
        .chain(ordered.into_values())
        .chain(unordered)
        .collect();
    debug!(path = %base_path, entries = assets.len(), skipped = failures.len(), "decoded collection");
    DecodedCollection { assets, failures }
}

/// Work out, for every stored entry, the link path to resolve and where the
/// result belongs.
fn scan(raw: &Value, base_path: &str) -> CodecResult<Scan> {
    let mut scan = Scan::default();
    match raw {
        Value::Array(items) => {
            for (index, item) in items.iter().enumerate() {
                if item.is_null() {
                    continue;
                }
                let key = index.to_string();
                scan.push(base_path, &key, item, placement_of(&key, item));
            }
        }
        Value::Object(map) => {
            let mut shadowed = HashSet::new();
            if let Some(default) = map.get(DEFAULT_KEY).filter(|v| !v.is_null()) {
                // A slug-keyed default points at its own slug entry, which is
                // then skipped so the asset is not listed twice.
                if let Some(slug) = unwrap_slug(default)
                    .and_then(|(_, link)| Link::from_value(link).ok())
                    .and_then(|link| link.last_segment().map(str::to_string))
                {
                    shadowed.insert(slug);
                }
                scan.push(base_path, DEFAULT_KEY, default, Placement::Default);
            }
            for (key, value) in map {
                if key == DEFAULT_KEY || value.is_null() || shadowed.contains(key) {
                    continue;
                }
                scan.push(base_path, key, value, placement_of(key, value));
            }
        }
        other => {
            return Err(CodecError::MalformedCollection {
                path: base_path.to_string(),
                found: kind_of(other),
            })
        }
    }
    Ok(scan)
}

impl Scan {
    fn push(&mut self, base_path: &str, key: &str, value: &Value, placement: Placement) {
        match unwrap_slug(value) {
            Some((slug, _)) => self.entries.push(PendingEntry {
                key: key.to_string(),
                link_path: path::join([base_path, key, slug.unwrap_or_default()]),
                placement,
            }),
            None => {
                let reason = format!("expected a link or {{slug: link}}, found {}", kind_of(value));
                warn!(path = %base_path, key = %key, "skipping malformed entry");
                self.malformed.push(DecodeFailure {
                    key: key.to_string(),
                    link_path: path::join([base_path, key]),
                    reason: CodecError::MalformedEntry {
                        key: key.to_string(),
                        reason,
                    }
                    .to_string(),
                });
            }
        }
    }
}

/// Split an entry into its slug wrapper (if any) and the link itself.
fn unwrap_slug(value: &Value) -> Option<(Option<&str>, &Value)> {
    if is_link(value) {
        return Some((None, value));
    }
    let (slug, link) = value.as_object()?.iter().next()?;
    is_link(link).then_some((Some(slug.as_str()), link))
}

/// An explicit `order` on the link wins; otherwise the key (or array
/// position) is read as an index. Negative or unusable orders leave the
/// entry unordered.
fn placement_of(key: &str, value: &Value) -> Placement {
    let link = unwrap_slug(value).map_or(value, |(_, link)| link);
    let order = match link.get(ORDER_KEY) {
        Some(order) => order_from_value(order),
        None => path::parse_int_prefix(key),
    };
    match order {
        Some(index) if index >= 0 => Placement::Ordered(index),
        _ => Placement::Unordered,
    }
}

// ---------------------------------------------------------------------------
// Encode
// ---------------------------------------------------------------------------

/// Encode `assets` for storage under `spec`, from the point of view of the
/// object version `current` (links to it are written relative).
pub fn encode(spec: &CollectionSpec, current: &VersionHash, assets: &[AssetRef]) -> Value {
    let has_default = spec.encoding().supports_default() && assets.iter().any(|a| a.is_default);
    let mut next_index: i64 = if has_default { 1 } else { 0 };
    let mut keyed = Vec::with_capacity(assets.len());
    let mut default_seen = false;
    for asset in assets {
        let key = if asset.is_default && has_default && !default_seen {
            default_seen = true;
            Key::Default
        } else {
            let key = Key::Index(next_index);
            next_index += 1;
            key
        };
        keyed.push((key, asset));
    }

    match spec.encoding() {
        CollectionEncoding::PlainArray => Value::Array(
            assets
                .iter()
                .map(|asset| asset_link(current, asset).to_value())
                .collect(),
        ),
        CollectionEncoding::IndexedObject => {
            let mut out = Map::new();
            for (key, asset) in keyed {
                out.insert(key.to_string(), asset_link(current, asset).to_value());
            }
            Value::Object(out)
        }
        CollectionEncoding::IndexedSluggedObject => {
            let mut out = Map::new();
            for (key, asset) in keyed {
                let mut wrapper = Map::new();
                wrapper.insert(slug_for(asset), asset_link(current, asset).to_value());
                out.insert(key.to_string(), Value::Object(wrapper));
            }
            Value::Object(out)
        }
        CollectionEncoding::SluggedObject => {
            let mut out = Map::new();
            let mut used = HashSet::from([DEFAULT_KEY.to_string()]);
            for (key, asset) in keyed {
                let slug = unique_slug(&mut used, slug_for(asset), &spec.name);
                let order = match key {
                    Key::Default => {
                        let alias = Link::relative(spec.entry_meta_path(&slug)).with_order(0);
                        out.insert(DEFAULT_KEY.to_string(), alias.to_value());
                        0
                    }
                    Key::Index(index) => index,
                };
                out.insert(slug, asset_link(current, asset).with_order(order).to_value());
            }
            Value::Object(out)
        }
    }
}

#[derive(Clone, Copy, Debug)]
enum Key {
    Default,
    Index(i64),
}

impl std::fmt::Display for Key {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Key::Default => f.write_str(DEFAULT_KEY),
            Key::Index(index) => write!(f, "{index}"),
        }
    }
}

/// The link an entry is stored as.
pub fn asset_link(current: &VersionHash, asset: &AssetRef) -> Link {
    Link::for_target(current, Some(&asset.version_hash), TARGET_PATH)
}

/// Slug an entry is keyed by: the target's own stored slug, else the
/// slugified display title, else the version hash.
pub fn slug_for(asset: &AssetRef) -> String {
    asset
        .target
        .slug
        .clone()
        .filter(|slug| !slug.is_empty())
        .or_else(|| {
            asset
                .target
                .display_title
                .as_deref()
                .map(slugify)
                .filter(|slug| !slug.is_empty())
        })
        .unwrap_or_else(|| asset.version_hash.to_string())
}

pub(crate) fn unique_slug(used: &mut HashSet<String>, slug: String, collection: &str) -> String {
    if used.insert(slug.clone()) {
        return slug;
    }
    let unique = (2..)
        .map(|n| format!("{slug}-{n}"))
        .find(|candidate| !used.contains(candidate))
        .unwrap_or_else(|| slug.clone());
    warn!(collection = %collection, slug = %slug, renamed = %unique, "duplicate slug in collection");
    used.insert(unique.clone());
    unique
}

#[cfg(test)]
mod tests {
    use super::*;
    use alink_store::InMemoryContentStore;
    use alink_types::ResolvedTarget;
    use serde_json::json;
    use std::sync::Arc;

    // --- Fixtures --------------------------------------------------------

    struct Site {
        store: Arc<InMemoryContentStore>,
        targets: Vec<VersionHash>,
    }

    fn target_meta(i: usize) -> Value {
        json!({"public": {"asset_metadata": {
            "title": format!("Title {i}"),
            "display_title": format!("Title {i}"),
            "slug": format!("title-{i}"),
        }}})
    }

    fn link_to(h: &VersionHash) -> Value {
        json!({".": {"auto_update": {"tag": "latest"}}, "/": format!("/qfab/{h}/meta/public/asset_metadata")})
    }

    impl Site {
        fn new(n: usize) -> Self {
            let store = InMemoryContentStore::new();
            let targets = (0..n)
                .map(|i| {
                    store
                        .insert_version("ilib_t", &format!("iq__t{i}"), None, target_meta(i))
                        .unwrap()
                })
                .collect();
            Self {
                store: Arc::new(store),
                targets,
            }
        }

        /// Commit a site version holding `titles` and return a resolver on it.
        fn resolver(&self, titles: Value) -> LinkResolver<InMemoryContentStore> {
            let site = self
                .store
                .insert_version(
                    "ilib_s",
                    "iq__site",
                    None,
                    json!({"public": {"asset_metadata": {"titles": titles}}}),
                )
                .unwrap();
            LinkResolver::new(self.store.clone(), site)
        }

        fn link(&self, i: usize) -> Value {
            link_to(&self.targets[i])
        }

        fn asset(&self, i: usize) -> AssetRef {
            AssetRef::new(
                self.targets[i].clone(),
                ResolvedTarget::from_asset_metadata(
                    &target_meta(i)["public"]["asset_metadata"],
                    self.targets[i].clone(),
                ),
            )
        }
    }

    const BASE: &str = "public/asset_metadata/titles";

    fn hashes(assets: &[AssetRef]) -> Vec<(VersionHash, bool)> {
        assets
            .iter()
            .map(|a| (a.version_hash.clone(), a.is_default))
            .collect()
    }

    async fn round_trip(site: &Site, spec: &CollectionSpec, assets: &[AssetRef]) -> Vec<AssetRef> {
        // Encode against a placeholder, commit, then decode against the commit.
        let current = VersionHash::new("hq__site_draft").unwrap();
        let encoded = encode(spec, &current, assets);
        let resolver = site.resolver(encoded.clone());
        let decoded = decode(&resolver, Some(&encoded), &spec.base_path()).await;
        assert!(decoded.failures.is_empty(), "{:?}", decoded.failures);
        decoded.assets
    }

    // --- Decode ----------------------------------------------------------

    #[tokio::test]
    async fn sparse_and_non_numeric_keys() {
        let site = Site::new(3);
        let raw = json!({"0": site.link(0), "2": site.link(1), "foo": site.link(2)});
        let resolver = site.resolver(raw.clone());

        let decoded = decode(&resolver, Some(&raw), BASE).await;
        assert_eq!(
            hashes(&decoded.assets),
            vec![
                (site.targets[0].clone(), false),
                (site.targets[1].clone(), false),
                (site.targets[2].clone(), false),
            ]
        );
    }

    #[tokio::test]
    async fn default_comes_first() {
        let site = Site::new(2);
        let raw = json!({"default": site.link(0), "0": site.link(1)});
        let resolver = site.resolver(raw.clone());

        let decoded = decode(&resolver, Some(&raw), BASE).await;
        assert_eq!(
            hashes(&decoded.assets),
            vec![
                (site.targets[0].clone(), true),
                (site.targets[1].clone(), false),
            ]
        );
        assert_eq!(decoded.assets[0].target.title.as_deref(), Some("Title 0"));
    }

    #[tokio::test]
    async fn one_bad_link_degrades_the_collection() {
        let site = Site::new(5);
        site.store.fail_reads_of(site.targets[2].clone());
        let raw = Value::Array((0..5).map(|i| site.link(i)).collect());
        let resolver = site.resolver(raw.clone());

        let decoded = decode(&resolver, Some(&raw), BASE).await;
        assert_eq!(decoded.assets.len(), 4);
        assert_eq!(decoded.failures.len(), 1);
        assert_eq!(decoded.failures[0].key, "2");
        assert_eq!(decoded.failures[0].link_path, format!("{BASE}/2"));
        assert!(!decoded
            .assets
            .iter()
            .any(|a| a.version_hash == site.targets[2]));
    }

    #[tokio::test]
    async fn explicit_order_beats_key() {
        let site = Site::new(2);
        let mut first = site.link(0);
        first["order"] = json!(1);
        let mut second = site.link(1);
        second["order"] = json!("0");
        let raw = json!({"title-0": first, "title-1": second});
        let resolver = site.resolver(raw.clone());

        let decoded = decode(&resolver, Some(&raw), BASE).await;
        assert_eq!(decoded.assets[0].version_hash, site.targets[1]);
        assert_eq!(decoded.assets[1].version_hash, site.targets[0]);
    }

    #[tokio::test]
    async fn array_order_beats_position() {
        let site = Site::new(3);
        let mut first = site.link(0);
        first["order"] = json!(1);
        let mut second = site.link(1);
        second["order"] = json!(0);
        let raw = json!([first, second, site.link(2)]);
        let resolver = site.resolver(raw.clone());

        let decoded = decode(&resolver, Some(&raw), BASE).await;
        assert_eq!(
            hashes(&decoded.assets),
            vec![
                (site.targets[1].clone(), false),
                (site.targets[0].clone(), false),
                (site.targets[2].clone(), false),
            ]
        );
    }

    #[tokio::test]
    async fn order_collisions_keep_both_entries() {
        let site = Site::new(2);
        let raw = json!({"1": site.link(0), "01": site.link(1)});
        let resolver = site.resolver(raw.clone());

        let decoded = decode(&resolver, Some(&raw), BASE).await;
        // Ties break on the stored key.
        assert_eq!(
            hashes(&decoded.assets),
            vec![
                (site.targets[1].clone(), false),
                (site.targets[0].clone(), false),
            ]
        );
    }

    #[tokio::test]
    async fn slug_wrapped_default_is_not_duplicated() {
        let site = Site::new(2);
        let raw = json!({
            "default": {
                ".": {"auto_update": {"tag": "latest"}},
                "/": "./meta/public/asset_metadata/titles/title-0",
                "order": 0
            },
            "title-0": {"order": 0, ".": {}, "/": format!("/qfab/{}/meta/public/asset_metadata", site.targets[0])},
            "title-1": {"order": 1, ".": {}, "/": format!("/qfab/{}/meta/public/asset_metadata", site.targets[1])},
        });
        let resolver = site.resolver(raw.clone());

        let decoded = decode(&resolver, Some(&raw), BASE).await;
        assert_eq!(
            hashes(&decoded.assets),
            vec![
                (site.targets[0].clone(), true),
                (site.targets[1].clone(), false),
            ]
        );
    }

    #[tokio::test]
    async fn malformed_entries_and_collections_are_reported() {
        let site = Site::new(1);
        let raw = json!({"0": site.link(0), "1": "nonsense", "2": null});
        let resolver = site.resolver(raw.clone());

        let decoded = decode(&resolver, Some(&raw), BASE).await;
        assert_eq!(decoded.assets.len(), 1);
        assert_eq!(decoded.failures.len(), 1);
        assert_eq!(decoded.failures[0].key, "1");

        let decoded = decode(&resolver, Some(&json!("oops")), BASE).await;
        assert!(decoded.assets.is_empty());
        assert_eq!(decoded.failures[0].key, "");

        let decoded = decode(&resolver, None, BASE).await;
        assert_eq!(decoded, DecodedCollection::default());
    }

    // --- Encode ----------------------------------------------------------

    #[test]
    fn encodes_each_shape() {
        let site = Site::new(2);
        let current = VersionHash::new("hq__current").unwrap();
        let assets = vec![site.asset(0).as_default(), site.asset(1)];
        let l0 = link_to(&site.targets[0]);
        let l1 = link_to(&site.targets[1]);

        let plain = encode(&CollectionSpec::new("titles", false, false), &current, &assets);
        assert_eq!(plain, json!([l0, l1]));

        let indexed = encode(&CollectionSpec::new("titles", true, false), &current, &assets);
        assert_eq!(indexed, json!({"default": l0, "1": l1}));

        let both = encode(&CollectionSpec::new("titles", true, true), &current, &assets);
        assert_eq!(
            both,
            json!({"default": {"title-0": l0}, "1": {"title-1": l1}})
        );

        let slugged = encode(&CollectionSpec::new("titles", false, true), &current, &assets);
        let mut l0_ordered = l0.clone();
        l0_ordered["order"] = json!(0);
        let mut l1_ordered = l1.clone();
        l1_ordered["order"] = json!(1);
        assert_eq!(
            slugged,
            json!({
                "default": {
                    ".": {"auto_update": {"tag": "latest"}},
                    "/": "./meta/public/asset_metadata/titles/title-0",
                    "order": 0
                },
                "title-0": l0_ordered,
                "title-1": l1_ordered,
            })
        );
    }

    #[test]
    fn without_default_indices_start_at_zero() {
        let site = Site::new(2);
        let current = VersionHash::new("hq__current").unwrap();
        let out = encode(
            &CollectionSpec::new("titles", true, false),
            &current,
            &[site.asset(0), site.asset(1)],
        );
        assert_eq!(out.as_object().unwrap().keys().collect::<Vec<_>>(), ["0", "1"]);
    }

    #[test]
    fn links_to_current_version_are_relative() {
        let current = VersionHash::new("hq__current").unwrap();
        let asset = AssetRef::new(
            current.clone(),
            ResolvedTarget::from_asset_metadata(&json!({}), current.clone()),
        );
        let out = encode(&CollectionSpec::new("titles", false, false), &current, &[asset]);
        assert_eq!(out[0]["/"], json!("./meta/public/asset_metadata"));
    }

    #[test]
    fn slug_fallbacks_and_collisions() {
        let h = |s: &str| VersionHash::new(s).unwrap();
        let titled = |hash: &str, title: &str| {
            AssetRef::new(
                h(hash),
                ResolvedTarget::from_asset_metadata(&json!({"display_title": title}), h(hash)),
            )
        };
        assert_eq!(slug_for(&titled("hq__a", "My Show")), "my-show");
        assert_eq!(slug_for(&titled("hq__b", "!!!")), "hq__b");

        let out = encode(
            &CollectionSpec::new("titles", false, true),
            &h("hq__current"),
            &[titled("hq__a", "Same"), titled("hq__b", "Same")],
        );
        let keys: Vec<_> = out.as_object().unwrap().keys().cloned().collect();
        assert_eq!(keys, ["same", "same-2"]);
    }

    #[tokio::test]
    async fn slug_named_default_keeps_the_alias_free() {
        let site = Site::new(1);
        let meta = json!({"public": {"asset_metadata": {"title": "Default", "slug": "default"}}});
        let named = site
            .store
            .insert_version("ilib_t", "iq__named", None, meta.clone())
            .unwrap();
        let named_asset = AssetRef::new(
            named.clone(),
            ResolvedTarget::from_asset_metadata(&meta["public"]["asset_metadata"], named.clone()),
        );
        let spec = CollectionSpec::new("titles", false, true);

        let out = encode(&spec, &VersionHash::new("hq__current").unwrap(), &[named_asset.clone()]);
        let keys: Vec<_> = out.as_object().unwrap().keys().cloned().collect();
        assert_eq!(keys, ["default-2"]);

        let alone = round_trip(&site, &spec, &[named_asset.clone()]).await;
        assert_eq!(hashes(&alone), vec![(named.clone(), false)]);

        let mixed = vec![site.asset(0).as_default(), named_asset];
        let decoded = round_trip(&site, &spec, &mixed).await;
        assert_eq!(
            hashes(&decoded),
            vec![(site.targets[0].clone(), true), (named, false)]
        );
    }

    // --- Round trips -----------------------------------------------------

    #[tokio::test]
    async fn every_encoding_round_trips() {
        let site = Site::new(3);
        let all = [
            CollectionSpec::new("titles", false, false),
            CollectionSpec::new("titles", true, false),
            CollectionSpec::new("titles", false, true),
            CollectionSpec::new("titles", true, true),
        ];
        for spec in &all {
            for n in [0, 1, 3] {
                let plain: Vec<AssetRef> = (0..n).map(|i| site.asset(i)).collect();
                let decoded = round_trip(&site, spec, &plain).await;
                assert_eq!(hashes(&decoded), hashes(&plain), "{spec:?} n={n}");

                if n > 0 && spec.encoding().supports_default() {
                    let mut with_default = plain.clone();
                    with_default[0] = with_default[0].clone().as_default();
                    let decoded = round_trip(&site, spec, &with_default).await;
                    assert_eq!(hashes(&decoded), hashes(&with_default), "{spec:?} n={n} default");
                }
            }
        }
    }
}
