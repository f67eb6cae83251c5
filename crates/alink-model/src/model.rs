//! The editable asset model and its mutation operations.
//!
//! All operations are synchronous except the two that need a fresh target
//! summary ([`AssetModel::add_asset`] and [`AssetModel::update_asset`]).
//! Index arguments must be in range: an out-of-range index is a caller bug
//! and panics, like slice indexing.

use alink_codec::{
    slugify, Credit, CreditGroup, FieldRecord, FieldValue, GalleryEntry, ImageEntry, Playlist,
};
use alink_resolve::LinkResolver;
use alink_store::ContentStore;
use alink_types::{AssetRef, VersionHash};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::{AssociatedAssetConfig, EditorConfig};
use crate::error::{ModelError, ModelResult};

/// Built-in fields every asset carries, stored at the asset metadata root.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetInfo {
    pub title: String,
    pub display_title: String,
    pub slug: String,
    pub ip_title_id: String,
    pub title_type: String,
    pub asset_type: String,
}

impl AssetInfo {
    pub const FIELDS: [&'static str; 6] = [
        "title",
        "display_title",
        "slug",
        "ip_title_id",
        "title_type",
        "asset_type",
    ];

    fn field_mut(&mut self, key: &str) -> Option<&mut String> {
        match key {
            "title" => Some(&mut self.title),
            "display_title" => Some(&mut self.display_title),
            "slug" => Some(&mut self.slug),
            "ip_title_id" => Some(&mut self.ip_title_id),
            "title_type" => Some(&mut self.title_type),
            "asset_type" => Some(&mut self.asset_type),
            _ => None,
        }
    }
}

/// An ordered collection of linked assets together with its configuration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AssetCollection {
    pub config: AssociatedAssetConfig,
    pub assets: Vec<AssetRef>,
}

/// Addresses a list of linked assets: a configured collection or the clips
/// of a playlist.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum ClipList {
    Collection(String),
    Playlist(usize),
}

impl ClipList {
    pub fn collection(name: impl Into<String>) -> Self {
        Self::Collection(name.into())
    }
}

impl std::fmt::Display for ClipList {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Collection(name) => f.write_str(name),
            Self::Playlist(index) => write!(f, "playlist #{index}"),
        }
    }
}

/// The in-memory aggregate an edit session mutates.
#[derive(Clone, Debug)]
pub struct AssetModel {
    config: EditorConfig,
    current: VersionHash,
    info: AssetInfo,
    fields: FieldRecord,
    original_slug: String,
    slug_warning: bool,
    credits: Vec<CreditGroup>,
    images: Vec<ImageEntry>,
    gallery: Vec<GalleryEntry>,
    playlists: Vec<Playlist>,
    collections: Vec<AssetCollection>,
}

impl AssetModel {
    /// An empty model for the object version `current`.
    pub fn new(config: EditorConfig, current: VersionHash) -> Self {
        let info = AssetInfo {
            title_type: config.default_title_type().to_string(),
            asset_type: config.default_asset_type().to_string(),
            ..AssetInfo::default()
        };
        let collections = config
            .associated_assets
            .iter()
            .map(|config| AssetCollection {
                config: config.clone(),
                assets: Vec::new(),
            })
            .collect();
        let images = config
            .default_image_keys
            .iter()
            .map(|key| ImageEntry::empty(key.clone(), &current))
            .collect();
        Self {
            config,
            current,
            info,
            fields: FieldRecord::new(),
            original_slug: String::new(),
            slug_warning: false,
            credits: Vec::new(),
            images,
            gallery: Vec::new(),
            playlists: Vec::new(),
            collections,
        }
    }

    pub(crate) fn set_loaded_info(&mut self, info: AssetInfo, fields: FieldRecord) {
        self.original_slug = info.slug.clone();
        self.info = info;
        self.fields = fields;
    }

    pub(crate) fn set_loaded_media(
        &mut self,
        credits: Vec<CreditGroup>,
        images: Vec<ImageEntry>,
        gallery: Vec<GalleryEntry>,
        playlists: Vec<Playlist>,
    ) {
        self.credits = credits;
        self.images = images;
        self.gallery = gallery;
        self.playlists = playlists;
    }

    pub(crate) fn set_loaded_collection(&mut self, name: &str, assets: Vec<AssetRef>) {
        if let Some(collection) = self.collections.iter_mut().find(|c| c.config.name == name) {
            collection.assets = assets;
        }
    }

    // --- Read access -----------------------------------------------------

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    /// The object version being edited.
    pub fn current_version(&self) -> &VersionHash {
        &self.current
    }

    pub fn info(&self) -> &AssetInfo {
        &self.info
    }

    pub fn fields(&self) -> &FieldRecord {
        &self.fields
    }

    /// Set when the slug was changed away from the one the object was
    /// loaded with.
    pub fn slug_warning(&self) -> bool {
        self.slug_warning
    }

    pub fn credits(&self) -> &[CreditGroup] {
        &self.credits
    }

    pub fn images(&self) -> &[ImageEntry] {
        &self.images
    }

    pub fn gallery(&self) -> &[GalleryEntry] {
        &self.gallery
    }

    pub fn playlists(&self) -> &[Playlist] {
        &self.playlists
    }

    pub fn collections(&self) -> &[AssetCollection] {
        &self.collections
    }

    pub fn collection(&self, name: &str) -> Option<&AssetCollection> {
        self.collections.iter().find(|c| c.config.name == name)
    }

    /// Collections shown for the current title type.
    pub fn relevant_collections(&self) -> impl Iterator<Item = &AssetCollection> {
        self.collections
            .iter()
            .filter(|c| c.config.applies_to(&self.info.title_type))
    }

    /// The entries of a collection or playlist.
    pub fn clips(&self, list: &ClipList) -> ModelResult<&[AssetRef]> {
        match list {
            ClipList::Collection(name) => self
                .collection(name)
                .map(|c| c.assets.as_slice())
                .ok_or_else(|| ModelError::UnknownCollection(name.clone())),
            ClipList::Playlist(index) => Ok(&self.playlists[*index].clips),
        }
    }

    fn clips_mut(&mut self, list: &ClipList) -> ModelResult<&mut Vec<AssetRef>> {
        match list {
            ClipList::Collection(name) => self
                .collections
                .iter_mut()
                .find(|c| &c.config.name == name)
                .map(|c| &mut c.assets)
                .ok_or_else(|| ModelError::UnknownCollection(name.clone())),
            ClipList::Playlist(index) => Ok(&mut self.playlists[*index].clips),
        }
    }

    // --- Asset info ------------------------------------------------------

    /// Update a built-in field.
    ///
    /// While the object has no original slug, changing the display title
    /// re-derives the slug. Once it has one, changing the slug raises the
    /// slug warning.
    pub fn update_info(&mut self, key: &str, value: impl Into<String>) -> ModelResult<()> {
        let value = value.into();
        let field = self
            .info
            .field_mut(key)
            .ok_or_else(|| ModelError::UnknownField(key.to_string()))?;
        *field = value;

        if key == "display_title" && self.original_slug.is_empty() {
            self.info.slug = slugify(&self.info.display_title);
        } else if key == "slug" && !self.original_slug.is_empty() {
            self.slug_warning = self.original_slug != self.info.slug;
        }
        Ok(())
    }

    /// Set a configured info field.
    pub fn set_field(&mut self, name: &str, value: FieldValue) -> ModelResult<()> {
        if !self.config.info_fields.iter().any(|f| f.name == name) {
            return Err(ModelError::UnknownField(name.to_string()));
        }
        self.fields.insert(name.to_string(), value);
        Ok(())
    }

    // --- Linked assets ---------------------------------------------------

    /// Append `asset` unless an entry with the same version hash is already
    /// present. Returns whether it was added.
    pub fn insert_asset(&mut self, list: &ClipList, asset: AssetRef) -> ModelResult<bool> {
        let clips = self.clips_mut(list)?;
        if clips.iter().any(|a| a.version_hash == asset.version_hash) {
            debug!(list = %list, hash = %asset.version_hash, "asset already present");
            return Ok(false);
        }
        clips.push(AssetRef {
            is_default: false,
            ..asset
        });
        Ok(true)
    }

    /// Resolve `hash` and append it. A hash already present is a no-op and
    /// costs no remote call.
    pub async fn add_asset<S>(
        &mut self,
        resolver: &LinkResolver<S>,
        list: &ClipList,
        hash: VersionHash,
    ) -> ModelResult<bool>
    where
        S: ContentStore + ?Sized,
    {
        if self.clips(list)?.iter().any(|a| a.version_hash == hash) {
            return Ok(false);
        }
        let target = resolver.target(&hash).await?;
        self.insert_asset(list, AssetRef::new(hash, target))
    }

    /// Point an entry at its target's latest version, keeping its default
    /// flag. Returns whether anything changed; nothing changes when the
    /// latest version is already listed elsewhere.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of range.
    pub async fn update_asset<S>(
        &mut self,
        resolver: &LinkResolver<S>,
        list: &ClipList,
        index: usize,
    ) -> ModelResult<bool>
    where
        S: ContentStore + ?Sized,
    {
        let current = &self.clips(list)?[index];
        if !current.update_available() {
            return Ok(false);
        }
        let latest = current.target.latest_version_hash.clone();
        let is_default = current.is_default;
        if self.clips(list)?.iter().any(|a| a.version_hash == latest) {
            debug!(list = %list, hash = %latest, "latest version already listed");
            return Ok(false);
        }
        let target = resolver.target(&latest).await?;
        self.clips_mut(list)?[index] = AssetRef {
            version_hash: latest,
            is_default,
            target,
        };
        Ok(true)
    }

    /// # Panics
    ///
    /// Panics if `index` is out of range.
    pub fn remove_asset(&mut self, list: &ClipList, index: usize) -> ModelResult<AssetRef> {
        Ok(self.clips_mut(list)?.remove(index))
    }

    /// # Panics
    ///
    /// Panics if either index is out of range.
    pub fn swap_assets(&mut self, list: &ClipList, i1: usize, i2: usize) -> ModelResult<()> {
        self.clips_mut(list)?.swap(i1, i2);
        Ok(())
    }

    /// Toggle the default flag of entry `index`. At most one entry is the
    /// default afterwards; toggling the current default leaves none.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of range.
    pub fn set_default(&mut self, list: &ClipList, index: usize) -> ModelResult<()> {
        if let ClipList::Collection(name) = list {
            let allowed = self
                .collection(name)
                .ok_or_else(|| ModelError::UnknownCollection(name.clone()))?
                .config
                .allows_default();
            if !allowed {
                return Err(ModelError::DefaultNotSupported(name.clone()));
            }
        }
        let clips = self.clips_mut(list)?;
        let was_default = clips[index].is_default;
        for clip in clips.iter_mut() {
            clip.is_default = false;
        }
        clips[index].is_default = !was_default;
        Ok(())
    }

    // --- Credits ---------------------------------------------------------

    /// Returns the index of the new group.
    pub fn add_credit_group(&mut self) -> usize {
        self.credits.push(CreditGroup::default());
        self.credits.len() - 1
    }

    pub fn remove_credit_group(&mut self, group: usize) -> CreditGroup {
        self.credits.remove(group)
    }

    /// Update `group` (the role name) or `talent_type`.
    pub fn update_credit_group(
        &mut self,
        group: usize,
        key: &str,
        value: impl Into<String>,
    ) -> ModelResult<()> {
        let target = &mut self.credits[group];
        match key {
            "group" => target.group = value.into(),
            "talent_type" => target.talent_type = Some(value.into()),
            other => return Err(ModelError::UnknownField(other.to_string())),
        }
        Ok(())
    }

    pub fn add_credit(&mut self, group: usize) -> usize {
        let credits = &mut self.credits[group].credits;
        credits.push(Credit::default());
        credits.len() - 1
    }

    pub fn update_credit(&mut self, group: usize, credit: usize, key: &str, value: impl Into<String>) {
        self.credits[group].credits[credit].set(key, value);
    }

    pub fn swap_credits(&mut self, group: usize, i1: usize, i2: usize) {
        self.credits[group].credits.swap(i1, i2);
    }

    pub fn remove_credit(&mut self, group: usize, credit: usize) -> Credit {
        self.credits[group].credits.remove(credit)
    }

    // --- Images ----------------------------------------------------------

    /// Append an empty image slot in the current version.
    pub fn add_image(&mut self) -> usize {
        self.images.push(ImageEntry::empty("", &self.current));
        self.images.len() - 1
    }

    pub fn update_image(&mut self, index: usize, image: ImageEntry) {
        self.images[index] = image;
    }

    pub fn remove_image(&mut self, index: usize) -> ImageEntry {
        self.images.remove(index)
    }

    // --- Gallery ---------------------------------------------------------

    pub fn add_gallery_image(&mut self) -> usize {
        self.gallery.push(GalleryEntry::empty(&self.current));
        self.gallery.len() - 1
    }

    pub fn update_gallery_image(&mut self, index: usize, entry: GalleryEntry) {
        self.gallery[index] = entry;
    }

    pub fn remove_gallery_image(&mut self, index: usize) -> GalleryEntry {
        self.gallery.remove(index)
    }

    pub fn swap_gallery_images(&mut self, i1: usize, i2: usize) {
        self.gallery.swap(i1, i2);
    }

    // --- Playlists -------------------------------------------------------

    /// Append an empty playlist. Returns its index.
    pub fn add_playlist(&mut self) -> usize {
        self.playlists.push(Playlist::default());
        self.playlists.len() - 1
    }

    pub fn update_playlist_name(&mut self, index: usize, name: impl Into<String>) {
        self.playlists[index].name = name.into();
    }

    pub fn update_playlist_slug(&mut self, index: usize, slug: impl Into<String>) {
        self.playlists[index].slug = slug.into();
    }

    pub fn remove_playlist(&mut self, index: usize) -> Playlist {
        self.playlists.remove(index)
    }

    pub fn swap_playlists(&mut self, i1: usize, i2: usize) {
        self.playlists.swap(i1, i2);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alink_store::InMemoryContentStore;
    use alink_types::ResolvedTarget;
    use proptest::prelude::*;
    use serde_json::json;
    use std::sync::Arc;

    fn hash(s: &str) -> VersionHash {
        VersionHash::new(s).unwrap()
    }

    fn asset(s: &str) -> AssetRef {
        AssetRef::new(
            hash(s),
            ResolvedTarget::from_asset_metadata(&json!({"title": s}), hash(s)),
        )
    }

    fn model() -> AssetModel {
        AssetModel::new(EditorConfig::default(), hash("hq__current"))
    }

    fn titles() -> ClipList {
        ClipList::collection("titles")
    }

    fn hashes(model: &AssetModel, list: &ClipList) -> Vec<String> {
        model
            .clips(list)
            .unwrap()
            .iter()
            .map(|a| a.version_hash.to_string())
            .collect()
    }

    fn defaults(model: &AssetModel, list: &ClipList) -> Vec<bool> {
        model.clips(list).unwrap().iter().map(|a| a.is_default).collect()
    }

    // --- Construction ----------------------------------------------------

    #[test]
    fn new_model_uses_configured_defaults() {
        let m = model();
        assert_eq!(m.info().title_type, "collection");
        assert_eq!(m.info().asset_type, "primary");
        assert_eq!(m.collections().len(), 4);
        assert_eq!(m.images().len(), 2);
        let relevant: Vec<_> = m.relevant_collections().map(|c| c.config.name.as_str()).collect();
        assert_eq!(relevant, ["titles", "series"]);
    }

    // --- Info ------------------------------------------------------------

    #[test]
    fn display_title_derives_slug_for_new_objects() {
        let mut m = model();
        m.update_info("display_title", "My New Show").unwrap();
        assert_eq!(m.info().slug, "my-new-show");
        assert!(!m.slug_warning());
    }

    #[test]
    fn changing_an_existing_slug_warns() {
        let mut m = model();
        m.set_loaded_info(
            AssetInfo {
                slug: "old".into(),
                display_title: "Old".into(),
                ..AssetInfo::default()
            },
            FieldRecord::new(),
        );
        m.update_info("display_title", "Renamed").unwrap();
        assert_eq!(m.info().slug, "old");

        m.update_info("slug", "new").unwrap();
        assert!(m.slug_warning());
        m.update_info("slug", "old").unwrap();
        assert!(!m.slug_warning());
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let mut m = model();
        assert!(matches!(m.update_info("nope", "x"), Err(ModelError::UnknownField(_))));
        assert!(matches!(
            m.set_field("nope", FieldValue::Unset),
            Err(ModelError::UnknownField(_))
        ));
        m.set_field("runtime", FieldValue::text("90")).unwrap();
        assert_eq!(m.fields()["runtime"], FieldValue::text("90"));
    }

    // --- Collections -----------------------------------------------------

    #[test]
    fn insert_is_idempotent_on_hash() {
        let mut m = model();
        assert!(m.insert_asset(&titles(), asset("hq__a")).unwrap());
        assert!(m.insert_asset(&titles(), asset("hq__b")).unwrap());
        let before = m.clips(&titles()).unwrap().to_vec();
        assert!(!m.insert_asset(&titles(), asset("hq__a")).unwrap());
        assert_eq!(m.clips(&titles()).unwrap(), before.as_slice());
    }

    #[test]
    fn unknown_collection() {
        let mut m = model();
        let list = ClipList::collection("nope");
        assert!(matches!(m.clips(&list), Err(ModelError::UnknownCollection(_))));
        assert!(matches!(
            m.insert_asset(&list, asset("hq__a")),
            Err(ModelError::UnknownCollection(_))
        ));
    }

    #[test]
    fn swap_and_remove() {
        let mut m = model();
        for h in ["hq__a", "hq__b", "hq__c"] {
            m.insert_asset(&titles(), asset(h)).unwrap();
        }
        m.swap_assets(&titles(), 0, 2).unwrap();
        assert_eq!(hashes(&m, &titles()), ["hq__c", "hq__b", "hq__a"]);
        let removed = m.remove_asset(&titles(), 1).unwrap();
        assert_eq!(removed.version_hash, hash("hq__b"));
        assert_eq!(hashes(&m, &titles()), ["hq__c", "hq__a"]);
    }

    #[test]
    #[should_panic]
    fn swap_out_of_range_panics() {
        let mut m = model();
        m.insert_asset(&titles(), asset("hq__a")).unwrap();
        let _ = m.swap_assets(&titles(), 0, 5);
    }

    #[test]
    fn set_default_toggles_exclusively() {
        let mut m = model();
        for h in ["hq__a", "hq__b", "hq__c"] {
            m.insert_asset(&titles(), asset(h)).unwrap();
        }
        m.set_default(&titles(), 1).unwrap();
        assert_eq!(defaults(&m, &titles()), [false, true, false]);
        m.set_default(&titles(), 2).unwrap();
        assert_eq!(defaults(&m, &titles()), [false, false, true]);
        m.set_default(&titles(), 2).unwrap();
        assert_eq!(defaults(&m, &titles()), [false, false, false]);
    }

    #[test]
    fn default_refused_where_not_configured() {
        let mut m = model();
        let episodes = ClipList::collection("episodes");
        m.insert_asset(&episodes, asset("hq__e")).unwrap();
        assert!(matches!(
            m.set_default(&episodes, 0),
            Err(ModelError::DefaultNotSupported(_))
        ));
    }

    #[test]
    fn inserted_assets_are_never_default() {
        let mut m = model();
        m.insert_asset(&titles(), asset("hq__a").as_default()).unwrap();
        assert_eq!(defaults(&m, &titles()), [false]);
    }

    proptest! {
        #[test]
        fn at_most_one_default(ops in proptest::collection::vec(0usize..5, 0..30)) {
            let mut m = model();
            for i in 0..5 {
                m.insert_asset(&titles(), asset(&format!("hq__{i}"))).unwrap();
            }
            for index in ops {
                m.set_default(&titles(), index).unwrap();
                let count = defaults(&m, &titles()).iter().filter(|d| **d).count();
                prop_assert!(count <= 1);
            }
        }
    }

    // --- Playlists -------------------------------------------------------

    #[test]
    fn playlist_clip_operations() {
        let mut m = model();
        let index = m.add_playlist();
        assert_eq!(m.playlists()[index].slug, "New Playlist");
        let list = ClipList::Playlist(index);
        m.insert_asset(&list, asset("hq__a")).unwrap();
        m.insert_asset(&list, asset("hq__b")).unwrap();
        m.set_default(&list, 0).unwrap();
        m.swap_assets(&list, 0, 1).unwrap();
        assert_eq!(defaults(&m, &list), [false, true]);

        m.update_playlist_slug(index, "trailers");
        m.update_playlist_name(index, "Trailers");
        let second = m.add_playlist();
        m.swap_playlists(index, second);
        assert_eq!(m.playlists()[1].slug, "trailers");
        assert_eq!(m.remove_playlist(0).slug, "New Playlist");
    }

    // --- Credits, images, gallery ---------------------------------------

    #[test]
    fn credit_operations() {
        let mut m = model();
        let group = m.add_credit_group();
        m.update_credit_group(group, "group", "cast").unwrap();
        m.update_credit_group(group, "talent_type", "Actor").unwrap();
        assert!(m.update_credit_group(group, "bogus", "x").is_err());
        for name in ["a", "b", "c"] {
            let i = m.add_credit(group);
            m.update_credit(group, i, "talent_first_name", name);
        }
        m.swap_credits(group, 0, 2);
        assert_eq!(m.remove_credit(group, 1).talent_first_name, "b");
        let names: Vec<_> = m.credits()[0]
            .credits
            .iter()
            .map(|c| c.talent_first_name.as_str())
            .collect();
        assert_eq!(names, ["c", "a"]);
        assert_eq!(m.remove_credit_group(0).group, "cast");
    }

    #[test]
    fn image_and_gallery_operations() {
        let mut m = model();
        let i = m.add_image();
        assert_eq!(m.images()[i].target_hash, hash("hq__current"));
        m.update_image(
            i,
            ImageEntry {
                image_key: "banner".into(),
                image_path: Some("b.jpg".into()),
                target_hash: hash("hq__current"),
            },
        );
        assert_eq!(m.remove_image(i).image_key, "banner");

        let g0 = m.add_gallery_image();
        let g1 = m.add_gallery_image();
        let mut entry = GalleryEntry::empty(&hash("hq__current"));
        entry.title = "First".into();
        m.update_gallery_image(g0, entry);
        m.swap_gallery_images(g0, g1);
        assert_eq!(m.gallery()[1].title, "First");
        assert_eq!(m.remove_gallery_image(1).title, "First");
    }

    // --- Resolving mutations ---------------------------------------------

    async fn store_with_versions() -> (Arc<InMemoryContentStore>, VersionHash, VersionHash) {
        let store = InMemoryContentStore::new();
        let meta = |t: &str| json!({"public": {"asset_metadata": {"title": t}}});
        let v1 = store.insert_version("ilib", "iq__a", None, meta("v1")).unwrap();
        let v2 = store.insert_version("ilib", "iq__a", None, meta("v2")).unwrap();
        (Arc::new(store), v1, v2)
    }

    #[tokio::test]
    async fn add_asset_resolves_once() {
        let (store, v1, _) = store_with_versions().await;
        let resolver = LinkResolver::new(store.clone(), hash("hq__current"));
        let mut m = model();

        assert!(m.add_asset(&resolver, &titles(), v1.clone()).await.unwrap());
        assert!(!m.add_asset(&resolver, &titles(), v1.clone()).await.unwrap());
        assert_eq!(store.metadata_requests(), 1);
        assert_eq!(m.clips(&titles()).unwrap()[0].target.title.as_deref(), Some("v1"));
    }

    #[tokio::test]
    async fn update_asset_moves_to_latest_and_keeps_default() {
        let (store, v1, v2) = store_with_versions().await;
        let resolver = LinkResolver::new(store, hash("hq__current"));
        let mut m = model();
        m.add_asset(&resolver, &titles(), v1).await.unwrap();
        m.set_default(&titles(), 0).unwrap();

        assert!(m.update_asset(&resolver, &titles(), 0).await.unwrap());
        let updated = &m.clips(&titles()).unwrap()[0];
        assert_eq!(updated.version_hash, v2);
        assert!(updated.is_default);
        assert!(!updated.update_available());
        assert_eq!(updated.target.title.as_deref(), Some("v2"));

        assert!(!m.update_asset(&resolver, &titles(), 0).await.unwrap());
    }

    #[tokio::test]
    async fn update_asset_never_duplicates_an_entry() {
        let (store, v1, v2) = store_with_versions().await;
        let resolver = LinkResolver::new(store, hash("hq__current"));
        let mut m = model();
        m.add_asset(&resolver, &titles(), v1.clone()).await.unwrap();
        m.add_asset(&resolver, &titles(), v2.clone()).await.unwrap();

        assert!(!m.update_asset(&resolver, &titles(), 0).await.unwrap());
        let listed: Vec<_> = m
            .clips(&titles())
            .unwrap()
            .iter()
            .map(|a| a.version_hash.clone())
            .collect();
        assert_eq!(listed, vec![v1, v2]);
    }
}
