use std::sync::Arc;

use alink_model::{load, AssetModel, ClipList, LoadReport};
use alink_resolve::LinkResolver;
use alink_save::{plan_writes, SaveOrchestrator, SaveReport, SaveState, WriteStep};
use alink_store::{ContentStore, MetadataRef};
use alink_types::link::PROPS_KEY;
use alink_types::{path, VersionHash};
use serde_json::{Map, Value};
use tracing::info;

use crate::config::{SessionConfig, SessionParams};
use crate::error::{SdkError, SdkResult};

/// One edit of one object version: load, mutate, save.
///
/// Opening a session starts a fresh resolver session, so nothing memoized
/// by an earlier session is reused.
pub struct EditSession<S: ?Sized> {
    params: SessionParams,
    resolver: LinkResolver<S>,
    model: AssetModel,
    report: LoadReport,
    saver: SaveOrchestrator<S>,
}

impl<S> EditSession<S>
where
    S: ContentStore + ?Sized,
{
    /// Fetch the object's asset metadata and decode it into a model.
    pub async fn open(store: Arc<S>, params: SessionParams, config: SessionConfig) -> SdkResult<Self> {
        let (version, asset_metadata) = fetch(store.as_ref(), &params).await?;
        let resolver = LinkResolver::with_config(store.clone(), version.clone(), config.resolver);
        let (model, report) = load(&resolver, &asset_metadata, config.editor).await;
        info!(
            object_id = %params.object_id,
            version = %version,
            skipped = report.skipped.len(),
            "opened edit session"
        );
        let saver = SaveOrchestrator::new(store, params.library_id.clone(), params.object_id.clone());
        Ok(Self {
            params,
            resolver,
            model,
            report,
            saver,
        })
    }

    pub fn params(&self) -> &SessionParams {
        &self.params
    }

    /// The version being edited.
    pub fn version(&self) -> &VersionHash {
        self.resolver.current_version()
    }

    pub fn resolver(&self) -> &LinkResolver<S> {
        &self.resolver
    }

    pub fn model(&self) -> &AssetModel {
        &self.model
    }

    pub fn model_mut(&mut self) -> &mut AssetModel {
        &mut self.model
    }

    /// Entries that could not be resolved on load.
    pub fn load_report(&self) -> &LoadReport {
        &self.report
    }

    /// Resolve `hash` and append it to `list`.
    pub async fn add_asset(&mut self, list: &ClipList, hash: VersionHash) -> SdkResult<bool> {
        Ok(self.model.add_asset(&self.resolver, list, hash).await?)
    }

    /// Move entry `index` of `list` to its latest version.
    pub async fn update_asset(&mut self, list: &ClipList, index: usize) -> SdkResult<bool> {
        Ok(self.model.update_asset(&self.resolver, list, index).await?)
    }

    /// The writes a save would issue now.
    pub fn plan(&self) -> Vec<WriteStep> {
        plan_writes(&self.model)
    }

    pub fn save_state(&self) -> SaveState {
        self.saver.state()
    }

    /// Write the model back in one transaction. A failed save can be
    /// retried; a committed session refuses further saves.
    pub async fn save(&mut self) -> SdkResult<SaveReport> {
        Ok(self.saver.save(&self.model).await?)
    }
}

impl<S: ?Sized> std::fmt::Debug for EditSession<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EditSession")
            .field("params", &self.params)
            .field("save", &self.saver)
            .finish_non_exhaustive()
    }
}

/// The version to edit and its asset metadata subtree.
async fn fetch<S>(store: &S, params: &SessionParams) -> SdkResult<(VersionHash, Value)>
where
    S: ContentStore + ?Sized,
{
    let not_found = || SdkError::ObjectNotFound(format!("{}/{}", params.library_id, params.object_id));

    if let Some(version) = &params.version_hash {
        let asset_metadata = store
            .metadata(&MetadataRef::from(version), path::ASSET_METADATA, false)
            .await?
            .unwrap_or_else(|| Value::Object(Map::new()));
        return Ok((version.clone(), asset_metadata));
    }

    // A resolving read of the root reports which version served it.
    let reference = MetadataRef::Object {
        library_id: params.library_id.clone(),
        object_id: params.object_id.clone(),
    };
    let root = store.metadata(&reference, "", true).await?.ok_or_else(not_found)?;
    let source = root
        .get(PROPS_KEY)
        .and_then(|props| props.get("source"))
        .and_then(Value::as_str)
        .ok_or_else(|| SdkError::Internal(format!("no source version reported for {reference}")))?;
    let version = VersionHash::new(source).map_err(|e| SdkError::Internal(e.to_string()))?;
    let asset_metadata = path::segments(path::ASSET_METADATA)
        .try_fold(&root, |node, segment| node.get(segment))
        .cloned()
        .unwrap_or_else(|| Value::Object(Map::new()));
    Ok((version, asset_metadata))
}
