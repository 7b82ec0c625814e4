//! Scene sync use case.
//!
//! Orchestrates one scene between the LiG cloud, the record files on disk
//! and the local scene graph:
//!
//! - `fetch_scene`: objects, downloads, assembly, record files
//! - `refresh_from_files` / `update_files`: record files to and from nodes
//! - `upload_scene`: node transforms back to the cloud
//! - `upload_assets`, `export_keyframe_path`

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use lig_core::config::LigConfig;
use lig_core::coordinate::{to_local_space, to_remote_space};
use lig_core::download::{AssetFetcher, DownloadResult, plan_downloads};
use lig_core::keyframe::{KeyframeSample, render_path_script};
use lig_core::remote::{ArCloudService, ObjectPatch};
use lig_core::repository::ObjectRecordRepository;
use lig_core::scene::{NodeHandle, SceneAdapter};
use lig_core::session::normalize_scene_id;
use lig_core::{LigError, SchemaMapper};
use lig_infrastructure::{ConfigService, JsonRecordRepository};
use lig_interaction::RemoteClient;
use serde_json::Value;
use tracing::{error, info, warn};

use crate::download_scheduler::DownloadScheduler;
use crate::import_assembler::ImportAssembler;

/// Outcome of one `fetch_scene` run.
#[derive(Debug, Default)]
pub struct SyncReport {
    pub scene_id: String,
    pub created: Vec<String>,
    pub updated: Vec<String>,
    /// Object name and error for every failed download.
    pub failed_downloads: Vec<(String, LigError)>,
    /// Object name and error for every record that could not be assembled.
    pub failed_imports: Vec<(String, LigError)>,
}

impl SyncReport {
    pub fn is_clean(&self) -> bool {
        self.failed_downloads.is_empty() && self.failed_imports.is_empty()
    }
}

/// Counts of a batch that touches existing nodes.
#[derive(Debug, Default)]
pub struct BatchReport {
    pub succeeded: Vec<String>,
    pub failed: Vec<(String, LigError)>,
}

struct ServiceFetcher<'a>(&'a dyn ArCloudService);

impl AssetFetcher for ServiceFetcher<'_> {
    fn fetch(&self, url: &str) -> lig_core::Result<PathBuf> {
        self.0.download_asset(url)
    }
}

pub struct SceneSyncUseCase {
    service: Arc<dyn ArCloudService>,
    repository: Arc<dyn ObjectRecordRepository>,
    scheduler: DownloadScheduler,
}

impl SceneSyncUseCase {
    pub fn new(
        service: Arc<dyn ArCloudService>,
        repository: Arc<dyn ObjectRecordRepository>,
        scheduler: DownloadScheduler,
    ) -> Self {
        Self {
            service,
            repository,
            scheduler,
        }
    }

    /// Wires the HTTP client, the record files and the scheduler from
    /// `config`.
    pub fn from_config(config: &LigConfig) -> Result<Self> {
        let client = RemoteClient::new(config).context("Failed to create LiG client")?;
        let repository =
            JsonRecordRepository::from_config(config).context("Failed to resolve save directory")?;
        Ok(Self::new(
            Arc::new(client),
            Arc::new(repository),
            DownloadScheduler::from_config(config),
        ))
    }

    /// Loads the platform config file, with environment overrides, and
    /// wires from it.
    pub fn from_default_config() -> Result<Self> {
        let config = ConfigService::new()
            .and_then(|service| service.load())
            .context("Failed to load configuration")?;
        Self::from_config(&config)
    }

    pub fn service(&self) -> &Arc<dyn ArCloudService> {
        &self.service
    }

    /// Fetches the objects of `scene_id`, downloads their assets and
    /// assembles them into `adapter`.
    ///
    /// A failed download or import is recorded in the report and the batch
    /// continues. The call fails outright when the object list cannot be
    /// fetched, when every download failed with a session or transport
    /// error, or when a record file cannot be written.
    pub fn fetch_scene<A>(&self, scene_id: &str, adapter: &mut A) -> Result<SyncReport>
    where
        A: SceneAdapter + ?Sized,
    {
        let scene_id = normalize_scene_id(scene_id);
        let mut report = SyncReport {
            scene_id: scene_id.to_string(),
            ..SyncReport::default()
        };

        let records = self
            .service
            .fetch_objects_for_scene(scene_id)
            .with_context(|| format!("Failed to fetch objects for scene {scene_id}"))?;
        if records.is_empty() {
            warn!(scene_id, "No AR objects found to download");
            return Ok(report);
        }

        let tasks = plan_downloads(&records);
        let downloads = self
            .scheduler
            .schedule(&ServiceFetcher(self.service.as_ref()), tasks);
        check_batch_fatal(&downloads)?;
        report.failed_downloads = downloads
            .iter()
            .filter_map(|r| match &r.outcome {
                Err(e) => Some((r.task.object_name.clone(), e.clone())),
                Ok(_) => None,
            })
            .collect();

        let assembler = ImportAssembler::new(scene_id);
        for record in &records {
            let object_name = record.object_name();
            let node = match assembler.assemble(record, &downloads, adapter) {
                Ok(node) => node,
                Err(e) => {
                    warn!(object = %object_name, error = %e, "Import failed");
                    report.failed_imports.push((object_name, e));
                    continue;
                }
            };
            if let Some(props) = adapter.object_properties(node.anchor) {
                self.repository
                    .save_record(&object_name, &props.json_data)
                    .with_context(|| format!("Failed to save record for {object_name}"))?;
            }
            if node.created {
                report.created.push(object_name);
            } else {
                report.updated.push(object_name);
            }
        }

        info!(
            scene_id,
            created = report.created.len(),
            updated = report.updated.len(),
            failed_downloads = report.failed_downloads.len(),
            failed_imports = report.failed_imports.len(),
            "Download and import completed"
        );
        Ok(report)
    }

    /// Reloads every root node of `group` from its record file.
    pub fn refresh_from_files<A>(&self, adapter: &mut A, group: &str) -> Result<BatchReport>
    where
        A: SceneAdapter + ?Sized,
    {
        let mut report = BatchReport::default();
        for (node, name) in named_roots(adapter, group) {
            match self.refresh_node(adapter, node, &name) {
                Ok(()) => report.succeeded.push(name),
                Err(e) => {
                    warn!(object = %name, error = %e, "Refresh from file failed");
                    report.failed.push((name, e));
                }
            }
        }
        info!(group, refreshed = report.succeeded.len(), "Refreshed from files");
        Ok(report)
    }

    fn refresh_node<A>(&self, adapter: &mut A, node: NodeHandle, name: &str) -> lig_core::Result<()>
    where
        A: SceneAdapter + ?Sized,
    {
        let json = self
            .repository
            .load_record(name)?
            .ok_or_else(|| LigError::not_found("record", name))?;
        let props = adapter
            .object_properties_mut(node)
            .ok_or_else(|| LigError::schema(format!("{name} has no properties")))?;
        let previous = props.json_data.clone();
        props.json_data = json;
        if let Err(e) = props.sync_from_json() {
            props.json_data = previous;
            return Err(e);
        }
        let transform = to_local_space(&props.transform);
        adapter.set_transform(node, &transform)
    }

    /// Writes the edited properties of every root node of `group` to its
    /// record file.
    pub fn update_files<A>(&self, adapter: &mut A, group: &str) -> Result<BatchReport>
    where
        A: SceneAdapter + ?Sized,
    {
        let mut report = BatchReport::default();
        for (node, name) in named_roots(adapter, group) {
            match self.write_node(adapter, node, &name) {
                Ok(()) => report.succeeded.push(name),
                Err(e) => {
                    warn!(object = %name, error = %e, "Update file failed");
                    report.failed.push((name, e));
                }
            }
        }
        info!(group, written = report.succeeded.len(), "Updated record files");
        Ok(report)
    }

    /// Pulls the node transform into its properties, re-encodes the record
    /// and saves it.
    fn write_node<A>(&self, adapter: &mut A, node: NodeHandle, name: &str) -> lig_core::Result<()>
    where
        A: SceneAdapter + ?Sized,
    {
        let transform = to_remote_space(&adapter.node_transform(node)?);
        let props = adapter
            .object_properties_mut(node)
            .ok_or_else(|| LigError::schema(format!("{name} has no properties")))?;
        props.transform = transform;
        let tag = props.type_tag();
        props.sync_to_json(tag)?;
        self.repository.save_record(name, &props.json_data)?;
        Ok(())
    }

    fn upload_node<A>(&self, adapter: &mut A, node: NodeHandle, name: &str) -> lig_core::Result<Value>
    where
        A: SceneAdapter + ?Sized,
    {
        self.write_node(adapter, node, name)?;
        let props = adapter
            .object_properties(node)
            .ok_or_else(|| LigError::schema(format!("{name} has no properties")))?;
        let record = SchemaMapper::to_remote(props, props.type_tag())?;
        self.service
            .patch_object(record.id, &ObjectPatch::from(&record))
    }

    /// Sends the location, zoom and model of every root node of `group`.
    ///
    /// Record files are updated first. A session or transport error stops
    /// the batch.
    pub fn upload_scene<A>(&self, adapter: &mut A, group: &str) -> Result<BatchReport>
    where
        A: SceneAdapter + ?Sized,
    {
        if !self.service.authenticated() {
            return Err(LigError::NotLoggedIn).context("Login to LiG Cloud first");
        }
        let mut report = BatchReport::default();
        for (node, name) in named_roots(adapter, group) {
            let outcome = self.upload_node(adapter, node, &name);
            match outcome {
                Ok(_) => report.succeeded.push(name),
                Err(e) if e.is_fatal_for_batch() => {
                    error!(object = %name, error = %e, "Upload aborted");
                    return Err(e).with_context(|| format!("Upload aborted at {name}"));
                }
                Err(e) => {
                    warn!(object = %name, error = %e, "Upload failed");
                    report.failed.push((name, e));
                }
            }
        }
        info!(group, uploaded = report.succeeded.len(), "Scene uploaded");
        Ok(report)
    }

    pub fn upload_assets(&self, paths: &[&Path]) -> Result<Value> {
        self.service
            .upload_assets(paths)
            .context("Failed to upload assets")
    }

    /// Renders the path script of `object_name` and saves it next to the
    /// record files.
    pub fn export_keyframe_path(
        &self,
        object_name: &str,
        samples: &[KeyframeSample],
    ) -> Result<PathBuf> {
        let script = render_path_script(samples)
            .with_context(|| format!("Failed to render path for {object_name}"))?;
        let path = self
            .repository
            .save_path_script(object_name, &script)
            .with_context(|| format!("Failed to save path for {object_name}"))?;
        info!(object = object_name, path = %path.display(), "Exported keyframe path");
        Ok(path)
    }
}

fn named_roots<A>(adapter: &A, group: &str) -> Vec<(NodeHandle, String)>
where
    A: SceneAdapter + ?Sized,
{
    adapter
        .group_roots(group)
        .into_iter()
        .filter_map(|node| adapter.node_name(node).map(|name| (node, name)))
        .collect()
}

/// Fails when no download succeeded and one failed for a reason that
/// would fail every retry as well.
fn check_batch_fatal(downloads: &[DownloadResult]) -> Result<()> {
    if downloads.is_empty() || downloads.iter().any(DownloadResult::is_success) {
        return Ok(());
    }
    match downloads
        .iter()
        .filter_map(|r| r.outcome.as_ref().err())
        .find(|e| e.is_fatal_for_batch())
    {
        Some(e) => Err(e.clone()).context("Every download failed"),
        None => Ok(()),
    }
}
