//! Remote AR cloud service abstraction.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::ar_object::{ArModel, ArObjectRecord, Location, Zoom};
use crate::error::Result;
use crate::session::{Credentials, SceneSummary, Session};

/// Partial update sent with `PATCH ar_objects/{id}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectPatch {
    pub location: Location,
    pub zoom: Zoom,
    pub model: ArModel,
}

impl From<&ArObjectRecord> for ObjectPatch {
    fn from(record: &ArObjectRecord) -> Self {
        Self {
            location: record.location.clone(),
            zoom: record.zoom.clone(),
            model: record.model.clone(),
        }
    }
}

/// Operations offered by the LiG cloud.
///
/// Every call except `login` and `download_asset` requires a session and
/// fails with [`LigError::NotLoggedIn`](crate::LigError::NotLoggedIn)
/// without one. Asset URLs are public.
pub trait ArCloudService: Send + Sync {
    fn login(&self, credentials: &Credentials) -> Result<Session>;

    fn logout(&self);

    fn authenticated(&self) -> bool;

    fn list_scenes(&self) -> Result<Vec<SceneSummary>>;

    /// Objects of a scene. `scene_id` may be a `"{id} {name}"` label.
    fn fetch_objects_for_scene(&self, scene_id: &str) -> Result<Vec<ArObjectRecord>>;

    /// Downloads `url` into the session's asset directory.
    fn download_asset(&self, url: &str) -> Result<PathBuf>;

    fn patch_object(&self, id: i64, patch: &ObjectPatch) -> Result<Value>;

    fn upload_assets(&self, paths: &[&Path]) -> Result<Value>;
}
