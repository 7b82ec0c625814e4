//! Request and response bodies of the LiG REST API.

use lig_core::ArObjectRecord;
use lig_core::session::{Credentials, SceneSummary};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
pub(crate) struct LoginRequest<'a> {
    pub user: LoginUser<'a>,
}

#[derive(Debug, Serialize)]
pub(crate) struct LoginUser<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

impl<'a> From<&'a Credentials> for LoginRequest<'a> {
    fn from(credentials: &'a Credentials) -> Self {
        Self {
            user: LoginUser {
                email: &credentials.email,
                password: &credentials.password,
            },
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct LoginResponse {
    pub token: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SceneListResponse {
    #[serde(default)]
    pub scenes: Vec<SceneSummary>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ArObjectsResponse {
    pub ar_objects: Vec<ArObjectRecord>,
}

/// One file in an upload batch.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UploadAsset {
    pub filename: String,
    pub ext: String,
    /// Base64 of the file contents.
    pub data: String,
    pub client_id: u32,
}

#[derive(Debug, Serialize)]
pub(crate) struct UploadRequest {
    pub assets: Vec<UploadAsset>,
}
