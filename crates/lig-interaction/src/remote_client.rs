//! Blocking HTTP client for the LiG AR cloud.
//!
//! One `RemoteClient` holds the process session. Workers of the download
//! scheduler share it by reference, so every method takes `&self`.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, RwLock};
use std::time::Duration;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use lig_core::config::LigConfig;
use lig_core::download::AssetFetcher;
use lig_core::remote::{ArCloudService, ObjectPatch};
use lig_core::session::{Credentials, SceneSummary, Session, normalize_scene_id};
use lig_core::{ArObjectRecord, LigError, Result};
use reqwest::StatusCode;
use reqwest::blocking::{Client, RequestBuilder, Response};
use reqwest::header::AUTHORIZATION;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tempfile::TempDir;
use tracing::{debug, info, warn};

use crate::dto::{
    ArObjectsResponse, LoginRequest, LoginResponse, SceneListResponse, UploadAsset, UploadRequest,
};

/// `client_id` sent with every uploaded asset.
pub const UPLOAD_CLIENT_ID: u32 = 1;

const FALLBACK_ASSET_NAME: &str = "asset";

pub struct RemoteClient {
    http: Client,
    base_url: String,
    session: RwLock<Option<Session>>,
    /// Created on the first download, removed with the client.
    asset_dir: Mutex<Option<TempDir>>,
}

impl RemoteClient {
    /// Builds a client for `config.api_base_url`.
    ///
    /// `request_timeout_secs` of `None` disables the timeout entirely.
    pub fn new(config: &LigConfig) -> Result<Self> {
        let http = Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(config.request_timeout_secs.map(Duration::from_secs))
            .build()
            .map_err(|e| LigError::config(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            http,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            session: RwLock::new(None),
            asset_dir: Mutex::new(None),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Token of the current session, if any.
    pub fn token(&self) -> Option<String> {
        self.session
            .read()
            .ok()?
            .as_ref()
            .map(|session| session.token().to_string())
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    fn current_session(&self) -> Result<Session> {
        self.session
            .read()
            .map_err(|_| LigError::io("session lock poisoned"))?
            .clone()
            .ok_or(LigError::NotLoggedIn)
    }

    fn set_session(&self, session: Option<Session>) -> Result<()> {
        *self
            .session
            .write()
            .map_err(|_| LigError::io("session lock poisoned"))? = session;
        Ok(())
    }

    /// Attaches the bearer token, or fails before any request is made.
    fn authorized(&self, builder: RequestBuilder) -> Result<RequestBuilder> {
        let session = self.current_session()?;
        Ok(builder.header(AUTHORIZATION, session.bearer()))
    }

    fn asset_dir(&self) -> Result<PathBuf> {
        let mut guard = self
            .asset_dir
            .lock()
            .map_err(|_| LigError::io("asset directory lock poisoned"))?;
        if guard.is_none() {
            let dir = tempfile::Builder::new().prefix("lig-assets-").tempdir()?;
            debug!(path = %dir.path().display(), "Created asset directory");
            *guard = Some(dir);
        }
        guard
            .as_ref()
            .map(|dir| dir.path().to_path_buf())
            .ok_or_else(|| LigError::io("asset directory unavailable"))
    }
}

fn send(builder: RequestBuilder) -> Result<Response> {
    builder.send().map_err(transport_error)
}

fn transport_error(err: reqwest::Error) -> LigError {
    if err.is_timeout() {
        LigError::network(format!("request timed out: {err}"))
    } else if err.is_connect() {
        LigError::network(format!("connection failed: {err}"))
    } else {
        LigError::network(err.to_string())
    }
}

fn status_error(response: Response) -> LigError {
    let status = response.status().as_u16();
    let body = response.text().unwrap_or_default();
    LigError::http(status, body)
}

fn check_status(response: Response) -> Result<Response> {
    if response.status().is_success() {
        Ok(response)
    } else {
        Err(status_error(response))
    }
}

fn decode_body<T: DeserializeOwned>(response: Response) -> Result<T> {
    let text = response.text().map_err(transport_error)?;
    serde_json::from_str(&text)
        .map_err(|e| LigError::decode(format!("unexpected response body: {e}")))
}

/// Acknowledgement body. An empty body is `Value::Null`.
fn ack_body(response: Response) -> Result<Value> {
    let text = response.text().map_err(transport_error)?;
    if text.trim().is_empty() {
        return Ok(Value::Null);
    }
    serde_json::from_str(&text)
        .map_err(|e| LigError::decode(format!("unexpected response body: {e}")))
}

/// Local file name for a downloaded URL: the last path segment.
pub fn asset_file_name(url: &str) -> String {
    reqwest::Url::parse(url)
        .ok()
        .and_then(|url| {
            url.path_segments()
                .and_then(|mut segments| segments.next_back())
                .filter(|name| !name.is_empty())
                .map(str::to_string)
        })
        .unwrap_or_else(|| FALLBACK_ASSET_NAME.to_string())
}

/// Reads and encodes the files of an upload batch.
pub fn build_upload_assets(paths: &[&Path]) -> Result<Vec<UploadAsset>> {
    if paths.is_empty() {
        return Err(LigError::schema("No files to upload"));
    }
    paths
        .iter()
        .map(|path| {
            if path.to_string_lossy().trim().is_empty() {
                return Err(LigError::schema("Upload path is empty"));
            }
            let data = fs::read(path)?;
            let filename = path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_default();
            let ext = path
                .extension()
                .map(|ext| ext.to_string_lossy().into_owned())
                .unwrap_or_default();
            Ok(UploadAsset {
                filename,
                ext,
                data: STANDARD.encode(data),
                client_id: UPLOAD_CLIENT_ID,
            })
        })
        .collect()
}

impl ArCloudService for RemoteClient {
    fn login(&self, credentials: &Credentials) -> Result<Session> {
        let request = self
            .http
            .post(self.endpoint("login"))
            .json(&LoginRequest::from(credentials));
        let response = send(request)?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            let body = response.text().unwrap_or_default();
            warn!(status = status.as_u16(), email = %credentials.email, "Login rejected");
            return Err(LigError::auth(format!("{status}: {body}")));
        }

        let body: LoginResponse = decode_body(check_status(response)?)?;
        if body.token.trim().is_empty() {
            warn!(email = %credentials.email, "Login returned an empty token");
            return Err(LigError::auth("login response carried an empty token"));
        }
        let session = Session::new(body.token);
        self.set_session(Some(session.clone()))?;
        info!(email = %credentials.email, "Logged in");
        Ok(session)
    }

    fn logout(&self) {
        if let Err(e) = self.set_session(None) {
            warn!(error = %e, "Failed to clear session");
            return;
        }
        info!("Logged out");
    }

    fn authenticated(&self) -> bool {
        self.session
            .read()
            .map(|session| session.is_some())
            .unwrap_or(false)
    }

    fn list_scenes(&self) -> Result<Vec<SceneSummary>> {
        let request = self.authorized(self.http.get(self.endpoint("scenes")))?;
        let body: SceneListResponse = decode_body(check_status(send(request)?)?)?;
        debug!(count = body.scenes.len(), "Listed scenes");
        Ok(body.scenes)
    }

    fn fetch_objects_for_scene(&self, scene_id: &str) -> Result<Vec<ArObjectRecord>> {
        let id = normalize_scene_id(scene_id);
        let request = self.authorized(
            self.http
                .get(self.endpoint(&format!("ar_objects_from_scene/{id}"))),
        )?;
        if id.is_empty() {
            return Err(LigError::schema("Scene id is empty"));
        }

        let response = send(request)?;
        if response.status() == StatusCode::NOT_FOUND {
            return Err(LigError::not_found("scene", id));
        }
        let body: ArObjectsResponse = decode_body(check_status(response)?)?;
        info!(scene_id = id, count = body.ar_objects.len(), "Fetched scene objects");
        Ok(body.ar_objects)
    }

    fn download_asset(&self, url: &str) -> Result<PathBuf> {
        let response = check_status(send(self.http.get(url))?)?;
        let bytes = response.bytes().map_err(transport_error)?;
        let path = self.asset_dir()?.join(asset_file_name(url));
        fs::write(&path, &bytes)?;
        debug!(url, path = %path.display(), size = bytes.len(), "Downloaded asset");
        Ok(path)
    }

    fn patch_object(&self, id: i64, patch: &ObjectPatch) -> Result<Value> {
        if id < 1 {
            return Err(LigError::schema(format!("Invalid object id: {id}")));
        }
        let request = self.authorized(
            self.http
                .patch(self.endpoint(&format!("ar_objects/{id}")))
                .json(patch),
        )?;
        let ack = ack_body(check_status(send(request)?)?)?;
        info!(object_id = id, "Patched object");
        Ok(ack)
    }

    fn upload_assets(&self, paths: &[&Path]) -> Result<Value> {
        let builder = self.authorized(self.http.post(self.endpoint("assets")))?;
        let assets = build_upload_assets(paths)?;
        let count = assets.len();
        let request = builder.json(&UploadRequest { assets });
        let ack = ack_body(check_status(send(request)?)?)?;
        info!(count, "Uploaded assets");
        Ok(ack)
    }
}

impl AssetFetcher for RemoteClient {
    fn fetch(&self, url: &str) -> Result<PathBuf> {
        self.download_asset(url)
    }
}
