use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use lig_application::{DownloadScheduler, SceneSyncUseCase};
use lig_core::coordinate::LocalTransform;
use lig_core::keyframe::KeyframeSample;
use lig_core::remote::{ArCloudService, ObjectPatch};
use lig_core::repository::ObjectRecordRepository;
use lig_core::scene::{InMemoryScene, SceneAdapter};
use lig_core::session::{Credentials, SceneSummary, Session};
use lig_core::{ArObjectRecord, LigError};
use lig_infrastructure::JsonRecordRepository;
use serde_json::{Value, json};
use tempfile::TempDir;

/// In-process stand-in for the LiG cloud.
struct FakeCloud {
    asset_dir: PathBuf,
    records: Vec<ArObjectRecord>,
    failing_urls: HashSet<String>,
    failure: LigError,
    logged_in: bool,
    patches: Mutex<Vec<(i64, Value)>>,
}

impl FakeCloud {
    fn new(asset_dir: &Path, records: Value) -> Self {
        Self {
            asset_dir: asset_dir.to_path_buf(),
            records: serde_json::from_value(records).unwrap(),
            failing_urls: HashSet::new(),
            failure: LigError::http(404, "missing"),
            logged_in: true,
            patches: Mutex::new(Vec::new()),
        }
    }

    fn failing(mut self, url: &str) -> Self {
        self.failing_urls.insert(url.to_string());
        self
    }
}

impl ArCloudService for FakeCloud {
    fn login(&self, _credentials: &Credentials) -> lig_core::Result<Session> {
        Ok(Session::new("token"))
    }

    fn logout(&self) {}

    fn authenticated(&self) -> bool {
        self.logged_in
    }

    fn list_scenes(&self) -> lig_core::Result<Vec<SceneSummary>> {
        Ok(Vec::new())
    }

    fn fetch_objects_for_scene(&self, scene_id: &str) -> lig_core::Result<Vec<ArObjectRecord>> {
        if !self.logged_in {
            return Err(LigError::NotLoggedIn);
        }
        match scene_id {
            "12" => Ok(self.records.clone()),
            other => Err(LigError::not_found("scene", other)),
        }
    }

    fn download_asset(&self, url: &str) -> lig_core::Result<PathBuf> {
        if self.failing_urls.contains(url) {
            return Err(self.failure.clone());
        }
        let name = url.rsplit('/').next().unwrap_or("asset");
        let path = self.asset_dir.join(name);
        fs::write(&path, url.as_bytes())?;
        Ok(path)
    }

    fn patch_object(&self, id: i64, patch: &ObjectPatch) -> lig_core::Result<Value> {
        self.patches
            .lock()
            .unwrap()
            .push((id, serde_json::to_value(patch).unwrap()));
        Ok(json!({"ok": true}))
    }

    fn upload_assets(&self, paths: &[&Path]) -> lig_core::Result<Value> {
        Ok(json!({"count": paths.len()}))
    }
}

fn scene_records() -> Value {
    json!([
        {
            "id": 1, "name": "poster",
            "location": {"x": 0.0, "y": 1.0, "z": -2.0, "rotate_x": 0.0, "rotate_y": 0.0, "rotate_z": 0.0},
            "model": {"type": 5, "fields": {"width": 1.0}, "texture": {"url": "https://cdn.test/poster.png"}}
        },
        {
            "id": 2, "name": "robot",
            "model": {"type": 8, "ios_texture": {"url": "https://cdn.test/robot.glb"}}
        },
        {
            "id": 3, "name": "clip",
            "model": {"type": 9, "texture": {"url": "https://cdn.test/clip.mp4"}}
        }
    ])
}

struct Fixture {
    _assets: TempDir,
    records_dir: TempDir,
    cloud: Arc<FakeCloud>,
    repository: Arc<JsonRecordRepository>,
    usecase: SceneSyncUseCase,
}

fn fixture(configure: impl FnOnce(FakeCloud) -> FakeCloud) -> Fixture {
    let assets = TempDir::new().unwrap();
    let records_dir = TempDir::new().unwrap();
    let cloud = Arc::new(configure(FakeCloud::new(assets.path(), scene_records())));
    let repository = Arc::new(JsonRecordRepository::new(records_dir.path()));
    let usecase = SceneSyncUseCase::new(
        cloud.clone(),
        repository.clone(),
        DownloadScheduler::new(5),
    );
    Fixture {
        _assets: assets,
        records_dir,
        cloud,
        repository,
        usecase,
    }
}

#[test]
fn test_fetch_scene_with_one_failed_download() {
    let fx = fixture(|cloud| cloud.failing("https://cdn.test/clip.mp4"));
    let mut scene = InMemoryScene::new();

    let report = fx
        .usecase
        .fetch_scene("12 lobby", &mut scene)
        .expect("Batch should complete");

    assert_eq!(report.scene_id, "12");
    assert_eq!(report.created, vec!["1-poster", "2-robot"]);
    assert_eq!(report.failed_downloads.len(), 1);
    assert_eq!(report.failed_downloads[0].0, "3-clip");
    assert_eq!(report.failed_imports.len(), 1);
    assert!(!report.is_clean());

    assert_eq!(scene.group_roots("12").len(), 2);
    assert!(scene.find_node("3-clip").is_none());
    assert!(fx.records_dir.path().join("1-poster.json").exists());
    assert!(fx.records_dir.path().join("2-robot.json").exists());
    assert!(!fx.records_dir.path().join("3-clip.json").exists());

    let poster = scene.find_node("1-poster").unwrap();
    assert_eq!(
        scene.node_transform(poster).unwrap().location,
        [0.0, 2.0, 1.0]
    );
}

#[test]
fn test_second_fetch_updates_in_place() {
    let fx = fixture(|cloud| cloud);
    let mut scene = InMemoryScene::new();
    let first = fx.usecase.fetch_scene("12", &mut scene).unwrap();
    assert_eq!(first.created.len(), 3);
    let nodes = scene.len();

    let second = fx.usecase.fetch_scene("12", &mut scene).unwrap();
    assert!(second.created.is_empty());
    assert_eq!(second.updated.len(), 3);
    assert_eq!(scene.len(), nodes);
}

#[test]
fn test_every_download_failing_on_transport_aborts() {
    let fx = fixture(|mut cloud| {
        cloud.failure = LigError::network("connection refused");
        cloud
            .failing("https://cdn.test/poster.png")
            .failing("https://cdn.test/robot.glb")
            .failing("https://cdn.test/clip.mp4")
    });
    let mut scene = InMemoryScene::new();

    let err = fx.usecase.fetch_scene("12", &mut scene).unwrap_err();
    let cause = err.downcast_ref::<LigError>().unwrap();
    assert!(cause.is_network());
    assert!(scene.is_empty());
}

#[test]
fn test_unknown_scene_is_not_found() {
    let fx = fixture(|cloud| cloud);
    let mut scene = InMemoryScene::new();
    let err = fx.usecase.fetch_scene("99", &mut scene).unwrap_err();
    assert!(err.downcast_ref::<LigError>().unwrap().is_not_found());
}

#[test]
fn test_upload_sends_moved_transform() {
    let fx = fixture(|cloud| cloud);
    let mut scene = InMemoryScene::new();
    fx.usecase.fetch_scene("12", &mut scene).unwrap();

    let poster = scene.find_node("1-poster").unwrap();
    scene
        .set_transform(
            poster,
            &LocalTransform {
                location: [2.0, -3.0, 1.0],
                ..LocalTransform::default()
            },
        )
        .unwrap();

    let report = fx.usecase.upload_scene(&mut scene, "12").unwrap();
    assert_eq!(report.succeeded.len(), 3);
    assert!(report.failed.is_empty());

    let patches = fx.cloud.patches.lock().unwrap();
    let (_, body) = patches.iter().find(|(id, _)| *id == 1).unwrap();
    assert_eq!(body["location"]["x"], json!(2.0));
    assert_eq!(body["location"]["y"], json!(1.0));
    assert_eq!(body["location"]["z"], json!(3.0));
    let mut keys: Vec<&String> = body.as_object().unwrap().keys().collect();
    keys.sort();
    assert_eq!(keys, vec!["location", "model", "zoom"]);

    let stored: Value = serde_json::from_str(
        &fx.repository.load_record("1-poster").unwrap().unwrap(),
    )
    .unwrap();
    assert_eq!(stored["location"]["z"], json!(3.0));
}

#[test]
fn test_upload_requires_login() {
    let fx = fixture(|mut cloud| {
        cloud.logged_in = false;
        cloud
    });
    let mut scene = InMemoryScene::new();
    let err = fx.usecase.upload_scene(&mut scene, "12").unwrap_err();
    assert!(err.downcast_ref::<LigError>().unwrap().is_not_logged_in());
}

#[test]
fn test_refresh_reads_edited_record_file() {
    let fx = fixture(|cloud| cloud);
    let mut scene = InMemoryScene::new();
    fx.usecase.fetch_scene("12", &mut scene).unwrap();

    let mut record: Value =
        serde_json::from_str(&fx.repository.load_record("2-robot").unwrap().unwrap()).unwrap();
    record["location"] = json!({"x": 4.0, "y": 5.0, "z": 6.0});
    fx.repository
        .save_record("2-robot", &record.to_string())
        .unwrap();

    let report = fx.usecase.refresh_from_files(&mut scene, "12").unwrap();
    assert_eq!(report.succeeded.len(), 3);

    let robot = scene.find_node("2-robot").unwrap();
    assert_eq!(scene.node_transform(robot).unwrap().location, [4.0, -6.0, 5.0]);
    assert_eq!(
        scene.object_properties(robot).unwrap().transform.location,
        [4.0, 5.0, 6.0]
    );
}

#[test]
fn test_update_files_writes_edited_properties() {
    let fx = fixture(|cloud| cloud);
    let mut scene = InMemoryScene::new();
    fx.usecase.fetch_scene("12", &mut scene).unwrap();

    let poster = scene.find_node("1-poster").unwrap();
    scene
        .object_properties_mut(poster)
        .unwrap()
        .set_transparency(0.25);

    let report = fx.usecase.update_files(&mut scene, "12").unwrap();
    assert_eq!(report.succeeded.len(), 3);

    let stored: Value =
        serde_json::from_str(&fx.repository.load_record("1-poster").unwrap().unwrap()).unwrap();
    assert_eq!(stored["transparency"], json!(0.25));
}

#[test]
fn test_export_keyframe_path() {
    let fx = fixture(|cloud| cloud);
    let samples = [
        KeyframeSample {
            frame: 1,
            transform: LocalTransform::default(),
        },
        KeyframeSample {
            frame: 6,
            transform: LocalTransform {
                location: [1.0, 0.0, 0.0],
                ..LocalTransform::default()
            },
        },
    ];

    let path = fx.usecase.export_keyframe_path("2-robot", &samples).unwrap();
    assert_eq!(path, fx.records_dir.path().join("2-robot_key_recode.txt"));
    let script = fs::read_to_string(path).unwrap();
    assert!(script.contains("      direction_x: 1.000000\n"));

    assert!(fx.usecase.export_keyframe_path("2-robot", &[]).is_err());
}

#[test]
fn test_upload_assets_passes_through() {
    let fx = fixture(|cloud| cloud);
    let ack = fx
        .usecase
        .upload_assets(&[Path::new("a.png"), Path::new("b.png")])
        .unwrap();
    assert_eq!(ack, json!({"count": 2}));
}
