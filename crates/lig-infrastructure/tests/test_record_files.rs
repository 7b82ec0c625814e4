use lig_core::ar_object::ObjectTypeTag;
use lig_core::config::LigConfig;
use lig_core::repository::ObjectRecordRepository;
use lig_core::LocalObjectProperties;
use lig_infrastructure::{ConfigService, JsonRecordRepository};
use serde_json::{json, Value};
use tempfile::TempDir;

#[test]
fn test_record_survives_save_and_reload() {
    let temp_dir = TempDir::new().unwrap();
    let repo = JsonRecordRepository::new(temp_dir.path());

    let record = json!({
        "id": 21,
        "name": "poster",
        "location": {"x": 1.0, "y": 2.0, "z": 3.0},
        "model": {"type": 5, "fields": {"width": 2.0}},
        "zone_id": 9
    });
    let mut props = LocalObjectProperties::with_json(record.to_string());
    props.sync_from_json().expect("record should decode");
    props.sync_to_json(ObjectTypeTag::Image).expect("record should encode");

    let path = repo
        .save_record("21-poster", &props.json_data)
        .expect("Should save record");
    assert!(path.ends_with("21-poster.json"));

    let stored = repo
        .load_record("21-poster")
        .expect("Should load record")
        .expect("Record should exist");
    let value: Value = serde_json::from_str(&stored).unwrap();
    assert_eq!(value["zone_id"], json!(9));
    assert_eq!(value["model"]["fields"]["width"], json!(2.0));

    let mut reloaded = LocalObjectProperties::with_json(stored);
    reloaded.sync_from_json().unwrap();
    assert_eq!(reloaded.type_fields, props.type_fields);
}

#[test]
fn test_path_script_sits_beside_records() {
    let temp_dir = TempDir::new().unwrap();
    let repo = JsonRecordRepository::new(temp_dir.path());
    let path = repo
        .save_path_script("4-drone", "---\n")
        .expect("Should save script");
    assert_eq!(path, temp_dir.path().join("4-drone_key_recode.txt"));
}

#[test]
fn test_config_round_trip_through_service() {
    let temp_dir = TempDir::new().unwrap();
    let service = ConfigService::with_path(temp_dir.path().join("config.toml"));

    assert_eq!(service.load_stored().unwrap(), LigConfig::default());

    service
        .update(|config| {
            config.download_workers = 3;
            config.save_dir = Some(temp_dir.path().join("records"));
        })
        .expect("Should update config");

    let stored = service.load_stored().unwrap();
    assert_eq!(stored.workers(), 3);

    let repo = JsonRecordRepository::from_config(&stored).unwrap();
    assert_eq!(repo.save_dir(), temp_dir.path().join("records"));
}
