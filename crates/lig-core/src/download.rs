//! Asset download tasks.
//!
//! A task names one URL owned by one AR object. The slot index is the URL's
//! position within that object (face order for info-balls, always 0 for
//! single-asset types) and travels with the result so consumers can restore
//! order after a concurrent run.

use std::path::{Path, PathBuf};

use tracing::warn;

use crate::ar_object::{ArObjectRecord, ObjectTypeTag};
use crate::error::Result;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadTask {
    pub object_id: i64,
    pub object_name: String,
    pub url: String,
    pub slot: usize,
}

#[derive(Debug, Clone)]
pub struct DownloadResult {
    pub task: DownloadTask,
    pub outcome: Result<PathBuf>,
}

impl DownloadResult {
    pub fn path(&self) -> Option<&Path> {
        self.outcome.as_ref().ok().map(PathBuf::as_path)
    }

    pub fn is_success(&self) -> bool {
        self.outcome.is_ok()
    }
}

/// Fetches one asset URL to a local file.
///
/// Implementations are shared by every download worker.
pub trait AssetFetcher: Sync {
    fn fetch(&self, url: &str) -> Result<PathBuf>;
}

/// Download tasks for a single record.
///
/// Info-balls yield one task per `texture.photos` entry. Other types yield at
/// most one task for the first usable texture URL. Particles need no asset.
pub fn tasks_for(record: &ArObjectRecord) -> Vec<DownloadTask> {
    let object_name = record.object_name();
    let urls = match record.type_tag() {
        ObjectTypeTag::Particle => return Vec::new(),
        ObjectTypeTag::InfoBall => record.photo_urls(),
        _ => record
            .primary_asset_url()
            .map(|url| (0, url.to_string()))
            .into_iter()
            .collect(),
    };
    if urls.is_empty() {
        warn!(object = %object_name, "No URL found for object");
    }
    urls.into_iter()
        .map(|(slot, url)| DownloadTask {
            object_id: record.id,
            object_name: object_name.clone(),
            url,
            slot,
        })
        .collect()
}

/// Download tasks for a batch, in record order.
pub fn plan_downloads(records: &[ArObjectRecord]) -> Vec<DownloadTask> {
    records.iter().flat_map(tasks_for).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tracing_test::traced_test;

    fn record(value: serde_json::Value) -> ArObjectRecord {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_info_ball_gets_one_task_per_photo() {
        let ball = record(json!({
            "id": 3, "name": "ball",
            "model": {"type": 13, "texture": {"photos": ["https://a/1.png", "https://a/2.png", "https://a/3.png"]}}
        }));
        let tasks = tasks_for(&ball);
        assert_eq!(tasks.len(), 3);
        assert_eq!(tasks[2].slot, 2);
        assert_eq!(tasks[2].url, "https://a/3.png");
        assert_eq!(tasks[0].object_name, "3-ball");
    }

    #[test]
    fn test_blank_photo_keeps_later_slots() {
        let ball = record(json!({
            "id": 3, "name": "ball",
            "model": {"type": 13, "texture": {"photos": ["https://a/1.png", "", "https://a/3.png"]}}
        }));
        let tasks = tasks_for(&ball);
        let slots: Vec<(usize, &str)> = tasks.iter().map(|t| (t.slot, t.url.as_str())).collect();
        assert_eq!(slots, vec![(0, "https://a/1.png"), (2, "https://a/3.png")]);
    }

    #[test]
    fn test_single_asset_uses_first_texture() {
        let image = record(json!({
            "id": 1, "name": "sign",
            "model": {"type": 5, "texture": {"url": "https://a/sign.png"}, "android_texture": {"url": "https://a/other.png"}}
        }));
        let tasks = tasks_for(&image);
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].url, "https://a/sign.png");
        assert_eq!(tasks[0].slot, 0);
    }

    #[test]
    #[traced_test]
    fn test_missing_url_warns_and_skips() {
        let image = record(json!({"id": 2, "name": "blank", "model": {"type": 5}}));
        assert!(tasks_for(&image).is_empty());
        assert!(logs_contain("No URL found for object"));
    }

    #[test]
    #[traced_test]
    fn test_particle_needs_no_asset() {
        let particle = record(json!({"id": 4, "name": "sparks", "model": {"type": 16}}));
        assert!(tasks_for(&particle).is_empty());
        assert!(!logs_contain("No URL found"));
    }

    #[test]
    fn test_plan_keeps_record_order() {
        let records = vec![
            record(json!({"id": 1, "name": "a", "model": {"type": 8, "texture": {"url": "https://a/a.glb"}}})),
            record(json!({"id": 2, "name": "b", "model": {"type": 9, "ios_texture": {"url": "https://a/b.mp4"}}})),
        ];
        let tasks = plan_downloads(&records);
        let ids: Vec<i64> = tasks.iter().map(|t| t.object_id).collect();
        assert_eq!(ids, vec![1, 2]);
    }
}
