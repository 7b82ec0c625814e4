//! Runtime configuration model.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

pub const DEFAULT_API_BASE_URL: &str = "https://api.lig.com.tw/api/v1";
pub const DEFAULT_USER_AGENT: &str = "Blender LiG Plugin Client";
pub const DEFAULT_DOWNLOAD_WORKERS: usize = 5;

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct LigConfig {
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    /// Directory holding `{objectName}.json` files. Unset means the
    /// platform data directory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub save_dir: Option<PathBuf>,
    #[serde(default = "default_download_workers")]
    pub download_workers: usize,
    /// Unset leaves the HTTP client's default.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_timeout_secs: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_dir: Option<PathBuf>,
}

fn default_api_base_url() -> String {
    DEFAULT_API_BASE_URL.to_string()
}

fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.to_string()
}

fn default_download_workers() -> usize {
    DEFAULT_DOWNLOAD_WORKERS
}

impl Default for LigConfig {
    fn default() -> Self {
        Self {
            api_base_url: default_api_base_url(),
            user_agent: default_user_agent(),
            save_dir: None,
            download_workers: default_download_workers(),
            request_timeout_secs: None,
            log_dir: None,
        }
    }
}

impl LigConfig {
    /// Worker count, never below one.
    pub fn workers(&self) -> usize {
        self.download_workers.max(1)
    }
}
