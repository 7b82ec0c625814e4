//! Filesystem-facing services: paths, configuration, record files, media
//! decoding and logging setup.

pub mod config_service;
pub mod json_record_repository;
pub mod media;
pub mod paths;
pub mod storage;
pub mod telemetry;

pub use crate::config_service::ConfigService;
pub use crate::json_record_repository::JsonRecordRepository;
pub use crate::paths::LigPaths;
