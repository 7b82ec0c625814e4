//! Application layer for the LiG AR cloud sync.
//!
//! Coordinates the domain core, the REST client and the record files:
//! concurrent asset downloads, assembly of scene nodes and the scene-level
//! fetch and upload flows.

pub mod download_scheduler;
pub mod import_assembler;
pub mod info_ball;
pub mod sync_usecase;

pub use download_scheduler::DownloadScheduler;
pub use import_assembler::{ImportAssembler, ImportedNode};
pub use sync_usecase::{BatchReport, SceneSyncUseCase, SyncReport};
