//! Domain core of the LiG AR cloud sync.
//!
//! Holds the remote record model, the local property model and the mapping
//! between them, plus the traits the outer crates implement: the cloud
//! service, the record repository and the scene adapter.

pub mod ar_object;
pub mod clipboard;
pub mod config;
pub mod coordinate;
pub mod download;
pub mod error;
pub mod keyframe;
pub mod properties;
pub mod remote;
pub mod repository;
pub mod scene;
pub mod schema;
pub mod session;

pub use ar_object::{ArObjectRecord, ObjectTypeTag};
pub use error::{LigError, Result};
pub use properties::LocalObjectProperties;
pub use schema::SchemaMapper;
