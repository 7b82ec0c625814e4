//! AR object domain models.
//!
//! An AR object is the remote record describing one placed content item
//! (image, video, 3D model, info-ball or particle emitter) inside a scene.

mod model;
mod tag;

pub use model::{ArModel, ArObjectRecord, Location, Texture, Zoom};
pub use tag::ObjectTypeTag;
