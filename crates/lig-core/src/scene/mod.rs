//! Boundary to the 3D host.
//!
//! The sync pipeline never touches a concrete scene graph. Everything it
//! needs goes through [`SceneAdapter`]; [`InMemoryScene`] is a complete
//! in-process implementation for headless runs and tests.

mod adapter;
mod memory;

pub use adapter::{MaterialHandle, NodeHandle, ParticleEmitterConfig, SceneAdapter};
pub use memory::{InMemoryScene, MaterialBinding, NodeKind, SceneNode};
