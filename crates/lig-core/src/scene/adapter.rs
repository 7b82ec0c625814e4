//! Scene adapter trait and handle types.

use std::path::{Path, PathBuf};

use crate::coordinate::LocalTransform;
use crate::error::Result;
use crate::properties::{LocalObjectProperties, ParticleFields};

/// Opaque reference to a node owned by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeHandle(pub u64);

/// Opaque reference to a material owned by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MaterialHandle(pub u64);

/// Emitter settings in host terms.
#[derive(Debug, Clone, PartialEq)]
pub struct ParticleEmitterConfig {
    pub count: u32,
    pub lifetime: f64,
    pub lifetime_random: f64,
    pub normal_velocity: f64,
    pub velocity_random: f64,
}

impl From<&ParticleFields> for ParticleEmitterConfig {
    fn from(fields: &ParticleFields) -> Self {
        let fields = fields.clone().clamped();
        Self {
            count: fields.birth_rate as u32,
            lifetime: fields.life_span,
            lifetime_random: fields.life_span_variation,
            normal_velocity: fields.velocity,
            velocity_random: fields.velocity_variation,
        }
    }
}

/// Operations the sync pipeline needs from a 3D host.
///
/// All calls happen on the thread that owns the scene.
pub trait SceneAdapter {
    fn find_node(&self, name: &str) -> Option<NodeHandle>;

    /// Creates an empty node that carries an object's transform.
    fn create_anchor_node(&mut self, name: &str) -> Result<NodeHandle>;

    /// Deletes `node` together with its descendants and their group
    /// memberships.
    fn remove_node(&mut self, node: NodeHandle) -> Result<()>;

    /// Imports an asset file and returns its root nodes.
    fn import_file(&mut self, path: &Path) -> Result<Vec<NodeHandle>>;

    fn create_plane(&mut self, name: &str, width: f64, height: f64) -> Result<NodeHandle>;

    fn set_transform(&mut self, node: NodeHandle, transform: &LocalTransform) -> Result<()>;

    fn node_transform(&self, node: NodeHandle) -> Result<LocalTransform>;

    fn parent(&mut self, child: NodeHandle, parent: NodeHandle) -> Result<()>;

    fn bind_image_texture(&mut self, node: NodeHandle, path: &Path) -> Result<MaterialHandle>;

    /// Binds an ordered frame list as a cycling image-sequence texture.
    fn bind_image_sequence(&mut self, node: NodeHandle, frames: &[PathBuf])
    -> Result<MaterialHandle>;

    fn create_particle_emitter(
        &mut self,
        node: NodeHandle,
        config: &ParticleEmitterConfig,
    ) -> Result<()>;

    /// Moves `node` and all of its descendants into `group`, creating the
    /// group when needed.
    fn add_nodes_to_group(&mut self, node: NodeHandle, group: &str) -> Result<()>;

    /// Top-level nodes of `group`: members whose parent is not in the group.
    fn group_roots(&self, group: &str) -> Vec<NodeHandle>;

    fn node_name(&self, node: NodeHandle) -> Option<String>;

    fn dimensions(&self, node: NodeHandle) -> Result<[f64; 3]>;

    fn set_dimensions(&mut self, node: NodeHandle, dimensions: [f64; 3]) -> Result<()>;

    fn set_object_properties(
        &mut self,
        node: NodeHandle,
        properties: LocalObjectProperties,
    ) -> Result<()>;

    fn object_properties(&self, node: NodeHandle) -> Option<&LocalObjectProperties>;

    fn object_properties_mut(&mut self, node: NodeHandle) -> Option<&mut LocalObjectProperties>;
}
