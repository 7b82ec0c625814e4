//! In-process scene graph implementing [`SceneAdapter`].

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::path::{Path, PathBuf};

use super::adapter::{MaterialHandle, NodeHandle, ParticleEmitterConfig, SceneAdapter};
use crate::coordinate::LocalTransform;
use crate::error::{LigError, Result};
use crate::properties::LocalObjectProperties;

#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    Anchor,
    Imported { source: PathBuf },
    Plane { width: f64, height: f64 },
}

#[derive(Debug, Clone, PartialEq)]
pub enum MaterialBinding {
    Image(PathBuf),
    Sequence(Vec<PathBuf>),
}

#[derive(Debug, Clone)]
pub struct SceneNode {
    pub name: String,
    pub kind: NodeKind,
    pub transform: LocalTransform,
    pub dimensions: [f64; 3],
    pub parent: Option<NodeHandle>,
    pub material: Option<(MaterialHandle, MaterialBinding)>,
    pub emitter: Option<ParticleEmitterConfig>,
    pub properties: Option<LocalObjectProperties>,
}

impl SceneNode {
    fn new(name: String, kind: NodeKind, dimensions: [f64; 3]) -> Self {
        Self {
            name,
            kind,
            transform: LocalTransform::default(),
            dimensions,
            parent: None,
            material: None,
            emitter: None,
            properties: None,
        }
    }
}

/// A scene graph held entirely in memory.
///
/// Node names are unique; a clashing name gets a `.001`-style suffix the way
/// desktop 3D hosts do.
#[derive(Debug)]
pub struct InMemoryScene {
    nodes: BTreeMap<NodeHandle, SceneNode>,
    groups: HashMap<String, BTreeSet<NodeHandle>>,
    next_id: u64,
    import_dimensions: [f64; 3],
}

impl Default for InMemoryScene {
    fn default() -> Self {
        Self {
            nodes: BTreeMap::new(),
            groups: HashMap::new(),
            next_id: 1,
            import_dimensions: [1.0, 1.0, 1.0],
        }
    }
}

impl InMemoryScene {
    pub fn new() -> Self {
        Self::default()
    }

    /// Dimensions given to every node created by `import_file`.
    pub fn with_import_dimensions(mut self, dimensions: [f64; 3]) -> Self {
        self.import_dimensions = dimensions;
        self
    }

    pub fn node(&self, handle: NodeHandle) -> Option<&SceneNode> {
        self.nodes.get(&handle)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn children(&self, parent: NodeHandle) -> Vec<NodeHandle> {
        self.nodes
            .iter()
            .filter(|(_, node)| node.parent == Some(parent))
            .map(|(handle, _)| *handle)
            .collect()
    }

    fn unique_name(&self, name: &str) -> String {
        if self.find_node(name).is_none() {
            return name.to_string();
        }
        (1..)
            .map(|n| format!("{name}.{n:03}"))
            .find(|candidate| self.find_node(candidate).is_none())
            .unwrap_or_else(|| name.to_string())
    }

    fn insert(&mut self, name: &str, kind: NodeKind, dimensions: [f64; 3]) -> NodeHandle {
        let handle = NodeHandle(self.next_id);
        self.next_id += 1;
        let node = SceneNode::new(self.unique_name(name), kind, dimensions);
        self.nodes.insert(handle, node);
        handle
    }

    fn node_mut(&mut self, handle: NodeHandle) -> Result<&mut SceneNode> {
        self.nodes
            .get_mut(&handle)
            .ok_or_else(|| LigError::not_found("node", handle.0.to_string()))
    }

    fn get(&self, handle: NodeHandle) -> Result<&SceneNode> {
        self.nodes
            .get(&handle)
            .ok_or_else(|| LigError::not_found("node", handle.0.to_string()))
    }

    fn descendants(&self, root: NodeHandle) -> Vec<NodeHandle> {
        let mut out = vec![root];
        let mut cursor = 0;
        while cursor < out.len() {
            let current = out[cursor];
            out.extend(self.children(current));
            cursor += 1;
        }
        out
    }

    fn bind(&mut self, node: NodeHandle, binding: MaterialBinding) -> Result<MaterialHandle> {
        let material = MaterialHandle(self.next_id);
        self.next_id += 1;
        self.node_mut(node)?.material = Some((material, binding));
        Ok(material)
    }
}

impl SceneAdapter for InMemoryScene {
    fn find_node(&self, name: &str) -> Option<NodeHandle> {
        self.nodes
            .iter()
            .find(|(_, node)| node.name == name)
            .map(|(handle, _)| *handle)
    }

    fn create_anchor_node(&mut self, name: &str) -> Result<NodeHandle> {
        Ok(self.insert(name, NodeKind::Anchor, [0.0; 3]))
    }

    fn remove_node(&mut self, node: NodeHandle) -> Result<()> {
        self.get(node)?;
        let doomed = self.descendants(node);
        for handle in &doomed {
            self.nodes.remove(handle);
        }
        for set in self.groups.values_mut() {
            for handle in &doomed {
                set.remove(handle);
            }
        }
        Ok(())
    }

    fn import_file(&mut self, path: &Path) -> Result<Vec<NodeHandle>> {
        if !path.is_file() {
            return Err(LigError::import(format!(
                "file not found: {}",
                path.display()
            )));
        }
        let name = path
            .file_stem()
            .and_then(|stem| stem.to_str())
            .unwrap_or("imported")
            .to_string();
        let kind = NodeKind::Imported {
            source: path.to_path_buf(),
        };
        let dimensions = self.import_dimensions;
        Ok(vec![self.insert(&name, kind, dimensions)])
    }

    fn create_plane(&mut self, name: &str, width: f64, height: f64) -> Result<NodeHandle> {
        Ok(self.insert(name, NodeKind::Plane { width, height }, [width, height, 0.0]))
    }

    fn set_transform(&mut self, node: NodeHandle, transform: &LocalTransform) -> Result<()> {
        self.node_mut(node)?.transform = *transform;
        Ok(())
    }

    fn node_transform(&self, node: NodeHandle) -> Result<LocalTransform> {
        Ok(self.get(node)?.transform)
    }

    fn parent(&mut self, child: NodeHandle, parent: NodeHandle) -> Result<()> {
        self.get(parent)?;
        if self.descendants(child).contains(&parent) {
            return Err(LigError::import("cannot parent a node under its own descendant"));
        }
        self.node_mut(child)?.parent = Some(parent);
        Ok(())
    }

    fn bind_image_texture(&mut self, node: NodeHandle, path: &Path) -> Result<MaterialHandle> {
        self.bind(node, MaterialBinding::Image(path.to_path_buf()))
    }

    fn bind_image_sequence(
        &mut self,
        node: NodeHandle,
        frames: &[PathBuf],
    ) -> Result<MaterialHandle> {
        if frames.is_empty() {
            return Err(LigError::import("image sequence has no frames"));
        }
        self.bind(node, MaterialBinding::Sequence(frames.to_vec()))
    }

    fn create_particle_emitter(
        &mut self,
        node: NodeHandle,
        config: &ParticleEmitterConfig,
    ) -> Result<()> {
        self.node_mut(node)?.emitter = Some(config.clone());
        Ok(())
    }

    fn add_nodes_to_group(&mut self, node: NodeHandle, group: &str) -> Result<()> {
        self.get(node)?;
        let members = self.descendants(node);
        for set in self.groups.values_mut() {
            for member in &members {
                set.remove(member);
            }
        }
        self.groups
            .entry(group.to_string())
            .or_default()
            .extend(members);
        Ok(())
    }

    fn group_roots(&self, group: &str) -> Vec<NodeHandle> {
        let Some(members) = self.groups.get(group) else {
            return Vec::new();
        };
        members
            .iter()
            .filter(|handle| {
                self.nodes
                    .get(handle)
                    .and_then(|node| node.parent)
                    .is_none_or(|parent| !members.contains(&parent))
            })
            .copied()
            .collect()
    }

    fn node_name(&self, node: NodeHandle) -> Option<String> {
        self.nodes.get(&node).map(|n| n.name.clone())
    }

    fn dimensions(&self, node: NodeHandle) -> Result<[f64; 3]> {
        Ok(self.get(node)?.dimensions)
    }

    fn set_dimensions(&mut self, node: NodeHandle, dimensions: [f64; 3]) -> Result<()> {
        self.node_mut(node)?.dimensions = dimensions;
        Ok(())
    }

    fn set_object_properties(
        &mut self,
        node: NodeHandle,
        properties: LocalObjectProperties,
    ) -> Result<()> {
        self.node_mut(node)?.properties = Some(properties);
        Ok(())
    }

    fn object_properties(&self, node: NodeHandle) -> Option<&LocalObjectProperties> {
        self.nodes.get(&node).and_then(|n| n.properties.as_ref())
    }

    fn object_properties_mut(&mut self, node: NodeHandle) -> Option<&mut LocalObjectProperties> {
        self.nodes.get_mut(&node).and_then(|n| n.properties.as_mut())
    }
}
