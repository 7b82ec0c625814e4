//! Builds local scene nodes from fetched records and their downloads.
//!
//! Runs on the calling thread only, after the download barrier.

use std::f64::consts::FRAC_PI_2;
use std::path::{Path, PathBuf};

use lig_core::coordinate::{LocalTransform, to_local_space};
use lig_core::download::DownloadResult;
use lig_core::properties::{InfoBallFields, LocalObjectProperties, ParticleFields, TypeFields};
use lig_core::scene::{NodeHandle, ParticleEmitterConfig, SceneAdapter};
use lig_core::session::normalize_scene_id;
use lig_core::{ArObjectRecord, LigError, ObjectTypeTag, Result, SchemaMapper};
use lig_infrastructure::media::{self, GifFrames};
use tracing::{debug, info, warn};

use crate::info_ball::RingLayoutParams;

/// How a downloaded file is brought into the scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetKind {
    Model,
    Image,
    Video,
    Gif,
}

/// Classifies a downloaded file by extension, falling back to its guessed
/// MIME type for other `model/*` formats.
pub fn classify_asset(path: &Path) -> Result<AssetKind> {
    let ext = path
        .extension()
        .map(|ext| ext.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_default();
    let kind = match ext.as_str() {
        "glb" | "gltf" => Some(AssetKind::Model),
        "png" | "jpg" | "jpeg" | "webp" => Some(AssetKind::Image),
        "mp4" | "mov" => Some(AssetKind::Video),
        "gif" => Some(AssetKind::Gif),
        _ => mime_guess::from_path(path)
            .first()
            .filter(|mime| mime.type_() == "model")
            .map(|_| AssetKind::Model),
    };
    kind.ok_or_else(|| {
        LigError::import(format!("Unsupported file format: {}", path.display()))
    })
}

/// Result of assembling one record.
#[derive(Debug, Clone, PartialEq)]
pub struct ImportedNode {
    pub object_name: String,
    pub anchor: NodeHandle,
    /// False when an existing node was only refreshed.
    pub created: bool,
    /// Nodes parented directly under the anchor by this import.
    pub children: Vec<NodeHandle>,
}

/// Assembles records into the group of one scene.
#[derive(Debug, Clone)]
pub struct ImportAssembler {
    group: String,
}

impl ImportAssembler {
    /// Assembler adding new anchors to the group named after `scene_id`.
    pub fn new(scene_id: &str) -> Self {
        Self {
            group: normalize_scene_id(scene_id).to_string(),
        }
    }

    pub fn group(&self) -> &str {
        &self.group
    }

    /// Creates (or refreshes) the node for `record`.
    ///
    /// `downloads` may hold results of other records; only those with the
    /// record's id are used. A failed import leaves nothing behind in the
    /// scene, so a later fetch builds the object from scratch.
    pub fn assemble<A>(
        &self,
        record: &ArObjectRecord,
        downloads: &[DownloadResult],
        adapter: &mut A,
    ) -> Result<ImportedNode>
    where
        A: SceneAdapter + ?Sized,
    {
        let object_name = record.object_name();
        let transform = to_local_space(&record.remote_transform());
        let props = SchemaMapper::to_local(record)?;

        if let Some(anchor) = adapter.find_node(&object_name) {
            adapter.set_transform(anchor, &transform)?;
            match adapter.object_properties_mut(anchor) {
                Some(existing) => {
                    existing.json_data = props.json_data;
                    existing.sync_from_json()?;
                }
                None => adapter.set_object_properties(anchor, props)?,
            }
            info!(object = %object_name, "Updated existing object");
            return Ok(ImportedNode {
                object_name,
                anchor,
                created: false,
                children: Vec::new(),
            });
        }

        let slots = downloaded_slots(record.id, downloads);
        let tag = record.type_tag();
        let asset = match tag {
            ObjectTypeTag::InfoBall | ObjectTypeTag::Particle => None,
            _ => {
                let path = slots.iter().flatten().next().ok_or_else(|| {
                    LigError::import(format!("No downloaded asset for {object_name}"))
                })?;
                Some(PreparedAsset::from_path(path)?)
            }
        };

        let anchor = adapter.create_anchor_node(&object_name)?;
        let children = match self.populate(adapter, anchor, record, props, asset, &slots) {
            Ok(children) => children,
            Err(e) => {
                if let Err(cleanup) = adapter.remove_node(anchor) {
                    warn!(object = %object_name, error = %cleanup, "Failed to remove partial import");
                }
                return Err(e);
            }
        };
        info!(object = %object_name, %tag, children = children.len(), group = %self.group, "Imported object");

        Ok(ImportedNode {
            object_name,
            anchor,
            created: true,
            children,
        })
    }

    fn populate<A>(
        &self,
        adapter: &mut A,
        anchor: NodeHandle,
        record: &ArObjectRecord,
        props: LocalObjectProperties,
        asset: Option<PreparedAsset>,
        slots: &[Option<PathBuf>],
    ) -> Result<Vec<NodeHandle>>
    where
        A: SceneAdapter + ?Sized,
    {
        let object_name = record.object_name();
        let children = match (record.type_tag(), asset) {
            (_, Some(asset)) => import_asset(adapter, anchor, &object_name, asset)?,
            (ObjectTypeTag::InfoBall, None) => {
                build_info_ball(adapter, anchor, record, &props, slots)?
            }
            (ObjectTypeTag::Particle, None) => {
                let fields = match &props.type_fields {
                    TypeFields::Particle(fields) => fields.clone(),
                    _ => ParticleFields::default(),
                };
                adapter.create_particle_emitter(anchor, &ParticleEmitterConfig::from(&fields))?;
                Vec::new()
            }
            (_, None) => Vec::new(),
        };

        adapter.set_transform(anchor, &to_local_space(&record.remote_transform()))?;
        adapter.set_object_properties(anchor, props)?;
        adapter.add_nodes_to_group(anchor, &self.group)?;
        Ok(children)
    }
}

/// A downloaded asset, classified and decoded before any node exists.
enum PreparedAsset {
    File(PathBuf, AssetKind),
    Sequence(GifFrames),
}

impl PreparedAsset {
    fn from_path(path: &Path) -> Result<Self> {
        match classify_asset(path)? {
            AssetKind::Gif => Ok(Self::Sequence(media::extract_gif_frames(path)?)),
            kind => Ok(Self::File(path.to_path_buf(), kind)),
        }
    }
}

/// Successful download paths of one record, indexed by slot.
fn downloaded_slots(object_id: i64, downloads: &[DownloadResult]) -> Vec<Option<PathBuf>> {
    let mut slots: Vec<Option<PathBuf>> = Vec::new();
    for result in downloads.iter().filter(|r| r.task.object_id == object_id) {
        let slot = result.task.slot;
        if slots.len() <= slot {
            slots.resize(slot + 1, None);
        }
        slots[slot] = result.path().map(Path::to_path_buf);
    }
    slots
}

fn upright() -> LocalTransform {
    LocalTransform {
        rotation_radians: [FRAC_PI_2, 0.0, 0.0],
        ..LocalTransform::default()
    }
}

/// Brings `asset` in under `anchor`. Every new node is parented before it
/// is touched further.
fn import_asset<A>(
    adapter: &mut A,
    anchor: NodeHandle,
    object_name: &str,
    asset: PreparedAsset,
) -> Result<Vec<NodeHandle>>
where
    A: SceneAdapter + ?Sized,
{
    let roots = match asset {
        PreparedAsset::File(path, kind) => {
            let roots = adapter.import_file(&path)?;
            for &root in &roots {
                adapter.parent(root, anchor)?;
            }
            if matches!(kind, AssetKind::Image | AssetKind::Video) {
                for &root in &roots {
                    let [width, height, _] = adapter.dimensions(root)?;
                    let longest = width.max(height);
                    if longest > 0.0 {
                        adapter.set_dimensions(root, [width / longest, height / longest, 0.0])?;
                    }
                    adapter.set_transform(root, &upright())?;
                }
            }
            debug!(object = object_name, ?kind, nodes = roots.len(), "Imported asset");
            roots
        }
        PreparedAsset::Sequence(frames) => {
            let plane = adapter.create_plane(
                &format!("{object_name}_sequence"),
                frames.aspect_ratio(),
                1.0,
            )?;
            adapter.parent(plane, anchor)?;
            adapter.set_transform(plane, &upright())?;
            adapter.bind_image_sequence(plane, &frames.frames)?;
            debug!(object = object_name, frames = frames.frames.len(), "Imported image sequence");
            vec![plane]
        }
    };
    Ok(roots)
}

fn build_info_ball<A>(
    adapter: &mut A,
    anchor: NodeHandle,
    record: &ArObjectRecord,
    props: &LocalObjectProperties,
    textures: &[Option<PathBuf>],
) -> Result<Vec<NodeHandle>>
where
    A: SceneAdapter + ?Sized,
{
    let fields = match &props.type_fields {
        TypeFields::InfoBall(fields) => fields.clone(),
        _ => InfoBallFields::default(),
    };
    let params = RingLayoutParams::from_fields(&fields, &record.model.fields);

    let available = textures.iter().flatten().count();
    if available != params.face_total() {
        let mismatch = LigError::AssetMismatch {
            expected: params.face_total(),
            actual: available,
        };
        warn!(object = %props.obj_name, error = %mismatch, "Texture count does not match info-ball faces");
    }

    let mut planes = Vec::new();
    for face in params.layout() {
        let Some(texture) = textures.get(face.texture_index).and_then(Option::as_ref) else {
            debug!(face = %face.name, "No texture for face, skipped");
            continue;
        };
        let plane = adapter.create_plane(&face.name, face.width, face.height)?;
        adapter.parent(plane, anchor)?;
        adapter.set_transform(
            plane,
            &LocalTransform {
                location: face.location,
                rotation_radians: face.rotation,
                ..LocalTransform::default()
            },
        )?;
        adapter.bind_image_texture(plane, texture)?;
        planes.push(plane);
    }
    Ok(planes)
}
