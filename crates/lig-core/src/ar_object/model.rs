//! Remote AR object record.
//!
//! Every struct keeps unrecognized keys in a flattened `extra` map so a record
//! fetched from the server and written back out loses nothing.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::tag::ObjectTypeTag;
use crate::coordinate::RemoteTransform;

/// Position (meters) and rotation (degrees) in the Y-up remote space.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Location {
    #[serde(default)]
    pub x: f64,
    #[serde(default)]
    pub y: f64,
    #[serde(default)]
    pub z: f64,
    #[serde(default)]
    pub rotate_x: f64,
    #[serde(default)]
    pub rotate_y: f64,
    #[serde(default)]
    pub rotate_z: f64,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Per-axis scale in remote space.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Zoom {
    #[serde(default = "unit")]
    pub x: f64,
    #[serde(default = "unit")]
    pub y: f64,
    #[serde(default = "unit")]
    pub z: f64,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

fn unit() -> f64 {
    1.0
}

impl Default for Zoom {
    fn default() -> Self {
        Self {
            x: 1.0,
            y: 1.0,
            z: 1.0,
            extra: Map::new(),
        }
    }
}

/// A downloadable asset reference.
///
/// Info-ball textures additionally carry an ordered `photos` list with one
/// entry per face.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Texture {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photos: Option<Vec<Value>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Texture {
    /// Non-empty asset URL, if any.
    pub fn asset_url(&self) -> Option<&str> {
        self.url.as_deref().filter(|url| !url.trim().is_empty())
    }

    /// Photo URLs paired with their face slot.
    ///
    /// Entries may be bare strings or `{ "url": ... }` objects. Blank or
    /// unusable entries are skipped but still occupy their slot.
    pub fn photo_urls(&self) -> Vec<(usize, String)> {
        self.photos
            .iter()
            .flatten()
            .enumerate()
            .filter_map(|(slot, photo)| {
                let url = match photo {
                    Value::String(url) => url.as_str(),
                    Value::Object(map) => map.get("url").and_then(Value::as_str)?,
                    _ => return None,
                };
                (!url.trim().is_empty()).then(|| (slot, url.to_string()))
            })
            .collect()
    }
}

/// The `model` block: type tag, type-specific fields and asset references.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ArModel {
    #[serde(rename = "type", default)]
    pub type_code: i64,
    #[serde(default)]
    pub fields: Map<String, Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub texture: Option<Texture>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ios_texture: Option<Texture>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub android_texture: Option<Texture>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// One AR object as served by `ar_objects_from_scene`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArObjectRecord {
    pub id: i64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub location: Location,
    #[serde(default)]
    pub zoom: Zoom,
    #[serde(default)]
    pub model: ArModel,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actions: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub events: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub_events: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transparency: Option<f64>,
    #[serde(default)]
    pub is_child: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zone_id: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scene_id: Option<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ArObjectRecord {
    /// Creates a bare record with default location, zoom and no assets.
    pub fn new(id: i64, name: impl Into<String>, tag: ObjectTypeTag) -> Self {
        Self {
            id,
            name: name.into(),
            location: Location::default(),
            zoom: Zoom::default(),
            model: ArModel {
                type_code: tag.code(),
                ..ArModel::default()
            },
            actions: None,
            events: None,
            sub_events: None,
            transparency: None,
            is_child: false,
            group: None,
            zone_id: None,
            scene_id: None,
            extra: Map::new(),
        }
    }

    /// Local node name, `"{id}-{name}"`.
    pub fn object_name(&self) -> String {
        format!("{}-{}", self.id, self.name)
    }

    pub fn type_tag(&self) -> ObjectTypeTag {
        ObjectTypeTag::from_code(self.model.type_code)
    }

    /// First non-empty URL among `texture`, `ios_texture`, `android_texture`.
    pub fn primary_asset_url(&self) -> Option<&str> {
        [
            &self.model.texture,
            &self.model.ios_texture,
            &self.model.android_texture,
        ]
        .into_iter()
        .flatten()
        .find_map(Texture::asset_url)
    }

    /// Info-ball face URLs from `texture.photos`, keyed by face slot.
    pub fn photo_urls(&self) -> Vec<(usize, String)> {
        self.model
            .texture
            .as_ref()
            .map(Texture::photo_urls)
            .unwrap_or_default()
    }

    pub fn remote_transform(&self) -> RemoteTransform {
        RemoteTransform {
            location: [self.location.x, self.location.y, self.location.z],
            rotation_degrees: [
                self.location.rotate_x,
                self.location.rotate_y,
                self.location.rotate_z,
            ],
            zoom: [self.zoom.x, self.zoom.y, self.zoom.z],
        }
    }

    /// Overwrites location, rotation and zoom from a remote-space transform.
    pub fn set_remote_transform(&mut self, transform: &RemoteTransform) {
        let [x, y, z] = transform.location;
        let [rx, ry, rz] = transform.rotation_degrees;
        self.location.x = x;
        self.location.y = y;
        self.location.z = z;
        self.location.rotate_x = rx;
        self.location.rotate_y = ry;
        self.location.rotate_z = rz;
        let [zx, zy, zz] = transform.zoom;
        self.zoom.x = zx;
        self.zoom.y = zy;
        self.zoom.z = zz;
    }
}
