//! Ring layout of info-ball faces.
//!
//! An info-ball is `floor_count` stacked rings of `face_count` textured
//! planes. Ring `l` sits at height `l * (h + g) - (h + g) * (floors - 1) / 2`
//! and every face is turned to be tangent to its ring.

use std::f64::consts::{FRAC_PI_2, TAU};

use lig_core::properties::InfoBallFields;
use serde_json::{Map, Value};
use tracing::warn;

/// Upper bound on `floor_count` and on `face_count` accepted from a record.
pub const MAX_RING_DIMENSION: u32 = 256;

/// Inputs of the ring layout, resolved per ring.
#[derive(Debug, Clone, PartialEq)]
pub struct RingLayoutParams {
    pub floors: u32,
    pub faces: u32,
    pub face_width: f64,
    pub floor_height: f64,
    pub floor_gap: f64,
    /// Horizontal gap between faces, one entry per ring.
    pub ring_gaps: Vec<f64>,
    /// Extra tilt about x in radians, indexed by ring.
    pub ring_tilts: Vec<f64>,
}

/// Where one face goes, relative to the info-ball anchor.
#[derive(Debug, Clone, PartialEq)]
pub struct FacePlacement {
    pub name: String,
    pub ring: u32,
    pub face: u32,
    pub texture_index: usize,
    pub width: f64,
    pub height: f64,
    pub location: [f64; 3],
    pub rotation: [f64; 3],
}

fn numbers(value: &Value) -> Option<Vec<f64>> {
    value
        .as_array()
        .map(|items| items.iter().filter_map(Value::as_f64).collect())
}

fn clamp_count(field: &str, value: u32) -> u32 {
    if value > MAX_RING_DIMENSION {
        warn!(field, value, max = MAX_RING_DIMENSION, "Info-ball count clamped");
    }
    value.min(MAX_RING_DIMENSION)
}

impl RingLayoutParams {
    /// Resolves the layout from decoded fields plus the raw `model.fields`.
    ///
    /// `face_gap` may arrive as a list; it is used per ring when it has one
    /// entry per ring, otherwise its first entry applies to every ring.
    /// `floor_angles` are read in reverse order, so ring 0 takes the last
    /// angle. Rings without an angle get no tilt. Counts above
    /// [`MAX_RING_DIMENSION`] are clamped.
    pub fn from_fields(fields: &InfoBallFields, raw: &Map<String, Value>) -> Self {
        let floors = clamp_count("floor_count", fields.floor_count);
        let faces = clamp_count("face_count", fields.face_count);
        let ring_count = floors as usize;

        let ring_gaps = match raw.get("face_gap").and_then(numbers) {
            Some(gaps) if gaps.len() == ring_count => gaps,
            Some(gaps) => vec![gaps.first().copied().unwrap_or(fields.face_gap); ring_count],
            None => vec![fields.face_gap; ring_count],
        };

        let angles = raw
            .get("floor_angles")
            .and_then(numbers)
            .unwrap_or_else(|| fields.floor_angles.to_vec());
        let ring_tilts = angles.iter().rev().map(|deg| deg.to_radians()).collect();

        Self {
            floors,
            faces,
            face_width: fields.face_width,
            floor_height: fields.floor_height,
            floor_gap: fields.floor_gap,
            ring_gaps,
            ring_tilts,
        }
    }

    pub fn face_total(&self) -> usize {
        self.floors as usize * self.faces as usize
    }

    pub fn radius(&self, ring: u32) -> f64 {
        let gap = self.ring_gaps.get(ring as usize).copied().unwrap_or(0.0);
        (self.face_width + gap) * f64::from(self.faces) / TAU
    }

    fn ring_height(&self, ring: u32) -> f64 {
        let pitch = self.floor_height + self.floor_gap;
        f64::from(ring) * pitch - pitch * f64::from(self.floors.saturating_sub(1)) / 2.0
    }

    /// Every face, ring by ring.
    pub fn layout(&self) -> Vec<FacePlacement> {
        if self.faces == 0 {
            return Vec::new();
        }
        let step = TAU / f64::from(self.faces);
        let mut placements = Vec::with_capacity(self.face_total());
        for ring in 0..self.floors {
            let radius = self.radius(ring);
            let z = self.ring_height(ring);
            let tilt = self.ring_tilts.get(ring as usize).copied().unwrap_or(0.0);
            for face in 0..self.faces {
                let angle = f64::from(face) * step;
                placements.push(FacePlacement {
                    name: format!("Plane_L{}_{}", ring + 1, face + 1),
                    ring,
                    face,
                    texture_index: ring as usize * self.faces as usize + face as usize,
                    width: self.face_width,
                    height: self.floor_height,
                    location: [radius * angle.cos(), radius * angle.sin(), z],
                    rotation: [FRAC_PI_2 + tilt, 0.0, angle + FRAC_PI_2],
                });
            }
        }
        placements
    }
}
