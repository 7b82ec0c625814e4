//! Local shadow of an AR object record.

use crate::ar_object::ObjectTypeTag;
use crate::coordinate::RemoteTransform;

use super::text::{NumericText, StructuredText};

/// Default distance (meters) at which an object becomes visible.
pub const DEFAULT_VISIBLE_DISTANCE: f64 = 20.0;

/// Fields shared by every object type.
#[derive(Debug, Clone, PartialEq)]
pub struct CommonFields {
    pub visible_distance: f64,
    pub is_ignore: bool,
    pub face_me: bool,
    pub is_hidden: bool,
    pub is_double_sided: bool,
    pub is_occlusion: bool,
    pub is_allow_pinch: bool,
}

impl Default for CommonFields {
    fn default() -> Self {
        Self {
            visible_distance: DEFAULT_VISIBLE_DISTANCE,
            is_ignore: false,
            face_me: false,
            is_hidden: false,
            is_double_sided: false,
            is_occlusion: false,
            is_allow_pinch: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ImageFields {
    pub width: f64,
    pub height: f64,
    pub is_size_scale_lock: bool,
    pub bloom_intensity: f64,
    pub bloom_radius: f64,
}

impl Default for ImageFields {
    fn default() -> Self {
        Self {
            width: 1.0,
            height: 1.0,
            is_size_scale_lock: true,
            bloom_intensity: 0.0,
            bloom_radius: 0.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct VideoFields {
    pub hue_angle: NumericText,
    pub hue_range: NumericText,
    pub saturation: NumericText,
    pub is_play: bool,
    pub is_loop_play: bool,
}

impl Default for VideoFields {
    fn default() -> Self {
        Self {
            hue_angle: NumericText::Empty,
            hue_range: NumericText::Empty,
            saturation: NumericText::Number(0.5),
            is_play: false,
            is_loop_play: false,
        }
    }
}

/// An optional animation frame bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FrameSetting {
    pub enabled: bool,
    pub value: i64,
}

impl FrameSetting {
    pub fn enabled(value: i64) -> Self {
        Self {
            enabled: true,
            value,
        }
    }

    /// `None` when disabled.
    pub fn get(&self) -> Option<i64> {
        self.enabled.then_some(self.value)
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Model3dFields {
    pub animation_speed: NumericText,
    pub start_frame: FrameSetting,
    pub end_frame: FrameSetting,
    pub fps: NumericText,
    pub multiply_number: NumericText,
    pub multiply_radius: NumericText,
    pub multiply_range: NumericText,
    pub multiply_is_zero_y: bool,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct InfoBallFields {
    pub floor_count: u32,
    pub face_count: u32,
    pub floor_height: f64,
    pub floor_gap: f64,
    pub face_width: f64,
    pub face_gap: f64,
    pub speed: f64,
    /// Per-ring tilt in degrees.
    pub floor_angles: [f64; 3],
    pub face_gap_list: [f64; 3],
}

/// Particle emitter settings. All values are non-negative.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ParticleFields {
    pub birth_rate: f64,
    pub birth_rate_variation: f64,
    pub life_span: f64,
    pub life_span_variation: f64,
    pub velocity: f64,
    pub velocity_variation: f64,
}

impl ParticleFields {
    pub fn clamped(mut self) -> Self {
        for value in [
            &mut self.birth_rate,
            &mut self.birth_rate_variation,
            &mut self.life_span,
            &mut self.life_span_variation,
            &mut self.velocity,
            &mut self.velocity_variation,
        ] {
            *value = value.max(0.0);
        }
        self
    }
}

/// Type-specific field set, selected by the record's type tag.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum TypeFields {
    Image(ImageFields),
    Video(VideoFields),
    Model3d(Model3dFields),
    InfoBall(InfoBallFields),
    Particle(ParticleFields),
    /// Unknown tag: common fields only.
    #[default]
    Other,
}

impl TypeFields {
    pub fn default_for(tag: ObjectTypeTag) -> Self {
        match tag {
            ObjectTypeTag::Image => Self::Image(ImageFields::default()),
            ObjectTypeTag::Video => Self::Video(VideoFields::default()),
            ObjectTypeTag::Model3d => Self::Model3d(Model3dFields::default()),
            ObjectTypeTag::InfoBall => Self::InfoBall(InfoBallFields::default()),
            ObjectTypeTag::Particle => Self::Particle(ParticleFields::default()),
            ObjectTypeTag::Other(_) => Self::Other,
        }
    }

    /// Whether this field set is the one `tag` selects.
    pub fn matches(&self, tag: ObjectTypeTag) -> bool {
        matches!(
            (self, tag),
            (Self::Image(_), ObjectTypeTag::Image)
                | (Self::Video(_), ObjectTypeTag::Video)
                | (Self::Model3d(_), ObjectTypeTag::Model3d)
                | (Self::InfoBall(_), ObjectTypeTag::InfoBall)
                | (Self::Particle(_), ObjectTypeTag::Particle)
                | (Self::Other, ObjectTypeTag::Other(_))
        )
    }
}

/// Editable properties attached to a local anchor node.
///
/// `json_data` is the authoritative record. The flattened fields are only
/// brought in line with it by `sync_from_json` and written back by
/// `sync_to_json`.
#[derive(Debug, Clone, PartialEq)]
pub struct LocalObjectProperties {
    pub json_data: String,
    pub obj_name: String,
    pub model_type: i64,
    /// Remote-space values (degrees), as shown to the author.
    pub transform: RemoteTransform,
    pub common: CommonFields,
    pub type_fields: TypeFields,
    pub actions: StructuredText,
    pub events: StructuredText,
    pub sub_events: StructuredText,
    pub transparency: f64,
    pub is_child: bool,
}

impl Default for LocalObjectProperties {
    fn default() -> Self {
        Self {
            json_data: String::new(),
            obj_name: String::new(),
            model_type: 0,
            transform: RemoteTransform::default(),
            common: CommonFields::default(),
            type_fields: TypeFields::Other,
            actions: StructuredText::Absent,
            events: StructuredText::Absent,
            sub_events: StructuredText::Absent,
            transparency: 1.0,
            is_child: false,
        }
    }
}

impl LocalObjectProperties {
    /// Properties holding `json_data` with every flattened field at its
    /// default. Call `sync_from_json` to populate them.
    pub fn with_json(json_data: impl Into<String>) -> Self {
        Self {
            json_data: json_data.into(),
            ..Self::default()
        }
    }

    pub fn type_tag(&self) -> ObjectTypeTag {
        ObjectTypeTag::from_code(self.model_type)
    }

    pub fn set_transparency(&mut self, value: f64) {
        self.transparency = clamp_unit(value);
    }
}

pub(crate) fn clamp_unit(value: f64) -> f64 {
    if value.is_nan() {
        1.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_particle_clamped() {
        let fields = ParticleFields {
            birth_rate: -3.0,
            velocity: 2.0,
            ..ParticleFields::default()
        }
        .clamped();
        assert_eq!(fields.birth_rate, 0.0);
        assert_eq!(fields.velocity, 2.0);
    }

    #[test]
    fn test_transparency_is_clamped() {
        let mut props = LocalObjectProperties::default();
        props.set_transparency(1.7);
        assert_eq!(props.transparency, 1.0);
        props.set_transparency(-0.2);
        assert_eq!(props.transparency, 0.0);
    }

    #[test]
    fn test_type_fields_match_tag() {
        let fields = TypeFields::default_for(ObjectTypeTag::Video);
        assert!(fields.matches(ObjectTypeTag::Video));
        assert!(!fields.matches(ObjectTypeTag::Image));
        assert!(TypeFields::Other.matches(ObjectTypeTag::Other(99)));
    }

    #[test]
    fn test_frame_setting_disabled_is_none() {
        assert_eq!(FrameSetting::default().get(), None);
        assert_eq!(FrameSetting::enabled(12).get(), Some(12));
    }
}
