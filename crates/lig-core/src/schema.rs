//! Mapping between remote records and local object properties.
//!
//! Common fields are always mapped. Type-specific fields go through
//! [`FIELD_CODECS`], one decode/encode pair per object type tag.

use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use serde_json::{Map, Value, json};
use tracing::{debug, warn};

use crate::ar_object::{ArObjectRecord, ObjectTypeTag};
use crate::coordinate::RemoteTransform;
use crate::error::{LigError, Result};
use crate::properties::{
    CommonFields, FrameSetting, ImageFields, InfoBallFields, LocalObjectProperties,
    Model3dFields, NumericText, ParticleFields, StructuredText, TypeFields, VideoFields,
    clamp_unit,
};

type DecodeFn = fn(&Map<String, Value>) -> TypeFields;
type EncodeFn = fn(&TypeFields, &mut Map<String, Value>);

/// Decode/encode pair for one object type.
pub struct FieldCodec {
    pub tag: ObjectTypeTag,
    pub decode: DecodeFn,
    pub encode: EncodeFn,
}

pub static FIELD_CODECS: &[FieldCodec] = &[
    FieldCodec {
        tag: ObjectTypeTag::Image,
        decode: decode_image,
        encode: encode_image,
    },
    FieldCodec {
        tag: ObjectTypeTag::Video,
        decode: decode_video,
        encode: encode_video,
    },
    FieldCodec {
        tag: ObjectTypeTag::Model3d,
        decode: decode_model3d,
        encode: encode_model3d,
    },
    FieldCodec {
        tag: ObjectTypeTag::InfoBall,
        decode: decode_info_ball,
        encode: encode_info_ball,
    },
    FieldCodec {
        tag: ObjectTypeTag::Particle,
        decode: decode_particle,
        encode: encode_particle,
    },
];

pub fn codec_for(tag: ObjectTypeTag) -> Option<&'static FieldCodec> {
    FIELD_CODECS.iter().find(|codec| codec.tag == tag)
}

// ============================================================================
// Value helpers
// ============================================================================

fn f64_of(value: Option<&Value>) -> Option<f64> {
    match value? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn f64_or(fields: &Map<String, Value>, key: &str, default: f64) -> f64 {
    f64_of(fields.get(key)).unwrap_or(default)
}

fn bool_or(fields: &Map<String, Value>, key: &str, default: bool) -> bool {
    fields.get(key).and_then(Value::as_bool).unwrap_or(default)
}

fn u32_or(fields: &Map<String, Value>, key: &str) -> u32 {
    f64_of(fields.get(key))
        .filter(|n| *n >= 0.0)
        .map_or(0, |n| n as u32)
}

fn frame_of(value: Option<&Value>) -> FrameSetting {
    f64_of(value).map_or_else(FrameSetting::default, |n| FrameSetting::enabled(n as i64))
}

fn triple_or_zero(fields: &Map<String, Value>, key: &str) -> [f64; 3] {
    let Some(value) = fields.get(key) else {
        return [0.0; 3];
    };
    let parsed: Option<Vec<f64>> = value
        .as_array()
        .and_then(|items| items.iter().map(|item| f64_of(Some(item))).collect());
    match parsed.as_deref() {
        Some(&[a, b, c]) => [a, b, c],
        _ => {
            warn!(field = key, value = %value, "Expected exactly 3 numbers, using zeros");
            [0.0; 3]
        }
    }
}

fn number(value: f64) -> Value {
    json!(value)
}

fn text_of(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Runs `edit` on the child object at `key`, replacing a non-object value.
fn with_object<R>(
    map: &mut Map<String, Value>,
    key: &str,
    edit: impl FnOnce(&mut Map<String, Value>) -> R,
) -> R {
    let mut inner = match map.remove(key) {
        Some(Value::Object(inner)) => inner,
        _ => Map::new(),
    };
    let result = edit(&mut inner);
    map.insert(key.to_string(), Value::Object(inner));
    result
}

/// Serializes with 4-space indentation, the layout of the saved record files.
pub fn to_pretty_json<T: Serialize>(value: &T) -> Result<String> {
    let mut buf = Vec::new();
    let formatter = PrettyFormatter::with_indent(b"    ");
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
    value.serialize(&mut ser)?;
    String::from_utf8(buf).map_err(|e| LigError::decode(e.to_string()))
}

// ============================================================================
// Per-type codecs
// ============================================================================

fn decode_image(fields: &Map<String, Value>) -> TypeFields {
    let defaults = ImageFields::default();
    TypeFields::Image(ImageFields {
        width: f64_or(fields, "width", defaults.width),
        height: f64_or(fields, "height", defaults.height),
        is_size_scale_lock: bool_or(fields, "is_size_scale_lock", defaults.is_size_scale_lock),
        bloom_intensity: f64_or(fields, "bloom_intensity", defaults.bloom_intensity),
        bloom_radius: f64_or(fields, "bloom_radius", defaults.bloom_radius),
    })
}

fn encode_image(fields: &TypeFields, out: &mut Map<String, Value>) {
    let TypeFields::Image(f) = fields else { return };
    out.insert("width".into(), number(f.width));
    out.insert("height".into(), number(f.height));
    out.insert("is_size_scale_lock".into(), json!(f.is_size_scale_lock));
    out.insert("bloom_intensity".into(), number(f.bloom_intensity));
    out.insert("bloom_radius".into(), number(f.bloom_radius));
}

fn decode_video(fields: &Map<String, Value>) -> TypeFields {
    let saturation = match fields.get("saturation") {
        None => VideoFields::default().saturation,
        present => NumericText::from_json(present),
    };
    TypeFields::Video(VideoFields {
        hue_angle: NumericText::from_json(fields.get("hue_angle")),
        hue_range: NumericText::from_json(fields.get("hue_range")),
        saturation,
        is_play: bool_or(fields, "is_play", false),
        is_loop_play: bool_or(fields, "is_loop_play", false),
    })
}

fn encode_video(fields: &TypeFields, out: &mut Map<String, Value>) {
    let TypeFields::Video(f) = fields else { return };
    out.insert("hue_angle".into(), f.hue_angle.to_json_coerced("hue_angle"));
    out.insert("hue_range".into(), f.hue_range.to_json_coerced("hue_range"));
    out.insert("saturation".into(), f.saturation.to_json_coerced("saturation"));
    out.insert("is_play".into(), json!(f.is_play));
    out.insert("is_loop_play".into(), json!(f.is_loop_play));
}

fn decode_model3d(fields: &Map<String, Value>) -> TypeFields {
    TypeFields::Model3d(Model3dFields {
        animation_speed: NumericText::from_json(fields.get("animation_speed")),
        start_frame: frame_of(fields.get("start_frame")),
        end_frame: frame_of(fields.get("end_frame")),
        fps: NumericText::from_json(fields.get("fps")),
        multiply_number: NumericText::from_json(fields.get("multiply_number")),
        multiply_radius: NumericText::from_json(fields.get("multiply_radius")),
        multiply_range: NumericText::from_json(fields.get("multiply_range")),
        multiply_is_zero_y: bool_or(fields, "multiply_is_zero_y", false),
    })
}

fn encode_model3d(fields: &TypeFields, out: &mut Map<String, Value>) {
    let TypeFields::Model3d(f) = fields else { return };
    out.insert(
        "animation_speed".into(),
        f.animation_speed.to_json_coerced("animation_speed"),
    );
    out.insert("start_frame".into(), json!(f.start_frame.get()));
    out.insert("end_frame".into(), json!(f.end_frame.get()));
    out.insert("fps".into(), f.fps.to_json_coerced("fps"));
    out.insert(
        "multiply_number".into(),
        f.multiply_number.to_json_coerced("multiply_number"),
    );
    out.insert("multiply_radius".into(), f.multiply_radius.to_json_verbatim());
    out.insert("multiply_range".into(), f.multiply_range.to_json_verbatim());
    out.insert("multiply_is_zero_y".into(), json!(f.multiply_is_zero_y));
}

fn decode_info_ball(fields: &Map<String, Value>) -> TypeFields {
    // `face_gap` is sometimes sent as a per-ring list; the scalar is its head.
    let face_gap = match fields.get("face_gap") {
        Some(Value::Array(items)) => f64_of(items.first()).unwrap_or(0.0),
        other => f64_of(other).unwrap_or(0.0),
    };
    TypeFields::InfoBall(InfoBallFields {
        floor_count: u32_or(fields, "floor_count"),
        face_count: u32_or(fields, "face_count"),
        floor_height: f64_or(fields, "floor_height", 0.0),
        floor_gap: f64_or(fields, "floor_gap", 0.0),
        face_width: f64_or(fields, "face_width", 0.0),
        face_gap,
        speed: f64_or(fields, "speed", 0.0),
        floor_angles: triple_or_zero(fields, "floor_angles"),
        face_gap_list: triple_or_zero(fields, "face_gap_list"),
    })
}

fn encode_info_ball(fields: &TypeFields, out: &mut Map<String, Value>) {
    let TypeFields::InfoBall(f) = fields else { return };
    out.insert("floor_count".into(), json!(f.floor_count));
    out.insert("face_count".into(), json!(f.face_count));
    out.insert("floor_height".into(), number(f.floor_height));
    out.insert("floor_gap".into(), number(f.floor_gap));
    out.insert("face_width".into(), number(f.face_width));
    // A list-valued gap is left as the server sent it.
    if !out.get("face_gap").is_some_and(Value::is_array) {
        out.insert("face_gap".into(), number(f.face_gap));
    }
    out.insert("speed".into(), number(f.speed));
    out.insert("floor_angles".into(), json!(f.floor_angles));
    out.insert("face_gap_list".into(), json!(f.face_gap_list));
}

const PARTICLE_KEYS: [&str; 6] = [
    "particle_birth_rate",
    "particle_birth_rate_variation",
    "particle_life_span",
    "particle_life_span_variation",
    "particle_velocity",
    "particle_velocity_variation",
];

fn decode_particle(fields: &Map<String, Value>) -> TypeFields {
    let [br, brv, ls, lsv, v, vv] = PARTICLE_KEYS.map(|key| f64_or(fields, key, 0.0));
    TypeFields::Particle(
        ParticleFields {
            birth_rate: br,
            birth_rate_variation: brv,
            life_span: ls,
            life_span_variation: lsv,
            velocity: v,
            velocity_variation: vv,
        }
        .clamped(),
    )
}

fn encode_particle(fields: &TypeFields, out: &mut Map<String, Value>) {
    let TypeFields::Particle(f) = fields else { return };
    let f = f.clone().clamped();
    let values = [
        f.birth_rate,
        f.birth_rate_variation,
        f.life_span,
        f.life_span_variation,
        f.velocity,
        f.velocity_variation,
    ];
    for (key, value) in PARTICLE_KEYS.into_iter().zip(values) {
        out.insert(key.into(), number(value));
    }
}

// ============================================================================
// Common fields
// ============================================================================

fn decode_common(fields: &Map<String, Value>) -> CommonFields {
    let defaults = CommonFields::default();
    CommonFields {
        visible_distance: f64_or(fields, "visible_distance", defaults.visible_distance),
        is_ignore: bool_or(fields, "is_ignore", false),
        face_me: bool_or(fields, "face_me", false),
        is_hidden: bool_or(fields, "is_hidden", false),
        is_double_sided: bool_or(fields, "is_double_sided", false),
        is_occlusion: bool_or(fields, "is_occlusion", false),
        is_allow_pinch: bool_or(fields, "is_allow_pinch", false),
    }
}

fn encode_common(common: &CommonFields, out: &mut Map<String, Value>) {
    out.insert("visible_distance".into(), number(common.visible_distance));
    out.insert("is_ignore".into(), json!(common.is_ignore));
    out.insert("face_me".into(), json!(common.face_me));
    out.insert("is_hidden".into(), json!(common.is_hidden));
    out.insert("is_double_sided".into(), json!(common.is_double_sided));
    out.insert("is_occlusion".into(), json!(common.is_occlusion));
    out.insert("is_allow_pinch".into(), json!(common.is_allow_pinch));
}

fn parse_record_object(json_data: &str) -> Result<Map<String, Value>> {
    match serde_json::from_str::<Value>(json_data) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(other) => Err(LigError::decode(format!(
            "record must be a JSON object, found {}",
            kind_of(&other)
        ))),
        Err(e) => Err(LigError::decode(e.to_string())),
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

impl LocalObjectProperties {
    /// Repopulates the flattened fields from `json_data`.
    ///
    /// Empty `json_data` is a no-op. Malformed JSON is logged and returned as
    /// [`LigError::Decode`]; the properties are left untouched.
    pub fn sync_from_json(&mut self) -> Result<()> {
        if self.json_data.trim().is_empty() {
            return Ok(());
        }
        let data = parse_record_object(&self.json_data).inspect_err(|e| {
            warn!(obj_name = %self.obj_name, error = %e, "JSON decode error, properties unchanged");
        })?;

        let empty = Map::new();
        let location = data.get("location").and_then(Value::as_object).unwrap_or(&empty);
        let zoom = data.get("zoom").and_then(Value::as_object).unwrap_or(&empty);
        let model = data.get("model").and_then(Value::as_object).unwrap_or(&empty);
        let fields = model.get("fields").and_then(Value::as_object).unwrap_or(&empty);

        let model_type = model.get("type").and_then(Value::as_i64).unwrap_or(0);
        let tag = ObjectTypeTag::from_code(model_type);

        let obj_name = match (data.get("id"), data.get("name")) {
            (Some(id), name) => format!(
                "{}-{}",
                text_of(id),
                name.map(text_of).unwrap_or_default()
            ),
            (None, _) => self.obj_name.clone(),
        };

        let transform = RemoteTransform {
            location: ["x", "y", "z"].map(|k| f64_or(location, k, 0.0)),
            rotation_degrees: ["rotate_x", "rotate_y", "rotate_z"].map(|k| f64_or(location, k, 0.0)),
            zoom: ["x", "y", "z"].map(|k| f64_or(zoom, k, 1.0)),
        };

        let type_fields = codec_for(tag).map_or(TypeFields::Other, |codec| (codec.decode)(fields));

        self.obj_name = obj_name;
        self.model_type = model_type;
        self.transform = transform;
        self.common = decode_common(fields);
        self.type_fields = type_fields;
        self.actions = StructuredText::from_json(data.get("actions"));
        self.events = StructuredText::from_json(data.get("events"));
        self.sub_events = StructuredText::from_json(data.get("sub_events"));
        self.transparency = clamp_unit(f64_or(&data, "transparency", 1.0));
        self.is_child = bool_or(&data, "is_child", false);
        debug!(obj_name = %self.obj_name, %tag, "Synced properties from JSON");
        Ok(())
    }

    /// Writes the flattened fields back into `json_data`, keeping every key
    /// the properties do not model.
    ///
    /// Type-specific keys are written with the codec for `tag`. When the local
    /// field set belongs to another type they are left as stored and a warning
    /// is logged.
    pub fn sync_to_json(&mut self, tag: ObjectTypeTag) -> Result<()> {
        if self.json_data.trim().is_empty() {
            return Ok(());
        }
        let mut data = parse_record_object(&self.json_data).inspect_err(|e| {
            warn!(obj_name = %self.obj_name, error = %e, "JSON decode error, record unchanged");
        })?;

        let [x, y, z] = self.transform.location;
        let [rx, ry, rz] = self.transform.rotation_degrees;
        with_object(&mut data, "location", |location| {
            for (key, value) in [("x", x), ("y", y), ("z", z), ("rotate_x", rx), ("rotate_y", ry), ("rotate_z", rz)] {
                location.insert(key.into(), number(value));
            }
        });
        let [zx, zy, zz] = self.transform.zoom;
        with_object(&mut data, "zoom", |zoom| {
            for (key, value) in [("x", zx), ("y", zy), ("z", zz)] {
                zoom.insert(key.into(), number(value));
            }
        });
        with_object(&mut data, "model", |model| {
            with_object(model, "fields", |fields| {
                encode_common(&self.common, fields);
                match codec_for(tag) {
                    Some(codec) if self.type_fields.matches(tag) => {
                        (codec.encode)(&self.type_fields, fields)
                    }
                    Some(_) => warn!(
                        obj_name = %self.obj_name,
                        %tag,
                        "Local field set does not match object type, type-specific fields left as stored"
                    ),
                    None => {}
                }
            })
        });

        for (key, text) in [
            ("actions", &self.actions),
            ("events", &self.events),
            ("sub_events", &self.sub_events),
        ] {
            if let Some(value) = text.to_json() {
                data.insert(key.into(), value);
            }
        }
        data.insert("transparency".into(), number(clamp_unit(self.transparency)));
        data.insert("is_child".into(), json!(self.is_child));

        self.json_data = to_pretty_json(&data)?;
        Ok(())
    }
}

/// Converts whole records to and from local properties.
pub struct SchemaMapper;

impl SchemaMapper {
    pub fn to_local(record: &ArObjectRecord) -> Result<LocalObjectProperties> {
        let mut props = LocalObjectProperties::with_json(to_pretty_json(record)?);
        props.sync_from_json()?;
        Ok(props)
    }

    /// Builds the record for `local`, writing type-specific fields for `tag`.
    pub fn to_remote(local: &LocalObjectProperties, tag: ObjectTypeTag) -> Result<ArObjectRecord> {
        if local.json_data.trim().is_empty() {
            return Err(LigError::schema(format!(
                "'{}' has no stored record to export",
                local.obj_name
            )));
        }
        let mut synced = local.clone();
        synced.sync_to_json(tag)?;
        serde_json::from_str(&synced.json_data).map_err(|e| LigError::schema(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing_test::traced_test;

    fn full_record(tag: ObjectTypeTag, fields: Value) -> ArObjectRecord {
        let mut all = json!({
            "visible_distance": 35.0,
            "is_ignore": false,
            "face_me": true,
            "is_hidden": false,
            "is_double_sided": true,
            "is_occlusion": false,
            "is_allow_pinch": true
        });
        if let (Some(all), Value::Object(extra)) = (all.as_object_mut(), fields) {
            all.extend(extra);
        }
        serde_json::from_value(json!({
            "id": 42,
            "name": "lobby sign",
            "location": {"x": 1.5, "y": -2.0, "z": 3.25, "rotate_x": 10.0, "rotate_y": 20.0, "rotate_z": 30.0},
            "zoom": {"x": 1.0, "y": 2.0, "z": 3.0},
            "model": {"type": tag.code(), "fields": all, "texture": {"url": "https://cdn/a.png", "id": 9}},
            "actions": [{"id": 3, "group": "frame"}],
            "events": "on_tap",
            "transparency": 0.8,
            "is_child": true,
            "zone_id": 4
        }))
        .unwrap()
    }

    #[test]
    fn test_round_trip_image() {
        let record = full_record(
            ObjectTypeTag::Image,
            json!({"width": 2.5, "height": 1.25, "is_size_scale_lock": false, "bloom_intensity": 0.3, "bloom_radius": 4.0}),
        );
        let local = SchemaMapper::to_local(&record).unwrap();
        assert_eq!(local.obj_name, "42-lobby sign");
        let back = SchemaMapper::to_remote(&local, ObjectTypeTag::Image).unwrap();
        assert_eq!(back, record);
    }

    #[test]
    fn test_round_trip_model3d() {
        let record = full_record(
            ObjectTypeTag::Model3d,
            json!({
                "animation_speed": 1.5,
                "start_frame": 10,
                "end_frame": null,
                "fps": 24.0,
                "multiply_number": 3.0,
                "multiply_radius": "1.5",
                "multiply_range": 2.0,
                "multiply_is_zero_y": true
            }),
        );
        let local = SchemaMapper::to_local(&record).unwrap();
        let TypeFields::Model3d(fields) = &local.type_fields else {
            panic!("expected model fields, got {:?}", local.type_fields);
        };
        assert_eq!(fields.start_frame, FrameSetting::enabled(10));
        assert!(!fields.end_frame.enabled);
        assert_eq!(fields.multiply_radius, NumericText::Opaque("1.5".into()));
        let back = SchemaMapper::to_remote(&local, ObjectTypeTag::Model3d).unwrap();
        assert_eq!(back, record);
    }

    #[test]
    fn test_round_trip_info_ball_and_particle() {
        let ball = full_record(
            ObjectTypeTag::InfoBall,
            json!({
                "floor_count": 2,
                "face_count": 6,
                "floor_height": 1.0,
                "floor_gap": 0.2,
                "face_width": 0.8,
                "face_gap": 0.1,
                "speed": 0.5,
                "floor_angles": [0.0, 15.0, 30.0],
                "face_gap_list": [0.1, 0.1, 0.1]
            }),
        );
        let local = SchemaMapper::to_local(&ball).unwrap();
        assert_eq!(SchemaMapper::to_remote(&local, ObjectTypeTag::InfoBall).unwrap(), ball);

        let particle = full_record(
            ObjectTypeTag::Particle,
            json!({
                "particle_birth_rate": 50.0,
                "particle_birth_rate_variation": 5.0,
                "particle_life_span": 2.0,
                "particle_life_span_variation": 0.5,
                "particle_velocity": 1.0,
                "particle_velocity_variation": 0.25
            }),
        );
        let local = SchemaMapper::to_local(&particle).unwrap();
        assert_eq!(SchemaMapper::to_remote(&local, ObjectTypeTag::Particle).unwrap(), particle);
    }

    #[test]
    fn test_defaults_for_missing_fields() {
        let record = ArObjectRecord::new(5, "clip", ObjectTypeTag::Video);
        let local = SchemaMapper::to_local(&record).unwrap();
        assert_eq!(local.common.visible_distance, 20.0);
        assert_eq!(local.transparency, 1.0);
        assert!(!local.is_child);
        assert!(local.actions.is_absent());
        let TypeFields::Video(video) = &local.type_fields else {
            panic!("expected video fields");
        };
        assert_eq!(video.saturation, NumericText::Number(0.5));
        assert!(video.hue_angle.is_empty());
    }

    #[test]
    fn test_image_without_width_defaults_to_one() {
        let record = full_record(ObjectTypeTag::Image, json!({"height": 2.0}));
        let local = SchemaMapper::to_local(&record).unwrap();
        let TypeFields::Image(image) = &local.type_fields else {
            panic!("expected image fields");
        };
        assert_eq!(image.width, 1.0);
        assert_eq!(image.height, 2.0);
    }

    #[test]
    fn test_empty_hue_exports_null() {
        let record = full_record(
            ObjectTypeTag::Video,
            json!({"hue_angle": "", "hue_range": 12.0, "saturation": 0.5, "is_play": true, "is_loop_play": false}),
        );
        let local = SchemaMapper::to_local(&record).unwrap();
        let back = SchemaMapper::to_remote(&local, ObjectTypeTag::Video).unwrap();
        assert_eq!(back.model.fields.get("hue_angle"), Some(&Value::Null));
        assert_eq!(back.model.fields.get("hue_range"), Some(&json!(12.0)));
    }

    #[test]
    fn test_edited_numeric_text_is_coerced() {
        let record = full_record(ObjectTypeTag::Video, json!({}));
        let mut local = SchemaMapper::to_local(&record).unwrap();
        if let TypeFields::Video(video) = &mut local.type_fields {
            video.hue_angle = NumericText::from_input("45");
            video.saturation = NumericText::from_input("");
        }
        let back = SchemaMapper::to_remote(&local, ObjectTypeTag::Video).unwrap();
        assert_eq!(back.model.fields.get("hue_angle"), Some(&json!(45.0)));
        assert_eq!(back.model.fields.get("saturation"), Some(&Value::Null));
    }

    #[test]
    fn test_actions_text_edit_round_trips_raw() {
        let record = full_record(ObjectTypeTag::Image, json!({}));
        let mut local = SchemaMapper::to_local(&record).unwrap();
        local.actions.set_text("{broken");
        local.sub_events.set_text(r#"{"kind": "tap"}"#);
        let back = SchemaMapper::to_remote(&local, ObjectTypeTag::Image).unwrap();
        assert_eq!(back.actions, Some(json!("{broken")));
        assert_eq!(back.sub_events, Some(json!({"kind": "tap"})));
        assert_eq!(back.events, Some(json!("on_tap")));
    }

    #[test]
    #[traced_test]
    fn test_malformed_json_leaves_state_unchanged() {
        let record = full_record(ObjectTypeTag::Image, json!({"width": 9.0}));
        let mut local = SchemaMapper::to_local(&record).unwrap();
        let before = local.clone();
        local.json_data = "{not json".to_string();

        let err = local.sync_from_json().unwrap_err();
        assert!(err.is_decode());
        assert!(logs_contain("JSON decode error"));
        assert_eq!(local.type_fields, before.type_fields);
        assert_eq!(local.transform, before.transform);

        assert!(local.sync_to_json(ObjectTypeTag::Image).unwrap_err().is_decode());
        assert_eq!(local.json_data, "{not json");
    }

    #[test]
    #[traced_test]
    fn test_info_ball_angles_need_three_components() {
        let record = full_record(ObjectTypeTag::InfoBall, json!({"floor_angles": [10.0, 20.0]}));
        let local = SchemaMapper::to_local(&record).unwrap();
        let TypeFields::InfoBall(ball) = &local.type_fields else {
            panic!("expected info-ball fields");
        };
        assert_eq!(ball.floor_angles, [0.0; 3]);
        assert!(logs_contain("Expected exactly 3 numbers"));
    }

    #[test]
    #[traced_test]
    fn test_mismatched_type_keeps_stored_fields() {
        let record = full_record(ObjectTypeTag::Image, json!({"width": 7.0}));
        let local = SchemaMapper::to_local(&record).unwrap();
        let back = SchemaMapper::to_remote(&local, ObjectTypeTag::Particle).unwrap();
        assert_eq!(back.model.fields.get("width"), Some(&json!(7.0)));
        assert!(back.model.fields.get("particle_birth_rate").is_none());
        assert!(logs_contain("does not match object type"));
    }

    #[test]
    fn test_unknown_type_maps_common_fields_only() {
        let record = full_record(ObjectTypeTag::Other(99), json!({"custom": "kept"}));
        let local = SchemaMapper::to_local(&record).unwrap();
        assert_eq!(local.type_fields, TypeFields::Other);
        assert!(local.common.face_me);
        let back = SchemaMapper::to_remote(&local, ObjectTypeTag::Other(99)).unwrap();
        assert_eq!(back.model.fields.get("custom"), Some(&json!("kept")));
    }

    #[test]
    fn test_pretty_json_uses_four_spaces() {
        let text = to_pretty_json(&json!({"a": 1})).unwrap();
        assert_eq!(text, "{\n    \"a\": 1\n}");
    }

    #[test]
    fn test_to_remote_without_record_is_schema_error() {
        let local = LocalObjectProperties::default();
        let err = SchemaMapper::to_remote(&local, ObjectTypeTag::Image).unwrap_err();
        assert!(matches!(err, LigError::Schema(_)));
    }
}
