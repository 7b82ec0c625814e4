//! Local object properties and their editable value types.

mod model;
mod text;

pub use model::{
    CommonFields, DEFAULT_VISIBLE_DISTANCE, FrameSetting, ImageFields, InfoBallFields,
    LocalObjectProperties, Model3dFields, ParticleFields, TypeFields, VideoFields,
};
pub(crate) use model::clamp_unit;
pub use text::{NumericText, StructuredText};
