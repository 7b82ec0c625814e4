//! Object type tags used by the remote `model.type` field.

use std::fmt;

/// Integer tag selecting the type-specific field set and import strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjectTypeTag {
    Image,
    Model3d,
    Video,
    InfoBall,
    Particle,
    /// Any code without a dedicated strategy. Only common fields apply.
    Other(i64),
}

impl ObjectTypeTag {
    pub const IMAGE: i64 = 5;
    pub const MODEL_3D: i64 = 8;
    pub const VIDEO: i64 = 9;
    pub const ARINFOBALL: i64 = 13;
    pub const PARTICLE: i64 = 16;

    pub fn from_code(code: i64) -> Self {
        match code {
            Self::IMAGE => Self::Image,
            Self::MODEL_3D => Self::Model3d,
            Self::VIDEO => Self::Video,
            Self::ARINFOBALL => Self::InfoBall,
            Self::PARTICLE => Self::Particle,
            other => Self::Other(other),
        }
    }

    pub fn code(self) -> i64 {
        match self {
            Self::Image => Self::IMAGE,
            Self::Model3d => Self::MODEL_3D,
            Self::Video => Self::VIDEO,
            Self::InfoBall => Self::ARINFOBALL,
            Self::Particle => Self::PARTICLE,
            Self::Other(code) => code,
        }
    }

    /// Whether objects of this type are built from a single downloaded asset.
    pub fn uses_single_asset(self) -> bool {
        matches!(self, Self::Image | Self::Video | Self::Model3d)
    }
}

impl fmt::Display for ObjectTypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Image => write!(f, "IMAGE"),
            Self::Model3d => write!(f, "MODEL_3D"),
            Self::Video => write!(f, "VIDEO"),
            Self::InfoBall => write!(f, "ARINFOBALL"),
            Self::Particle => write!(f, "PARTICLE"),
            Self::Other(code) => write!(f, "OTHER({code})"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_codes_round_trip() {
        for code in [5, 8, 9, 13, 16] {
            assert_eq!(ObjectTypeTag::from_code(code).code(), code);
        }
    }

    #[test]
    fn test_unknown_code_is_other() {
        let tag = ObjectTypeTag::from_code(42);
        assert_eq!(tag, ObjectTypeTag::Other(42));
        assert!(!tag.uses_single_asset());
        assert_eq!(tag.to_string(), "OTHER(42)");
    }
}
