//! Conversion between the Y-up remote frame and the Z-up local frame.
//!
//! Remote rotations are Euler degrees, local rotations are Euler radians.
//! Axis mapping for both location and rotation:
//!
//! | local | remote |
//! |-------|--------|
//! | x     | x      |
//! | y     | -z     |
//! | z     | y      |
//!
//! Scale swaps y and z without negation.

/// Transform as stored in a remote record.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RemoteTransform {
    pub location: [f64; 3],
    pub rotation_degrees: [f64; 3],
    pub zoom: [f64; 3],
}

impl Default for RemoteTransform {
    fn default() -> Self {
        Self {
            location: [0.0; 3],
            rotation_degrees: [0.0; 3],
            zoom: [1.0; 3],
        }
    }
}

/// Transform as applied to a local scene node.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LocalTransform {
    pub location: [f64; 3],
    pub rotation_radians: [f64; 3],
    pub scale: [f64; 3],
}

impl Default for LocalTransform {
    fn default() -> Self {
        Self {
            location: [0.0; 3],
            rotation_radians: [0.0; 3],
            scale: [1.0; 3],
        }
    }
}

fn y_up_to_z_up([x, y, z]: [f64; 3]) -> [f64; 3] {
    [x, -z, y]
}

fn z_up_to_y_up([x, y, z]: [f64; 3]) -> [f64; 3] {
    [x, z, -y]
}

fn swap_yz([x, y, z]: [f64; 3]) -> [f64; 3] {
    [x, z, y]
}

pub fn to_local_space(remote: &RemoteTransform) -> LocalTransform {
    LocalTransform {
        location: y_up_to_z_up(remote.location),
        rotation_radians: y_up_to_z_up(remote.rotation_degrees.map(f64::to_radians)),
        scale: swap_yz(remote.zoom),
    }
}

pub fn to_remote_space(local: &LocalTransform) -> RemoteTransform {
    RemoteTransform {
        location: z_up_to_y_up(local.location),
        rotation_degrees: z_up_to_y_up(local.rotation_radians).map(f64::to_degrees),
        zoom: swap_yz(local.scale),
    }
}
