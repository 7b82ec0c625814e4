//! Export of sampled node motion as an AR path script.
//!
//! Each frame becomes a move action (id 3) and a rotate action (id 13)
//! holding the delta from the previous frame, expressed in remote axes.

use std::fmt::Write;

use crate::coordinate::LocalTransform;
use crate::error::{LigError, Result};

const MOVE_ACTION_ID: u32 = 3;
const ROTATE_ACTION_ID: u32 = 13;

/// Duration of one scripted step: five frames at 24 fps.
pub const STEP_SECONDS: f64 = 5.0 / 24.0;

/// A node's transform at one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KeyframeSample {
    pub frame: i64,
    pub transform: LocalTransform,
}

pub fn path_script_file_name(object_name: &str) -> String {
    format!("{object_name}_key_recode.txt")
}

fn write_action(out: &mut String, id: u32, direction: [f64; 3], frame: i64) {
    let [x, y, z] = direction;
    let _ = write!(
        out,
        "  - id: {id}\n    values:\n      direction_x: {x:.6}\n      direction_y: {y:.6}\n      direction_z: {z:.6}\n      group: {frame}\n      time: {STEP_SECONDS:.6}\n"
    );
}

/// Renders the path script for consecutive samples of one node.
pub fn render_path_script(samples: &[KeyframeSample]) -> Result<String> {
    if samples.is_empty() {
        return Err(LigError::schema("no keyframes to export"));
    }
    let mut out = String::from("---\n- id: 1\n  values: {}\n  actions:\n");
    let mut previous = samples[0].transform;
    for sample in samples {
        let current = sample.transform;
        let [dx, dy, dz] = delta(current.location, previous.location);
        let [rx, ry, rz] =
            delta(current.rotation_radians, previous.rotation_radians).map(f64::to_degrees);
        write_action(&mut out, MOVE_ACTION_ID, [dx, dz, -dy], sample.frame);
        write_action(&mut out, ROTATE_ACTION_ID, [rx, rz, -ry], sample.frame);
        previous = current;
    }
    Ok(out)
}

fn delta(a: [f64; 3], b: [f64; 3]) -> [f64; 3] {
    [a[0] - b[0], a[1] - b[1], a[2] - b[2]]
}
