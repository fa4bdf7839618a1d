//! Landmark normalization
//!
//! Input is the 33-point body landmark layout in image space: x to the
//! right, y down, both in [0, 1], plus a per-point visibility score. Output
//! is a [`BoneMap`] of unit directions with +Y up, keyed by the names the
//! receiver expects. Bones whose endpoints aren't confidently visible get a
//! zero vector, which the receiver treats as "reset and skip".

use glam::Vec3;

use mimic_core::{BoneMap, CHEST_FORWARD, CHEST_RIGHT, CHEST_UP};

pub const LANDMARK_COUNT: usize = 33;

pub const LEFT_SHOULDER: usize = 11;
pub const RIGHT_SHOULDER: usize = 12;
pub const LEFT_ELBOW: usize = 13;
pub const RIGHT_ELBOW: usize = 14;
pub const LEFT_WRIST: usize = 15;
pub const RIGHT_WRIST: usize = 16;
pub const LEFT_HIP: usize = 23;
pub const RIGHT_HIP: usize = 24;
pub const LEFT_KNEE: usize = 25;
pub const RIGHT_KNEE: usize = 26;
pub const LEFT_ANKLE: usize = 27;
pub const RIGHT_ANKLE: usize = 28;

/// Minimum visibility for a landmark to count
pub const DEFAULT_VISIBILITY_THRESHOLD: f32 = 0.6;

/// Bone name and its (from, to) landmark indices
pub const BONE_PAIRS: [(&str, usize, usize); 11] = [
    ("Spine", LEFT_HIP, LEFT_SHOULDER),
    ("Spine2", RIGHT_HIP, RIGHT_SHOULDER),
    ("Neck", LEFT_SHOULDER, RIGHT_SHOULDER),
    ("LeftUpperArm", LEFT_SHOULDER, LEFT_ELBOW),
    ("LeftLowerArm", LEFT_ELBOW, LEFT_WRIST),
    ("RightUpperArm", RIGHT_SHOULDER, RIGHT_ELBOW),
    ("RightLowerArm", RIGHT_ELBOW, RIGHT_WRIST),
    ("LeftUpperLeg", LEFT_HIP, LEFT_KNEE),
    ("LeftLowerLeg", LEFT_KNEE, LEFT_ANKLE),
    ("RightUpperLeg", RIGHT_HIP, RIGHT_KNEE),
    ("RightLowerLeg", RIGHT_KNEE, RIGHT_ANKLE),
];

const MIN_LENGTH: f32 = 1e-6;

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Landmark {
    pub position: Vec3,
    pub visibility: f32,
}

impl Landmark {
    pub fn new(x: f32, y: f32, z: f32, visibility: f32) -> Self {
        Self {
            position: Vec3::new(x, y, z),
            visibility,
        }
    }
}

fn unit(v: Vec3) -> Vec3 {
    let len = v.length();
    if len.is_finite() && len >= MIN_LENGTH {
        v / len
    } else {
        Vec3::ZERO
    }
}

/// Convert one set of landmarks into bone directions
pub fn bone_directions(landmarks: &[Landmark; LANDMARK_COUNT], vis_threshold: f32) -> BoneMap {
    let points: Vec<Vec3> = landmarks
        .iter()
        .map(|l| Vec3::new(l.position.x, 1.0 - l.position.y, l.position.z))
        .collect();
    let visible = |i: usize| landmarks[i].visibility >= vis_threshold;

    let pelvis = (points[LEFT_HIP] + points[RIGHT_HIP]) * 0.5;
    let shoulders = (points[LEFT_SHOULDER] + points[RIGHT_SHOULDER]) * 0.5;
    let span = points[RIGHT_SHOULDER].distance(points[LEFT_SHOULDER]);
    let scale = if span > MIN_LENGTH { span } else { 1.0 };
    let local = |i: usize| (points[i] - pelvis) / scale;

    let mut bones = BoneMap::with_capacity(BONE_PAIRS.len() + 3);
    for &(name, a, b) in BONE_PAIRS.iter() {
        let dir = if visible(a) && visible(b) {
            unit(local(b) - local(a))
        } else {
            Vec3::ZERO
        };
        bones.insert(name.to_string(), dir);
    }

    let torso_visible = [LEFT_SHOULDER, RIGHT_SHOULDER, LEFT_HIP, RIGHT_HIP]
        .into_iter()
        .all(visible);
    let (forward, up, right) = if torso_visible {
        let right = unit(points[RIGHT_SHOULDER] - points[LEFT_SHOULDER]);
        let up = unit(shoulders - pelvis);
        (unit(right.cross(up)), up, right)
    } else {
        (Vec3::ZERO, Vec3::ZERO, Vec3::ZERO)
    };
    bones.insert(CHEST_FORWARD.to_string(), forward);
    bones.insert(CHEST_UP.to_string(), up);
    bones.insert(CHEST_RIGHT.to_string(), right);

    bones
}
