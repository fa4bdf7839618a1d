//! Bone identities for the humanoid rig
//!
//! The mapper only ever touches a fixed, curated set of bones. Everything else
//! a rig may contain is ignored.

use std::fmt;

use glam::Vec3;

/// Humanoid bone identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum HumanBone {
    // Torso
    Hips,
    Spine,
    Chest,
    Neck,

    // Left arm
    LeftUpperArm,
    LeftLowerArm,
    LeftHand,

    // Right arm
    RightUpperArm,
    RightLowerArm,
    RightHand,

    // Left leg
    LeftUpperLeg,
    LeftLowerLeg,
    LeftFoot,

    // Right leg
    RightUpperLeg,
    RightLowerLeg,
    RightFoot,
}

/// Limb bones paired with the child used to auto-calibrate their aim axis
pub const CALIBRATION_TABLE: [(HumanBone, HumanBone); 8] = [
    (HumanBone::LeftUpperArm, HumanBone::LeftLowerArm),
    (HumanBone::LeftLowerArm, HumanBone::LeftHand),
    (HumanBone::RightUpperArm, HumanBone::RightLowerArm),
    (HumanBone::RightLowerArm, HumanBone::RightHand),
    (HumanBone::LeftUpperLeg, HumanBone::LeftLowerLeg),
    (HumanBone::LeftLowerLeg, HumanBone::LeftFoot),
    (HumanBone::RightUpperLeg, HumanBone::RightLowerLeg),
    (HumanBone::RightLowerLeg, HumanBone::RightFoot),
];

impl HumanBone {
    /// The curated bones the mapper binds to
    pub fn curated() -> &'static [HumanBone] {
        &[
            HumanBone::LeftUpperArm,
            HumanBone::LeftLowerArm,
            HumanBone::RightUpperArm,
            HumanBone::RightLowerArm,
            HumanBone::LeftUpperLeg,
            HumanBone::LeftLowerLeg,
            HumanBone::RightUpperLeg,
            HumanBone::RightLowerLeg,
            HumanBone::Spine,
            HumanBone::Chest,
            HumanBone::Neck,
            HumanBone::Hips,
        ]
    }

    /// Limb bones driven by streamed directions, in application order
    pub fn limbs() -> &'static [HumanBone] {
        &[
            HumanBone::LeftUpperArm,
            HumanBone::LeftLowerArm,
            HumanBone::RightUpperArm,
            HumanBone::RightLowerArm,
            HumanBone::LeftUpperLeg,
            HumanBone::LeftLowerLeg,
            HumanBone::RightUpperLeg,
            HumanBone::RightLowerLeg,
        ]
    }

    /// Wire name of the bone (exact, case-sensitive)
    pub fn name(self) -> &'static str {
        match self {
            HumanBone::Hips => "Hips",
            HumanBone::Spine => "Spine",
            HumanBone::Chest => "Chest",
            HumanBone::Neck => "Neck",
            HumanBone::LeftUpperArm => "LeftUpperArm",
            HumanBone::LeftLowerArm => "LeftLowerArm",
            HumanBone::LeftHand => "LeftHand",
            HumanBone::RightUpperArm => "RightUpperArm",
            HumanBone::RightLowerArm => "RightLowerArm",
            HumanBone::RightHand => "RightHand",
            HumanBone::LeftUpperLeg => "LeftUpperLeg",
            HumanBone::LeftLowerLeg => "LeftLowerLeg",
            HumanBone::LeftFoot => "LeftFoot",
            HumanBone::RightUpperLeg => "RightUpperLeg",
            HumanBone::RightLowerLeg => "RightLowerLeg",
            HumanBone::RightFoot => "RightFoot",
        }
    }

    /// Child bone used to calibrate this bone's aim axis, if any
    pub fn aim_reference(self) -> Option<HumanBone> {
        CALIBRATION_TABLE
            .iter()
            .find(|(bone, _)| *bone == self)
            .map(|(_, child)| *child)
    }
}

impl fmt::Display for HumanBone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One of the six principal local axes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum AimAxis {
    #[default]
    PosX,
    NegX,
    PosY,
    NegY,
    PosZ,
    NegZ,
}

impl AimAxis {
    /// Candidate order; ties resolve to the earliest entry
    pub const ALL: [AimAxis; 6] = [
        AimAxis::PosX,
        AimAxis::NegX,
        AimAxis::PosY,
        AimAxis::NegY,
        AimAxis::PosZ,
        AimAxis::NegZ,
    ];

    /// Unit vector for this axis
    pub fn vector(self) -> Vec3 {
        match self {
            AimAxis::PosX => Vec3::X,
            AimAxis::NegX => Vec3::NEG_X,
            AimAxis::PosY => Vec3::Y,
            AimAxis::NegY => Vec3::NEG_Y,
            AimAxis::PosZ => Vec3::Z,
            AimAxis::NegZ => Vec3::NEG_Z,
        }
    }

    /// Principal axis with the largest dot product against `dir`.
    ///
    /// Returns `None` for a degenerate (zero or non-finite) direction.
    pub fn closest_to(dir: Vec3) -> Option<AimAxis> {
        let dir = dir.try_normalize()?;
        let mut best = AimAxis::PosX;
        let mut best_dot = f32::NEG_INFINITY;
        for axis in AimAxis::ALL {
            let d = dir.dot(axis.vector());
            if d > best_dot {
                best_dot = d;
                best = axis;
            }
        }
        Some(best)
    }
}
