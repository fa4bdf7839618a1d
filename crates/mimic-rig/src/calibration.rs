//! Aim-axis calibration from the bind pose
//!
//! Rigs disagree on which local axis runs along a limb. Rather than hard-coding
//! it, each limb's axis is picked once at bind time: the principal local axis
//! closest to the direction from the bone toward its reference child.

use std::collections::HashMap;

use glam::Vec3;
use tracing::debug;

use mimic_core::{AimAxis, HumanBone, CALIBRATION_TABLE};

use crate::Skeleton;

/// Calibrated aim axis per limb bone
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AimAxisCache {
    axes: HashMap<HumanBone, AimAxis>,
}

impl AimAxisCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Calibrate every limb in the table that has both ends present in `rig`
    pub fn calibrate<S: Skeleton + ?Sized>(rig: &S) -> Self {
        let mut cache = Self::new();
        for &(bone, child) in CALIBRATION_TABLE.iter() {
            if let Some(axis) = calibrate_bone(rig, bone, child) {
                cache.axes.insert(bone, axis);
            }
        }
        cache
    }

    pub fn get(&self, bone: HumanBone) -> Option<AimAxis> {
        self.axes.get(&bone).copied()
    }

    /// Calibrated axis, or +X when the bone couldn't be calibrated
    pub fn axis_or_default(&self, bone: HumanBone) -> Vec3 {
        self.get(bone).unwrap_or_default().vector()
    }

    pub fn len(&self) -> usize {
        self.axes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.axes.is_empty()
    }
}

fn calibrate_bone<S: Skeleton + ?Sized>(rig: &S, bone: HumanBone, child: HumanBone) -> Option<AimAxis> {
    let from = rig.position(bone)?;
    let to = rig.position(child)?;
    let world_dir = (to - from).try_normalize()?;
    let local_dir = rig.inverse_transform_direction(bone, world_dir)?;
    let axis = AimAxis::closest_to(local_dir);
    if axis.is_none() {
        debug!("degenerate bind pose for {}, leaving uncalibrated", bone);
    }
    axis
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MemorySkeleton;
    use glam::Quat;
    use std::f32::consts::FRAC_PI_2;

    #[test]
    fn test_humanoid_axes() {
        let rig = MemorySkeleton::humanoid();
        let cache = AimAxisCache::calibrate(&rig);

        assert_eq!(cache.len(), 8);
        assert_eq!(cache.get(HumanBone::LeftUpperArm), Some(AimAxis::NegX));
        assert_eq!(cache.get(HumanBone::RightLowerArm), Some(AimAxis::PosX));
        assert_eq!(cache.get(HumanBone::LeftUpperLeg), Some(AimAxis::NegY));
        assert_eq!(cache.get(HumanBone::RightLowerLeg), Some(AimAxis::NegY));
        assert_eq!(cache.get(HumanBone::Chest), None);
    }

    #[test]
    fn test_axes_follow_bind_rotation() {
        let mut rig = MemorySkeleton::humanoid();
        // Bone frame rolled so its local +Z now points along world +X
        rig.set_local_rotation(HumanBone::RightUpperArm, Quat::from_rotation_y(FRAC_PI_2));
        // Keep the child where it was in world space
        rig.add_bone(
            HumanBone::RightLowerArm,
            Some(HumanBone::RightUpperArm),
            Vec3::new(0.0, 0.0, 0.28),
        );

        let cache = AimAxisCache::calibrate(&rig);
        assert_eq!(cache.get(HumanBone::RightUpperArm), Some(AimAxis::PosZ));
    }

    #[test]
    fn test_missing_child_leaves_bone_uncalibrated() {
        let mut rig = MemorySkeleton::humanoid();
        rig.remove_bone(HumanBone::LeftHand);

        let cache = AimAxisCache::calibrate(&rig);
        assert_eq!(cache.get(HumanBone::LeftLowerArm), None);
        assert_eq!(cache.axis_or_default(HumanBone::LeftLowerArm), Vec3::X);
        assert_eq!(cache.len(), 7);
    }

    #[test]
    fn test_coincident_child_is_degenerate() {
        let mut rig = MemorySkeleton::humanoid();
        rig.add_bone(HumanBone::LeftFoot, Some(HumanBone::LeftLowerLeg), Vec3::ZERO);

        let cache = AimAxisCache::calibrate(&rig);
        assert_eq!(cache.get(HumanBone::LeftLowerLeg), None);
    }
}
