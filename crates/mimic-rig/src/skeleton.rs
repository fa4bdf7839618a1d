//! Skeleton binding interface

use glam::{Quat, Vec3};

use mimic_core::HumanBone;

/// A rig the mapper can read and pose.
///
/// Positions and rotations are in world space. Implementations only need to
/// answer for the bones they actually have.
pub trait Skeleton {
    /// World position of a bone
    fn position(&self, bone: HumanBone) -> Option<Vec3>;

    /// World rotation of a bone
    fn rotation(&self, bone: HumanBone) -> Option<Quat>;

    /// Overwrite a bone's world rotation in place
    fn set_rotation(&mut self, bone: HumanBone, rotation: Quat);

    fn has_bone(&self, bone: HumanBone) -> bool {
        self.rotation(bone).is_some()
    }

    /// Bone-local direction to world space
    fn transform_direction(&self, bone: HumanBone, local: Vec3) -> Option<Vec3> {
        self.rotation(bone).map(|r| r * local)
    }

    /// World direction to bone-local space
    fn inverse_transform_direction(&self, bone: HumanBone, world: Vec3) -> Option<Vec3> {
        self.rotation(bone).map(|r| r.inverse() * world)
    }
}
