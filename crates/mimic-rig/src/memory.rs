//! In-memory hierarchical skeleton
//!
//! Each bone stores an offset and rotation relative to its parent, so
//! turning an upper arm carries the forearm and hand along with it.

use std::collections::BTreeMap;

use glam::{Quat, Vec3};
use tracing::warn;

use mimic_core::HumanBone;

use crate::Skeleton;

#[derive(Debug, Clone, Copy)]
struct Node {
    parent: Option<HumanBone>,
    offset: Vec3,
    local_rotation: Quat,
}

/// Simple rig kept entirely in memory
#[derive(Debug, Clone)]
pub struct MemorySkeleton {
    root_position: Vec3,
    root_rotation: Quat,
    root_scale: f32,
    nodes: BTreeMap<HumanBone, Node>,
}

impl Default for MemorySkeleton {
    fn default() -> Self {
        Self::new()
    }
}

impl MemorySkeleton {
    /// Empty rig at the origin
    pub fn new() -> Self {
        Self {
            root_position: Vec3::ZERO,
            root_rotation: Quat::IDENTITY,
            root_scale: 1.0,
            nodes: BTreeMap::new(),
        }
    }

    /// T-posed humanoid facing +Z with +Y up; its left side is -X
    pub fn humanoid() -> Self {
        use HumanBone::*;

        let mut rig = Self::new();
        rig.add_bone(Hips, None, Vec3::new(0.0, 1.0, 0.0))
            .add_bone(Spine, Some(Hips), Vec3::new(0.0, 0.1, 0.0))
            .add_bone(Chest, Some(Spine), Vec3::new(0.0, 0.15, 0.0))
            .add_bone(Neck, Some(Chest), Vec3::new(0.0, 0.2, 0.0))
            .add_bone(LeftUpperArm, Some(Chest), Vec3::new(-0.18, 0.15, 0.0))
            .add_bone(LeftLowerArm, Some(LeftUpperArm), Vec3::new(-0.28, 0.0, 0.0))
            .add_bone(LeftHand, Some(LeftLowerArm), Vec3::new(-0.25, 0.0, 0.0))
            .add_bone(RightUpperArm, Some(Chest), Vec3::new(0.18, 0.15, 0.0))
            .add_bone(RightLowerArm, Some(RightUpperArm), Vec3::new(0.28, 0.0, 0.0))
            .add_bone(RightHand, Some(RightLowerArm), Vec3::new(0.25, 0.0, 0.0))
            .add_bone(LeftUpperLeg, Some(Hips), Vec3::new(-0.1, -0.05, 0.0))
            .add_bone(LeftLowerLeg, Some(LeftUpperLeg), Vec3::new(0.0, -0.42, 0.0))
            .add_bone(LeftFoot, Some(LeftLowerLeg), Vec3::new(0.0, -0.4, 0.0))
            .add_bone(RightUpperLeg, Some(Hips), Vec3::new(0.1, -0.05, 0.0))
            .add_bone(RightLowerLeg, Some(RightUpperLeg), Vec3::new(0.0, -0.42, 0.0))
            .add_bone(RightFoot, Some(RightLowerLeg), Vec3::new(0.0, -0.4, 0.0));
        rig
    }

    /// Add (or replace) a bone. A parent that doesn't exist makes the bone a root.
    ///
    /// A parent that is the bone itself or one of its descendants would close a
    /// cycle; such a call is ignored.
    pub fn add_bone(&mut self, bone: HumanBone, parent: Option<HumanBone>, offset: Vec3) -> &mut Self {
        if let Some(parent) = parent {
            if self.descends_from(parent, bone) {
                warn!(%bone, %parent, "rejecting bone that would close a parent cycle");
                return self;
            }
        }
        self.nodes.insert(
            bone,
            Node {
                parent,
                offset,
                local_rotation: Quat::IDENTITY,
            },
        );
        self
    }

    pub fn remove_bone(&mut self, bone: HumanBone) -> &mut Self {
        self.nodes.remove(&bone);
        self
    }

    /// Rotation relative to the parent bone
    pub fn set_local_rotation(&mut self, bone: HumanBone, rotation: Quat) -> &mut Self {
        if let Some(node) = self.nodes.get_mut(&bone) {
            node.local_rotation = rotation;
        }
        self
    }

    pub fn local_rotation(&self, bone: HumanBone) -> Option<Quat> {
        self.nodes.get(&bone).map(|n| n.local_rotation)
    }

    /// Place the whole rig
    pub fn set_root(&mut self, position: Vec3, rotation: Quat, scale: f32) {
        self.root_position = position;
        self.root_rotation = rotation;
        self.root_scale = scale;
    }

    pub fn root(&self) -> (Vec3, Quat, f32) {
        (self.root_position, self.root_rotation, self.root_scale)
    }

    pub fn bone_count(&self) -> usize {
        self.nodes.len()
    }

    /// True if `ancestor` is `bone` or sits on its parent chain
    fn descends_from(&self, bone: HumanBone, ancestor: HumanBone) -> bool {
        let mut current = Some(bone);
        while let Some(b) = current {
            if b == ancestor {
                return true;
            }
            current = self.nodes.get(&b).and_then(|n| n.parent);
        }
        false
    }

    fn world(&self, bone: HumanBone) -> Option<(Vec3, Quat)> {
        let node = self.nodes.get(&bone)?;
        let (parent_pos, parent_rot) = match node.parent.and_then(|p| self.world(p)) {
            Some(parent) => parent,
            None => (self.root_position, self.root_rotation),
        };
        let position = parent_pos + parent_rot * (node.offset * self.root_scale);
        let rotation = (parent_rot * node.local_rotation).normalize();
        Some((position, rotation))
    }

    fn parent_rotation(&self, node: &Node) -> Quat {
        node.parent
            .and_then(|p| self.world(p))
            .map(|(_, r)| r)
            .unwrap_or(self.root_rotation)
    }
}

impl Skeleton for MemorySkeleton {
    fn position(&self, bone: HumanBone) -> Option<Vec3> {
        self.world(bone).map(|(p, _)| p)
    }

    fn rotation(&self, bone: HumanBone) -> Option<Quat> {
        self.world(bone).map(|(_, r)| r)
    }

    fn set_rotation(&mut self, bone: HumanBone, rotation: Quat) {
        let Some(node) = self.nodes.get(&bone).copied() else {
            return;
        };
        let local = (self.parent_rotation(&node).inverse() * rotation).normalize();
        if let Some(node) = self.nodes.get_mut(&bone) {
            node.local_rotation = local;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    #[test]
    fn test_humanoid_layout() {
        let rig = MemorySkeleton::humanoid();
        assert_eq!(rig.bone_count(), 16);

        let hand = rig.position(HumanBone::LeftHand).unwrap();
        assert!(hand.x < -0.5);
        let foot = rig.position(HumanBone::RightFoot).unwrap();
        assert!(foot.y < 0.2);
    }

    #[test]
    fn test_children_follow_parent() {
        let mut rig = MemorySkeleton::humanoid();
        let shoulder = rig.position(HumanBone::RightUpperArm).unwrap();

        // Swing the right arm straight down
        rig.set_rotation(HumanBone::RightUpperArm, Quat::from_rotation_z(-FRAC_PI_2));

        let elbow = rig.position(HumanBone::RightLowerArm).unwrap();
        let down = (elbow - shoulder).normalize();
        assert!(down.abs_diff_eq(Vec3::NEG_Y, 1e-5), "{:?}", down);
    }

    #[test]
    fn test_set_rotation_is_world_space() {
        let mut rig = MemorySkeleton::humanoid();
        rig.set_local_rotation(HumanBone::Chest, Quat::from_rotation_y(0.5));

        let target = Quat::from_rotation_x(0.3);
        rig.set_rotation(HumanBone::LeftUpperArm, target);
        let actual = rig.rotation(HumanBone::LeftUpperArm).unwrap();
        assert!(actual.abs_diff_eq(target, 1e-5));
    }

    #[test]
    fn test_root_placement() {
        let mut rig = MemorySkeleton::humanoid();
        rig.set_root(Vec3::new(2.0, 0.0, 0.0), Quat::from_rotation_y(std::f32::consts::PI), 2.0);

        let hips = rig.position(HumanBone::Hips).unwrap();
        assert!(hips.abs_diff_eq(Vec3::new(2.0, 2.0, 0.0), 1e-5));
        // Facing -Z now, so the left hand sits on +X of the hips
        assert!(rig.position(HumanBone::LeftHand).unwrap().x > hips.x);
    }

    #[test]
    fn test_parent_cycle_rejected() {
        let mut rig = MemorySkeleton::humanoid();
        rig.add_bone(HumanBone::Neck, Some(HumanBone::Neck), Vec3::Y);
        rig.add_bone(HumanBone::Hips, Some(HumanBone::LeftFoot), Vec3::ZERO);

        let hips = rig.position(HumanBone::Hips).unwrap();
        assert!(hips.abs_diff_eq(Vec3::new(0.0, 1.0, 0.0), 1e-5));
        assert!(rig.position(HumanBone::Neck).is_some());
        assert!(rig.position(HumanBone::LeftFoot).is_some());
    }

    #[test]
    fn test_forward_parent_reference_cannot_cycle() {
        let mut rig = MemorySkeleton::new();
        rig.add_bone(HumanBone::Spine, Some(HumanBone::Chest), Vec3::Y);
        rig.add_bone(HumanBone::Chest, Some(HumanBone::Spine), Vec3::Y);

        assert_eq!(rig.bone_count(), 1);
        assert!(rig.position(HumanBone::Spine).unwrap().abs_diff_eq(Vec3::Y, 1e-6));
    }

    #[test]
    fn test_missing_bone() {
        let mut rig = MemorySkeleton::humanoid();
        rig.remove_bone(HumanBone::Neck);
        assert!(!rig.has_bone(HumanBone::Neck));
        rig.set_rotation(HumanBone::Neck, Quat::IDENTITY);
        assert!(rig.rotation(HumanBone::Neck).is_none());
    }
}
