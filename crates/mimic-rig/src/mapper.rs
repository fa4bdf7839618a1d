//! Pose mapper - retargets streamed directions onto a bound rig
//!
//! Each tick the mapper:
//! 1. Smooths the chest forward/up vectors and turns the chest toward them
//! 2. Smooths each limb direction and swings the limb's aim axis onto it
//!
//! A zero (or absent) vector for a joint means "no data": its filter is reset
//! and the joint keeps its last applied orientation.

use std::collections::BTreeSet;

use glam::Vec3;
use tracing::debug;

use mimic_core::{bone_vector, BoneMap, FilterBank, HumanBone, CHEST_FORWARD, CHEST_UP, DEFAULT_FILTER_ALPHA};

use crate::{from_to_rotation, look_rotation, AimAxisCache, Skeleton, MIN_DIRECTION_SQ};

/// Filter tag for the chest forward vector
pub const CHEST_FORWARD_FILTER: &str = "ChestFwd";

/// Filter tag for the chest up vector
pub const CHEST_UP_FILTER: &str = "ChestUp";

/// Mapper tuning
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MapperConfig {
    /// Weight of the previous smoothed value in each joint filter
    pub filter_alpha: f32,
    /// Slerp factor toward the chest target each tick
    pub chest_blend: f32,
    /// Slerp factor toward each limb target each tick
    pub limb_blend: f32,
}

impl Default for MapperConfig {
    fn default() -> Self {
        Self {
            filter_alpha: DEFAULT_FILTER_ALPHA,
            chest_blend: 0.75,
            limb_blend: 0.9,
        }
    }
}

/// Binds to one rig instance and drives it from pose frames
#[derive(Debug, Clone)]
pub struct PoseMapper {
    config: MapperConfig,
    bound: bool,
    bones: BTreeSet<HumanBone>,
    aim_axes: AimAxisCache,
    filters: FilterBank,
}

impl Default for PoseMapper {
    fn default() -> Self {
        Self::new(MapperConfig::default())
    }
}

impl PoseMapper {
    pub fn new(config: MapperConfig) -> Self {
        Self {
            config,
            bound: false,
            bones: BTreeSet::new(),
            aim_axes: AimAxisCache::new(),
            filters: FilterBank::new(config.filter_alpha),
        }
    }

    /// Cache the curated bones present in `rig` and calibrate limb aim axes.
    ///
    /// All previous state is discarded, so this must run for every new rig.
    pub fn bind<S: Skeleton + ?Sized>(&mut self, rig: &S) {
        self.bones = HumanBone::curated()
            .iter()
            .copied()
            .filter(|&bone| rig.has_bone(bone))
            .collect();
        self.aim_axes = AimAxisCache::calibrate(rig);
        self.filters = FilterBank::new(self.config.filter_alpha);
        self.bound = true;

        debug!(
            bones = self.bones.len(),
            calibrated = self.aim_axes.len(),
            "pose mapper bound"
        );
    }

    /// Drop the binding
    pub fn unbind(&mut self) {
        self.bound = false;
        self.bones.clear();
        self.aim_axes = AimAxisCache::new();
        self.filters.clear();
    }

    /// Apply one frame of bone directions. Returns how many bones were rotated.
    pub fn apply<S: Skeleton + ?Sized>(&mut self, bones: &BoneMap, rig: &mut S) -> usize {
        if !self.bound {
            return 0;
        }
        let mut updated = 0;

        if self.bones.contains(&HumanBone::Chest) {
            let forward = self.filters.step(CHEST_FORWARD_FILTER, bone_vector(bones, CHEST_FORWARD));
            let up = self.filters.step(CHEST_UP_FILTER, bone_vector(bones, CHEST_UP));
            if forward != Vec3::ZERO && self.orient_chest(rig, forward, up) {
                updated += 1;
            }
        }

        for &bone in HumanBone::limbs() {
            if !self.bones.contains(&bone) {
                continue;
            }
            let dir = self.filters.step(bone.name(), bone_vector(bones, bone.name()));
            if dir == Vec3::ZERO {
                continue;
            }
            if self.aim(rig, bone, dir) {
                updated += 1;
            }
        }

        updated
    }

    fn orient_chest<S: Skeleton + ?Sized>(&self, rig: &mut S, forward: Vec3, up: Vec3) -> bool {
        let up = up.try_normalize().unwrap_or(Vec3::Y);
        let (Some(current), Some(target)) = (rig.rotation(HumanBone::Chest), look_rotation(forward, up)) else {
            return false;
        };
        rig.set_rotation(HumanBone::Chest, current.slerp(target, self.config.chest_blend));
        true
    }

    fn aim<S: Skeleton + ?Sized>(&self, rig: &mut S, bone: HumanBone, dir: Vec3) -> bool {
        if dir.length_squared() < MIN_DIRECTION_SQ {
            return false;
        }
        let Some(current) = rig.rotation(bone) else {
            return false;
        };
        let axis = current * self.aim_axes.axis_or_default(bone);
        let Some(delta) = from_to_rotation(axis, dir) else {
            return false;
        };
        let target = (delta * current).normalize();
        rig.set_rotation(bone, current.slerp(target, self.config.limb_blend));
        true
    }

    pub fn is_bound(&self) -> bool {
        self.bound
    }

    /// Whether `bone` was found on the rig at bind time
    pub fn has_bone(&self, bone: HumanBone) -> bool {
        self.bones.contains(&bone)
    }

    pub fn aim_axes(&self) -> &AimAxisCache {
        &self.aim_axes
    }

    pub fn filters(&self) -> &FilterBank {
        &self.filters
    }

    pub fn config(&self) -> &MapperConfig {
        &self.config
    }
}
