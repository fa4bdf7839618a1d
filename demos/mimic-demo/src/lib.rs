//! Shared pieces for the demo binaries
//!
//! - A fixed avatar catalog and a headless scene backed by [`MemorySkeleton`]
//! - A synthetic landmark generator standing in for a camera

use std::f32::consts::PI;

use glam::{Quat, Vec3};

use mimic_core::{Gender, HumanBone};
use mimic_rig::{MemorySkeleton, Skeleton};
use mimic_runtime::{AvatarCatalog, Placement, SceneHost};
use mimic_tracker::{
    Landmark, LANDMARK_COUNT, LEFT_ANKLE, LEFT_ELBOW, LEFT_HIP, LEFT_KNEE, LEFT_SHOULDER, LEFT_WRIST,
    RIGHT_ANKLE, RIGHT_ELBOW, RIGHT_HIP, RIGHT_KNEE, RIGHT_SHOULDER, RIGHT_WRIST,
};

/// Avatar names per gender
#[derive(Debug, Clone)]
pub struct DemoCatalog {
    male: Vec<String>,
    female: Vec<String>,
}

impl Default for DemoCatalog {
    fn default() -> Self {
        Self {
            male: vec!["Atlas".into(), "Bram".into()],
            female: vec!["Cleo".into(), "Dara".into(), "Esme".into()],
        }
    }
}

impl AvatarCatalog for DemoCatalog {
    type Template = String;

    fn lookup(&self, gender: Gender) -> &[String] {
        match gender {
            Gender::Male => &self.male[..],
            Gender::Female => &self.female[..],
            Gender::Unknown => &[],
        }
    }
}

/// Avatar living only in memory
#[derive(Debug, Clone)]
pub struct HeadlessAvatar {
    pub name: String,
    pub rig: MemorySkeleton,
}

impl Skeleton for HeadlessAvatar {
    fn position(&self, bone: HumanBone) -> Option<Vec3> {
        self.rig.position(bone)
    }

    fn rotation(&self, bone: HumanBone) -> Option<Quat> {
        self.rig.rotation(bone)
    }

    fn set_rotation(&mut self, bone: HumanBone, rotation: Quat) {
        self.rig.set_rotation(bone, rotation)
    }
}

/// Scene that builds T-posed humanoids and counts them
#[derive(Debug, Default)]
pub struct HeadlessScene {
    pub created: u64,
    pub destroyed: u64,
}

impl SceneHost<String> for HeadlessScene {
    type Avatar = HeadlessAvatar;

    fn instantiate(&mut self, template: &String, placement: &Placement) -> HeadlessAvatar {
        self.created += 1;
        let mut rig = MemorySkeleton::humanoid();
        rig.set_root(placement.position, placement.rotation(), placement.scale);
        tracing::info!(avatar = %template, "instantiated");
        HeadlessAvatar {
            name: template.clone(),
            rig,
        }
    }

    fn destroy(&mut self, avatar: HeadlessAvatar) {
        self.destroyed += 1;
        tracing::info!(avatar = %avatar.name, "destroyed");
    }
}

/// World direction a bone's segment points, measured to its child
pub fn segment_direction<S: Skeleton>(rig: &S, bone: HumanBone) -> Option<Vec3> {
    let from = rig.position(bone)?;
    let to = rig.position(bone.aim_reference()?)?;
    (to - from).try_normalize()
}

/// Person facing the camera, waving the right arm at `t` seconds
pub fn waving_landmarks(t: f32) -> [Landmark; LANDMARK_COUNT] {
    let mut lm = [Landmark::new(0.5, 0.2, 0.0, 0.9); LANDMARK_COUNT];
    let set = |lm: &mut [Landmark; LANDMARK_COUNT], i: usize, x: f32, y: f32| {
        lm[i] = Landmark::new(x, y, 0.0, 0.95);
    };

    set(&mut lm, LEFT_SHOULDER, 0.58, 0.35);
    set(&mut lm, RIGHT_SHOULDER, 0.42, 0.35);
    set(&mut lm, LEFT_ELBOW, 0.62, 0.5);
    set(&mut lm, LEFT_WRIST, 0.63, 0.63);
    set(&mut lm, LEFT_HIP, 0.55, 0.62);
    set(&mut lm, RIGHT_HIP, 0.45, 0.62);
    set(&mut lm, LEFT_KNEE, 0.55, 0.78);
    set(&mut lm, RIGHT_KNEE, 0.45, 0.78);
    set(&mut lm, LEFT_ANKLE, 0.55, 0.93);
    set(&mut lm, RIGHT_ANKLE, 0.45, 0.93);

    // Upper arm raised out to the side, forearm swinging about vertical
    set(&mut lm, RIGHT_ELBOW, 0.3, 0.3);
    let swing = 0.5 * (2.0 * PI * 1.5 * t).sin();
    let (sin, cos) = swing.sin_cos();
    set(&mut lm, RIGHT_WRIST, 0.3 - 0.12 * sin, 0.3 - 0.12 * cos);
    lm
}
