//! Avatar lifecycle - at most one live avatar, driven by presence events
//!
//! ```text
//!            entered(g)                 entered(g')
//!   Empty ─────────────► Active(a) ───────────────► destroy(a), Active(a')
//!     ▲                     │
//!     └──────── left ───────┘
//! ```
//!
//! Template lookup, instantiation and randomness are injected so the state
//! machine can be driven with deterministic fakes.

use glam::{EulerRot, Quat, Vec3};
use rand::seq::SliceRandom;
use rand::Rng;
use tracing::{debug, info, warn};

use mimic_core::{BoneMap, Gender, PoseFrame, PresenceEvent};
use mimic_rig::{MapperConfig, PoseMapper, Skeleton};

/// Source of avatar templates, grouped by gender
pub trait AvatarCatalog {
    type Template;

    /// Templates available for `gender` (may be empty)
    fn lookup(&self, gender: Gender) -> &[Self::Template];
}

/// Scene the avatars live in
pub trait SceneHost<T> {
    type Avatar: Skeleton;

    /// Create an instance of `template` under the spawn root
    fn instantiate(&mut self, template: &T, placement: &Placement) -> Self::Avatar;

    /// Remove an instance from the scene
    fn destroy(&mut self, avatar: Self::Avatar);
}

/// Local transform applied to every spawned avatar
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub position: Vec3,
    /// Euler angles in degrees, applied Z then X then Y
    pub euler_degrees: Vec3,
    pub scale: f32,
}

impl Default for Placement {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            euler_degrees: Vec3::new(0.0, 180.0, 0.0),
            scale: 1.0,
        }
    }
}

impl Placement {
    pub fn rotation(&self) -> Quat {
        Quat::from_euler(
            EulerRot::YXZ,
            self.euler_degrees.y.to_radians(),
            self.euler_degrees.x.to_radians(),
            self.euler_degrees.z.to_radians(),
        )
    }
}

/// The live avatar and its binding
#[derive(Debug)]
pub struct ActiveAvatar<A> {
    pub avatar: A,
    pub mapper: PoseMapper,
    /// Gender requested by the tracker
    pub gender: Gender,
    /// Pool the template was actually taken from
    pub pool: Gender,
}

/// Lifecycle state
#[derive(Debug)]
pub enum AvatarSlot<A> {
    Empty,
    Active(ActiveAvatar<A>),
}

impl<A> AvatarSlot<A> {
    pub fn is_active(&self) -> bool {
        matches!(self, AvatarSlot::Active(_))
    }
}

/// What handling one frame did
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameReport {
    pub despawned: bool,
    pub spawned: bool,
    pub spawn_failed: bool,
    /// Bones rotated by the mapper (None if the frame wasn't forwarded)
    pub bones_updated: Option<usize>,
}

/// Owns zero or one avatar instance
pub struct LifecycleManager<C, H, R>
where
    C: AvatarCatalog,
    H: SceneHost<C::Template>,
{
    catalog: C,
    scene: H,
    rng: R,
    placement: Placement,
    mapper_config: MapperConfig,
    slot: AvatarSlot<H::Avatar>,
}

impl<C, H, R> LifecycleManager<C, H, R>
where
    C: AvatarCatalog,
    H: SceneHost<C::Template>,
    R: Rng,
{
    pub fn new(catalog: C, scene: H, rng: R) -> Self {
        Self {
            catalog,
            scene,
            rng,
            placement: Placement::default(),
            mapper_config: MapperConfig::default(),
            slot: AvatarSlot::Empty,
        }
    }

    pub fn with_placement(mut self, placement: Placement) -> Self {
        self.placement = placement;
        self
    }

    pub fn with_mapper_config(mut self, config: MapperConfig) -> Self {
        self.mapper_config = config;
        self
    }

    /// Dispatch a decoded frame: presence event first, then bones
    pub fn handle_frame(&mut self, frame: &PoseFrame) -> FrameReport {
        let mut report = FrameReport::default();
        match frame.event {
            PresenceEvent::Entered => {
                report.despawned = self.despawn();
                report.spawned = self.spawn(frame.gender);
                report.spawn_failed = !report.spawned;
            }
            PresenceEvent::Left => {
                report.despawned = self.despawn();
            }
            PresenceEvent::None => {}
        }
        report.bones_updated = self.apply_bones(&frame.bones);
        report
    }

    /// Replace any live avatar with a new one for `gender`.
    ///
    /// Returns false (and stays empty) if no template exists for the gender
    /// or the male fallback.
    pub fn spawn(&mut self, gender: Gender) -> bool {
        self.despawn();

        let mut pool = gender;
        if self.catalog.lookup(pool).is_empty() {
            warn!("no avatar templates for gender {}, falling back to male", gender);
            pool = Gender::Male;
        }

        let Some(template) = self.catalog.lookup(pool).choose(&mut self.rng) else {
            warn!("no avatar templates available, spawn skipped");
            return false;
        };

        let avatar = self.scene.instantiate(template, &self.placement);
        let mut mapper = PoseMapper::new(self.mapper_config);
        mapper.bind(&avatar);

        info!(%gender, %pool, "avatar spawned");
        self.slot = AvatarSlot::Active(ActiveAvatar {
            avatar,
            mapper,
            gender,
            pool,
        });
        true
    }

    /// Destroy the live avatar, if any. Returns whether one existed.
    pub fn despawn(&mut self) -> bool {
        match std::mem::replace(&mut self.slot, AvatarSlot::Empty) {
            AvatarSlot::Active(active) => {
                self.scene.destroy(active.avatar);
                debug!(gender = %active.gender, "avatar despawned");
                true
            }
            AvatarSlot::Empty => false,
        }
    }

    /// Forward bone directions to the live avatar's mapper.
    ///
    /// No-op (None) while empty or for an empty bone set.
    pub fn apply_bones(&mut self, bones: &BoneMap) -> Option<usize> {
        if bones.is_empty() {
            return None;
        }
        match &mut self.slot {
            AvatarSlot::Active(active) => Some(active.mapper.apply(bones, &mut active.avatar)),
            AvatarSlot::Empty => None,
        }
    }

    pub fn is_active(&self) -> bool {
        self.slot.is_active()
    }

    pub fn slot(&self) -> &AvatarSlot<H::Avatar> {
        &self.slot
    }

    pub fn active(&self) -> Option<&ActiveAvatar<H::Avatar>> {
        match &self.slot {
            AvatarSlot::Active(active) => Some(active),
            AvatarSlot::Empty => None,
        }
    }

    pub fn avatar(&self) -> Option<&H::Avatar> {
        self.active().map(|a| &a.avatar)
    }

    pub fn mapper(&self) -> Option<&PoseMapper> {
        self.active().map(|a| &a.mapper)
    }

    pub fn placement(&self) -> &Placement {
        &self.placement
    }

    pub fn catalog(&self) -> &C {
        &self.catalog
    }

    pub fn scene(&self) -> &H {
        &self.scene
    }

    pub fn scene_mut(&mut self) -> &mut H {
        &mut self.scene
    }
}
