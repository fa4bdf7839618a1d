//! Pose frames - one decoded unit of tracking data
//!
//! A frame carries who is in view (gender), whether they just entered or
//! left, and a map of streamed bone directions.

use std::collections::HashMap;
use std::fmt;

use glam::Vec3;

/// Key carrying the torso forward direction
pub const CHEST_FORWARD: &str = "ChestForward";

/// Key carrying the torso up direction
pub const CHEST_UP: &str = "ChestUp";

/// Key carrying the torso right direction (sent by trackers, unused by the mapper)
pub const CHEST_RIGHT: &str = "ChestRight";

/// Streamed bone directions keyed by wire name
pub type BoneMap = HashMap<String, Vec3>;

/// Gender label attached to a frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Gender {
    #[default]
    Unknown,
    Male,
    Female,
}

impl Gender {
    /// Parse a wire label. Matching is case-insensitive; unknown labels map to `Unknown`.
    pub fn parse(label: &str) -> Gender {
        match label.to_lowercase().as_str() {
            "male" => Gender::Male,
            "female" => Gender::Female,
            _ => Gender::Unknown,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Gender::Unknown => "unknown",
            Gender::Male => "male",
            Gender::Female => "female",
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Presence transition carried by a frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PresenceEvent {
    #[default]
    None,
    Entered,
    Left,
}

impl PresenceEvent {
    /// Parse a wire label. Matching is case-insensitive; unknown labels map to `None`.
    pub fn parse(label: &str) -> PresenceEvent {
        match label.to_lowercase().as_str() {
            "entered" => PresenceEvent::Entered,
            "left" => PresenceEvent::Left,
            _ => PresenceEvent::None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            PresenceEvent::None => "none",
            PresenceEvent::Entered => "entered",
            PresenceEvent::Left => "left",
        }
    }
}

impl fmt::Display for PresenceEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A decoded pose frame
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PoseFrame {
    pub gender: Gender,
    pub event: PresenceEvent,
    pub bones: BoneMap,
}

impl PoseFrame {
    pub fn new(gender: Gender, event: PresenceEvent) -> Self {
        Self {
            gender,
            event,
            bones: BoneMap::new(),
        }
    }

    /// Add a bone direction
    pub fn with_bone(mut self, name: impl Into<String>, dir: Vec3) -> Self {
        self.bones.insert(name.into(), dir);
        self
    }

    /// Direction for `key`, or the zero sentinel when absent
    pub fn vector(&self, key: &str) -> Vec3 {
        bone_vector(&self.bones, key)
    }
}

/// Direction for `key` in `bones`, or the zero sentinel when absent
#[inline]
pub fn bone_vector(bones: &BoneMap, key: &str) -> Vec3 {
    bones.get(key).copied().unwrap_or(Vec3::ZERO)
}
