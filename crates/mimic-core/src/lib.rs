//! Mimic Core - Fundamental types and primitives
//!
//! This crate defines the core types shared by every Mimic crate:
//! - Bone identities for the humanoid rig (HumanBone, AimAxis)
//! - Pose frames as decoded from the wire (PoseFrame, Gender, PresenceEvent)
//! - Per-joint exponential smoothing (JointFilter, FilterBank)
//! - Error types

pub mod bone;
pub mod error;
pub mod filter;
pub mod frame;

pub use bone::*;
pub use error::*;
pub use filter::*;
pub use frame::*;

pub use glam::{Quat, Vec3};
