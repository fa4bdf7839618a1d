//! Mimic Rig - Driving a humanoid skeleton from streamed directions
//!
//! # Pipeline
//!
//! Bind: Rig → Cache curated bones → Calibrate aim axes from bind pose
//! Apply: Frame → Smooth per joint → Aim limbs / orient chest → Blend
//!
//! The rig itself is an external collaborator behind the [`Skeleton`]
//! trait. [`MemorySkeleton`] is a small hierarchical implementation used by
//! tests and the headless demo.

pub mod calibration;
pub mod mapper;
pub mod math;
pub mod memory;
pub mod skeleton;

pub use calibration::*;
pub use mapper::*;
pub use math::*;
pub use memory::*;
pub use skeleton::*;
