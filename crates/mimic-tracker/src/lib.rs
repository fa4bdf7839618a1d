//! Mimic Tracker - Producing pose frames from body landmarks
//!
//! This crate provides the sending half of the pipeline:
//! - Presence gating with entry debounce and exit timeout
//! - Landmark normalization into per-bone unit directions
//! - Sender-side smoothing
//! - A pipeline tying the three together into [`PoseFrame`]s
//!
//! [`PoseFrame`]: mimic_core::PoseFrame

pub mod gate;
pub mod landmarks;
pub mod pipeline;
pub mod smoother;

pub use gate::*;
pub use landmarks::*;
pub use pipeline::*;
pub use smoother::*;
