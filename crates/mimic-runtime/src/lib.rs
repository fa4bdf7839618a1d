//! Mimic Runtime - Avatar orchestration and the tick loop
//!
//! Each call to [`PoseRuntime::tick`] runs the same stages:
//! 1. Pop at most one raw message from the ingestion queue
//! 2. Decode it into a pose frame
//! 3. Spawn or despawn the avatar on presence events
//! 4. Retarget the frame's bone directions onto the active avatar
//!
//! The runtime owns no timer; an external scheduler calls `tick()`.

pub mod config;
pub mod lifecycle;
pub mod runtime;
pub mod telemetry;

pub use config::*;
pub use lifecycle::*;
pub use runtime::*;
pub use telemetry::*;
