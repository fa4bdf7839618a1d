//! Pose runtime - the per-tick loop

use std::time::{Duration, Instant};

use tracing::{debug, trace};

use mimic_transport::MessageSource;
use mimic_wire::decode_frame;

use crate::{AvatarCatalog, FrameReport, LifecycleManager, SceneHost};

#[derive(Clone, Debug, Default)]
pub struct RuntimeStats {
    pub ticks: u64,
    pub messages_processed: u64,
    pub spawns: u64,
    pub despawns: u64,
    pub spawn_failures: u64,
    /// Frames whose bones reached an active avatar
    pub frames_applied: u64,
    pub last_tick_duration: Duration,
}

impl RuntimeStats {
    fn record(&mut self, report: &FrameReport) {
        self.messages_processed += 1;
        self.despawns += report.despawned as u64;
        self.spawns += report.spawned as u64;
        self.spawn_failures += report.spawn_failed as u64;
        self.frames_applied += report.bones_updated.is_some() as u64;
    }
}

/// Result of a single tick
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TickOutcome {
    /// No message was pending
    Idle,
    /// One message was decoded and dispatched
    Processed(FrameReport),
}

/// Ties the message source to the avatar lifecycle
pub struct PoseRuntime<C, H, R>
where
    C: AvatarCatalog,
    H: SceneHost<C::Template>,
{
    source: Box<dyn MessageSource>,
    lifecycle: LifecycleManager<C, H, R>,
    stats: RuntimeStats,
    stopped: bool,
}

impl<C, H, R> PoseRuntime<C, H, R>
where
    C: AvatarCatalog,
    H: SceneHost<C::Template>,
    R: rand::Rng,
{
    pub fn new(source: Box<dyn MessageSource>, lifecycle: LifecycleManager<C, H, R>) -> Self {
        Self {
            source,
            lifecycle,
            stats: RuntimeStats::default(),
            stopped: false,
        }
    }

    /// Execute one tick: poll, decode, dispatch
    pub fn tick(&mut self) -> TickOutcome {
        let start = Instant::now();
        self.stats.ticks += 1;

        let outcome = match self.source.poll() {
            Some(text) => TickOutcome::Processed(self.handle_message(&text)),
            None => TickOutcome::Idle,
        };

        self.stats.last_tick_duration = start.elapsed();
        outcome
    }

    /// Decode and dispatch one raw message, bypassing the source
    pub fn handle_message(&mut self, text: &str) -> FrameReport {
        let frame = decode_frame(text);
        trace!(
            gender = %frame.gender,
            event = %frame.event,
            bones = frame.bones.len(),
            "pose frame"
        );
        let report = self.lifecycle.handle_frame(&frame);
        self.stats.record(&report);
        report
    }

    /// Stop the source and remove any live avatar. Idempotent.
    pub fn shutdown(&mut self) {
        if self.stopped {
            return;
        }
        self.stopped = true;
        self.source.stop();
        if self.lifecycle.despawn() {
            self.stats.despawns += 1;
        }
        debug!(ticks = self.stats.ticks, "pose runtime shut down");
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped
    }

    pub fn stats(&self) -> &RuntimeStats {
        &self.stats
    }

    pub fn lifecycle(&self) -> &LifecycleManager<C, H, R> {
        &self.lifecycle
    }

    pub fn lifecycle_mut(&mut self) -> &mut LifecycleManager<C, H, R> {
        &mut self.lifecycle
    }
}
