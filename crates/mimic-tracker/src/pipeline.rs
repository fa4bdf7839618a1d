//! Per-frame tracker pipeline: gate, normalize, smooth

use std::time::Instant;

use tracing::debug;

use mimic_core::{Gender, PoseFrame, PresenceEvent};

use crate::{bone_directions, BoneSmoother, Landmark, PresenceGate, DEFAULT_VISIBILITY_THRESHOLD, LANDMARK_COUNT};

#[derive(Debug, Clone)]
pub struct TrackerPipeline {
    gate: PresenceGate,
    smoother: BoneSmoother,
    vis_threshold: f32,
}

impl Default for TrackerPipeline {
    fn default() -> Self {
        Self::new(PresenceGate::default(), BoneSmoother::default())
    }
}

impl TrackerPipeline {
    pub fn new(gate: PresenceGate, smoother: BoneSmoother) -> Self {
        Self {
            gate,
            smoother,
            vis_threshold: DEFAULT_VISIBILITY_THRESHOLD,
        }
    }

    pub fn with_visibility_threshold(mut self, threshold: f32) -> Self {
        self.vis_threshold = threshold;
        self
    }

    /// Process one camera frame.
    ///
    /// Returns the frame to send: every detected frame carries bones, and an
    /// undetected frame is only sent when it ends presence.
    pub fn process(
        &mut self,
        landmarks: Option<&[Landmark; LANDMARK_COUNT]>,
        gender: Gender,
        now: Instant,
    ) -> Option<PoseFrame> {
        let event = self.gate.step(landmarks.is_some(), now);
        if event != PresenceEvent::None {
            debug!(%event, %gender, "presence changed");
        }

        match landmarks {
            Some(landmarks) => {
                let bones = self.smoother.smooth(&bone_directions(landmarks, self.vis_threshold));
                Some(PoseFrame { gender, event, bones })
            }
            None if event == PresenceEvent::Left => {
                self.smoother.reset();
                Some(PoseFrame::new(Gender::Unknown, PresenceEvent::Left))
            }
            None => None,
        }
    }

    pub fn gate(&self) -> &PresenceGate {
        &self.gate
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_session() {
        let mut pipeline = TrackerPipeline::new(
            PresenceGate::new(2, Duration::from_millis(100)),
            BoneSmoother::default(),
        );
        let lm = [Landmark::new(0.5, 0.5, 0.0, 1.0); LANDMARK_COUNT];
        let t0 = Instant::now();

        let first = pipeline.process(Some(&lm), Gender::Female, t0).unwrap();
        assert_eq!(first.event, PresenceEvent::None);
        assert_eq!(first.bones.len(), 14);

        let second = pipeline.process(Some(&lm), Gender::Female, t0).unwrap();
        assert_eq!(second.event, PresenceEvent::Entered);
        assert_eq!(second.gender, Gender::Female);

        assert!(pipeline.process(None, Gender::Female, t0 + Duration::from_millis(50)).is_none());

        let left = pipeline.process(None, Gender::Female, t0 + Duration::from_millis(200)).unwrap();
        assert_eq!(left.event, PresenceEvent::Left);
        assert_eq!(left.gender, Gender::Unknown);
        assert!(left.bones.is_empty());
        assert!(!pipeline.gate().is_present());
    }
}
