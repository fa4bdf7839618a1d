//! Presence gate
//!
//! Turns a per-frame "person detected" flag into entry and exit events.
//! Entry needs several consecutive detections; exit needs the person to be
//! missing for longer than a timeout.

use std::time::{Duration, Instant};

use mimic_core::PresenceEvent;

/// Consecutive detections required before `Entered`
pub const DEFAULT_STABLE_FRAMES: u32 = 8;

/// Absence required before `Left`
pub const DEFAULT_ABSENT_TIMEOUT: Duration = Duration::from_millis(800);

#[derive(Debug, Clone)]
pub struct PresenceGate {
    stable_frames: u32,
    absent_timeout: Duration,
    present_count: u32,
    last_seen: Option<Instant>,
    present: bool,
}

impl Default for PresenceGate {
    fn default() -> Self {
        Self::new(DEFAULT_STABLE_FRAMES, DEFAULT_ABSENT_TIMEOUT)
    }
}

impl PresenceGate {
    pub fn new(stable_frames: u32, absent_timeout: Duration) -> Self {
        Self {
            stable_frames: stable_frames.max(1),
            absent_timeout,
            present_count: 0,
            last_seen: None,
            present: false,
        }
    }

    /// Feed one frame's detection result
    pub fn step(&mut self, detected: bool, now: Instant) -> PresenceEvent {
        if detected {
            self.last_seen = Some(now);
            self.present_count = self.present_count.saturating_add(1);
            if !self.present && self.present_count >= self.stable_frames {
                self.present = true;
                return PresenceEvent::Entered;
            }
            return PresenceEvent::None;
        }

        self.present_count = 0;
        if self.present {
            let absent_for = self.last_seen.map(|t| now.saturating_duration_since(t)).unwrap_or_default();
            if absent_for > self.absent_timeout {
                self.present = false;
                return PresenceEvent::Left;
            }
        }
        PresenceEvent::None
    }

    pub fn is_present(&self) -> bool {
        self.present
    }

    pub fn reset(&mut self) {
        self.present_count = 0;
        self.last_seen = None;
        self.present = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frames(gate: &mut PresenceGate, start: Instant, detected: bool, n: u32) -> Vec<PresenceEvent> {
        (0..n)
            .map(|i| gate.step(detected, start + Duration::from_millis(33 * i as u64)))
            .collect()
    }

    #[test]
    fn test_entry_debounce() {
        let mut gate = PresenceGate::default();
        let t0 = Instant::now();
        let events = frames(&mut gate, t0, true, 10);

        assert!(events[..7].iter().all(|e| *e == PresenceEvent::None));
        assert_eq!(events[7], PresenceEvent::Entered);
        assert_eq!(events[8], PresenceEvent::None);
        assert!(gate.is_present());
    }

    #[test]
    fn test_miss_resets_counter() {
        let mut gate = PresenceGate::default();
        let t0 = Instant::now();
        frames(&mut gate, t0, true, 7);
        gate.step(false, t0);
        let events = frames(&mut gate, t0, true, 7);
        assert!(events.iter().all(|e| *e == PresenceEvent::None));
        assert!(!gate.is_present());
    }

    #[test]
    fn test_exit_after_timeout() {
        let mut gate = PresenceGate::new(1, Duration::from_millis(800));
        let t0 = Instant::now();
        assert_eq!(gate.step(true, t0), PresenceEvent::Entered);

        assert_eq!(gate.step(false, t0 + Duration::from_millis(500)), PresenceEvent::None);
        assert_eq!(gate.step(false, t0 + Duration::from_millis(800)), PresenceEvent::None);
        assert_eq!(gate.step(false, t0 + Duration::from_millis(801)), PresenceEvent::Left);
        assert_eq!(gate.step(false, t0 + Duration::from_secs(5)), PresenceEvent::None);
        assert!(!gate.is_present());
    }

    #[test]
    fn test_brief_dropout_keeps_presence() {
        let mut gate = PresenceGate::new(2, Duration::from_millis(800));
        let t0 = Instant::now();
        gate.step(true, t0);
        assert_eq!(gate.step(true, t0), PresenceEvent::Entered);

        gate.step(false, t0 + Duration::from_millis(300));
        assert_eq!(gate.step(true, t0 + Duration::from_millis(400)), PresenceEvent::None);
        assert_eq!(gate.step(false, t0 + Duration::from_millis(1100)), PresenceEvent::None);
        assert!(gate.is_present());
    }

    #[test]
    fn test_never_present_never_leaves() {
        let mut gate = PresenceGate::default();
        let t0 = Instant::now();
        assert!(frames(&mut gate, t0, false, 50).iter().all(|e| *e == PresenceEvent::None));
    }
}
