//! Joint filtering - one-pole exponential smoothing with a zero sentinel
//!
//! A zero vector means "no data for this joint this tick". It resets the
//! filter so the next real sample starts fresh instead of blending with
//! stale state.

use std::collections::HashMap;

use glam::Vec3;

/// Default weight given to the previous smoothed value
pub const DEFAULT_FILTER_ALPHA: f32 = 0.8;

/// One-pole low-pass filter over a direction vector
#[derive(Debug, Clone, Copy)]
pub struct JointFilter {
    alpha: f32,
    state: Vec3,
    active: bool,
}

impl Default for JointFilter {
    fn default() -> Self {
        Self::new(DEFAULT_FILTER_ALPHA)
    }
}

impl JointFilter {
    /// Create an inactive filter. `alpha` is clamped to [0, 1].
    pub fn new(alpha: f32) -> Self {
        Self {
            alpha: alpha.clamp(0.0, 1.0),
            state: Vec3::ZERO,
            active: false,
        }
    }

    /// Feed one sample and return the smoothed value.
    ///
    /// The first sample after construction or a reset passes through unchanged.
    pub fn step(&mut self, sample: Vec3) -> Vec3 {
        if sample == Vec3::ZERO {
            self.reset();
            return Vec3::ZERO;
        }
        if !self.active {
            self.state = sample;
            self.active = true;
            return self.state;
        }
        self.state = self.alpha * self.state + (1.0 - self.alpha) * sample;
        self.state
    }

    /// Drop smoothing history
    pub fn reset(&mut self) {
        self.state = Vec3::ZERO;
        self.active = false;
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Last smoothed value (zero while inactive)
    pub fn value(&self) -> Vec3 {
        self.state
    }

    pub fn alpha(&self) -> f32 {
        self.alpha
    }
}

/// Set of joint filters keyed by semantic tag, created lazily
#[derive(Debug, Clone)]
pub struct FilterBank {
    alpha: f32,
    filters: HashMap<String, JointFilter>,
}

impl Default for FilterBank {
    fn default() -> Self {
        Self::new(DEFAULT_FILTER_ALPHA)
    }
}

impl FilterBank {
    pub fn new(alpha: f32) -> Self {
        Self {
            alpha,
            filters: HashMap::new(),
        }
    }

    /// Smooth `sample` through the filter for `key`
    pub fn step(&mut self, key: &str, sample: Vec3) -> Vec3 {
        if let Some(filter) = self.filters.get_mut(key) {
            return filter.step(sample);
        }
        let mut filter = JointFilter::new(self.alpha);
        let out = filter.step(sample);
        self.filters.insert(key.to_string(), filter);
        out
    }

    /// Filter for `key`, if it has ever been stepped
    pub fn get(&self, key: &str) -> Option<&JointFilter> {
        self.filters.get(key)
    }

    /// Whether the filter for `key` currently holds state
    pub fn is_active(&self, key: &str) -> bool {
        self.filters.get(key).is_some_and(JointFilter::is_active)
    }

    /// Forget every filter
    pub fn clear(&mut self) {
        self.filters.clear();
    }

    pub fn len(&self) -> usize {
        self.filters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }
}
