//! Sender-side smoothing of bone directions

use mimic_core::{BoneMap, FilterBank};

/// Weight of the previous value on the sending side
pub const SENDER_SMOOTHING_ALPHA: f32 = 0.7;

/// Per-bone exponential smoothing before transmission
#[derive(Debug, Clone)]
pub struct BoneSmoother {
    filters: FilterBank,
}

impl Default for BoneSmoother {
    fn default() -> Self {
        Self::new(SENDER_SMOOTHING_ALPHA)
    }
}

impl BoneSmoother {
    pub fn new(alpha: f32) -> Self {
        Self {
            filters: FilterBank::new(alpha),
        }
    }

    /// Smooth every entry of `bones`. Zero entries reset their filter and stay zero.
    pub fn smooth(&mut self, bones: &BoneMap) -> BoneMap {
        bones
            .iter()
            .map(|(name, dir)| (name.clone(), self.filters.step(name, *dir)))
            .collect()
    }

    pub fn reset(&mut self) {
        self.filters.clear();
    }
}
