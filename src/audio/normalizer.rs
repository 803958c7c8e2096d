use crate::audio::PCM_SAMPLES;

pub const VOLUME_MIN: f64 = 0.05;
pub const VOLUME_MAX: f64 = 1.0;

const VOLUME_KEEP: f64 = 0.8;
const VOLUME_NEW: f64 = 0.2;
const LEVEL_DIVISOR: f64 = PCM_SAMPLES as f64 / 2.5;

/// Auto-gain: keeps a smoothed loudness estimate and rescales each chunk by it.
#[derive(Debug, Clone, Copy)]
pub struct GainNormalizer {
    volume: f64,
}

impl GainNormalizer {
    pub fn new() -> Self {
        Self { volume: VOLUME_MIN }
    }

    pub fn volume(&self) -> f64 {
        self.volume
    }

    /// Blends this chunk's level into the running estimate, then divides the
    /// chunk by the blended value (not the previous one).
    pub fn normalize(&mut self, chunk: &mut [f64]) {
        let sum: f64 = chunk.iter().map(|s| s.abs()).sum();
        let level = (sum / LEVEL_DIVISOR).clamp(VOLUME_MIN, VOLUME_MAX);
        self.volume = self.volume * VOLUME_KEEP + level * VOLUME_NEW;

        for s in chunk.iter_mut() {
            *s /= self.volume;
        }
    }
}

impl Default for GainNormalizer {
    fn default() -> Self {
        Self::new()
    }
}
