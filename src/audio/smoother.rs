use crate::audio::{MAX_BANDS, SKIP_BANDS};
use rustfft::num_complex::Complex;

/// Ceiling for any bar after the global rescale.
pub const MAX_PIXEL_HEIGHT: f64 = 32.0;

const MAGNITUDE_SCALE: f64 = 64.0;
const EXPONENT_BASE: f64 = 2.5;
const NOISE_FLOOR: f64 = 0.2;
const BAR_NEW_WEIGHT: f64 = 0.25;
const BAR_KEEP_WEIGHT: f64 = 0.75;
// below this a decaying bar is zero; 0.75^n alone never gets there in f64
const SILENCE_SNAP: f64 = 1e-9;

/// Turns transform bins into bar heights: power curve, EMA, global clamp.
#[derive(Debug, Clone, Copy)]
pub struct BandSmoother {
    bars: [f64; MAX_BANDS + 1],
}

impl BandSmoother {
    pub fn new() -> Self {
        Self {
            bars: [0.0; MAX_BANDS + 1],
        }
    }

    /// Updates the first `bands` bars from `bins`, skipping the DC end.
    ///
    /// Quieter audio (lower `volume`) raises the exponent, which pushes small
    /// magnitudes toward zero.
    pub fn extract(&mut self, bins: &[Complex<f64>], bands: usize, volume: f64) {
        let bands = bands.min(MAX_BANDS);
        let exponent = EXPONENT_BASE + (1.0 - volume);
        let source = bins.get(SKIP_BANDS..).unwrap_or(&[]);

        let mut peak = 0.0f64;
        for (bar, bin) in self.bars[..bands].iter_mut().zip(source) {
            let v = bin.norm() / MAGNITUDE_SCALE;
            let level = (v.max(0.0).powf(exponent) - NOISE_FLOOR).max(0.0);
            let mut next = level * BAR_NEW_WEIGHT + *bar * BAR_KEEP_WEIGHT;
            if next < SILENCE_SNAP {
                next = 0.0;
            }
            *bar = next;
            peak = peak.max(next);
        }

        if peak > MAX_PIXEL_HEIGHT {
            let scale = MAX_PIXEL_HEIGHT / peak;
            for bar in &mut self.bars[..bands] {
                *bar = (*bar * scale).min(MAX_PIXEL_HEIGHT);
            }
        }
    }

    pub fn bars(&self, bands: usize) -> &[f64] {
        &self.bars[..bands.min(MAX_BANDS)]
    }
}

impl Default for BandSmoother {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::FFT_USED;

    fn flat_bins(magnitude: f64) -> Vec<Complex<f64>> {
        vec![Complex::new(magnitude, 0.0); FFT_USED]
    }

    #[test]
    fn silence_reaches_exact_zero() {
        let mut s = BandSmoother::new();
        s.extract(&flat_bins(64.0 * 4.0), MAX_BANDS, 1.0);
        assert!(s.bars(MAX_BANDS).iter().all(|&b| b > 0.0));

        let silent = flat_bins(0.0);
        for _ in 0..100 {
            s.extract(&silent, MAX_BANDS, 0.05);
        }
        assert!(s.bars(MAX_BANDS).iter().all(|&b| b == 0.0));
    }

    #[test]
    fn global_clamp_caps_every_bar() {
        let mut s = BandSmoother::new();
        let mut bins = flat_bins(1e3);
        bins[SKIP_BANDS + 3] = Complex::new(0.0, 1e7);
        for _ in 0..5 {
            s.extract(&bins, 100, 0.05);
            for &b in s.bars(100) {
                assert!(b >= 0.0);
                assert!(b * 6.0 <= MAX_PIXEL_HEIGHT * 6.0);
            }
        }
        let bars = s.bars(100);
        assert!((bars[3] - MAX_PIXEL_HEIGHT).abs() < 1e-9);
        assert!(bars[0] < bars[3]);
    }

    #[test]
    fn low_magnitudes_fall_under_noise_floor() {
        let mut s = BandSmoother::new();
        // v = 0.5, 0.5^2.5 ~ 0.177 < 0.2
        s.extract(&flat_bins(32.0), 20, 1.0);
        assert!(s.bars(20).iter().all(|&b| b == 0.0));
    }

    #[test]
    fn smoothing_blends_quarter_new() {
        let mut s = BandSmoother::new();
        // v = 2, 2^2.5 - 0.2 = 5.4568...
        let level = 2.0f64.powf(2.5) - 0.2;
        s.extract(&flat_bins(128.0), 12, 1.0);
        assert!((s.bars(12)[0] - level * 0.25).abs() < 1e-12);

        s.extract(&flat_bins(128.0), 12, 1.0);
        let expected = level * 0.25 + level * 0.25 * 0.75;
        assert!((s.bars(12)[0] - expected).abs() < 1e-12);
    }

    #[test]
    fn skips_dc_bins_and_leaves_inactive_bars() {
        let mut s = BandSmoother::new();
        let mut bins = flat_bins(0.0);
        for b in &mut bins[..SKIP_BANDS] {
            *b = Complex::new(1e4, 0.0);
        }
        bins[SKIP_BANDS + 20] = Complex::new(640.0, 0.0);
        s.extract(&bins, 12, 1.0);
        assert!(s.bars(12).iter().all(|&b| b == 0.0));

        s.extract(&bins, 30, 1.0);
        assert!(s.bars(30)[20] > 0.0);
        assert_eq!(s.bars(30)[0], 0.0);
    }
}
