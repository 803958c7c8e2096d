use rustfft::{num_complex::Complex, Fft, FftPlanner};
use std::f64::consts::PI;
use std::sync::Arc;

/// Computes only the first `used` bins of an `fft_size`-point real DFT.
///
/// The window is decimated into `fft_size / used` interleaved sub-sequences,
/// each transformed at length `used`, and the results are recombined with
/// precomputed twiddles. Two real sub-sequences share one complex transform.
pub struct FftEngine {
    fft_size: usize,
    used: usize,
    strides: usize,
    fft: Arc<dyn Fft<f64>>,
    packed: Vec<Complex<f64>>,
    scratch: Vec<Complex<f64>>,
    // W_N^(i*j) for j in 1..strides, i in 1..used; row-major by j
    twiddles: Vec<Complex<f64>>,
    out: Vec<Complex<f64>>,
}

impl FftEngine {
    pub fn new(fft_size: usize, used: usize) -> Self {
        assert!(used > 0, "fft engine needs at least one output bin");
        assert!(used <= fft_size, "used bins ({used}) exceed transform size ({fft_size})");
        assert!(
            fft_size % used == 0,
            "used bins ({used}) must divide transform size ({fft_size})"
        );

        let strides = fft_size / used;
        let rows = strides.div_ceil(2);

        let mut planner = FftPlanner::<f64>::new();
        let fft = planner.plan_fft_forward(used);
        let scratch = vec![Complex::new(0.0, 0.0); fft.get_inplace_scratch_len()];

        let mut twiddles = Vec::with_capacity((strides - 1) * (used - 1));
        for j in 1..strides {
            for i in 1..used {
                let phase = -2.0 * PI * (i * j) as f64 / fft_size as f64;
                twiddles.push(Complex::from_polar(1.0, phase));
            }
        }

        Self {
            fft_size,
            used,
            strides,
            fft,
            packed: vec![Complex::new(0.0, 0.0); rows * used],
            scratch,
            twiddles,
            out: vec![Complex::new(0.0, 0.0); used],
        }
    }

    /// Transforms `window` (exactly `fft_size` samples) and returns the first
    /// `used` bins. The returned slice is overwritten by the next call.
    pub fn transform(&mut self, window: &[f64]) -> &[Complex<f64>] {
        assert_eq!(
            window.len(),
            self.fft_size,
            "transform window must hold exactly fft_size samples"
        );

        let Self {
            used,
            strides,
            fft,
            packed,
            scratch,
            twiddles,
            out,
            ..
        } = self;
        let (k, s) = (*used, *strides);

        // row r carries sub-sequences 2r (real part) and 2r + 1 (imaginary part)
        for (row, lane) in packed.chunks_exact_mut(k).enumerate() {
            let a = 2 * row;
            let b = a + 1;
            for (m, z) in lane.iter_mut().enumerate() {
                let re = window[a + s * m];
                let im = if b < s { window[b + s * m] } else { 0.0 };
                *z = Complex::new(re, im);
            }
        }

        fft.process_with_scratch(packed, scratch);

        out.fill(Complex::new(0.0, 0.0));
        let half_i = Complex::new(0.0, -0.5);
        for (row, lane) in packed.chunks_exact(k).enumerate() {
            let a = 2 * row;
            let b = a + 1;
            for (i, acc) in out.iter_mut().enumerate() {
                let z = lane[i];
                let mirror = lane[(k - i) % k].conj();
                let ya = (z + mirror) * 0.5;
                *acc += ya * twiddle(twiddles, k, a, i);
                if b < s {
                    let yb = (z - mirror) * half_i;
                    *acc += yb * twiddle(twiddles, k, b, i);
                }
            }
        }

        out
    }
}

fn twiddle(twiddles: &[Complex<f64>], used: usize, j: usize, i: usize) -> Complex<f64> {
    if i == 0 || j == 0 {
        Complex::new(1.0, 0.0)
    } else {
        twiddles[(j - 1) * (used - 1) + (i - 1)]
    }
}
