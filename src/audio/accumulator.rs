use crate::audio::{FFT_SIZE, PCM_SAMPLES, REQUIRED_SAMPLES};

/// Rolling analysis window. Two chunks make a window; each transform slides it
/// forward by one chunk, so consecutive analyses overlap by half.
#[derive(Debug, Clone)]
pub struct SampleWindow {
    samples: Vec<f64>,
}

impl SampleWindow {
    pub fn new() -> Self {
        Self {
            samples: Vec::with_capacity(FFT_SIZE),
        }
    }

    pub fn accumulate(&mut self, chunk: &[f64]) {
        self.samples.extend_from_slice(chunk);
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_ready(&self) -> bool {
        self.samples.len() >= REQUIRED_SAMPLES
    }

    /// Zero-pads to the transform length and returns the padded window.
    pub fn pad(&mut self) -> &[f64] {
        if self.samples.len() < FFT_SIZE {
            self.samples.resize(FFT_SIZE, 0.0);
        }
        &self.samples
    }

    /// Drops the padding and the oldest chunk.
    pub fn trim(&mut self) {
        self.samples.truncate(REQUIRED_SAMPLES);
        let consumed = PCM_SAMPLES.min(self.samples.len());
        self.samples.drain(..consumed);
    }

    #[cfg(test)]
    pub fn samples(&self) -> &[f64] {
        &self.samples
    }
}

impl Default for SampleWindow {
    fn default() -> Self {
        Self::new()
    }
}
