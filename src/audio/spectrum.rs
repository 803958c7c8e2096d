use crate::audio::accumulator::SampleWindow;
use crate::audio::fft::FftEngine;
use crate::audio::normalizer::GainNormalizer;
use crate::audio::smoother::BandSmoother;
use crate::audio::{PcmChunk, FFT_SIZE, FFT_USED, PCM_SAMPLES};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    /// No transform plan yet.
    Uninitialized,
    Active,
    /// Source deregistered; further chunks are ignored.
    TornDown,
}

/// Owns every piece of the signal path. One instance per process, driven from
/// the event-loop thread only.
pub struct SpectrumPipeline {
    state: PipelineState,
    normalizer: GainNormalizer,
    window: SampleWindow,
    engine: Option<FftEngine>,
    smoother: BandSmoother,
    chunk: [f64; PCM_SAMPLES],
}

impl SpectrumPipeline {
    pub fn new() -> Self {
        Self {
            state: PipelineState::Uninitialized,
            normalizer: GainNormalizer::new(),
            window: SampleWindow::new(),
            engine: None,
            smoother: BandSmoother::new(),
            chunk: [0.0; PCM_SAMPLES],
        }
    }

    pub fn state(&self) -> PipelineState {
        self.state
    }

    /// Runs one host callback. Returns true when a transform fired and the
    /// first `bands` bars were updated.
    pub fn deliver_mono_pcm(&mut self, pcm: &PcmChunk, bands: usize) -> bool {
        if self.state == PipelineState::TornDown {
            return false;
        }

        for (dst, &src) in self.chunk.iter_mut().zip(pcm.iter()) {
            *dst = f64::from(src);
        }
        self.normalizer.normalize(&mut self.chunk);
        self.window.accumulate(&self.chunk);

        if !self.window.is_ready() {
            return false;
        }

        let engine = self.engine.get_or_insert_with(|| {
            log::info!("building transform plan ({FFT_SIZE} points, {FFT_USED} bins)");
            FftEngine::new(FFT_SIZE, FFT_USED)
        });
        let bins = engine.transform(self.window.pad());
        self.smoother.extract(bins, bands, self.normalizer.volume());
        self.window.trim();

        if self.state == PipelineState::Uninitialized {
            log::info!("spectrum pipeline active");
            self.state = PipelineState::Active;
        }
        true
    }

    /// Read-only snapshot of the active bars.
    pub fn bars(&self, bands: usize) -> &[f64] {
        self.smoother.bars(bands)
    }

    pub fn teardown(&mut self) {
        if self.state != PipelineState::TornDown {
            log::info!("spectrum pipeline torn down");
            self.state = PipelineState::TornDown;
        }
    }
}

impl Default for SpectrumPipeline {
    fn default() -> Self {
        Self::new()
    }
}
