pub mod accumulator;
pub mod capture;
pub mod fft;
pub mod normalizer;
pub mod smoother;
pub mod source;
pub mod spectrum;
pub mod tone;

/// Samples per host callback.
pub const PCM_SAMPLES: usize = 512;
/// Chunks that must accumulate before a transform runs.
pub const SAMPLE_CHUNKS: usize = 2;
pub const REQUIRED_SAMPLES: usize = PCM_SAMPLES * SAMPLE_CHUNKS;

/// Bins actually computed out of the full transform.
pub const FFT_USED: usize = 256;
/// Full transform length. Must stay a multiple of `FFT_USED`.
pub const FFT_SIZE: usize = FFT_USED * 156;

/// Lowest bins (DC and near-DC rumble) that never reach a bar.
pub const SKIP_BANDS: usize = 8;
pub const MAX_BANDS: usize = FFT_USED - SKIP_BANDS;

/// One mono chunk as delivered by an audio source.
pub type PcmChunk = [f32; PCM_SAMPLES];
