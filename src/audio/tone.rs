use crate::audio::{PcmChunk, PCM_SAMPLES};
use std::f64::consts::TAU;
use std::time::Instant;

const SAMPLE_RATE: f64 = 44_100.0;
const SWEEP_SECS: f64 = 8.0;
const SWEEP_LOW_HZ: f64 = 40.0;
// two octaves: 40 Hz -> 160 Hz
const SWEEP_OCTAVES: f64 = 2.0;
const AMPLITUDE: f64 = 0.6;
// never produce more than this per poll after a stall
const MAX_CATCH_UP: usize = 8;

/// Synthetic bass sweep used when no capture device is available.
#[derive(Debug, Clone)]
pub struct ToneSource {
    started_at: Instant,
    produced: u64,
    phase: f64,
}

impl ToneSource {
    pub fn new(now: Instant) -> Self {
        Self {
            started_at: now,
            produced: 0,
            phase: 0.0,
        }
    }

    /// Returns the chunks that are due by `now` in real time.
    pub fn drain_chunks(&mut self, now: Instant) -> Vec<PcmChunk> {
        let elapsed = now.saturating_duration_since(self.started_at).as_secs_f64();
        let due = (elapsed * SAMPLE_RATE) as u64;
        let behind = due.saturating_sub(self.produced) / PCM_SAMPLES as u64;

        if behind as usize > MAX_CATCH_UP {
            let skipped = behind - MAX_CATCH_UP as u64;
            self.produced += skipped * PCM_SAMPLES as u64;
        }

        let count = (behind as usize).min(MAX_CATCH_UP);
        (0..count).map(|_| self.next_chunk()).collect()
    }

    fn next_chunk(&mut self) -> PcmChunk {
        let mut chunk = [0.0f32; PCM_SAMPLES];
        for s in chunk.iter_mut() {
            let t = (self.produced as f64 / SAMPLE_RATE) % SWEEP_SECS;
            let freq = SWEEP_LOW_HZ * (SWEEP_OCTAVES * t / SWEEP_SECS).exp2();
            self.phase = (self.phase + TAU * freq / SAMPLE_RATE) % TAU;
            *s = (AMPLITUDE * self.phase.sin()) as f32;
            self.produced += 1;
        }
        chunk
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn paced_by_wall_clock() {
        let start = Instant::now();
        let mut tone = ToneSource::new(start);
        assert!(tone.drain_chunks(start).is_empty());

        // 512 samples at 44.1 kHz is ~11.6 ms
        let chunks = tone.drain_chunks(start + Duration::from_millis(35));
        assert_eq!(chunks.len(), 3);
        assert!(tone.drain_chunks(start + Duration::from_millis(35)).is_empty());
    }

    #[test]
    fn stall_is_skipped_not_replayed() {
        let start = Instant::now();
        let mut tone = ToneSource::new(start);
        let chunks = tone.drain_chunks(start + Duration::from_secs(5));
        assert_eq!(chunks.len(), MAX_CATCH_UP);
        assert!(tone.drain_chunks(start + Duration::from_secs(5)).is_empty());
    }

    #[test]
    fn stays_within_amplitude() {
        let start = Instant::now();
        let mut tone = ToneSource::new(start);
        let chunks = tone.drain_chunks(start + Duration::from_millis(90));
        assert!(!chunks.is_empty());
        for s in chunks.iter().flatten() {
            assert!(s.abs() <= AMPLITUDE as f32 + 1e-6);
        }
        assert!(chunks.iter().flatten().any(|s| s.abs() > 0.3));
    }
}
