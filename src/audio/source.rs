use crate::audio::capture::AudioCapture;
use crate::audio::tone::ToneSource;
use crate::audio::PcmChunk;
use crate::data::config::{Config, SourceKind};
use std::time::Instant;

/// Where mono chunks come from.
pub enum AudioSource {
    Capture(AudioCapture),
    Tone(ToneSource),
}

impl AudioSource {
    /// Opens the configured source. A capture that cannot start falls back to
    /// the tone so the display still runs.
    pub fn open(config: &Config, now: Instant) -> Self {
        match config.source {
            SourceKind::Tone => Self::Tone(ToneSource::new(now)),
            SourceKind::Capture => match AudioCapture::start(config.preferred_device()) {
                Ok(capture) => Self::Capture(capture),
                Err(e) => {
                    log::warn!("audio capture unavailable ({e}); using test tone");
                    Self::Tone(ToneSource::new(now))
                }
            },
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Capture(_) => "capture",
            Self::Tone(_) => "tone",
        }
    }

    pub fn maintain(&mut self, now: Instant) {
        if let Self::Capture(capture) = self {
            capture.maybe_restart(now);
        }
    }

    pub fn drain_chunks(&mut self, now: Instant) -> Vec<PcmChunk> {
        match self {
            Self::Capture(capture) => capture.drain_chunks(),
            Self::Tone(tone) => tone.drain_chunks(now),
        }
    }
}
