use crate::audio::{PcmChunk, PCM_SAMPLES};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{FromSample, Sample, SizedSample};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};
use thiserror::Error;

// keep the last ~16384 mono samples if the UI thread falls behind
const PENDING_CAP: usize = 16384;
const RESTART_THROTTLE: Duration = Duration::from_secs(2);
const STALE_AFTER: Duration = Duration::from_millis(900);

#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("no audio input device available")]
    NoDevice,
    #[error("unsupported sample format {0:?}")]
    UnsupportedFormat(cpal::SampleFormat),
    #[error("failed to query input config: {0}")]
    DefaultConfig(#[from] cpal::DefaultStreamConfigError),
    #[error("failed to build input stream: {0}")]
    BuildStream(#[from] cpal::BuildStreamError),
    #[error("failed to start input stream: {0}")]
    PlayStream(#[from] cpal::PlayStreamError),
}

/// Mono samples handed from the audio thread to the event loop.
#[derive(Clone, Default)]
struct SharedSamples {
    pending: Arc<Mutex<Vec<f32>>>,
    last_sample_at: Arc<Mutex<Option<Instant>>>,
}

impl SharedSamples {
    /// Averages interleaved frames down to mono and queues them.
    fn push_interleaved<T>(&self, data: &[T], channels: usize)
    where
        T: Sample,
        f32: FromSample<T>,
    {
        if data.is_empty() {
            return;
        }
        let channels = channels.max(1);

        {
            let mut pending = lock(&self.pending);
            pending.reserve(data.len() / channels);
            for frame in data.chunks(channels) {
                let sum: f32 = frame.iter().map(|&s| f32::from_sample(s)).sum();
                let mono = sum / frame.len() as f32;
                pending.push(if mono.is_finite() { mono } else { 0.0 });
            }

            if pending.len() > PENDING_CAP {
                let excess = pending.len() - PENDING_CAP;
                pending.drain(..excess);
            }
        }

        *lock(&self.last_sample_at) = Some(Instant::now());
    }

    /// Takes every complete chunk, leaving the remainder queued.
    fn drain_chunks(&self) -> Vec<PcmChunk> {
        let mut pending = lock(&self.pending);
        let whole = pending.len() / PCM_SAMPLES;
        if whole == 0 {
            return Vec::new();
        }

        let chunks = pending
            .chunks_exact(PCM_SAMPLES)
            .take(whole)
            .map(|src| {
                let mut chunk = [0.0f32; PCM_SAMPLES];
                chunk.copy_from_slice(src);
                chunk
            })
            .collect();
        pending.drain(..whole * PCM_SAMPLES);
        chunks
    }

    fn last_sample_age(&self, now: Instant) -> Option<Duration> {
        let last = *lock(&self.last_sample_at);
        last.map(|t| now.saturating_duration_since(t))
    }
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Live input stream delivering mono PCM. Dropping it deregisters the stream.
pub struct AudioCapture {
    shared: SharedSamples,
    preferred: Option<String>,
    last_restart_at: Instant,
    _stream: cpal::Stream,
}

impl AudioCapture {
    pub fn start(preferred: Option<&str>) -> Result<Self, CaptureError> {
        let preferred = preferred.map(str::to_owned);
        let shared = SharedSamples::default();
        let stream = open_stream(preferred.as_deref(), &shared)?;
        Ok(Self {
            shared,
            preferred,
            last_restart_at: Instant::now(),
            _stream: stream,
        })
    }

    /// Rebuilds the stream when it has gone quiet, e.g. after the monitor
    /// device disappeared. Throttled so a dead device does not flap.
    pub fn maybe_restart(&mut self, now: Instant) {
        if now.saturating_duration_since(self.last_restart_at) < RESTART_THROTTLE {
            return;
        }

        let stale = match self.shared.last_sample_age(now) {
            None => true,
            Some(age) => age > STALE_AFTER,
        };
        if !stale {
            return;
        }

        self.last_restart_at = now;
        log::info!("cpal capture stale; restarting");
        match open_stream(self.preferred.as_deref(), &self.shared) {
            Ok(stream) => self._stream = stream,
            Err(e) => log::warn!("cpal capture restart failed: {e}"),
        }
    }

    pub fn drain_chunks(&self) -> Vec<PcmChunk> {
        self.shared.drain_chunks()
    }
}

fn open_stream(preferred: Option<&str>, shared: &SharedSamples) -> Result<cpal::Stream, CaptureError> {
    let device = preferred
        .and_then(find_named_device)
        .or_else(pick_best_input_device)
        .or_else(|| cpal::default_host().default_input_device())
        .ok_or(CaptureError::NoDevice)?;

    if let Ok(name) = device.name() {
        log::info!("cpal input device: {name}");
    }

    let supported = device.default_input_config()?;
    let format = supported.sample_format();
    let config: cpal::StreamConfig = supported.into();

    let stream = match format {
        cpal::SampleFormat::F32 => build_stream::<f32>(&device, &config, shared.clone())?,
        cpal::SampleFormat::I16 => build_stream::<i16>(&device, &config, shared.clone())?,
        cpal::SampleFormat::U16 => build_stream::<u16>(&device, &config, shared.clone())?,
        other => return Err(CaptureError::UnsupportedFormat(other)),
    };
    stream.play()?;
    Ok(stream)
}

fn build_stream<T>(
    device: &cpal::Device,
    config: &cpal::StreamConfig,
    shared: SharedSamples,
) -> Result<cpal::Stream, CaptureError>
where
    T: SizedSample,
    f32: FromSample<T>,
{
    let channels = usize::from(config.channels);
    let err_fn = |err: cpal::StreamError| log::warn!("cpal stream error: {err}");
    let stream = device.build_input_stream(
        config,
        move |data: &[T], _: &cpal::InputCallbackInfo| shared.push_interleaved(data, channels),
        err_fn,
        None,
    )?;
    Ok(stream)
}

fn find_named_device(wanted: &str) -> Option<cpal::Device> {
    let wanted = wanted.to_lowercase();
    cpal::available_hosts()
        .into_iter()
        .filter_map(|id| cpal::host_from_id(id).ok())
        .filter_map(|host| host.input_devices().ok())
        .flatten()
        .find(|d| {
            d.name()
                .map(|n| n.to_lowercase().contains(&wanted))
                .unwrap_or(false)
        })
}

/// Highest-scoring input across every available host backend.
fn pick_best_input_device() -> Option<cpal::Device> {
    let mut best: Option<(i32, cpal::Device)> = None;

    for host_id in cpal::available_hosts() {
        let Ok(host) = cpal::host_from_id(host_id) else {
            continue;
        };
        let bonus = host_bonus(&format!("{host_id:?}"));
        let Ok(devices) = host.input_devices() else {
            continue;
        };

        for d in devices {
            let score = bonus + device_name_score(&d.name().unwrap_or_default());
            match &best {
                Some((best_score, _)) if score <= *best_score => {}
                _ => best = Some((score, d)),
            }
        }
    }

    best.map(|(_, d)| d)
}

fn host_bonus(host: &str) -> i32 {
    let host = host.to_lowercase();
    if host.contains("pipe") {
        50
    } else if host.contains("pulse") {
        40
    } else if host.contains("jack") {
        10
    } else {
        0
    }
}

/// Monitors and loopbacks carry what is playing; microphones do not.
fn device_name_score(name: &str) -> i32 {
    let lname = name.to_lowercase();
    let mut score = 0;

    if lname.contains("monitor") {
        score += 200;
    }
    if lname.contains("loopback") {
        score += 160;
    }
    if lname.contains("stereo mix") || lname.contains("what u hear") {
        score += 120;
    }
    if lname.contains("output") {
        score += 40;
    }
    if lname.contains("sink") {
        score += 30;
    }

    if lname.contains("microphone") || lname.contains("mic") {
        score -= 120;
    }
    if lname.contains("headset") {
        score -= 50;
    }
    if lname.contains("webcam") || lname.contains("camera") {
        score -= 80;
    }
    if lname.contains("input") && !lname.contains("monitor") {
        score -= 40;
    }

    score
}
