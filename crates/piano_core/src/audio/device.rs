//! Sine oscillator output on the default cpal device.
//!
//! The cpal stream is not `Send` on every platform, so it lives on a
//! dedicated thread; the context only shares the oscillator state with it.

use super::{AudioContext, AudioError, AudioResult, ToneId};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use log::error;
use parking_lot::Mutex;
use std::f32::consts::TAU;
use std::sync::mpsc;
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

const AMPLITUDE: f32 = 0.2;
/// Fade in/out length in samples, avoids clicks at tone edges.
const RAMP_SAMPLES: u64 = 256;

#[derive(Debug, Default)]
struct Oscillator {
    tone: Option<ToneId>,
    frequency_hz: f32,
    phase: f32,
    played: u64,
    total: u64,
}

impl Oscillator {
    fn next_sample(&mut self, sample_rate: f32) -> f32 {
        if self.tone.is_none() || self.played >= self.total {
            self.tone = None;
            return 0.0;
        }

        let remaining = self.total - self.played;
        let ramp = self.played.min(remaining).min(RAMP_SAMPLES) as f32 / RAMP_SAMPLES as f32;
        let sample = (self.phase * TAU).sin() * AMPLITUDE * ramp;

        self.phase = (self.phase + self.frequency_hz / sample_rate).fract();
        self.played += 1;
        sample
    }
}

/// Audio context backed by a cpal output stream.
pub struct CpalAudioContext {
    oscillator: Arc<Mutex<Oscillator>>,
    sample_rate: u32,
    next_tone: ToneId,
    close_tx: Option<mpsc::Sender<()>>,
    worker: Option<JoinHandle<()>>,
}

impl CpalAudioContext {
    /// Opens the default output device and starts a silent stream.
    pub fn open() -> AudioResult<Self> {
        let oscillator = Arc::new(Mutex::new(Oscillator::default()));
        let (ready_tx, ready_rx) = mpsc::channel::<AudioResult<u32>>();
        let (close_tx, close_rx) = mpsc::channel::<()>();

        let shared = Arc::clone(&oscillator);
        let worker = std::thread::Builder::new()
            .name("piano-audio".to_string())
            .spawn(move || {
                let stream = match build_stream(shared) {
                    Ok((stream, sample_rate)) => {
                        let _ = ready_tx.send(Ok(sample_rate));
                        stream
                    }
                    Err(err) => {
                        let _ = ready_tx.send(Err(err));
                        return;
                    }
                };
                let _ = close_rx.recv();
                drop(stream);
            })
            .map_err(|err| AudioError::Unavailable(format!("failed to spawn audio thread: {err}")))?;

        let sample_rate = ready_rx
            .recv()
            .map_err(|_| AudioError::Unavailable("audio thread exited early".to_string()))??;

        Ok(Self {
            oscillator,
            sample_rate,
            next_tone: 0,
            close_tx: Some(close_tx),
            worker: Some(worker),
        })
    }
}

impl AudioContext for CpalAudioContext {
    fn start_tone(&mut self, frequency_hz: f32, duration: Duration) -> AudioResult<ToneId> {
        if self.close_tx.is_none() {
            return Err(AudioError::Backend("context already closed".to_string()));
        }
        self.next_tone += 1;
        let total = (duration.as_secs_f64() * f64::from(self.sample_rate)) as u64;

        let mut osc = self.oscillator.lock();
        osc.tone = Some(self.next_tone);
        osc.frequency_hz = frequency_hz;
        osc.phase = 0.0;
        osc.played = 0;
        osc.total = total;
        Ok(self.next_tone)
    }

    fn stop_tone(&mut self, tone: ToneId) -> AudioResult<()> {
        let mut osc = self.oscillator.lock();
        if osc.tone == Some(tone) {
            osc.tone = None;
        }
        Ok(())
    }

    fn close(&mut self) -> AudioResult<()> {
        if let Some(close_tx) = self.close_tx.take() {
            let _ = close_tx.send(());
        }
        if let Some(worker) = self.worker.take() {
            worker
                .join()
                .map_err(|_| AudioError::Backend("audio thread panicked".to_string()))?;
        }
        Ok(())
    }
}

impl Drop for CpalAudioContext {
    fn drop(&mut self) {
        let _ = self.close();
    }
}

fn build_stream(oscillator: Arc<Mutex<Oscillator>>) -> AudioResult<(cpal::Stream, u32)> {
    let host = cpal::default_host();
    let device = host
        .default_output_device()
        .ok_or_else(|| AudioError::Unavailable("no output device available".to_string()))?;
    let supported = device
        .default_output_config()
        .map_err(|err| AudioError::Unavailable(format!("failed to get default config: {err}")))?;

    let sample_rate = supported.sample_rate().0;
    let channels = usize::from(supported.channels()).max(1);
    let config: cpal::StreamConfig = supported.into();
    let rate = sample_rate as f32;

    let stream = device
        .build_output_stream(
            &config,
            move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                let mut osc = oscillator.lock();
                for frame in data.chunks_mut(channels) {
                    let sample = osc.next_sample(rate);
                    frame.fill(sample);
                }
            },
            |err| error!("event=audio_stream module=audio status=error error={err}"),
            None,
        )
        .map_err(|err| AudioError::Unavailable(format!("failed to build stream: {err}")))?;

    stream
        .play()
        .map_err(|err| AudioError::Backend(format!("failed to play stream: {err}")))?;

    Ok((stream, sample_rate))
}
