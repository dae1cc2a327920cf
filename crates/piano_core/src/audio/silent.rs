use super::{AudioContext, AudioResult, ToneId};
use log::debug;
use std::time::Duration;

/// Context that produces no sound and only logs tone events.
///
/// Default backend for builds without the `audio-device` feature.
#[derive(Debug, Default)]
pub struct SilentAudioContext {
    next_tone: ToneId,
}

impl SilentAudioContext {
    pub fn new() -> Self {
        Self::default()
    }
}

impl AudioContext for SilentAudioContext {
    fn start_tone(&mut self, frequency_hz: f32, duration: Duration) -> AudioResult<ToneId> {
        self.next_tone += 1;
        debug!(
            "event=audio_tone module=audio backend=silent status=start tone_id={} frequency_hz={:.2} duration_ms={}",
            self.next_tone,
            frequency_hz,
            duration.as_millis()
        );
        Ok(self.next_tone)
    }

    fn stop_tone(&mut self, tone: ToneId) -> AudioResult<()> {
        debug!("event=audio_tone module=audio backend=silent status=stop tone_id={tone}");
        Ok(())
    }

    fn close(&mut self) -> AudioResult<()> {
        Ok(())
    }
}
