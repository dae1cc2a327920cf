use super::{AudioContext, AudioContextFactory, NotePlayer, ToneId};
use crate::model::note::Note;
use log::{debug, error, info};
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;

/// Length of one played note, roughly an eighth note at 120 bpm.
pub const DEFAULT_TONE_DURATION: Duration = Duration::from_millis(500);

/// Single-voice audio engine.
pub struct AudioEngine {
    factory: Box<dyn AudioContextFactory>,
    context: Option<Box<dyn AudioContext>>,
    active_tone: Option<ToneId>,
    tone_duration: Duration,
}

impl AudioEngine {
    /// Creates an engine. No audio resource is touched until the first note.
    pub fn new(factory: impl AudioContextFactory + 'static) -> Self {
        Self {
            factory: Box::new(factory),
            context: None,
            active_tone: None,
            tone_duration: DEFAULT_TONE_DURATION,
        }
    }

    pub fn with_tone_duration(mut self, duration: Duration) -> Self {
        self.tone_duration = duration;
        self
    }

    /// Whether the output context has been acquired.
    pub fn is_acquired(&self) -> bool {
        self.context.is_some()
    }

    /// Plays a note by name. Unknown names are ignored.
    ///
    /// Returns the note that was started, if any.
    pub fn play_note(&mut self, name: &str) -> Option<Note> {
        let Some(note) = Note::from_name(name) else {
            debug!("event=audio_play module=audio status=skipped reason=unknown_note");
            return None;
        };
        self.play(note).then_some(note)
    }

    /// Plays a note from the table. Returns `false` when the tone could not start.
    pub fn play(&mut self, note: Note) -> bool {
        if self.context.is_none() {
            match self.factory.acquire() {
                Ok(context) => {
                    info!("event=audio_acquire module=audio status=ok");
                    self.context = Some(context);
                }
                Err(err) => {
                    error!("event=audio_acquire module=audio status=error error={err}");
                    return false;
                }
            }
        }
        let Some(context) = self.context.as_mut() else {
            return false;
        };

        if let Some(previous) = self.active_tone.take() {
            if let Err(err) = context.stop_tone(previous) {
                error!(
                    "event=audio_stop module=audio status=error tone_id={previous} error={err}"
                );
            }
        }

        match context.start_tone(note.frequency_hz(), self.tone_duration) {
            Ok(tone) => {
                debug!(
                    "event=audio_play module=audio status=ok note={} tone_id={}",
                    note, tone
                );
                self.active_tone = Some(tone);
                true
            }
            Err(err) => {
                error!("event=audio_play module=audio status=error note={note} error={err}");
                false
            }
        }
    }

    /// Stops any active tone and releases the output context.
    ///
    /// Safe to call repeatedly; a later note acquires a fresh context.
    pub fn shutdown(&mut self) {
        let Some(mut context) = self.context.take() else {
            return;
        };
        if let Some(tone) = self.active_tone.take() {
            if let Err(err) = context.stop_tone(tone) {
                error!("event=audio_stop module=audio status=error tone_id={tone} error={err}");
            }
        }
        match context.close() {
            Ok(()) => info!("event=audio_release module=audio status=ok"),
            Err(err) => error!("event=audio_release module=audio status=error error={err}"),
        }
    }
}

impl Drop for AudioEngine {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Cloneable handle to one engine shared by input and playback.
#[derive(Clone)]
pub struct SharedAudioEngine {
    inner: Arc<Mutex<AudioEngine>>,
}

impl SharedAudioEngine {
    pub fn new(engine: AudioEngine) -> Self {
        Self {
            inner: Arc::new(Mutex::new(engine)),
        }
    }

    /// Plays a note by name; see [`AudioEngine::play_note`].
    pub fn play_note_name(&self, name: &str) -> Option<Note> {
        self.inner.lock().play_note(name)
    }

    pub fn shutdown(&self) {
        self.inner.lock().shutdown();
    }
}

impl NotePlayer for SharedAudioEngine {
    fn play_note(&self, note: Note) {
        self.inner.lock().play(note);
    }
}

#[cfg(test)]
mod tests {
    use super::AudioEngine;
    use crate::audio::{AudioContext, AudioError, AudioResult, ToneId};
    use std::time::Duration;

    struct NoopContext;

    impl AudioContext for NoopContext {
        fn start_tone(&mut self, _frequency_hz: f32, _duration: Duration) -> AudioResult<ToneId> {
            Ok(1)
        }

        fn stop_tone(&mut self, _tone: ToneId) -> AudioResult<()> {
            Ok(())
        }

        fn close(&mut self) -> AudioResult<()> {
            Ok(())
        }
    }

    #[test]
    fn failed_acquire_is_retried_on_next_note() {
        let mut attempts = 0;
        let mut engine = AudioEngine::new(move || -> AudioResult<Box<dyn AudioContext>> {
            attempts += 1;
            if attempts == 1 {
                Err(AudioError::Unavailable("blocked".into()))
            } else {
                Ok(Box::new(NoopContext))
            }
        });

        assert_eq!(engine.play_note("C4"), None);
        assert!(!engine.is_acquired());
        assert!(engine.play_note("C4").is_some());
        assert!(engine.is_acquired());
    }

    #[test]
    fn shutdown_without_acquire_is_a_noop() {
        let mut engine = AudioEngine::new(|| -> AudioResult<Box<dyn AudioContext>> {
            Ok(Box::new(NoopContext))
        });
        engine.shutdown();
        assert!(!engine.is_acquired());
    }
}
