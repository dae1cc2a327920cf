//! Monophonic note playback.
//!
//! # Responsibility
//! - Own the audio output context and its acquire/release lifecycle.
//! - Turn note names into fixed-length tones, one at a time.
//!
//! # Invariants
//! - The output context is acquired lazily on the first played note.
//! - At most one tone is active; a new tone stops the previous one first.
//! - Audio failures are logged and never propagated to callers.

use crate::model::note::Note;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Duration;

#[cfg(feature = "audio-device")]
mod device;
mod engine;
mod silent;

#[cfg(feature = "audio-device")]
pub use device::CpalAudioContext;
pub use engine::{AudioEngine, SharedAudioEngine, DEFAULT_TONE_DURATION};
pub use silent::SilentAudioContext;

pub type AudioResult<T> = Result<T, AudioError>;

/// Handle of one started tone, unique within its context.
pub type ToneId = u64;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AudioError {
    /// No usable output device or context could be acquired.
    Unavailable(String),
    /// The backend failed while starting, stopping or closing a tone.
    Backend(String),
}

impl Display for AudioError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unavailable(message) => write!(f, "audio output unavailable: {message}"),
            Self::Backend(message) => write!(f, "audio backend error: {message}"),
        }
    }
}

impl Error for AudioError {}

/// An acquired audio output able to sound one oscillator tone at a time.
pub trait AudioContext: Send {
    /// Starts a tone that ends by itself after `duration`.
    fn start_tone(&mut self, frequency_hz: f32, duration: Duration) -> AudioResult<ToneId>;
    /// Stops a tone early. Stopping a finished tone is not an error.
    fn stop_tone(&mut self, tone: ToneId) -> AudioResult<()>;
    /// Releases the output. The context is not used afterwards.
    fn close(&mut self) -> AudioResult<()>;
}

/// Acquires audio contexts on demand.
pub trait AudioContextFactory: Send {
    fn acquire(&mut self) -> AudioResult<Box<dyn AudioContext>>;
}

impl<F> AudioContextFactory for F
where
    F: FnMut() -> AudioResult<Box<dyn AudioContext>> + Send,
{
    fn acquire(&mut self) -> AudioResult<Box<dyn AudioContext>> {
        self()
    }
}

/// Anything that can sound a note. Fire-and-forget.
pub trait NotePlayer: Send + Sync {
    fn play_note(&self, note: Note);
}
