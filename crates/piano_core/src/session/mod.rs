//! Recording and replay of melodies on the front-end.
//!
//! # Responsibility
//! - Track the Idle/Recording state and the captured note sequence.
//! - Save recordings through a `MelodyStore` and keep the saved list fresh.
//! - Replay saved melodies with a fixed gap between notes.
//!
//! # Invariants
//! - Captured notes are append-only and in play order.
//! - Notes are captured only while Recording.
//! - Replay never feeds back into the recording.

mod playback;
mod recorder;
mod store;

pub use playback::{spawn_playback, DEFAULT_NOTE_GAP};
pub use recorder::{PianoSession, RecorderState, SaveOutcome, NOTHING_RECORDED_WARNING};
pub use store::{MelodyStore, StoreError, TitlePrompt};
