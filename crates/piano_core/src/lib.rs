//! Core domain logic for the virtual piano.
//! This crate owns the note table, melody storage and the playback/recording
//! rules shared by the HTTP service and the terminal piano.

pub mod audio;
pub mod db;
pub mod input;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;
pub mod session;

pub use audio::{
    AudioContext, AudioContextFactory, AudioEngine, AudioError, AudioResult, NotePlayer,
    SharedAudioEngine, SilentAudioContext, ToneId,
};
pub use input::{key_for_note, note_for_key, piano_keys, KeyInputMapper, PianoKey};
pub use logging::{default_log_level, init_logging_for, init_stderr_logging};
pub use model::melody::{Melody, MelodyId, MelodyValidationError, NewMelody};
pub use model::note::{KeyClass, Note};
pub use repo::melody_repo::{MelodyRepository, RepoError, RepoResult, SqliteMelodyRepository};
pub use service::melody_service::{parse_melody_id, MelodyService, MelodyServiceError};
pub use session::{
    MelodyStore, PianoSession, RecorderState, SaveOutcome, StoreError, TitlePrompt,
};
