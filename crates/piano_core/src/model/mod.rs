//! Domain model for the piano and its saved melodies.
//!
//! # Responsibility
//! - Define the fixed note table shared by input, audio and playback.
//! - Define the persisted melody shape and its creation draft.
//!
//! # Invariants
//! - Every melody is identified by a stable `MelodyId`.
//! - Melodies are append-only: no update or delete exists.

pub mod melody;
pub mod note;
