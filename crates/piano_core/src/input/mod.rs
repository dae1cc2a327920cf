//! Keyboard and on-screen key input.
//!
//! # Responsibility
//! - Expose the rendered key table and the computer-keyboard mapping.
//! - Sound mapped notes and report them to the caller's callback.
//!
//! # Invariants
//! - Exactly 13 rendered keys, in pitch order.
//! - Keyboard lookup is case-insensitive; unmapped input is ignored.

use crate::audio::NotePlayer;
use crate::model::note::{KeyClass, Note};
use std::sync::Arc;

/// One rendered piano key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PianoKey {
    pub note: Note,
    pub class: KeyClass,
    pub label: &'static str,
}

/// Computer keys laid out like a piano: home row for white, top row for black.
const KEYBOARD_MAP: [(char, Note); 13] = [
    ('a', Note::C4),
    ('w', Note::CSharp4),
    ('s', Note::D4),
    ('e', Note::DSharp4),
    ('d', Note::E4),
    ('f', Note::F4),
    ('t', Note::FSharp4),
    ('g', Note::G4),
    ('y', Note::GSharp4),
    ('h', Note::A4),
    ('u', Note::ASharp4),
    ('j', Note::B4),
    ('k', Note::C5),
];

/// Returns the 13 rendered keys in pitch order.
pub fn piano_keys() -> [PianoKey; 13] {
    Note::ALL.map(|note| PianoKey {
        note,
        class: note.key_class(),
        label: note.label(),
    })
}

/// Maps a computer key to its note, ignoring case.
pub fn note_for_key(key: char) -> Option<Note> {
    let lowered = key.to_ascii_lowercase();
    KEYBOARD_MAP
        .iter()
        .find(|(mapped, _)| *mapped == lowered)
        .map(|(_, note)| *note)
}

/// Computer key bound to a note.
pub fn key_for_note(note: Note) -> char {
    KEYBOARD_MAP
        .iter()
        .find(|(_, mapped)| *mapped == note)
        .map(|(key, _)| *key)
        .unwrap_or('?')
}

/// Routes key presses and key clicks to the audio engine.
#[derive(Clone)]
pub struct KeyInputMapper {
    player: Arc<dyn NotePlayer>,
}

impl KeyInputMapper {
    pub fn new(player: Arc<dyn NotePlayer>) -> Self {
        Self { player }
    }

    /// Handles a key press. Returns the played note, or `None` when unmapped.
    pub fn key_down(&self, key: char, on_note: impl FnOnce(Note)) -> Option<Note> {
        let note = note_for_key(key)?;
        self.trigger(note, on_note);
        Some(note)
    }

    /// Handles a click on rendered key `index` (0-based, pitch order).
    pub fn click(&self, index: usize, on_note: impl FnOnce(Note)) -> Option<Note> {
        let note = Note::ALL.get(index).copied()?;
        self.trigger(note, on_note);
        Some(note)
    }

    fn trigger(&self, note: Note, on_note: impl FnOnce(Note)) {
        self.player.play_note(note);
        on_note(note);
    }
}

#[cfg(test)]
mod tests {
    use super::{key_for_note, note_for_key, piano_keys};
    use crate::model::note::{KeyClass, Note};

    #[test]
    fn key_table_matches_note_order() {
        let keys = piano_keys();
        assert_eq!(keys[0].note, Note::C4);
        assert_eq!(keys[1].class, KeyClass::Black);
        assert_eq!(keys[1].label, "C#");
        assert_eq!(keys[12].note, Note::C5);
        assert_eq!(keys[12].label, "C");
    }

    #[test]
    fn keyboard_lookup_ignores_case() {
        assert_eq!(note_for_key('a'), Some(Note::C4));
        assert_eq!(note_for_key('K'), Some(Note::C5));
        assert_eq!(note_for_key('T'), Some(Note::FSharp4));
        assert_eq!(note_for_key('z'), None);
        assert_eq!(note_for_key('1'), None);
    }

    #[test]
    fn every_note_has_a_key() {
        for note in Note::ALL {
            assert_eq!(note_for_key(key_for_note(note)), Some(note));
        }
    }
}
