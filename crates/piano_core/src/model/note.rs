//! Playable note table.
//!
//! # Responsibility
//! - Define the 13 pitches the piano can sound, in pitch order.
//! - Map each pitch to its fixed frequency, key colour and key label.
//!
//! # Invariants
//! - The table is fixed at compile time and ordered from `C4` to `C5`.
//! - Name lookup is exact on the canonical name (`"C#4"`, not `"c#4"`).

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// One of the 13 pitches from middle C up to the next C.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Note {
    C4,
    CSharp4,
    D4,
    DSharp4,
    E4,
    F4,
    FSharp4,
    G4,
    GSharp4,
    A4,
    ASharp4,
    B4,
    C5,
}

/// Colour of the rendered piano key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyClass {
    White,
    Black,
}

impl Note {
    /// All playable notes in pitch order.
    pub const ALL: [Note; 13] = [
        Note::C4,
        Note::CSharp4,
        Note::D4,
        Note::DSharp4,
        Note::E4,
        Note::F4,
        Note::FSharp4,
        Note::G4,
        Note::GSharp4,
        Note::A4,
        Note::ASharp4,
        Note::B4,
        Note::C5,
    ];

    /// Canonical pitch name, e.g. `"C#4"`.
    pub fn name(self) -> &'static str {
        match self {
            Note::C4 => "C4",
            Note::CSharp4 => "C#4",
            Note::D4 => "D4",
            Note::DSharp4 => "D#4",
            Note::E4 => "E4",
            Note::F4 => "F4",
            Note::FSharp4 => "F#4",
            Note::G4 => "G4",
            Note::GSharp4 => "G#4",
            Note::A4 => "A4",
            Note::ASharp4 => "A#4",
            Note::B4 => "B4",
            Note::C5 => "C5",
        }
    }

    /// Equal-tempered frequency in Hz (A4 = 440 Hz).
    pub fn frequency_hz(self) -> f32 {
        match self {
            Note::C4 => 261.63,
            Note::CSharp4 => 277.18,
            Note::D4 => 293.66,
            Note::DSharp4 => 311.13,
            Note::E4 => 329.63,
            Note::F4 => 349.23,
            Note::FSharp4 => 369.99,
            Note::G4 => 392.00,
            Note::GSharp4 => 415.30,
            Note::A4 => 440.00,
            Note::ASharp4 => 466.16,
            Note::B4 => 493.88,
            Note::C5 => 523.25,
        }
    }

    pub fn key_class(self) -> KeyClass {
        match self {
            Note::CSharp4 | Note::DSharp4 | Note::FSharp4 | Note::GSharp4 | Note::ASharp4 => {
                KeyClass::Black
            }
            _ => KeyClass::White,
        }
    }

    /// Label printed on the rendered key (octave omitted).
    pub fn label(self) -> &'static str {
        let name = self.name();
        &name[..name.len() - 1]
    }

    /// Parses a canonical pitch name. Surrounding whitespace is ignored.
    pub fn from_name(value: &str) -> Option<Note> {
        let trimmed = value.trim();
        Note::ALL.into_iter().find(|note| note.name() == trimmed)
    }
}

impl Display for Note {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl TryFrom<String> for Note {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Note::from_name(&value).ok_or_else(|| format!("unknown note name `{value}`"))
    }
}

impl From<Note> for String {
    fn from(value: Note) -> Self {
        value.name().to_string()
    }
}
