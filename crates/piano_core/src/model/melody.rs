//! Melody domain model.
//!
//! # Responsibility
//! - Define the persisted melody record and its creation draft.
//! - Validate drafts before they reach storage.
//!
//! # Invariants
//! - `title` is trimmed and non-empty.
//! - `notes` is non-empty and keeps recorded order.
//! - A melody is never mutated after creation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

use super::note::Note;

/// Stable identifier assigned by the service at insert time.
pub type MelodyId = Uuid;

/// Persisted melody record.
///
/// Serialized with the wire names used by the REST API (`_id`, `createdAt`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Melody {
    #[serde(rename = "_id")]
    pub id: MelodyId,
    pub title: String,
    /// Pitch names in recorded order. Stored verbatim.
    pub notes: Vec<String>,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
}

impl Melody {
    /// Stored notes resolved against the note table, one slot per stored
    /// name. Names outside the table resolve to `None`.
    pub fn replay_notes(&self) -> Vec<Option<Note>> {
        self.notes.iter().map(|name| Note::from_name(name)).collect()
    }
}

/// Creation request for a melody.
///
/// Both fields are optional so that a missing field can be reported as a
/// validation failure instead of a decode failure.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewMelody {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub notes: Option<Vec<String>>,
}

impl NewMelody {
    pub fn new(title: impl Into<String>, notes: Vec<String>) -> Self {
        Self {
            title: Some(title.into()),
            notes: Some(notes),
        }
    }

    /// Builds a draft from recorded notes.
    pub fn from_recording(title: impl Into<String>, notes: &[Note]) -> Self {
        Self::new(title, notes.iter().map(|note| note.name().to_string()).collect())
    }

    /// Validates and normalizes the draft into `(title, notes)`.
    ///
    /// # Errors
    /// - `MissingTitle` when the title is absent or blank after trimming.
    /// - `MissingNotes` when notes are absent or empty.
    /// - `BlankNote` when any entry is blank.
    pub fn validate(&self) -> Result<(String, Vec<String>), MelodyValidationError> {
        let title = self
            .title
            .as_deref()
            .map(str::trim)
            .filter(|title| !title.is_empty())
            .ok_or(MelodyValidationError::MissingTitle)?;

        let notes = match self.notes.as_deref() {
            Some(notes) if !notes.is_empty() => notes,
            _ => return Err(MelodyValidationError::MissingNotes),
        };

        if let Some(index) = notes.iter().position(|note| note.trim().is_empty()) {
            return Err(MelodyValidationError::BlankNote { index });
        }

        Ok((title.to_string(), notes.to_vec()))
    }
}

/// Draft validation failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MelodyValidationError {
    MissingTitle,
    MissingNotes,
    BlankNote { index: usize },
}

impl Display for MelodyValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingTitle => write!(f, "melody validation failed: title is required"),
            Self::MissingNotes => {
                write!(f, "melody validation failed: notes must be a non-empty list")
            }
            Self::BlankNote { index } => {
                write!(f, "melody validation failed: notes[{index}] is blank")
            }
        }
    }
}

impl Error for MelodyValidationError {}
