//! Melody use-case service.
//!
//! # Responsibility
//! - Validate creation drafts and assign identity and timestamp.
//! - Provide list/create/get entry points for the HTTP surface.
//!
//! # Invariants
//! - Service APIs never bypass draft validation.
//! - `created_at` is truncated to millisecond precision so the returned
//!   record equals the stored one.
//! - Service layer remains storage-agnostic.

use crate::model::melody::{Melody, MelodyId, MelodyValidationError, NewMelody};
use crate::repo::melody_repo::{MelodyRepository, RepoError};
use chrono::{DateTime, TimeZone, Utc};
use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Service error for melody use-cases.
#[derive(Debug)]
pub enum MelodyServiceError {
    /// Draft failed validation.
    Validation(MelodyValidationError),
    /// No melody exists with this id.
    NotFound(MelodyId),
    /// Id text is not a valid melody id.
    InvalidId(String),
    /// Persistence-layer failure.
    Repo(RepoError),
}

impl Display for MelodyServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::NotFound(_) => write!(f, "Melody not found"),
            Self::InvalidId(value) => write!(f, "invalid melody id `{value}`"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for MelodyServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Repo(err) => Some(err),
            Self::NotFound(_) | Self::InvalidId(_) => None,
        }
    }
}

impl From<RepoError> for MelodyServiceError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

impl From<MelodyValidationError> for MelodyServiceError {
    fn from(value: MelodyValidationError) -> Self {
        Self::Validation(value)
    }
}

/// Parses melody id text as used in request paths.
pub fn parse_melody_id(value: &str) -> Result<MelodyId, MelodyServiceError> {
    Uuid::parse_str(value.trim()).map_err(|_| MelodyServiceError::InvalidId(value.to_string()))
}

/// Melody service facade over repository implementations.
pub struct MelodyService<R: MelodyRepository> {
    repo: R,
}

impl<R: MelodyRepository> MelodyService<R> {
    /// Creates a service using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Validates a draft and persists it as a new melody.
    ///
    /// # Contract
    /// - Title is trimmed; notes keep submitted order exactly.
    /// - Returns the stored record including generated id and timestamp.
    pub fn create_melody(&mut self, draft: &NewMelody) -> Result<Melody, MelodyServiceError> {
        let (title, notes) = match draft.validate() {
            Ok(valid) => valid,
            Err(err) => {
                warn!("event=melody_create module=service status=rejected reason={err}");
                return Err(err.into());
            }
        };

        let melody = Melody {
            id: Uuid::new_v4(),
            title,
            notes,
            created_at: now_millis(),
        };
        self.repo.insert_melody(&melody)?;

        info!(
            "event=melody_create module=service status=ok melody_id={} note_count={}",
            melody.id,
            melody.notes.len()
        );
        Ok(melody)
    }

    /// Lists all melodies, newest first.
    pub fn list_melodies(&self) -> Result<Vec<Melody>, MelodyServiceError> {
        Ok(self.repo.list_melodies()?)
    }

    /// Gets one melody by id.
    ///
    /// Returns `NotFound` when no melody has this id.
    pub fn get_melody(&self, id: MelodyId) -> Result<Melody, MelodyServiceError> {
        self.repo
            .get_melody(id)?
            .ok_or(MelodyServiceError::NotFound(id))
    }
}

fn now_millis() -> DateTime<Utc> {
    let now = Utc::now();
    Utc.timestamp_millis_opt(now.timestamp_millis())
        .single()
        .unwrap_or(now)
}
