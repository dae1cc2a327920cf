//! Melody store contract used by the front-end session.

use crate::model::melody::{Melody, NewMelody};
use async_trait::async_trait;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Failure of a remote melody store call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The request never got a response (connection refused, timeout...).
    Transport(String),
    /// The backend answered with a non-success status.
    Rejected { status: u16, message: String },
    /// The response body could not be decoded.
    Decode(String),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Transport(message) => write!(f, "melody store unreachable: {message}"),
            Self::Rejected { status, message } => {
                write!(f, "melody store rejected request ({status}): {message}")
            }
            Self::Decode(message) => write!(f, "invalid melody store response: {message}"),
        }
    }
}

impl Error for StoreError {}

/// Saved-melody backend as seen by the front-end.
#[async_trait]
pub trait MelodyStore: Send + Sync {
    /// All saved melodies, newest first.
    async fn list(&self) -> Result<Vec<Melody>, StoreError>;
    /// Submits a new melody and returns the stored record.
    async fn create(&self, draft: &NewMelody) -> Result<Melody, StoreError>;
}

/// Source of a melody title at save time.
#[async_trait]
pub trait TitlePrompt: Send {
    /// Returns `None` when the user cancels.
    async fn ask_title(&mut self) -> Option<String>;
}
