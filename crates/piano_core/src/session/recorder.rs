use super::playback::{spawn_playback, DEFAULT_NOTE_GAP};
use super::store::{MelodyStore, TitlePrompt};
use crate::audio::NotePlayer;
use crate::model::melody::{Melody, NewMelody};
use crate::model::note::Note;
use log::{error, info, warn};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

/// Shown when save is requested before anything was recorded.
pub const NOTHING_RECORDED_WARNING: &str = "Please record some notes first!";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecorderState {
    Idle,
    Recording,
}

/// Result of a save request, for the front-end to report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveOutcome {
    /// Nothing recorded; no store call was made.
    NothingRecorded,
    /// The title prompt was cancelled or left blank.
    Cancelled,
    /// The store accepted the melody.
    Saved(Melody),
    /// The store call failed; the recording is kept.
    Failed(String),
}

/// Recording state machine plus saved-melody list and replay.
pub struct PianoSession<S: MelodyStore> {
    store: S,
    player: Arc<dyn NotePlayer>,
    state: RecorderState,
    current: Vec<Note>,
    melodies: Vec<Melody>,
    note_gap: Duration,
}

impl<S: MelodyStore> PianoSession<S> {
    pub fn new(store: S, player: Arc<dyn NotePlayer>) -> Self {
        Self {
            store,
            player,
            state: RecorderState::Idle,
            current: Vec::new(),
            melodies: Vec::new(),
            note_gap: DEFAULT_NOTE_GAP,
        }
    }

    pub fn with_note_gap(mut self, gap: Duration) -> Self {
        self.note_gap = gap;
        self
    }

    pub fn state(&self) -> RecorderState {
        self.state
    }

    pub fn is_recording(&self) -> bool {
        self.state == RecorderState::Recording
    }

    /// Notes captured by the current (or last stopped) recording.
    pub fn current_notes(&self) -> &[Note] {
        &self.current
    }

    /// Saved melodies as of the last refresh, newest first.
    pub fn melodies(&self) -> &[Melody] {
        &self.melodies
    }

    /// Enters Recording with an empty sequence.
    pub fn start_recording(&mut self) {
        self.state = RecorderState::Recording;
        self.current.clear();
        info!("event=recording module=session status=start");
    }

    /// Returns to Idle, keeping the captured notes for a later save.
    pub fn stop_recording(&mut self) {
        self.state = RecorderState::Idle;
        info!(
            "event=recording module=session status=stop note_count={}",
            self.current.len()
        );
    }

    /// Played-note notification. Appends while Recording, ignored while Idle.
    pub fn note_played(&mut self, note: Note) -> bool {
        if self.state != RecorderState::Recording {
            return false;
        }
        self.current.push(note);
        true
    }

    /// Persists the current recording under a prompted title.
    ///
    /// # Contract
    /// - Empty recording: no prompt, no store call, nothing changes.
    /// - Cancelled or blank title: nothing changes.
    /// - Success: exactly one `create`, then the list is refreshed, the
    ///   recording cleared and the state set to Idle.
    /// - Failure: logged; recording and state are kept.
    pub async fn save(&mut self, prompt: &mut dyn TitlePrompt) -> SaveOutcome {
        if self.current.is_empty() {
            warn!("event=melody_save module=session status=skipped reason=empty_recording");
            return SaveOutcome::NothingRecorded;
        }

        let title = match prompt.ask_title().await {
            Some(title) if !title.trim().is_empty() => title.trim().to_string(),
            _ => {
                info!("event=melody_save module=session status=cancelled");
                return SaveOutcome::Cancelled;
            }
        };

        let draft = NewMelody::from_recording(title, &self.current);
        match self.store.create(&draft).await {
            Ok(melody) => {
                info!(
                    "event=melody_save module=session status=ok melody_id={} note_count={}",
                    melody.id,
                    melody.notes.len()
                );
                self.refresh_melodies().await;
                self.current.clear();
                self.state = RecorderState::Idle;
                SaveOutcome::Saved(melody)
            }
            Err(err) => {
                error!("event=melody_save module=session status=error error={err}");
                SaveOutcome::Failed(err.to_string())
            }
        }
    }

    /// Reloads the saved-melody list. On failure the previous list is kept.
    pub async fn refresh_melodies(&mut self) -> bool {
        match self.store.list().await {
            Ok(melodies) => {
                self.melodies = melodies;
                true
            }
            Err(err) => {
                error!("event=melody_list module=session status=error error={err}");
                false
            }
        }
    }

    /// Replays a melody in the background; see [`spawn_playback`].
    ///
    /// Concurrent replays are allowed and cut each other off on the
    /// single-voice engine. Replayed notes are never recorded. Unknown stored
    /// names are silent but keep their place in the timing.
    pub fn play_melody(&self, melody: &Melody) -> JoinHandle<()> {
        spawn_playback(
            Arc::clone(&self.player),
            melody.replay_notes(),
            self.note_gap,
        )
    }

    /// Replays the saved melody at `index` of the current list.
    pub fn play_saved(&self, index: usize) -> Option<JoinHandle<()>> {
        self.melodies.get(index).map(|melody| self.play_melody(melody))
    }
}
