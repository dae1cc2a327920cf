use crate::audio::NotePlayer;
use crate::model::note::Note;
use log::{debug, info};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

/// Delay between the starts of two consecutive notes during replay.
pub const DEFAULT_NOTE_GAP: Duration = Duration::from_millis(600);

/// Replays `notes` in order on a background task.
///
/// Each note is started, then the task sleeps `gap` before the next one.
/// A `None` slot sounds nothing but still takes its `gap`.
/// The task is not cancelled by anything in this crate; it runs to the end
/// unless the caller aborts the returned handle. Must be called from within
/// a tokio runtime.
pub fn spawn_playback(
    player: Arc<dyn NotePlayer>,
    notes: Vec<Option<Note>>,
    gap: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        info!(
            "event=melody_playback module=session status=start note_count={}",
            notes.len()
        );
        for (position, slot) in notes.iter().enumerate() {
            match slot {
                Some(note) => {
                    debug!("event=melody_playback module=session status=note note={note}");
                    player.play_note(*note);
                }
                None => debug!(
                    "event=melody_playback module=session status=skipped reason=unknown_note position={position}"
                ),
            }
            tokio::time::sleep(gap).await;
        }
        info!("event=melody_playback module=session status=ok");
    })
}
