use chrono::Utc;
use parking_lot::Mutex;
use piano_core::session::spawn_playback;
use piano_core::{Melody, Note, NotePlayer};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use uuid::Uuid;

#[derive(Default)]
struct TimedPlayer {
    calls: Mutex<Vec<(Note, Instant)>>,
}

impl NotePlayer for TimedPlayer {
    fn play_note(&self, note: Note) {
        self.calls.lock().push((note, Instant::now()));
    }
}

fn slots(notes: &[Note]) -> Vec<Option<Note>> {
    notes.iter().copied().map(Some).collect()
}

#[tokio::test(start_paused = true)]
async fn notes_play_in_order_600ms_apart() {
    let player = Arc::new(TimedPlayer::default());
    let started = Instant::now();

    spawn_playback(
        player.clone(),
        slots(&[Note::C4, Note::E4, Note::G4]),
        Duration::from_millis(600),
    )
    .await
    .unwrap();

    let calls = player.calls.lock().clone();
    let notes: Vec<Note> = calls.iter().map(|(note, _)| *note).collect();
    assert_eq!(notes, vec![Note::C4, Note::E4, Note::G4]);

    let offsets: Vec<Duration> = calls.iter().map(|(_, at)| *at - started).collect();
    assert_eq!(
        offsets,
        vec![
            Duration::ZERO,
            Duration::from_millis(600),
            Duration::from_millis(1200)
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn playback_does_not_block_the_caller() {
    let player = Arc::new(TimedPlayer::default());
    let handle = spawn_playback(
        player.clone(),
        slots(&[Note::A4, Note::B4]),
        Duration::from_millis(600),
    );

    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(player.calls.lock().len(), 1);
    assert!(!handle.is_finished());

    handle.await.unwrap();
    assert_eq!(player.calls.lock().len(), 2);
}

#[tokio::test(start_paused = true)]
async fn concurrent_playbacks_run_independently() {
    let player = Arc::new(TimedPlayer::default());
    let first = spawn_playback(player.clone(), slots(&[Note::C4, Note::D4]), Duration::from_millis(600));
    tokio::time::sleep(Duration::from_millis(300)).await;
    let second = spawn_playback(player.clone(), slots(&[Note::E4, Note::F4]), Duration::from_millis(600));

    first.await.unwrap();
    second.await.unwrap();

    let notes: Vec<Note> = player.calls.lock().iter().map(|(note, _)| *note).collect();
    assert_eq!(notes, vec![Note::C4, Note::E4, Note::D4, Note::F4]);
}

#[tokio::test(start_paused = true)]
async fn unknown_stored_names_keep_their_slot() {
    let melody = Melody {
        id: Uuid::new_v4(),
        title: "imported".into(),
        notes: vec!["C4".into(), "bogus".into(), "E4".into()],
        created_at: Utc::now(),
    };
    let player = Arc::new(TimedPlayer::default());
    let started = Instant::now();

    spawn_playback(player.clone(), melody.replay_notes(), Duration::from_millis(600))
        .await
        .unwrap();

    let calls: Vec<(Note, Duration)> = player
        .calls
        .lock()
        .iter()
        .map(|(note, at)| (*note, *at - started))
        .collect();
    assert_eq!(
        calls,
        vec![
            (Note::C4, Duration::ZERO),
            (Note::E4, Duration::from_millis(1200))
        ]
    );
    assert_eq!(Instant::now() - started, Duration::from_millis(1800));
}
