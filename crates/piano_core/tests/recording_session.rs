use async_trait::async_trait;
use chrono::Utc;
use parking_lot::Mutex;
use piano_core::{
    KeyInputMapper, Melody, MelodyStore, NewMelody, Note, NotePlayer, PianoSession,
    RecorderState, SaveOutcome, StoreError, TitlePrompt,
};
use std::sync::Arc;
use uuid::Uuid;

#[derive(Default)]
struct RecordingPlayer {
    played: Mutex<Vec<Note>>,
}

impl NotePlayer for RecordingPlayer {
    fn play_note(&self, note: Note) {
        self.played.lock().push(note);
    }
}

#[derive(Default)]
struct FakeStoreState {
    saved: Vec<Melody>,
    create_calls: Vec<NewMelody>,
    list_calls: usize,
    fail_create: bool,
}

#[derive(Clone, Default)]
struct FakeStore(Arc<Mutex<FakeStoreState>>);

#[async_trait]
impl MelodyStore for FakeStore {
    async fn list(&self) -> Result<Vec<Melody>, StoreError> {
        let mut state = self.0.lock();
        state.list_calls += 1;
        let mut melodies = state.saved.clone();
        melodies.reverse();
        Ok(melodies)
    }

    async fn create(&self, draft: &NewMelody) -> Result<Melody, StoreError> {
        let mut state = self.0.lock();
        state.create_calls.push(draft.clone());
        if state.fail_create {
            return Err(StoreError::Rejected {
                status: 400,
                message: "melody validation failed".into(),
            });
        }
        let melody = Melody {
            id: Uuid::new_v4(),
            title: draft.title.clone().unwrap_or_default(),
            notes: draft.notes.clone().unwrap_or_default(),
            created_at: Utc::now(),
        };
        state.saved.push(melody.clone());
        Ok(melody)
    }
}

struct FixedPrompt {
    answer: Option<String>,
    asked: usize,
}

impl FixedPrompt {
    fn answering(answer: Option<&str>) -> Self {
        Self {
            answer: answer.map(str::to_string),
            asked: 0,
        }
    }
}

#[async_trait]
impl TitlePrompt for FixedPrompt {
    async fn ask_title(&mut self) -> Option<String> {
        self.asked += 1;
        self.answer.clone()
    }
}

fn session() -> (PianoSession<FakeStore>, FakeStore, Arc<RecordingPlayer>) {
    let store = FakeStore::default();
    let player = Arc::new(RecordingPlayer::default());
    let session = PianoSession::new(store.clone(), player.clone());
    (session, store, player)
}

#[test]
fn start_recording_resets_sequence() {
    let (mut session, _, _) = session();
    session.start_recording();
    session.note_played(Note::C4);
    session.stop_recording();
    assert_eq!(session.current_notes(), &[Note::C4]);

    session.start_recording();
    assert_eq!(session.state(), RecorderState::Recording);
    assert!(session.current_notes().is_empty());
}

#[test]
fn notes_are_captured_only_while_recording() {
    let (mut session, _, _) = session();

    assert!(!session.note_played(Note::C4));
    session.start_recording();
    assert!(session.note_played(Note::E4));
    assert!(session.note_played(Note::E4));
    assert!(session.note_played(Note::G4));
    session.stop_recording();
    assert!(!session.note_played(Note::A4));

    assert_eq!(session.state(), RecorderState::Idle);
    assert_eq!(session.current_notes(), &[Note::E4, Note::E4, Note::G4]);
}

#[test]
fn key_input_feeds_player_and_recording() {
    let (mut session, _, player) = session();
    let mapper = KeyInputMapper::new(player.clone());

    session.start_recording();
    for key in ['a', 'D', 'z', 'g'] {
        mapper.key_down(key, |note| {
            session.note_played(note);
        });
    }
    assert_eq!(mapper.click(12, |note| {
        session.note_played(note);
    }), Some(Note::C5));
    assert_eq!(mapper.click(13, |_| panic!("out of range key")), None);

    let expected = vec![Note::C4, Note::E4, Note::G4, Note::C5];
    assert_eq!(session.current_notes(), expected.as_slice());
    assert_eq!(*player.played.lock(), expected);
}

#[tokio::test]
async fn save_with_empty_recording_does_nothing() {
    let (mut session, store, _) = session();
    let mut prompt = FixedPrompt::answering(Some("never asked"));

    session.start_recording();
    let outcome = session.save(&mut prompt).await;

    assert_eq!(outcome, SaveOutcome::NothingRecorded);
    assert_eq!(prompt.asked, 0);
    assert_eq!(session.state(), RecorderState::Recording);
    let state = store.0.lock();
    assert!(state.create_calls.is_empty());
    assert_eq!(state.list_calls, 0);
}

#[tokio::test]
async fn cancelled_or_blank_title_aborts_save() {
    let (mut session, store, _) = session();
    session.start_recording();
    session.note_played(Note::D4);

    for answer in [None, Some("   ")] {
        let mut prompt = FixedPrompt::answering(answer);
        assert_eq!(session.save(&mut prompt).await, SaveOutcome::Cancelled);
        assert_eq!(prompt.asked, 1);
    }

    assert_eq!(session.current_notes(), &[Note::D4]);
    assert!(session.is_recording());
    assert!(store.0.lock().create_calls.is_empty());
}

#[tokio::test]
async fn save_creates_once_then_clears_and_refreshes() {
    let (mut session, store, _) = session();
    session.start_recording();
    for note in [Note::C4, Note::E4, Note::G4, Note::C4] {
        session.note_played(note);
    }

    let mut prompt = FixedPrompt::answering(Some("  arpeggio "));
    let outcome = session.save(&mut prompt).await;

    let melody = match outcome {
        SaveOutcome::Saved(melody) => melody,
        other => panic!("expected saved outcome, got {other:?}"),
    };
    assert_eq!(melody.title, "arpeggio");

    {
        let state = store.0.lock();
        assert_eq!(
            state.create_calls,
            vec![NewMelody::new(
                "arpeggio",
                vec!["C4".into(), "E4".into(), "G4".into(), "C4".into()]
            )]
        );
        assert_eq!(state.list_calls, 1);
    }
    assert!(session.current_notes().is_empty());
    assert_eq!(session.state(), RecorderState::Idle);
    assert_eq!(session.melodies(), &[melody]);
}

#[tokio::test]
async fn failed_save_keeps_recording() {
    let (mut session, store, _) = session();
    store.0.lock().fail_create = true;
    session.start_recording();
    session.note_played(Note::F4);
    session.stop_recording();

    let mut prompt = FixedPrompt::answering(Some("doomed"));
    match session.save(&mut prompt).await {
        SaveOutcome::Failed(message) => assert!(message.contains("400")),
        other => panic!("unexpected outcome: {other:?}"),
    }

    assert_eq!(session.current_notes(), &[Note::F4]);
    assert_eq!(store.0.lock().list_calls, 0);
}

#[tokio::test]
async fn refresh_replaces_list_newest_first() {
    let (mut session, store, _) = session();
    for title in ["one", "two"] {
        store
            .create(&NewMelody::new(title, vec!["C4".into()]))
            .await
            .unwrap();
    }

    assert!(session.refresh_melodies().await);
    let titles: Vec<&str> = session
        .melodies()
        .iter()
        .map(|melody| melody.title.as_str())
        .collect();
    assert_eq!(titles, vec!["two", "one"]);
}

#[tokio::test(start_paused = true)]
async fn replay_plays_saved_notes_without_recording_them() {
    let (mut session, store, player) = session();
    store
        .create(&NewMelody::new("motif", vec!["G4".into(), "bogus".into(), "E4".into()]))
        .await
        .unwrap();
    session.refresh_melodies().await;

    session.start_recording();
    let started = tokio::time::Instant::now();
    session.play_saved(0).expect("melody 0 exists").await.unwrap();
    assert!(session.play_saved(1).is_none());

    assert_eq!(*player.played.lock(), vec![Note::G4, Note::E4]);
    // The unknown name is silent but still takes its 600 ms slot.
    assert_eq!(
        tokio::time::Instant::now() - started,
        std::time::Duration::from_millis(1800)
    );
    assert!(session.current_notes().is_empty());
}
