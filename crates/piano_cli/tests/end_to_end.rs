use piano_cli::{HttpMelodyStore, Terminal};
use piano_core::{
    AudioContext, AudioEngine, AudioResult, KeyInputMapper, MelodyStore, NewMelody,
    PianoSession, SharedAudioEngine, SilentAudioContext, StoreError,
};
use piano_server::{router, MelodyStorage};
use std::sync::Arc;
use std::time::Duration;

async fn spawn_server() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let app = router(Arc::new(MelodyStorage::new(":memory:")));
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

fn silent_engine() -> SharedAudioEngine {
    SharedAudioEngine::new(AudioEngine::new(|| -> AudioResult<Box<dyn AudioContext>> {
        Ok(Box::new(SilentAudioContext::new()))
    }))
}

fn terminal(store: HttpMelodyStore, script: &'static str) -> Terminal<HttpMelodyStore, &'static [u8], Vec<u8>> {
    let engine = silent_engine();
    let session = PianoSession::new(store, Arc::new(engine.clone()))
        .with_note_gap(Duration::from_millis(1));
    let mapper = KeyInputMapper::new(Arc::new(engine));
    Terminal::new(session, mapper, script.as_bytes(), Vec::new()).with_key_gap(Duration::ZERO)
}

#[tokio::test]
async fn store_creates_and_lists_newest_first() {
    let store = HttpMelodyStore::new(&spawn_server().await);

    let first = store
        .create(&NewMelody::new("first", vec!["C4".into(), "G4".into()]))
        .await
        .unwrap();
    let second = store
        .create(&NewMelody::new(" second ", vec!["A#4".into(), "C5".into(), "A#4".into()]))
        .await
        .unwrap();
    assert_eq!(second.title, "second");
    assert_eq!(second.notes, vec!["A#4", "C5", "A#4"]);

    let listed = store.list().await.unwrap();
    assert_eq!(listed, vec![second, first]);
}

#[tokio::test]
async fn rejected_create_carries_backend_message() {
    let store = HttpMelodyStore::new(&spawn_server().await);

    let err = store
        .create(&NewMelody {
            title: None,
            notes: Some(vec!["C4".into()]),
        })
        .await
        .unwrap_err();
    match err {
        StoreError::Rejected { status, message } => {
            assert_eq!(status, 400);
            assert!(message.contains("title"), "{message}");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn unreachable_backend_is_a_transport_error() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let store = HttpMelodyStore::new(&format!("http://{addr}"));
    assert!(matches!(
        store.list().await.unwrap_err(),
        StoreError::Transport(_)
    ));
}

#[tokio::test]
async fn terminal_records_saves_and_lists() {
    let store = HttpMelodyStore::new(&spawn_server().await);
    let mut terminal = terminal(
        store,
        ":record\nasdf\nzz\n:click 13\n:stop\nhj\n:save\nFirst tune\n:list\n:play 1\n:quit\n",
    );

    terminal.run().await.unwrap();

    let melodies = terminal.session().melodies();
    assert_eq!(melodies.len(), 1);
    assert_eq!(melodies[0].title, "First tune");
    assert_eq!(melodies[0].notes, vec!["C4", "D4", "E4", "F4", "C5"]);
    assert!(terminal.session().current_notes().is_empty());

    let output = String::from_utf8(terminal.output().clone()).unwrap();
    assert!(output.contains("Saved \"First tune\"."), "{output}");
    assert!(output.contains("1. First tune (5 notes)"), "{output}");
    assert!(output.contains("Playing #1"), "{output}");
}

#[tokio::test]
async fn terminal_warns_when_nothing_was_recorded() {
    let store = HttpMelodyStore::new(&spawn_server().await);
    let mut terminal = terminal(store, "asdf\n:save\n:play 3\n:bogus\n");

    terminal.run().await.unwrap();

    let output = String::from_utf8(terminal.output().clone()).unwrap();
    assert!(output.contains("Please record some notes first!"), "{output}");
    assert!(output.contains("No melody #3"), "{output}");
    assert!(output.contains("unknown command `:bogus`"), "{output}");
    assert!(terminal.session().melodies().is_empty());
}

#[tokio::test]
async fn cancelled_title_keeps_the_recording() {
    let store = HttpMelodyStore::new(&spawn_server().await);
    let mut terminal = terminal(store, ":record\nggh\n:save\n   \n");

    terminal.run().await.unwrap();

    let output = String::from_utf8(terminal.output().clone()).unwrap();
    assert!(output.contains("Save cancelled."), "{output}");
    assert_eq!(terminal.session().current_notes().len(), 3);
}

#[tokio::test]
async fn notice_is_shown_at_startup_and_with_help() {
    let store = HttpMelodyStore::new(&spawn_server().await);
    let mut terminal = terminal(store, ":help\n").with_notice("Sound is off in this build.");

    terminal.run().await.unwrap();

    let output = String::from_utf8(terminal.output().clone()).unwrap();
    assert_eq!(output.matches("Sound is off in this build.").count(), 2, "{output}");
    assert!(output.contains(":record"), "{output}");
}
