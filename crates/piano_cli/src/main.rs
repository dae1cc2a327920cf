//! Terminal piano entry point.

use anyhow::Result;
use log::info;
use piano_cli::{HttpMelodyStore, Terminal, DEFAULT_API_URL};
use piano_core::{
    default_log_level, init_logging_for, init_stderr_logging, AudioContext, AudioContextFactory,
    AudioEngine, AudioResult, KeyInputMapper, PianoSession, SharedAudioEngine,
};
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<()> {
    start_logging();

    let api_url = env_or("PIANO_API_URL", DEFAULT_API_URL);
    let store = HttpMelodyStore::new(&api_url);
    info!("event=cli_start module=cli status=ok endpoint={}", store.endpoint());

    let engine = SharedAudioEngine::new(AudioEngine::new(audio_factory()));
    let session = PianoSession::new(store, Arc::new(engine.clone()));
    let mapper = KeyInputMapper::new(Arc::new(engine.clone()));

    let mut terminal = Terminal::new(session, mapper, tokio::io::stdin(), std::io::stdout());
    if let Some(notice) = AUDIO_NOTICE {
        terminal = terminal.with_notice(notice);
    }
    let result = terminal.run().await;
    engine.shutdown();
    result
}

#[cfg(feature = "audio-device")]
const AUDIO_NOTICE: Option<&str> = None;

#[cfg(not(feature = "audio-device"))]
const AUDIO_NOTICE: Option<&str> = Some(
    "Sound is off in this build: notes are only logged. Rebuild with `--features audio-device` to hear them.",
);

#[cfg(feature = "audio-device")]
fn audio_factory() -> impl AudioContextFactory {
    || -> AudioResult<Box<dyn AudioContext>> {
        Ok(Box::new(piano_core::audio::CpalAudioContext::open()?))
    }
}

#[cfg(not(feature = "audio-device"))]
fn audio_factory() -> impl AudioContextFactory {
    || -> AudioResult<Box<dyn AudioContext>> {
        Ok(Box::new(piano_core::SilentAudioContext::new()))
    }
}

fn start_logging() {
    let level = env_or("PIANO_LOG_LEVEL", default_log_level());
    let log_dir = std::env::current_dir()
        .unwrap_or_else(|_| std::env::temp_dir())
        .join(env_or("PIANO_LOG_DIR", "logs"));
    if init_logging_for(&level, &log_dir.to_string_lossy(), "cli").is_err() {
        // The terminal is the UI; keep stderr quiet unless something is wrong.
        init_stderr_logging("warn");
    }
}

fn env_or(key: &str, fallback: &str) -> String {
    std::env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .unwrap_or_else(|| fallback.to_string())
}
