//! Line-oriented piano front-end.
//!
//! Plain text lines are key presses (`asdf` plays C4 D4 E4 F4); lines
//! starting with `:` are commands. The title prompt reads from the same
//! input stream.

use async_trait::async_trait;
use piano_core::input::PianoKey;
use piano_core::session::NOTHING_RECORDED_WARNING;
use piano_core::{
    key_for_note, piano_keys, KeyClass, KeyInputMapper, Melody, MelodyStore, Note, PianoSession,
    SaveOutcome, TitlePrompt,
};
use std::io::Write;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader, Lines};

/// Pause between keys typed on one line, so each one is audible.
pub const DEFAULT_KEY_GAP: Duration = Duration::from_millis(200);

const HELP: &str = "\
Type keys and press Enter to play (a w s e d f t g y h u j k).
Commands:
  :record      start recording (clears the current recording)
  :stop        stop recording
  :save        save the current recording
  :list        reload saved melodies
  :play <n>    replay saved melody n
  :click <n>   press rendered key n (1-13)
  :keys        show the keyboard
  :help        show this help
  :quit        exit";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Keys(String),
    Click(usize),
    Record,
    Stop,
    Save,
    List,
    Play(usize),
    ShowKeys,
    Help,
    Quit,
}

/// Parses one input line. Numbers in commands are 1-based.
pub fn parse_command(line: &str) -> Result<Command, String> {
    let trimmed = line.trim();
    let Some(command) = trimmed.strip_prefix(':') else {
        return Ok(Command::Keys(trimmed.to_string()));
    };

    let mut parts = command.split_whitespace();
    let name = parts.next().unwrap_or_default().to_ascii_lowercase();
    let argument = parts.next();

    let position = |what: &str| -> Result<usize, String> {
        argument
            .and_then(|raw| raw.parse::<usize>().ok())
            .filter(|value| *value > 0)
            .ok_or_else(|| format!("usage: :{what} <n> (n starts at 1)"))
    };

    match name.as_str() {
        "record" | "r" => Ok(Command::Record),
        "stop" => Ok(Command::Stop),
        "save" => Ok(Command::Save),
        "list" | "ls" => Ok(Command::List),
        "play" | "p" => position("play").map(Command::Play),
        "click" | "c" => position("click").map(Command::Click),
        "keys" => Ok(Command::ShowKeys),
        "help" | "h" | "?" => Ok(Command::Help),
        "quit" | "q" | "exit" => Ok(Command::Quit),
        other => Err(format!("unknown command `:{other}`; try :help")),
    }
}

/// Text rendering of the 13 keys with their numbers and computer keys.
pub fn render_keyboard() -> String {
    let keys = piano_keys();
    let cell = |key: &PianoKey| match key.class {
        KeyClass::White => format!("[{:^3}]", key.label),
        KeyClass::Black => format!("[{:^3}]", key.label).to_lowercase(),
    };
    let labels: Vec<String> = keys.iter().map(cell).collect();
    let bindings: Vec<String> = keys
        .iter()
        .map(|key| format!(" {:^3} ", key_for_note(key.note)))
        .collect();
    let numbers: Vec<String> = (1..=keys.len()).map(|n| format!(" {n:^3} ")).collect();
    format!(
        "{}\n{}\n{}",
        labels.join(""),
        bindings.join(""),
        numbers.join("")
    )
}

pub fn render_melodies(melodies: &[Melody]) -> String {
    if melodies.is_empty() {
        return "No saved melodies yet.".to_string();
    }
    let mut out = String::from("Saved melodies:");
    for (index, melody) in melodies.iter().enumerate() {
        out.push_str(&format!(
            "\n  {}. {} ({} notes)",
            index + 1,
            melody.title,
            melody.notes.len()
        ));
    }
    out
}

pub fn render_recording(notes: &[Note]) -> String {
    let names: Vec<&str> = notes.iter().map(|note| note.name()).collect();
    format!("Current recording: {}", names.join(" - "))
}

struct LinePrompt<'a, R, W> {
    lines: &'a mut Lines<BufReader<R>>,
    out: &'a mut W,
}

#[async_trait]
impl<'a, R, W> TitlePrompt for LinePrompt<'a, R, W>
where
    R: AsyncRead + Unpin + Send,
    W: Write + Send,
{
    async fn ask_title(&mut self) -> Option<String> {
        let _ = write!(self.out, "Enter a title for your melody: ");
        let _ = self.out.flush();
        match self.lines.next_line().await {
            Ok(Some(line)) => Some(line),
            _ => None,
        }
    }
}

/// Interactive session over an input stream and an output sink.
pub struct Terminal<S: MelodyStore, R, W> {
    session: PianoSession<S>,
    mapper: KeyInputMapper,
    lines: Lines<BufReader<R>>,
    out: W,
    key_gap: Duration,
    notice: Option<String>,
}

impl<S, R, W> Terminal<S, R, W>
where
    S: MelodyStore,
    R: AsyncRead + Unpin + Send,
    W: Write + Send,
{
    pub fn new(session: PianoSession<S>, mapper: KeyInputMapper, input: R, out: W) -> Self {
        Self {
            session,
            mapper,
            lines: BufReader::new(input).lines(),
            out,
            key_gap: DEFAULT_KEY_GAP,
            notice: None,
        }
    }

    pub fn with_key_gap(mut self, gap: Duration) -> Self {
        self.key_gap = gap;
        self
    }

    /// Line shown at startup and after `:help`, e.g. about the audio backend.
    pub fn with_notice(mut self, notice: impl Into<String>) -> Self {
        self.notice = Some(notice.into());
        self
    }

    pub fn session(&self) -> &PianoSession<S> {
        &self.session
    }

    pub fn output(&self) -> &W {
        &self.out
    }

    /// Runs until `:quit` or end of input.
    pub async fn run(&mut self) -> anyhow::Result<()> {
        writeln!(self.out, "{}\n", render_keyboard())?;
        self.print_notice()?;
        writeln!(self.out, "Type :help for commands.")?;
        self.session.refresh_melodies().await;
        writeln!(self.out, "{}", render_melodies(self.session.melodies()))?;

        loop {
            write!(self.out, "> ")?;
            self.out.flush()?;
            let Some(line) = self.lines.next_line().await? else {
                break;
            };
            match parse_command(&line) {
                Ok(Command::Quit) => break,
                Ok(command) => self.execute(command).await?,
                Err(message) => writeln!(self.out, "{message}")?,
            }
        }
        Ok(())
    }

    async fn execute(&mut self, command: Command) -> anyhow::Result<()> {
        match command {
            Command::Keys(text) => self.play_keys(&text).await?,
            Command::Click(number) => {
                let session = &mut self.session;
                let played = self.mapper.click(number - 1, |note| {
                    session.note_played(note);
                });
                match played {
                    Some(note) => writeln!(self.out, "{note}")?,
                    None => writeln!(self.out, "No key #{number}")?,
                }
            }
            Command::Record => {
                self.session.start_recording();
                writeln!(self.out, "Recording...")?;
            }
            Command::Stop => {
                self.session.stop_recording();
                writeln!(self.out, "Stopped.")?;
                self.print_recording()?;
            }
            Command::Save => self.save().await?,
            Command::List => {
                if !self.session.refresh_melodies().await {
                    writeln!(self.out, "Could not reach the melody service.")?;
                }
                writeln!(self.out, "{}", render_melodies(self.session.melodies()))?;
            }
            Command::Play(number) => match self.session.play_saved(number - 1) {
                Some(_) => writeln!(self.out, "Playing #{number}")?,
                None => writeln!(self.out, "No melody #{number}")?,
            },
            Command::ShowKeys => writeln!(self.out, "{}", render_keyboard())?,
            Command::Help => {
                writeln!(self.out, "{HELP}")?;
                self.print_notice()?;
            }
            Command::Quit => {}
        }
        Ok(())
    }

    async fn play_keys(&mut self, text: &str) -> anyhow::Result<()> {
        let mut played = Vec::new();
        for key in text.chars().filter(|key| !key.is_whitespace()) {
            let session = &mut self.session;
            let Some(note) = self.mapper.key_down(key, |note| {
                session.note_played(note);
            }) else {
                continue;
            };
            played.push(note.name());
            if !self.key_gap.is_zero() {
                tokio::time::sleep(self.key_gap).await;
            }
        }
        if !played.is_empty() {
            writeln!(self.out, "{}", played.join(" "))?;
        }
        if self.session.is_recording() {
            self.print_recording()?;
        }
        Ok(())
    }

    async fn save(&mut self) -> anyhow::Result<()> {
        let mut prompt = LinePrompt {
            lines: &mut self.lines,
            out: &mut self.out,
        };
        let outcome = self.session.save(&mut prompt).await;
        match outcome {
            SaveOutcome::NothingRecorded => writeln!(self.out, "{NOTHING_RECORDED_WARNING}")?,
            SaveOutcome::Cancelled => writeln!(self.out, "Save cancelled.")?,
            SaveOutcome::Saved(melody) => {
                writeln!(self.out, "Saved \"{}\".", melody.title)?;
                writeln!(self.out, "{}", render_melodies(self.session.melodies()))?;
            }
            SaveOutcome::Failed(message) => writeln!(self.out, "Save failed: {message}")?,
        }
        Ok(())
    }

    fn print_notice(&mut self) -> std::io::Result<()> {
        if let Some(notice) = &self.notice {
            writeln!(self.out, "{notice}")?;
        }
        Ok(())
    }

    fn print_recording(&mut self) -> std::io::Result<()> {
        if !self.session.current_notes().is_empty() {
            writeln!(self.out, "{}", render_recording(self.session.current_notes()))?;
        }
        Ok(())
    }
}
