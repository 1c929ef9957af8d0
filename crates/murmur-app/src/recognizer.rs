//! Simulated speech recognizer for the terminal host.
//!
//! Plays the backend role against the dictation controller: each typed line
//! becomes one utterance, delivered as the recognizer callback sequence
//! (`ReadyForSpeech`, `SpeechBegin`, sound levels, partials, `SpeechEnd`,
//! `Results`). Directive lines inject faults:
//!
//! - `!error <kind>` ends the cycle with that recognizer error
//! - `!empty` ends the cycle with an empty result set
//!
//! Leaving the recognizer waiting long enough exercises the controller's
//! silence guard instead.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

use murmur_core::error::{MurmurError, Result};
use murmur_speech::{
    ListenRequest, SpeechErrorKind, SpeechEvent, SpeechService, SpeechServiceProvider,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Listen,
    Cancel,
}

/// Provider handing out recognizers fed from a shared line source.
pub struct SimulatedProvider {
    feed: Arc<Mutex<UnboundedReceiver<String>>>,
    event_gap: Duration,
}

impl SimulatedProvider {
    /// Build a provider over a channel of typed utterances.
    pub fn new(feed: UnboundedReceiver<String>) -> Self {
        Self {
            feed: Arc::new(Mutex::new(feed)),
            event_gap: Duration::from_millis(120),
        }
    }

    /// Override the pause between scripted recognizer callbacks.
    pub fn with_event_gap(mut self, gap: Duration) -> Self {
        self.event_gap = gap;
        self
    }
}

impl SpeechServiceProvider for SimulatedProvider {
    type Service = SimulatedRecognizer;

    fn acquire(&self, events: UnboundedSender<SpeechEvent>) -> Result<Self::Service> {
        let (command_tx, command_rx) = tokio::sync::mpsc::unbounded_channel();
        let task = tokio::spawn(playback_loop(
            events,
            command_rx,
            Arc::clone(&self.feed),
            self.event_gap,
        ));
        tracing::debug!("Simulated recognizer acquired");
        Ok(SimulatedRecognizer { command_tx, task })
    }
}

/// One acquired recognizer. Commands are relayed to its playback task.
pub struct SimulatedRecognizer {
    command_tx: UnboundedSender<Command>,
    task: JoinHandle<()>,
}

impl SimulatedRecognizer {
    fn send(&self, command: Command) -> Result<()> {
        self.command_tx
            .send(command)
            .map_err(|_| MurmurError::Speech("Simulated recognizer task ended".to_string()))
    }
}

impl SpeechService for SimulatedRecognizer {
    async fn start_listening(&self, request: ListenRequest) -> Result<()> {
        tracing::debug!(
            language_model = %request.language_model,
            "Simulated listen cycle requested"
        );
        self.send(Command::Listen)
    }

    async fn cancel(&self) -> Result<()> {
        self.send(Command::Cancel)
    }
}

impl Drop for SimulatedRecognizer {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Drive listen cycles until the command channel closes.
async fn playback_loop(
    events: UnboundedSender<SpeechEvent>,
    mut commands: UnboundedReceiver<Command>,
    feed: Arc<Mutex<UnboundedReceiver<String>>>,
    gap: Duration,
) {
    let mut pending: Option<Command> = None;

    'cycles: loop {
        let command = match pending.take() {
            Some(command) => command,
            None => match commands.recv().await {
                Some(command) => command,
                None => break,
            },
        };
        if command != Command::Listen {
            continue;
        }

        if events.send(SpeechEvent::ReadyForSpeech).is_err() {
            break;
        }

        // Wait for an utterance, unless the cycle is cancelled first.
        let line = {
            let mut feed = feed.lock().await;
            loop {
                tokio::select! {
                    command = commands.recv() => match command {
                        Some(command) => {
                            pending = Some(command);
                            continue 'cycles;
                        }
                        None => break 'cycles,
                    },
                    line = feed.recv() => match line {
                        Some(line) if line.trim().is_empty() => continue,
                        Some(line) => break line.trim().to_string(),
                        None => {
                            // The input source is gone for good.
                            let _ = events.send(SpeechEvent::Error {
                                kind: SpeechErrorKind::Client,
                            });
                            break 'cycles;
                        }
                    },
                }
            }
        };

        for event in line_sequence(&line) {
            tokio::time::sleep(gap).await;
            if let Ok(command) = commands.try_recv() {
                pending = Some(command);
                continue 'cycles;
            }
            if events.send(event).is_err() {
                break 'cycles;
            }
        }
    }

    tracing::debug!("Simulated recognizer playback ended");
}

/// The callback sequence one line of input produces.
fn line_sequence(line: &str) -> Vec<SpeechEvent> {
    if let Some(rest) = line.strip_prefix("!error") {
        return vec![SpeechEvent::Error {
            kind: parse_error_kind(rest.trim()),
        }];
    }
    if line == "!empty" {
        return vec![SpeechEvent::Results {
            transcripts: Vec::new(),
            confidence_scores: Vec::new(),
        }];
    }

    let first_word = line.split_whitespace().next().unwrap_or(line).to_string();
    vec![
        SpeechEvent::SpeechBegin,
        SpeechEvent::RmsChanged { level: 0.4 },
        SpeechEvent::BufferReceived {
            bytes: line.as_bytes().to_vec(),
        },
        SpeechEvent::RmsChanged { level: 0.9 },
        SpeechEvent::PartialResults {
            transcripts: vec![first_word],
        },
        SpeechEvent::SpeechEnd,
        SpeechEvent::Results {
            transcripts: vec![line.to_string()],
            confidence_scores: vec![0.9],
        },
    ]
}

/// Map a directive argument to an error kind. Unrecognised names fall back
/// to `Unknown` so typos still inject something restartable.
fn parse_error_kind(name: &str) -> SpeechErrorKind {
    match name {
        "audio" => SpeechErrorKind::Audio,
        "client" => SpeechErrorKind::Client,
        "permissions" => SpeechErrorKind::InsufficientPermissions,
        "network" => SpeechErrorKind::Network,
        "network_timeout" => SpeechErrorKind::NetworkTimeout,
        "no_match" => SpeechErrorKind::NoMatch,
        "busy" => SpeechErrorKind::RecognizerBusy,
        "server" => SpeechErrorKind::Server,
        "speech_timeout" => SpeechErrorKind::SpeechTimeout,
        _ => SpeechErrorKind::Unknown,
    }
}
