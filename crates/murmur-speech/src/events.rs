use serde::{Deserialize, Serialize};

use crate::error::SpeechErrorKind;

/// Asynchronous notifications emitted by a speech recognition backend.
///
/// A backend delivers these over the channel bound at acquisition time, in
/// the order the underlying recognizer produced them. Consumers are expected
/// to treat the stream as a single logical sequence per listen cycle:
/// `ReadyForSpeech`, optionally `SpeechBegin` .. `SpeechEnd`, then either
/// `Results` or `Error`.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[non_exhaustive]
pub enum SpeechEvent {
    /// The recognizer is live and waiting for the user to speak.
    ReadyForSpeech,

    /// The recognizer detected the onset of speech.
    SpeechBegin,

    /// A chunk of captured audio, forwarded for hosts that want it.
    BufferReceived { bytes: Vec<u8> },

    /// The recognizer detected the end of the utterance.
    SpeechEnd,

    /// Intermediate hypotheses, best-guess first.
    PartialResults { transcripts: Vec<String> },

    /// Final hypotheses for the utterance, best-guess first.
    ///
    /// `confidence_scores` is parallel to `transcripts`; backends that do
    /// not score hypotheses leave it empty.
    Results {
        transcripts: Vec<String>,
        confidence_scores: Vec<f32>,
    },

    /// The listen cycle failed.
    Error { kind: SpeechErrorKind },

    /// Input sound level changed.
    RmsChanged { level: f32 },

    /// A backend-specific event outside the common taxonomy.
    Event { code: u32 },
}

impl SpeechEvent {
    /// Returns a human-readable event name for logging.
    pub fn event_name(&self) -> &'static str {
        match self {
            SpeechEvent::ReadyForSpeech => "ready_for_speech",
            SpeechEvent::SpeechBegin => "speech_begin",
            SpeechEvent::BufferReceived { .. } => "buffer_received",
            SpeechEvent::SpeechEnd => "speech_end",
            SpeechEvent::PartialResults { .. } => "partial_results",
            SpeechEvent::Results { .. } => "results",
            SpeechEvent::Error { .. } => "error",
            SpeechEvent::RmsChanged { .. } => "rms_changed",
            SpeechEvent::Event { .. } => "event",
        }
    }
}
