//! Murmur Speech crate - The speech recognition backend boundary.
//!
//! Defines the event stream a recognizer emits, the error taxonomy with its
//! restartable/terminal split, the listen request types, and the
//! `SpeechService` / `SpeechServiceProvider` traits that dictation is built
//! against. Includes a mock backend for testing without a real recognizer.

pub mod error;
pub mod events;
pub mod service;

pub use error::SpeechErrorKind;
pub use events::SpeechEvent;
pub use service::{
    LanguageModel, ListenRequest, MockSpeechProvider, MockSpeechService, SpeechService,
    SpeechServiceProvider,
};
