//! Visual feedback states for the dictation control surface.
//!
//! Purely presentational: the state mirrors what the recognizer is doing so a
//! UI can color its one-button control. Any state can follow any other; the
//! controller owns the sequencing.

use std::fmt;

/// Visual state of the dictation control.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum VisualState {
    /// White: no dictation in progress.
    #[default]
    Idle,
    /// Red: a listen cycle has been issued to the recognizer.
    Listening,
    /// Green: the recognizer is live and waiting for the user to speak.
    ReadyForSpeech,
    /// Yellow: the recognizer is hearing speech.
    SpeechDetected,
}

impl VisualState {
    /// Indicator color for UI layers, matching the classic one-button
    /// dictation control.
    pub fn indicator(&self) -> &'static str {
        match self {
            VisualState::Idle => "white",
            VisualState::Listening => "red",
            VisualState::ReadyForSpeech => "green",
            VisualState::SpeechDetected => "yellow",
        }
    }
}

impl fmt::Display for VisualState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VisualState::Idle => write!(f, "Idle"),
            VisualState::Listening => write!(f, "Listening"),
            VisualState::ReadyForSpeech => write!(f, "Ready for speech"),
            VisualState::SpeechDetected => write!(f, "Speech detected"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_idle() {
        assert_eq!(VisualState::default(), VisualState::Idle);
    }

    #[test]
    fn test_display() {
        assert_eq!(VisualState::Idle.to_string(), "Idle");
        assert_eq!(VisualState::Listening.to_string(), "Listening");
        assert_eq!(VisualState::ReadyForSpeech.to_string(), "Ready for speech");
        assert_eq!(VisualState::SpeechDetected.to_string(), "Speech detected");
    }

    #[test]
    fn test_indicator_colors() {
        assert_eq!(VisualState::Idle.indicator(), "white");
        assert_eq!(VisualState::Listening.indicator(), "red");
        assert_eq!(VisualState::ReadyForSpeech.indicator(), "green");
        assert_eq!(VisualState::SpeechDetected.indicator(), "yellow");
    }
}
