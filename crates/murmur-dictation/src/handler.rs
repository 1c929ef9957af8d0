//! Host-facing callback interface for the dictation flow.

use thiserror::Error;

use murmur_speech::SpeechErrorKind;

/// Why dictation gave up and stopped on its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum DictationFailure {
    /// The recognizer reported an error no restart can fix.
    #[error("Terminal recognizer error: {0}")]
    Terminal(SpeechErrorKind),

    /// The configured restart budget ran out.
    #[error("Gave up after {attempts} consecutive recognizer errors (last: {last})")]
    RetriesExhausted { attempts: u32, last: SpeechErrorKind },
}

/// Callbacks a host receives as dictation progresses.
///
/// The handler is injected at controller construction, so a controller
/// cannot exist without a host to report to. Callbacks are invoked inline on
/// the controller's event loop; implementations should hand work off to
/// their own executor rather than block, and must not call back into the
/// controller.
pub trait DictationHandler: Send + Sync {
    /// Speech onset was detected; an utterance is being captured.
    fn on_dictation_start(&self);

    /// The utterance ended; the recognizer is finalizing hypotheses.
    fn on_dictation_finish(&self);

    /// Final transcription hypotheses for one utterance, best-guess first.
    /// Never called with an empty list.
    fn on_results(&self, transcripts: &[String]);

    /// Dictation stopped on its own; `start()` may be called again once the
    /// underlying condition is fixed.
    fn on_dictation_failed(&self, failure: &DictationFailure);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_failure_display() {
        let failure = DictationFailure::Terminal(SpeechErrorKind::Client);
        assert_eq!(
            failure.to_string(),
            "Terminal recognizer error: Client side error"
        );
    }

    #[test]
    fn test_retries_exhausted_display() {
        let failure = DictationFailure::RetriesExhausted {
            attempts: 4,
            last: SpeechErrorKind::Network,
        };
        assert_eq!(
            failure.to_string(),
            "Gave up after 4 consecutive recognizer errors (last: Network error)"
        );
    }

    #[test]
    fn test_failure_equality() {
        assert_eq!(
            DictationFailure::Terminal(SpeechErrorKind::Client),
            DictationFailure::Terminal(SpeechErrorKind::Client)
        );
        assert_ne!(
            DictationFailure::Terminal(SpeechErrorKind::Client),
            DictationFailure::Terminal(SpeechErrorKind::InsufficientPermissions)
        );
        assert_ne!(
            DictationFailure::Terminal(SpeechErrorKind::Network),
            DictationFailure::RetriesExhausted {
                attempts: 1,
                last: SpeechErrorKind::Network
            }
        );
    }
}
