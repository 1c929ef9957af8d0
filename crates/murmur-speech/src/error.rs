use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Classification of errors reported by a speech recognition backend.
///
/// The taxonomy mirrors the failure codes a platform recognizer reports
/// through its error callback. Most kinds are transient conditions of the
/// audio path or the recognition service; dictation recovers from those by
/// restarting the listen cycle. `Client` and `InsufficientPermissions`
/// indicate a broken host setup that no amount of retrying will fix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum SpeechErrorKind {
    /// The audio recording path failed.
    #[error("Audio recording error")]
    Audio,

    /// The client-side recognizer API was misused or broke internally.
    #[error("Client side error")]
    Client,

    /// The host lacks the permissions required to record audio.
    #[error("Insufficient permissions")]
    InsufficientPermissions,

    /// A network failure while talking to the recognition service.
    #[error("Network error")]
    Network,

    /// The network operation timed out.
    #[error("Network operation timed out")]
    NetworkTimeout,

    /// The recognizer heard audio but matched no transcription.
    #[error("No recognition match")]
    NoMatch,

    /// The recognition service is busy with another request.
    #[error("Recognition service busy")]
    RecognizerBusy,

    /// The recognition service reported a server-side error.
    #[error("Error from server")]
    Server,

    /// No speech was heard within the recognizer's input window.
    #[error("No speech input")]
    SpeechTimeout,

    /// An error code outside the known taxonomy.
    #[error("Unrecognised error")]
    Unknown,
}

impl SpeechErrorKind {
    /// Whether dictation should self-heal from this error by restarting the
    /// listen cycle.
    ///
    /// Everything except `Client` and `InsufficientPermissions` is treated as
    /// transient. Unknown kinds restart rather than kill the session, keeping
    /// availability when a backend grows new error codes.
    pub fn is_restartable(&self) -> bool {
        !matches!(
            self,
            SpeechErrorKind::Client | SpeechErrorKind::InsufficientPermissions
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_restartable_kinds() {
        let restartable = [
            SpeechErrorKind::Audio,
            SpeechErrorKind::Network,
            SpeechErrorKind::NetworkTimeout,
            SpeechErrorKind::NoMatch,
            SpeechErrorKind::RecognizerBusy,
            SpeechErrorKind::Server,
            SpeechErrorKind::SpeechTimeout,
            SpeechErrorKind::Unknown,
        ];
        for kind in restartable {
            assert!(kind.is_restartable(), "{kind:?} should be restartable");
        }
    }

    #[test]
    fn test_terminal_kinds() {
        assert!(!SpeechErrorKind::Client.is_restartable());
        assert!(!SpeechErrorKind::InsufficientPermissions.is_restartable());
    }

    #[test]
    fn test_display_messages() {
        assert_eq!(SpeechErrorKind::Audio.to_string(), "Audio recording error");
        assert_eq!(SpeechErrorKind::Client.to_string(), "Client side error");
        assert_eq!(
            SpeechErrorKind::InsufficientPermissions.to_string(),
            "Insufficient permissions"
        );
        assert_eq!(SpeechErrorKind::Network.to_string(), "Network error");
        assert_eq!(
            SpeechErrorKind::SpeechTimeout.to_string(),
            "No speech input"
        );
        assert_eq!(SpeechErrorKind::Unknown.to_string(), "Unrecognised error");
    }

    #[test]
    fn test_serialization_roundtrip() {
        let kinds = [
            SpeechErrorKind::Audio,
            SpeechErrorKind::Client,
            SpeechErrorKind::InsufficientPermissions,
            SpeechErrorKind::Network,
            SpeechErrorKind::NetworkTimeout,
            SpeechErrorKind::NoMatch,
            SpeechErrorKind::RecognizerBusy,
            SpeechErrorKind::Server,
            SpeechErrorKind::SpeechTimeout,
            SpeechErrorKind::Unknown,
        ];
        for kind in kinds {
            let json = serde_json::to_string(&kind).unwrap();
            let back: SpeechErrorKind = serde_json::from_str(&json).unwrap();
            assert_eq!(kind, back);
        }
    }
}
