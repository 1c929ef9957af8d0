use std::future::Future;
use std::str::FromStr;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc::UnboundedSender;

use murmur_core::error::{MurmurError, Result};

use crate::events::SpeechEvent;

// =============================================================================
// Request types
// =============================================================================

/// Recognition language model requested for a listen cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LanguageModel {
    /// General-purpose dictation model.
    #[default]
    FreeForm,
    /// Model tuned for short search-style queries.
    WebSearch,
}

impl FromStr for LanguageModel {
    type Err = MurmurError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "free_form" => Ok(LanguageModel::FreeForm),
            "web_search" => Ok(LanguageModel::WebSearch),
            other => Err(MurmurError::Config(format!(
                "Unknown language model: {other}"
            ))),
        }
    }
}

impl std::fmt::Display for LanguageModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LanguageModel::FreeForm => write!(f, "free_form"),
            LanguageModel::WebSearch => write!(f, "web_search"),
        }
    }
}

/// Parameters for a single listen cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ListenRequest {
    /// Language model the recognizer should use.
    pub language_model: LanguageModel,
}

impl ListenRequest {
    pub fn new(language_model: LanguageModel) -> Self {
        Self { language_model }
    }

    /// Request for general-purpose free-form dictation.
    pub fn free_form() -> Self {
        Self::new(LanguageModel::FreeForm)
    }
}

// =============================================================================
// Traits
// =============================================================================

/// A speech recognizer performing one listen cycle at a time.
///
/// Implementations deliver progress through the event channel bound when the
/// service was acquired. A cycle ends with `Results` or `Error`; starting the
/// next cycle is the caller's job. Dropping the service releases the
/// underlying recognizer.
pub trait SpeechService: Send + Sync {
    /// Begin listening for one utterance.
    ///
    /// A cycle already in flight must be cancelled first.
    fn start_listening(&self, request: ListenRequest) -> impl Future<Output = Result<()>> + Send;

    /// Abort the in-flight listen cycle, discarding any partial hypotheses.
    fn cancel(&self) -> impl Future<Output = Result<()>> + Send;
}

/// Factory for speech recognizers.
///
/// The event sender is bound at acquisition time, so a recognizer can never
/// exist without a destination for its notifications.
pub trait SpeechServiceProvider: Send + Sync {
    type Service: SpeechService;

    /// Acquire a recognizer that reports through `events`.
    fn acquire(&self, events: UnboundedSender<SpeechEvent>) -> Result<Self::Service>;
}

// =============================================================================
// Mock implementation
// =============================================================================

#[derive(Debug, Default)]
struct MockSpeechInner {
    acquisitions: AtomicU32,
    start_calls: AtomicU32,
    cancel_calls: AtomicU32,
    listening: AtomicBool,
    released: AtomicBool,
    fail_next_listen: AtomicBool,
    events: Mutex<Option<UnboundedSender<SpeechEvent>>>,
    last_request: Mutex<Option<ListenRequest>>,
}

/// Mock speech provider for testing.
///
/// Hands out `MockSpeechService` instances backed by shared counters, so a
/// test can keep a clone of the provider and observe everything the consumer
/// did: acquisitions, listen/cancel calls, the listening flag, and whether
/// the service was released. `emit` plays the backend's role by pushing
/// events into the sender bound at acquisition.
#[derive(Debug, Clone, Default)]
pub struct MockSpeechProvider {
    inner: Arc<MockSpeechInner>,
}

impl MockSpeechProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of times `acquire` was called.
    pub fn acquisitions(&self) -> u32 {
        self.inner.acquisitions.load(Ordering::Relaxed)
    }

    /// Number of `start_listening` calls across all acquired services.
    pub fn start_calls(&self) -> u32 {
        self.inner.start_calls.load(Ordering::Relaxed)
    }

    /// Number of `cancel` calls across all acquired services.
    pub fn cancel_calls(&self) -> u32 {
        self.inner.cancel_calls.load(Ordering::Relaxed)
    }

    /// Whether a listen cycle is currently in flight.
    pub fn is_listening(&self) -> bool {
        self.inner.listening.load(Ordering::Relaxed)
    }

    /// Whether the most recently acquired service has been dropped.
    pub fn is_released(&self) -> bool {
        self.inner.released.load(Ordering::Relaxed)
    }

    /// The request passed to the most recent `start_listening` call.
    pub fn last_request(&self) -> Option<ListenRequest> {
        self.inner.last_request.lock().ok().and_then(|guard| *guard)
    }

    /// Make the next `start_listening` call fail, as a backend that lost the
    /// recognizer mid-session would. One-shot; later calls succeed again.
    pub fn fail_next_listen(&self) {
        self.inner.fail_next_listen.store(true, Ordering::Relaxed);
    }

    /// Emit an event as if the backend produced it.
    ///
    /// Fails if no service has been acquired yet.
    pub fn emit(&self, event: SpeechEvent) -> Result<()> {
        let guard = self
            .inner
            .events
            .lock()
            .map_err(|e| MurmurError::Speech(format!("Event sink lock poisoned: {e}")))?;
        let sender = guard
            .as_ref()
            .ok_or_else(|| MurmurError::Speech("No event sink bound".to_string()))?;
        sender
            .send(event)
            .map_err(|e| MurmurError::Speech(format!("Event sink closed: {e}")))
    }
}

impl SpeechServiceProvider for MockSpeechProvider {
    type Service = MockSpeechService;

    fn acquire(&self, events: UnboundedSender<SpeechEvent>) -> Result<Self::Service> {
        self.inner.acquisitions.fetch_add(1, Ordering::Relaxed);
        self.inner.released.store(false, Ordering::Relaxed);
        let mut guard = self
            .inner
            .events
            .lock()
            .map_err(|e| MurmurError::Speech(format!("Event sink lock poisoned: {e}")))?;
        *guard = Some(events);
        tracing::debug!("Mock speech service acquired");
        Ok(MockSpeechService {
            inner: Arc::clone(&self.inner),
        })
    }
}

/// Mock speech recognizer handed out by `MockSpeechProvider`.
#[derive(Debug)]
pub struct MockSpeechService {
    inner: Arc<MockSpeechInner>,
}

impl SpeechService for MockSpeechService {
    async fn start_listening(&self, request: ListenRequest) -> Result<()> {
        if self.inner.listening.load(Ordering::Relaxed) {
            return Err(MurmurError::Speech(
                "A listen cycle is already in flight".to_string(),
            ));
        }
        if self.inner.fail_next_listen.swap(false, Ordering::Relaxed) {
            return Err(MurmurError::Speech(
                "Recognizer refused to listen".to_string(),
            ));
        }
        self.inner.start_calls.fetch_add(1, Ordering::Relaxed);
        self.inner.listening.store(true, Ordering::Relaxed);
        let mut guard = self
            .inner
            .last_request
            .lock()
            .map_err(|e| MurmurError::Speech(format!("Request lock poisoned: {e}")))?;
        *guard = Some(request);
        tracing::debug!(language_model = %request.language_model, "Mock listen cycle started");
        Ok(())
    }

    async fn cancel(&self) -> Result<()> {
        self.inner.cancel_calls.fetch_add(1, Ordering::Relaxed);
        self.inner.listening.store(false, Ordering::Relaxed);
        tracing::debug!("Mock listen cycle cancelled");
        Ok(())
    }
}

impl Drop for MockSpeechService {
    fn drop(&mut self) {
        self.inner.listening.store(false, Ordering::Relaxed);
        self.inner.released.store(true, Ordering::Relaxed);
    }
}

// =============================================================================
// Tests
// =============================================================================
