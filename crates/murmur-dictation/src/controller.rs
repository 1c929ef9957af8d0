//! The continuous-dictation controller.
//!
//! `DictationController` drives a `SpeechService` through endless listen
//! cycles: each cycle ends with results or an error, the controller restarts
//! the recognizer, and transcripts flow to the injected `DictationHandler`.
//! Recoverable recognizer errors are absorbed by restarting; only terminal
//! ones (or an exhausted restart budget) stop dictation and reach the host.
//!
//! All mutable state lives behind one async mutex, giving the controller a
//! single logical thread of control. Backend callbacks and timer expiries
//! are marshalled onto it through channels and drained by `run`.

use std::time::Duration;

use tokio::sync::{mpsc, watch, Mutex};

use murmur_core::config::DictationConfig;
use murmur_core::error::{MurmurError, Result};
use murmur_speech::{
    LanguageModel, ListenRequest, SpeechErrorKind, SpeechEvent, SpeechService,
    SpeechServiceProvider,
};

use crate::handler::{DictationFailure, DictationHandler};
use crate::policy::RestartPolicy;
use crate::session::DictationSession;
use crate::state::VisualState;
use crate::timer::SilenceTimer;

/// Receiver bundle feeding a controller's event loop.
///
/// Handed out by `DictationController::new` and consumed by `run`. Keeping
/// the receivers outside the controller lets the loop await events without
/// holding the controller lock.
#[derive(Debug)]
pub struct DictationEvents {
    speech_rx: mpsc::UnboundedReceiver<SpeechEvent>,
    timer_rx: mpsc::UnboundedReceiver<u64>,
}

#[derive(Debug)]
struct ControllerInner<S> {
    /// The acquired recognizer. At most one per activation; `None` when idle.
    service: Option<S>,
    /// The armed silence guard. At most one live at a time.
    timer: Option<SilenceTimer>,
    /// Stamp for the most recently armed timer.
    generation: u64,
    /// Recoverable errors since the last successful speech or results.
    consecutive_failures: u32,
    session: Option<DictationSession>,
}

/// Orchestrates continuous dictation against an abstract speech backend.
pub struct DictationController<P: SpeechServiceProvider, H: DictationHandler> {
    provider: P,
    handler: H,
    request: ListenRequest,
    silence_timeout: Duration,
    policy: RestartPolicy,
    speech_tx: mpsc::UnboundedSender<SpeechEvent>,
    timer_tx: mpsc::UnboundedSender<u64>,
    state_tx: watch::Sender<VisualState>,
    inner: Mutex<ControllerInner<P::Service>>,
}

impl<P: SpeechServiceProvider, H: DictationHandler> DictationController<P, H> {
    /// Build a controller from the dictation config section.
    ///
    /// Fails fast on an unparseable `language_model`. Returns the controller
    /// together with the event bundle to pass to `run`.
    pub fn new(
        provider: P,
        handler: H,
        config: &DictationConfig,
    ) -> Result<(Self, DictationEvents)> {
        let language_model: LanguageModel = config.language_model.parse()?;
        let (speech_tx, speech_rx) = mpsc::unbounded_channel();
        let (timer_tx, timer_rx) = mpsc::unbounded_channel();
        let (state_tx, _) = watch::channel(VisualState::Idle);

        let controller = Self {
            provider,
            handler,
            request: ListenRequest::new(language_model),
            silence_timeout: Duration::from_millis(config.silence_timeout_ms),
            policy: RestartPolicy::from_config(config),
            speech_tx,
            timer_tx,
            state_tx,
            inner: Mutex::new(ControllerInner {
                service: None,
                timer: None,
                generation: 0,
                consecutive_failures: 0,
                session: None,
            }),
        };
        Ok((controller, DictationEvents { speech_rx, timer_rx }))
    }

    /// Start dictation.
    ///
    /// Acquires a recognizer from the provider and issues the first listen
    /// cycle. Calling `start` while dictation is already running is a no-op;
    /// the provider is consulted exactly once per activation.
    pub async fn start(&self) -> Result<()> {
        let mut inner = self.inner.lock().await;
        if inner.service.is_some() {
            tracing::debug!("Dictation already running; start ignored");
            return Ok(());
        }

        let service = self.provider.acquire(self.speech_tx.clone())?;
        inner.service = Some(service);
        inner.consecutive_failures = 0;

        let session = DictationSession::new();
        tracing::info!(
            session_id = %session.id,
            language_model = %self.request.language_model,
            "Dictation started"
        );
        inner.session = Some(session);

        if let Err(e) = self.listen_cycle(&mut inner, false).await {
            // Roll back the half-started activation.
            inner.service = None;
            inner.session = None;
            self.set_state(VisualState::Idle);
            return Err(e);
        }
        Ok(())
    }

    /// Stop dictation and release the recognizer.
    ///
    /// Calling `stop` while idle is a no-op.
    pub async fn stop(&self) -> Result<()> {
        let mut inner = self.inner.lock().await;
        if inner.service.is_none() {
            tracing::debug!("Dictation not running; stop ignored");
            return Ok(());
        }

        self.disarm_timer(&mut inner);
        inner.service = None;
        inner.consecutive_failures = 0;
        if let Some(session) = inner.session.take() {
            tracing::info!(
                session_id = %session.id,
                elapsed_secs = session.elapsed_secs(),
                cycles = session.cycles,
                results_delivered = session.results_delivered,
                "Dictation stopped"
            );
        }
        self.set_state(VisualState::Idle);
        Ok(())
    }

    /// Process one backend event.
    ///
    /// Events arriving after `stop` (stale callbacks from a released
    /// recognizer) are dropped.
    pub async fn dispatch(&self, event: SpeechEvent) -> Result<()> {
        let mut inner = self.inner.lock().await;
        if inner.service.is_none() {
            tracing::debug!(event = event.event_name(), "Event while idle ignored");
            return Ok(());
        }

        match event {
            SpeechEvent::ReadyForSpeech => {
                self.arm_timer(&mut inner);
                self.set_state(VisualState::ReadyForSpeech);
            }
            SpeechEvent::SpeechBegin => {
                // Voice is arriving; the silence guard has done its job.
                self.disarm_timer(&mut inner);
                inner.consecutive_failures = 0;
                self.set_state(VisualState::SpeechDetected);
                self.handler.on_dictation_start();
            }
            SpeechEvent::SpeechEnd => {
                self.set_state(VisualState::Idle);
                self.handler.on_dictation_finish();
            }
            SpeechEvent::Results {
                transcripts,
                confidence_scores,
            } => {
                self.disarm_timer(&mut inner);
                inner.consecutive_failures = 0;
                // Restart before forwarding, so the recognizer is already
                // listening while the host consumes the transcript. The
                // transcript is delivered even if the restart fails.
                let restarted = self.listen_cycle(&mut inner, true).await;
                tracing::debug!(?transcripts, ?confidence_scores, "Recognition results");
                if transcripts.is_empty() {
                    tracing::debug!("Empty result set suppressed");
                } else {
                    if let Some(session) = inner.session.as_mut() {
                        session.results_delivered += 1;
                    }
                    self.handler.on_results(&transcripts);
                }
                restarted?;
            }
            SpeechEvent::Error { kind } => {
                self.handle_error(&mut inner, kind).await?;
            }
            SpeechEvent::BufferReceived { bytes } => {
                tracing::debug!(len = bytes.len(), "Audio buffer received");
            }
            SpeechEvent::PartialResults { transcripts } => {
                tracing::debug!(hypotheses = transcripts.len(), "Partial results ignored");
            }
            SpeechEvent::RmsChanged { level } => {
                tracing::trace!(level, "Sound level changed");
            }
            other => {
                tracing::debug!(event = other.event_name(), "Speech event ignored");
            }
        }
        Ok(())
    }

    /// Handle a silence timer expiry.
    ///
    /// An expiry whose generation does not match the currently armed timer
    /// lost a race against cancellation and is ignored. A current expiry is
    /// treated exactly like a backend speech-timeout error.
    pub async fn silence_elapsed(&self, generation: u64) -> Result<()> {
        let mut inner = self.inner.lock().await;
        if inner.service.is_none() {
            tracing::debug!(generation, "Timer expiry while idle ignored");
            return Ok(());
        }
        if inner.timer.as_ref().map(SilenceTimer::generation) != Some(generation) {
            tracing::debug!(generation, "Stale timer expiry ignored");
            return Ok(());
        }

        let timeout_ms = self.silence_timeout.as_millis() as u64;
        tracing::debug!(generation, timeout_ms, "Silence window elapsed without speech");
        self.handle_error(&mut inner, SpeechErrorKind::SpeechTimeout)
            .await
    }

    /// Drive the controller from its event channels.
    ///
    /// Runs until both channels close. Processing failures are logged and do
    /// not tear the loop down.
    pub async fn run(&self, mut events: DictationEvents) {
        loop {
            tokio::select! {
                event = events.speech_rx.recv() => match event {
                    Some(event) => {
                        if let Err(e) = self.dispatch(event).await {
                            tracing::error!(error = %e, "Failed to process speech event");
                        }
                    }
                    None => break,
                },
                expiry = events.timer_rx.recv() => match expiry {
                    Some(generation) => {
                        if let Err(e) = self.silence_elapsed(generation).await {
                            tracing::error!(error = %e, "Failed to process timer expiry");
                        }
                    }
                    None => break,
                },
            }
        }
        tracing::debug!("Dictation event loop ended");
    }

    /// Subscribe to visual state changes.
    pub fn state_receiver(&self) -> watch::Receiver<VisualState> {
        self.state_tx.subscribe()
    }

    /// The current visual state.
    pub fn current_state(&self) -> VisualState {
        *self.state_tx.borrow()
    }

    /// Whether dictation currently holds a recognizer.
    pub async fn is_running(&self) -> bool {
        self.inner.lock().await.service.is_some()
    }

    /// Snapshot of the active session, if any.
    pub async fn session(&self) -> Option<DictationSession> {
        self.inner.lock().await.session.clone()
    }

    // -------------------------------------------------------------------------
    // Internals
    // -------------------------------------------------------------------------

    /// Issue the next listen cycle on the live recognizer.
    ///
    /// `cancel_current` aborts an in-flight cycle first, which is required
    /// when restarting out of an error or a delivered result.
    async fn listen_cycle(
        &self,
        inner: &mut ControllerInner<P::Service>,
        cancel_current: bool,
    ) -> Result<()> {
        let service = inner
            .service
            .as_ref()
            .ok_or_else(|| MurmurError::Dictation("No recognizer acquired".to_string()))?;
        if cancel_current {
            service.cancel().await?;
        }
        service.start_listening(self.request).await?;

        if let Some(session) = inner.session.as_mut() {
            session.cycles += 1;
        }
        self.set_state(VisualState::Listening);
        Ok(())
    }

    async fn handle_error(
        &self,
        inner: &mut ControllerInner<P::Service>,
        kind: SpeechErrorKind,
    ) -> Result<()> {
        self.disarm_timer(inner);

        if !kind.is_restartable() {
            tracing::warn!(error = %kind, "Terminal recognizer error");
            self.give_up(inner, DictationFailure::Terminal(kind));
            return Ok(());
        }

        inner.consecutive_failures += 1;
        if self.policy.is_exhausted(inner.consecutive_failures) {
            tracing::warn!(
                error = %kind,
                attempts = inner.consecutive_failures,
                "Restart budget exhausted"
            );
            self.give_up(
                inner,
                DictationFailure::RetriesExhausted {
                    attempts: inner.consecutive_failures,
                    last: kind,
                },
            );
            return Ok(());
        }

        tracing::debug!(
            error = %kind,
            consecutive_failures = inner.consecutive_failures,
            "Recoverable recognizer error; restarting listen cycle"
        );
        if !self.policy.restart_delay.is_zero() {
            tokio::time::sleep(self.policy.restart_delay).await;
        }
        self.listen_cycle(inner, true).await
    }

    /// Stop dictation on the controller's own initiative and tell the host.
    fn give_up(&self, inner: &mut ControllerInner<P::Service>, failure: DictationFailure) {
        inner.service = None;
        inner.consecutive_failures = 0;
        if let Some(session) = inner.session.take() {
            tracing::info!(
                session_id = %session.id,
                elapsed_secs = session.elapsed_secs(),
                cycles = session.cycles,
                results_delivered = session.results_delivered,
                "Dictation gave up"
            );
        }
        self.set_state(VisualState::Idle);
        self.handler.on_dictation_failed(&failure);
    }

    fn arm_timer(&self, inner: &mut ControllerInner<P::Service>) {
        self.disarm_timer(inner);
        inner.generation = inner.generation.wrapping_add(1);
        inner.timer = Some(SilenceTimer::arm(
            self.silence_timeout,
            inner.generation,
            self.timer_tx.clone(),
        ));
    }

    fn disarm_timer(&self, inner: &mut ControllerInner<P::Service>) {
        if let Some(timer) = inner.timer.take() {
            timer.cancel();
        }
    }

    fn set_state(&self, state: VisualState) {
        let previous = self.state_tx.send_replace(state);
        if previous != state {
            tracing::debug!("Visual state: {} -> {}", previous, state);
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
