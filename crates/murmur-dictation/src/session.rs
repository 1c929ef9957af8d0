//! Per-activation dictation session bookkeeping.

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Tracks one dictation activation, from `start()` to `stop()`.
///
/// A session spans many listen cycles; the controller increments the
/// counters as the loop self-heals and delivers results.
#[derive(Debug, Clone)]
pub struct DictationSession {
    /// Unique identifier for this activation.
    pub id: Uuid,
    /// When dictation was started.
    pub started_at: DateTime<Utc>,
    /// Listen cycles issued, including automatic restarts.
    pub cycles: u64,
    /// Non-empty result sets forwarded to the host.
    pub results_delivered: u64,
}

impl DictationSession {
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            started_at: Utc::now(),
            cycles: 0,
            results_delivered: 0,
        }
    }

    /// Returns the elapsed duration of this session in seconds.
    pub fn elapsed_secs(&self) -> f64 {
        let elapsed = Utc::now() - self.started_at;
        elapsed.num_milliseconds() as f64 / 1000.0
    }
}

impl Default for DictationSession {
    fn default() -> Self {
        Self::new()
    }
}
