//! Restart policy for the self-healing listen loop.

use std::num::NonZeroU32;
use std::time::Duration;

use murmur_core::config::DictationConfig;

/// Bounds on automatic restarts after recoverable recognizer errors.
///
/// The default is the continuous-dictation behavior: retry forever with no
/// pause. Hosts that would rather surface persistent trouble than spin can
/// cap the number of consecutive failures and space the restarts out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RestartPolicy {
    /// Consecutive recoverable failures tolerated before giving up.
    /// `None` means retry without limit.
    pub max_consecutive_failures: Option<NonZeroU32>,
    /// Pause inserted before each automatic restart.
    pub restart_delay: Duration,
}

impl Default for RestartPolicy {
    fn default() -> Self {
        Self {
            max_consecutive_failures: None,
            restart_delay: Duration::ZERO,
        }
    }
}

impl RestartPolicy {
    /// Build the policy from the dictation config section.
    ///
    /// A `max_consecutive_failures` of zero maps to unbounded.
    pub fn from_config(config: &DictationConfig) -> Self {
        Self {
            max_consecutive_failures: NonZeroU32::new(config.max_consecutive_failures),
            restart_delay: Duration::from_millis(config.restart_delay_ms),
        }
    }

    /// Whether `consecutive_failures` has reached the configured bound.
    pub fn is_exhausted(&self, consecutive_failures: u32) -> bool {
        match self.max_consecutive_failures {
            Some(max) => consecutive_failures >= max.get(),
            None => false,
        }
    }
}
