//! Murmur Dictation crate - Continuous dictation session control.
//!
//! Provides the controller that keeps a speech recognizer listening
//! indefinitely: restarting it after every result or recoverable error,
//! guarding against recognizers that go silent, and reporting progress to the
//! host through `DictationHandler` callbacks and a watchable `VisualState`.

pub mod controller;
pub mod handler;
pub mod policy;
pub mod session;
pub mod state;
pub mod timer;

pub use controller::{DictationController, DictationEvents};
pub use handler::{DictationFailure, DictationHandler};
pub use policy::RestartPolicy;
pub use session::DictationSession;
pub use state::VisualState;
pub use timer::SilenceTimer;
