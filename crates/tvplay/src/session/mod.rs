//! Playback session management.
//!
//! - [`SessionController`] owns the one live session and reacts to its events
//! - [`RetryState`] bounds automatic restarts of failing live streams
//! - the watchdog nudges stalled HLS sessions back to life

mod controller;
mod events;
mod playback;
mod retry;
mod watchdog;

pub use controller::{ControllerHandle, SessionController};
pub use events::{Command, ControllerMessage, Generation, SessionEvent, SessionSnapshot};
pub use retry::{RetryConfig, RetryDecision, RetryPhase, RetryState};
