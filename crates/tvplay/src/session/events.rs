use std::fmt;

use serde::Serialize;
use tokio::sync::oneshot;

use crate::buffer::BufferPolicy;
use crate::engine::{EngineEvent, HlsConfig, SessionKind};
use crate::session::RetryPhase;

/// Identity of one playback session.
///
/// Increases with every session the controller starts, including automatic
/// restarts. Asynchronous callbacks carry the generation they were created
/// for, which is how stale callbacks are recognised.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Generation(pub u64);

impl fmt::Display for Generation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Something that happened to a specific session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    Engine(EngineEvent),
    /// The playback start future resolved successfully.
    PlaybackStarted,
    /// The playback start future was rejected.
    PlaybackRejected(String),
    /// Backoff elapsed; restart the session.
    RetryDue,
    WatchdogTick,
}

/// Requests from the UI side.
#[derive(Debug)]
pub enum Command {
    SelectChannel(String),
    UpdateBuffer(BufferPolicy),
    Snapshot(oneshot::Sender<SessionSnapshot>),
    Shutdown,
}

/// Everything the controller task consumes, in arrival order.
#[derive(Debug)]
pub enum ControllerMessage {
    Command(Command),
    Session {
        generation: Generation,
        event: SessionEvent,
    },
}

/// Point-in-time view of the controller state.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionSnapshot {
    pub generation: Option<Generation>,
    pub kind: Option<SessionKind>,
    pub source_url: Option<String>,
    pub retry_pending: bool,
    pub retry_count: u32,
    pub retry_phase: RetryPhase,
    pub buffer: BufferPolicy,
    /// Live configuration of the HLS engine, if one is running.
    pub hls_config: Option<HlsConfig>,
}

impl SessionSnapshot {
    pub fn is_active(&self) -> bool {
        self.kind.is_some()
    }
}
