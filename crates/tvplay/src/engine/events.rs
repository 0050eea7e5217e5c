use std::fmt;

use tokio::sync::mpsc;
use tracing::trace;

use crate::session::{ControllerMessage, Generation, SessionEvent};

/// Error category reported by a playback engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Transport failures: manifest or segment requests, connection drops.
    Network,
    /// Decoder or media pipeline failures.
    Media,
    /// Anything else, carrying the engine's own category name.
    Other(String),
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Network => f.write_str("networkError"),
            Self::Media => f.write_str("mediaError"),
            Self::Other(name) => f.write_str(name),
        }
    }
}

/// An error signal raised by an engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineError {
    /// Whether the engine can continue on its own.
    pub fatal: bool,
    pub category: ErrorCategory,
    /// Engine-specific detail string, e.g. `manifestLoadError`.
    pub details: String,
}

impl EngineError {
    pub fn fatal(category: ErrorCategory, details: impl Into<String>) -> Self {
        Self {
            fatal: true,
            category,
            details: details.into(),
        }
    }

    pub fn transient(category: ErrorCategory, details: impl Into<String>) -> Self {
        Self {
            fatal: false,
            category,
            details: details.into(),
        }
    }
}

/// Lifecycle signals emitted by engines and render surfaces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    /// The HLS engine parsed the manifest and can start playback.
    ManifestParsed,
    /// The render surface loaded metadata for a directly assigned source.
    MetadataLoaded,
    Error(EngineError),
}

/// Channel an engine uses to report events back to the session controller.
///
/// Each sink is bound to the session generation it was created for. Events
/// from a sink whose session has since been released are discarded by the
/// controller, so engines may keep emitting after `destroy` without harm.
#[derive(Debug, Clone)]
pub struct EventSink {
    generation: Generation,
    tx: mpsc::UnboundedSender<ControllerMessage>,
}

impl EventSink {
    pub(crate) fn new(generation: Generation, tx: mpsc::UnboundedSender<ControllerMessage>) -> Self {
        Self { generation, tx }
    }

    /// Generation of the session this sink belongs to.
    pub fn generation(&self) -> Generation {
        self.generation
    }

    /// Emit an engine event. Returns `false` once the controller has stopped.
    pub fn emit(&self, event: EngineEvent) -> bool {
        self.send(SessionEvent::Engine(event))
    }

    pub(crate) fn send(&self, event: SessionEvent) -> bool {
        let delivered = self
            .tx
            .send(ControllerMessage::Session {
                generation: self.generation,
                event,
            })
            .is_ok();
        if !delivered {
            trace!(generation = %self.generation, "Controller gone, dropping session event");
        }
        delivered
    }
}
