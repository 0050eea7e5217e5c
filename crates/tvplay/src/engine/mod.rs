//! Playback engine abstraction.
//!
//! The session controller never talks to a concrete player. It drives the
//! traits defined here: a [`MediaRuntime`] that probes capabilities and
//! builds engines, the [`HlsEngine`] and [`TsEngine`] themselves, and the
//! [`RenderSurface`] they draw into. Engines report back through an
//! [`EventSink`].

mod events;
mod traits;

pub use events::{EngineError, EngineEvent, ErrorCategory, EventSink};
pub use traits::{
    HLS_NATIVE_MIME, HlsConfig, HlsEngine, MediaRuntime, PlayFuture, ReadyState, RenderSurface,
    SessionKind, StreamFormat, TsConfig, TsEngine,
};
