use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::engine::{HlsEngine, RenderSurface, SessionKind, TsEngine};
use crate::session::Generation;

/// The engine driving a session, tagged by kind.
pub(crate) enum SessionEngine {
    Hls(Box<dyn HlsEngine>),
    SegmentedTs(Box<dyn TsEngine>),
    /// The surface plays the source itself.
    NativeHls,
}

impl SessionEngine {
    pub(crate) fn kind(&self) -> SessionKind {
        match self {
            Self::Hls(_) => SessionKind::Hls,
            Self::SegmentedTs(_) => SessionKind::SegmentedTs,
            Self::NativeHls => SessionKind::NativeHls,
        }
    }
}

/// The single live playback session.
///
/// Owns its engine and the cancellation scope of its timers. Releasing is
/// idempotent and also happens on drop, so a session can never outlive its
/// owner with an engine still running.
pub(crate) struct PlaybackSession {
    pub(crate) generation: Generation,
    pub(crate) source_url: String,
    pub(crate) engine: SessionEngine,
    /// Set once a restart has been scheduled for this session.
    pub(crate) retry_pending: bool,
    surface: Arc<dyn RenderSurface>,
    token: CancellationToken,
    destroyed: bool,
}

impl PlaybackSession {
    pub(crate) fn new(
        generation: Generation,
        source_url: impl Into<String>,
        engine: SessionEngine,
        surface: Arc<dyn RenderSurface>,
        token: CancellationToken,
    ) -> Self {
        Self {
            generation,
            source_url: source_url.into(),
            engine,
            retry_pending: false,
            surface,
            token,
            destroyed: false,
        }
    }

    pub(crate) fn kind(&self) -> SessionKind {
        self.engine.kind()
    }

    pub(crate) fn token(&self) -> &CancellationToken {
        &self.token
    }

    /// Stop timers and free the engine. Later calls do nothing.
    pub(crate) fn release(&mut self) {
        if self.destroyed {
            return;
        }
        self.destroyed = true;
        self.token.cancel();

        match &mut self.engine {
            SessionEngine::Hls(engine) => engine.destroy(),
            SessionEngine::SegmentedTs(engine) => engine.destroy(),
            SessionEngine::NativeHls => self.surface.clear_source(),
        }
        debug!(
            generation = %self.generation,
            kind = %self.kind(),
            url = %self.source_url,
            "Playback session released"
        );
    }
}

impl Drop for PlaybackSession {
    fn drop(&mut self) {
        self.release();
    }
}
