//! Session controller: the only owner of the playback session.
//!
//! The controller runs as a single task and consumes one queue. UI commands
//! and session events (engine signals, playback start results, retry and
//! watchdog timers) all arrive on it in order, so state changes never
//! interleave. Session events carry the [`Generation`] they were issued for
//! and are dropped when that session is no longer the live one.

use std::ops::ControlFlow;
use std::sync::Arc;

use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace, warn};

use super::events::{Command, ControllerMessage, Generation, SessionEvent, SessionSnapshot};
use super::playback::{PlaybackSession, SessionEngine};
use super::retry::{RetryDecision, RetryState, schedule_restart};
use super::watchdog::spawn_watchdog;
use crate::buffer::BufferPolicy;
use crate::config::PlayerConfig;
use crate::engine::{
    EngineError, EngineEvent, ErrorCategory, EventSink, HLS_NATIVE_MIME, MediaRuntime, PlayFuture,
    ReadyState, RenderSurface, SessionKind, StreamFormat,
};
use crate::reporter::ErrorReporter;
use crate::{PlayerError, Result};

/// Cloneable sender side of a running [`SessionController`].
#[derive(Debug, Clone)]
pub struct ControllerHandle {
    tx: mpsc::UnboundedSender<ControllerMessage>,
}

impl ControllerHandle {
    fn send(&self, command: Command) -> Result<()> {
        self.tx
            .send(ControllerMessage::Command(command))
            .map_err(|_| PlayerError::ControllerClosed)
    }

    /// Tear down the current session and play `url`.
    pub fn select_channel(&self, url: impl Into<String>) -> Result<()> {
        self.send(Command::SelectChannel(url.into()))
    }

    /// Store a new buffer policy and push it into a live HLS engine.
    pub fn update_buffer_settings(&self, target_buffer_secs: u32, max_buffer_secs: u32) -> Result<()> {
        self.send(Command::UpdateBuffer(BufferPolicy::new(
            target_buffer_secs,
            max_buffer_secs,
        )))
    }

    /// Current controller state. Resolves after every message queued before it.
    pub async fn snapshot(&self) -> Result<SessionSnapshot> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.send(Command::Snapshot(reply_tx))?;
        reply_rx.await.map_err(|_| PlayerError::ControllerClosed)
    }

    /// Release the session and stop the controller task.
    pub fn shutdown(&self) -> Result<()> {
        self.send(Command::Shutdown)
    }

    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

/// Owns the playback session, the retry state and the buffer policy.
pub struct SessionController {
    runtime: Arc<dyn MediaRuntime>,
    surface: Arc<dyn RenderSurface>,
    reporter: ErrorReporter,
    config: PlayerConfig,
    buffer: BufferPolicy,
    retry: RetryState,
    session: Option<PlaybackSession>,
    last_generation: u64,
    tx: mpsc::UnboundedSender<ControllerMessage>,
    /// Parent of every session's cancellation token.
    root_token: CancellationToken,
}

impl SessionController {
    pub fn new(
        runtime: Arc<dyn MediaRuntime>,
        reporter: ErrorReporter,
        config: PlayerConfig,
    ) -> (Self, mpsc::UnboundedReceiver<ControllerMessage>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let surface = runtime.surface();
        let controller = Self {
            runtime,
            surface,
            reporter,
            buffer: config.buffer,
            retry: RetryState::new(config.retry.clone()),
            config,
            session: None,
            last_generation: 0,
            tx,
            root_token: CancellationToken::new(),
        };
        (controller, rx)
    }

    /// Start the controller on the current tokio runtime.
    pub fn spawn(
        runtime: Arc<dyn MediaRuntime>,
        reporter: ErrorReporter,
        config: PlayerConfig,
    ) -> (ControllerHandle, JoinHandle<()>) {
        let (controller, rx) = Self::new(runtime, reporter, config);
        let handle = controller.handle();
        let task = tokio::spawn(controller.run(rx));
        (handle, task)
    }

    pub fn handle(&self) -> ControllerHandle {
        ControllerHandle {
            tx: self.tx.clone(),
        }
    }

    /// Process messages until a shutdown command arrives.
    pub async fn run(mut self, mut rx: mpsc::UnboundedReceiver<ControllerMessage>) {
        info!("Session controller started");
        while let Some(message) = rx.recv().await {
            if self.handle_message(message).is_break() {
                break;
            }
        }
        self.release_session();
        self.root_token.cancel();
        info!("Session controller stopped");
    }

    fn handle_message(&mut self, message: ControllerMessage) -> ControlFlow<()> {
        match message {
            ControllerMessage::Command(command) => match command {
                Command::SelectChannel(url) => self.select_channel(&url),
                Command::UpdateBuffer(policy) => self.update_buffer_settings(policy),
                Command::Snapshot(reply) => {
                    let _ = reply.send(self.snapshot());
                }
                Command::Shutdown => return ControlFlow::Break(()),
            },
            ControllerMessage::Session { generation, event } => {
                self.handle_session_event(generation, event)
            }
        }
        ControlFlow::Continue(())
    }

    /// User picked a channel: new lineage, fresh error line.
    pub fn select_channel(&mut self, url: &str) {
        info!(url = %url, "Channel selected");
        self.reporter.clear();
        self.retry.reset();
        self.start_session(url.to_string());
    }

    pub fn update_buffer_settings(&mut self, policy: BufferPolicy) {
        self.buffer = policy;

        if let Some(SessionEngine::Hls(engine)) = self.session.as_mut().map(|s| &mut s.engine) {
            let config = engine.config_mut();
            config.max_buffer_length = policy.target_buffer_secs;
            config.max_max_buffer_length = policy.max_buffer_secs;
            debug!(
                target_secs = policy.target_buffer_secs,
                max_secs = policy.max_buffer_secs,
                "Buffer settings pushed into live HLS engine"
            );
        } else {
            debug!(
                target_secs = policy.target_buffer_secs,
                max_secs = policy.max_buffer_secs,
                "Buffer settings stored"
            );
        }
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        let session = self.session.as_ref();
        SessionSnapshot {
            generation: session.map(|s| s.generation),
            kind: session.map(|s| s.kind()),
            source_url: session.map(|s| s.source_url.clone()),
            retry_pending: session.is_some_and(|s| s.retry_pending),
            retry_count: self.retry.count(),
            retry_phase: self.retry.phase(),
            buffer: self.buffer,
            hls_config: match session.map(|s| &s.engine) {
                Some(SessionEngine::Hls(engine)) => Some(engine.config().clone()),
                _ => None,
            },
        }
    }

    fn release_session(&mut self) {
        if let Some(mut session) = self.session.take() {
            session.release();
        }
    }

    /// Replace whatever is playing with a new session for `url`. The retry
    /// lineage is left alone so automatic restarts keep counting.
    fn start_session(&mut self, url: String) {
        self.release_session();

        self.last_generation += 1;
        let generation = Generation(self.last_generation);
        let token = self.root_token.child_token();
        let sink = EventSink::new(generation, self.tx.clone());

        let engine = match StreamFormat::classify(&url) {
            StreamFormat::Hls => self.start_hls(&url, &sink, &token),
            StreamFormat::SegmentedTs => self.start_ts(&url, &sink, &token),
        };

        match engine {
            Some(engine) => {
                let session =
                    PlaybackSession::new(generation, url, engine, self.surface.clone(), token);
                info!(
                    generation = %generation,
                    kind = %session.kind(),
                    url = %session.source_url,
                    "Playback session started"
                );
                self.session = Some(session);
            }
            None => token.cancel(),
        }
    }

    fn start_hls(
        &self,
        url: &str,
        sink: &EventSink,
        token: &CancellationToken,
    ) -> Option<SessionEngine> {
        if self.runtime.hls_supported() {
            let config = self.config.hls.engine_config(&self.buffer);
            let mut engine = match self.runtime.create_hls(config, sink.clone()) {
                Ok(engine) => engine,
                Err(e) => {
                    self.reporter.report(&e);
                    return None;
                }
            };
            engine.load_source(url);
            engine.attach_media(self.surface.clone());

            if self.config.watchdog.enabled {
                spawn_watchdog(self.config.watchdog.interval(), sink.clone(), token.clone());
            }
            Some(SessionEngine::Hls(engine))
        } else if self.surface.can_play_type(HLS_NATIVE_MIME) {
            debug!(url = %url, "HLS engine unavailable, assigning source to the surface");
            self.surface.set_source(url, sink.clone());
            Some(SessionEngine::NativeHls)
        } else {
            self.reporter.report(&PlayerError::format_unsupported("HLS"));
            None
        }
    }

    fn start_ts(
        &self,
        url: &str,
        sink: &EventSink,
        token: &CancellationToken,
    ) -> Option<SessionEngine> {
        if !self.runtime.mse_live_playback() {
            self.reporter.report(&PlayerError::format_unsupported("MPEG-TS"));
            return None;
        }

        let config = self.config.ts.engine_config(url);
        let mut engine = match self.runtime.create_ts(config, sink.clone()) {
            Ok(engine) => engine,
            Err(e) => {
                self.reporter.report(&e);
                return None;
            }
        };
        engine.attach_media(self.surface.clone());
        engine.load();
        spawn_playback_start(engine.play(), sink.clone(), token.clone());
        Some(SessionEngine::SegmentedTs(engine))
    }

    fn handle_session_event(&mut self, generation: Generation, event: SessionEvent) {
        let Some(session) = self.session.as_ref() else {
            trace!(generation = %generation, ?event, "No live session, dropping event");
            return;
        };
        if session.generation != generation {
            trace!(
                generation = %generation,
                live = %session.generation,
                ?event,
                "Dropping event from a released session"
            );
            return;
        }

        let kind = session.kind();
        match event {
            SessionEvent::Engine(EngineEvent::ManifestParsed) if kind == SessionKind::Hls => {
                self.start_surface_playback()
            }
            SessionEvent::Engine(EngineEvent::MetadataLoaded) if kind == SessionKind::NativeHls => {
                self.start_surface_playback()
            }
            SessionEvent::Engine(EngineEvent::Error(err)) => self.on_engine_error(kind, err),
            SessionEvent::Engine(other) => {
                trace!(kind = %kind, event = ?other, "Ignoring engine event")
            }
            SessionEvent::PlaybackStarted => {
                info!(generation = %generation, kind = %kind, "Playback started");
                if kind == SessionKind::SegmentedTs {
                    self.retry.record_success();
                }
            }
            SessionEvent::PlaybackRejected(reason) => {
                if kind == SessionKind::SegmentedTs {
                    self.on_retryable_failure(&reason);
                } else {
                    self.reporter.report(&PlayerError::playback_rejected(reason));
                }
            }
            SessionEvent::RetryDue => self.on_retry_due(),
            SessionEvent::WatchdogTick => self.on_watchdog_tick(),
        }
    }

    fn start_surface_playback(&self) {
        if let Some(session) = self.session.as_ref() {
            spawn_playback_start(
                self.surface.play(),
                EventSink::new(session.generation, self.tx.clone()),
                session.token().clone(),
            );
        }
    }

    fn on_engine_error(&mut self, kind: SessionKind, err: EngineError) {
        if !err.fatal {
            debug!(
                kind = %kind,
                category = %err.category,
                details = %err.details,
                "Non-fatal engine error"
            );
            return;
        }
        match kind {
            SessionKind::Hls => self.on_hls_error(err),
            SessionKind::SegmentedTs if err.category == ErrorCategory::Network => {
                self.on_retryable_failure(&err.details)
            }
            SessionKind::SegmentedTs => self.reporter.report(&PlayerError::Engine {
                engine: "MPEG-TS",
                category: err.category,
                details: err.details,
            }),
            SessionKind::NativeHls => self.reporter.report(&PlayerError::Engine {
                engine: "Native HLS",
                category: err.category,
                details: err.details,
            }),
        }
    }

    fn on_hls_error(&mut self, err: EngineError) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        let SessionEngine::Hls(engine) = &mut session.engine else {
            return;
        };

        match err.category {
            ErrorCategory::Network => {
                engine.start_load();
                self.reporter.report(&PlayerError::EngineNetwork {
                    details: err.details,
                });
            }
            ErrorCategory::Media => {
                engine.recover_media_error();
                self.reporter.report(&PlayerError::EngineMedia {
                    details: err.details,
                });
            }
            category => {
                let error = PlayerError::EngineFatal {
                    engine: "HLS",
                    category,
                    details: err.details,
                };
                self.release_session();
                self.reporter.report(&error);
            }
        }
    }

    fn on_retryable_failure(&mut self, reason: &str) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        if session.retry_pending {
            debug!(generation = %session.generation, reason = %reason, "Restart already scheduled");
            return;
        }

        match self.retry.record_failure() {
            RetryDecision::Retry { attempt, delay } => {
                session.retry_pending = true;
                warn!(
                    attempt,
                    max = self.retry.max(),
                    delay_ms = delay.as_millis() as u64,
                    reason = %reason,
                    "Retrying playback"
                );
                schedule_restart(
                    delay,
                    EventSink::new(session.generation, self.tx.clone()),
                    session.token().clone(),
                );
            }
            RetryDecision::Exhausted { attempts } => {
                self.release_session();
                self.reporter
                    .report(&PlayerError::RetryExhausted { attempts });
            }
            RetryDecision::Ignore => {}
        }
    }

    fn on_retry_due(&mut self) {
        let Some(session) = self.session.as_ref() else {
            return;
        };
        if !session.retry_pending {
            return;
        }
        let url = session.source_url.clone();
        info!(attempt = self.retry.count(), url = %url, "Restarting playback session");
        self.reporter.clear();
        self.start_session(url);
    }

    fn on_watchdog_tick(&mut self) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        let SessionEngine::Hls(engine) = &mut session.engine else {
            return;
        };
        if self.surface.ready_state() == ReadyState::HaveNothing {
            warn!(generation = %session.generation, "Attempting to recover from stalled playback");
            engine.recover_media_error();
        }
    }
}

/// Await a playback start and feed the outcome back as a session event.
fn spawn_playback_start(play: PlayFuture, sink: EventSink, token: CancellationToken) {
    tokio::spawn(async move {
        tokio::select! {
            _ = token.cancelled() => {}
            result = play => {
                let event = match result {
                    Ok(()) => SessionEvent::PlaybackStarted,
                    Err(reason) => SessionEvent::PlaybackRejected(reason),
                };
                sink.send(event);
            }
        }
    });
}
