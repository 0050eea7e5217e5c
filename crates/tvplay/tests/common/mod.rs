//! Scripted media runtime shared by the integration tests.

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use futures::FutureExt;
use parking_lot::Mutex;
use tokio::time::Instant;
use tvplay_engine::engine::{
    EventSink, HlsConfig, HlsEngine, MediaRuntime, PlayFuture, ReadyState, RenderSurface,
    TsConfig, TsEngine,
};
use tvplay_engine::reporter::{ErrorReport, ErrorSink};
use tvplay_engine::session::SessionSnapshot;
use tvplay_engine::{ControllerHandle, ErrorReporter, PlayerConfig, SessionController};

/// How a scripted play call resolves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlayOutcome {
    Resolve,
    Reject(String),
    Pending,
}

impl PlayOutcome {
    fn into_future(self) -> PlayFuture {
        match self {
            Self::Resolve => futures::future::ready(Ok(())).boxed(),
            Self::Reject(reason) => futures::future::ready(Err(reason)).boxed(),
            Self::Pending => futures::future::pending().boxed(),
        }
    }
}

/// Everything the fakes observed, plus the knobs tests turn.
#[derive(Debug)]
pub struct Probe {
    pub hls_supported: bool,
    pub native_hls: bool,
    pub mse_live: bool,
    /// Make the HLS factory panic, taking the controller task down with it.
    pub panic_on_hls_create: bool,
    pub ready_state: ReadyState,
    pub surface_play: PlayOutcome,
    pub ts_play: PlayOutcome,

    pub hls_configs: Vec<HlsConfig>,
    pub hls_sinks: Vec<EventSink>,
    pub hls_sources: Vec<String>,
    pub hls_destroyed: Vec<usize>,
    pub start_loads: usize,
    pub media_recoveries: usize,

    pub ts_configs: Vec<TsConfig>,
    pub ts_sinks: Vec<EventSink>,
    pub ts_created_at: Vec<Instant>,
    pub ts_destroyed: Vec<usize>,
    pub ts_plays: usize,

    pub native_sources: Vec<String>,
    pub native_sinks: Vec<EventSink>,
    pub surface_cleared: usize,
    pub surface_plays: usize,
}

impl Default for Probe {
    fn default() -> Self {
        Self {
            hls_supported: true,
            native_hls: false,
            mse_live: true,
            panic_on_hls_create: false,
            ready_state: ReadyState::HaveEnoughData,
            surface_play: PlayOutcome::Resolve,
            ts_play: PlayOutcome::Pending,
            hls_configs: Vec::new(),
            hls_sinks: Vec::new(),
            hls_sources: Vec::new(),
            hls_destroyed: Vec::new(),
            start_loads: 0,
            media_recoveries: 0,
            ts_configs: Vec::new(),
            ts_sinks: Vec::new(),
            ts_created_at: Vec::new(),
            ts_destroyed: Vec::new(),
            ts_plays: 0,
            native_sources: Vec::new(),
            native_sinks: Vec::new(),
            surface_cleared: 0,
            surface_plays: 0,
        }
    }
}

impl Probe {
    /// Engines created but not yet destroyed.
    pub fn live_engines(&self) -> usize {
        self.hls_destroyed
            .iter()
            .chain(self.ts_destroyed.iter())
            .filter(|&&n| n == 0)
            .count()
    }
}

pub type SharedProbe = Arc<Mutex<Probe>>;

pub struct FakeSurface {
    probe: SharedProbe,
}

impl RenderSurface for FakeSurface {
    fn can_play_type(&self, mime: &str) -> bool {
        mime == tvplay_engine::engine::HLS_NATIVE_MIME && self.probe.lock().native_hls
    }

    fn set_source(&self, url: &str, events: EventSink) {
        let mut probe = self.probe.lock();
        probe.native_sources.push(url.to_string());
        probe.native_sinks.push(events);
    }

    fn clear_source(&self) {
        self.probe.lock().surface_cleared += 1;
    }

    fn ready_state(&self) -> ReadyState {
        self.probe.lock().ready_state
    }

    fn play(&self) -> PlayFuture {
        let mut probe = self.probe.lock();
        probe.surface_plays += 1;
        probe.surface_play.clone().into_future()
    }
}

pub struct FakeHls {
    id: usize,
    config: HlsConfig,
    probe: SharedProbe,
}

impl HlsEngine for FakeHls {
    fn load_source(&mut self, url: &str) {
        self.probe.lock().hls_sources.push(url.to_string());
    }

    fn attach_media(&mut self, _surface: Arc<dyn RenderSurface>) {}

    fn start_load(&mut self) {
        self.probe.lock().start_loads += 1;
    }

    fn recover_media_error(&mut self) {
        self.probe.lock().media_recoveries += 1;
    }

    fn config(&self) -> &HlsConfig {
        &self.config
    }

    fn config_mut(&mut self) -> &mut HlsConfig {
        &mut self.config
    }

    fn destroy(&mut self) {
        self.probe.lock().hls_destroyed[self.id] += 1;
    }
}

pub struct FakeTs {
    id: usize,
    probe: SharedProbe,
}

impl TsEngine for FakeTs {
    fn attach_media(&mut self, _surface: Arc<dyn RenderSurface>) {}

    fn load(&mut self) {}

    fn play(&mut self) -> PlayFuture {
        let mut probe = self.probe.lock();
        probe.ts_plays += 1;
        probe.ts_play.clone().into_future()
    }

    fn destroy(&mut self) {
        self.probe.lock().ts_destroyed[self.id] += 1;
    }
}

pub struct FakeRuntime {
    pub probe: SharedProbe,
    surface: Arc<FakeSurface>,
}

impl FakeRuntime {
    pub fn new(probe: Probe) -> Arc<Self> {
        let probe = Arc::new(Mutex::new(probe));
        Arc::new(Self {
            surface: Arc::new(FakeSurface {
                probe: probe.clone(),
            }),
            probe,
        })
    }
}

impl MediaRuntime for FakeRuntime {
    fn surface(&self) -> Arc<dyn RenderSurface> {
        self.surface.clone()
    }

    fn hls_supported(&self) -> bool {
        self.probe.lock().hls_supported
    }

    fn create_hls(
        &self,
        config: HlsConfig,
        events: EventSink,
    ) -> tvplay_engine::Result<Box<dyn HlsEngine>> {
        let mut probe = self.probe.lock();
        assert!(!probe.panic_on_hls_create, "HLS factory exploded");
        let id = probe.hls_destroyed.len();
        probe.hls_destroyed.push(0);
        probe.hls_configs.push(config.clone());
        probe.hls_sinks.push(events);
        Ok(Box::new(FakeHls {
            id,
            config,
            probe: self.probe.clone(),
        }))
    }

    fn mse_live_playback(&self) -> bool {
        self.probe.lock().mse_live
    }

    fn create_ts(
        &self,
        config: TsConfig,
        events: EventSink,
    ) -> tvplay_engine::Result<Box<dyn TsEngine>> {
        let mut probe = self.probe.lock();
        let id = probe.ts_destroyed.len();
        probe.ts_destroyed.push(0);
        probe.ts_configs.push(config);
        probe.ts_sinks.push(events);
        probe.ts_created_at.push(Instant::now());
        Ok(Box::new(FakeTs {
            id,
            probe: self.probe.clone(),
        }))
    }
}

/// Records every report pushed to it.
#[derive(Default)]
pub struct RecordingSink {
    pub shown: Mutex<Vec<ErrorReport>>,
}

impl ErrorSink for RecordingSink {
    fn show(&self, report: &ErrorReport) {
        self.shown.lock().push(report.clone());
    }

    fn clear(&self) {}
}

pub struct Harness {
    pub runtime: Arc<FakeRuntime>,
    pub reporter: ErrorReporter,
    pub reports: Arc<RecordingSink>,
    pub handle: ControllerHandle,
    pub task: tokio::task::JoinHandle<()>,
}

impl Harness {
    pub fn start(probe: Probe) -> Self {
        Self::with_config(probe, PlayerConfig::default())
    }

    pub fn with_config(probe: Probe, config: PlayerConfig) -> Self {
        let runtime = FakeRuntime::new(probe);
        let reports = Arc::new(RecordingSink::default());
        let reporter = ErrorReporter::new().with_sink(reports.clone());
        let (handle, task) = SessionController::spawn(runtime.clone(), reporter.clone(), config);
        Self {
            runtime,
            reporter,
            reports,
            handle,
            task,
        }
    }

    pub fn probe(&self) -> parking_lot::MutexGuard<'_, Probe> {
        self.runtime.probe.lock()
    }

    /// Let spawned tasks run, then read the controller state.
    pub async fn settle(&self) -> SessionSnapshot {
        tokio::time::sleep(Duration::from_millis(1)).await;
        self.handle.snapshot().await.unwrap()
    }

    /// Shut the controller down and wait for its task.
    pub async fn stop(&mut self) {
        self.handle.shutdown().unwrap();
        (&mut self.task).await.unwrap();
    }

    pub fn last_hls_sink(&self) -> EventSink {
        self.probe().hls_sinks.last().cloned().unwrap()
    }

    pub fn last_ts_sink(&self) -> EventSink {
        self.probe().ts_sinks.last().cloned().unwrap()
    }

    pub fn last_report(&self) -> Option<ErrorReport> {
        self.reporter.current()
    }
}
