//! Playback engine seams and related types.

use std::fmt;
use std::sync::Arc;

use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};

use super::events::EventSink;
use crate::Result;

/// MIME type a render surface must accept to play HLS without an engine.
pub const HLS_NATIVE_MIME: &str = "application/vnd.apple.mpegurl";

/// Result of an asynchronous playback start. `Err` carries the rejection
/// reason given by the surface or engine.
pub type PlayFuture = BoxFuture<'static, std::result::Result<(), String>>;

/// How a session is being played.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionKind {
    /// Adaptive HLS engine attached to the surface.
    Hls,
    /// Segmented MPEG-TS engine fed through media source extensions.
    SegmentedTs,
    /// The surface plays the HLS manifest by itself.
    NativeHls,
}

impl SessionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Hls => "hls",
            Self::SegmentedTs => "segmented_ts",
            Self::NativeHls => "native_hls",
        }
    }
}

impl fmt::Display for SessionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Stream format inferred from the URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamFormat {
    Hls,
    SegmentedTs,
}

impl StreamFormat {
    /// Anything mentioning an `.m3u8` manifest is HLS; the rest is treated
    /// as a raw transport stream.
    pub fn classify(url: &str) -> Self {
        if url.to_ascii_lowercase().contains(".m3u8") {
            Self::Hls
        } else {
            Self::SegmentedTs
        }
    }
}

/// Media readiness as reported by the render surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ReadyState {
    HaveNothing,
    HaveMetadata,
    HaveCurrentData,
    HaveFutureData,
    HaveEnoughData,
}

/// Construction and live configuration of the HLS engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HlsConfig {
    /// Target forward buffer in seconds.
    pub max_buffer_length: u32,
    /// Hard ceiling for the forward buffer in seconds.
    pub max_max_buffer_length: u32,
    /// Buffer size ceiling in bytes.
    pub max_buffer_size: u64,
    /// Largest gap in seconds the engine may jump over.
    pub max_buffer_hole: f64,
    pub low_latency_mode: bool,
}

/// Construction settings of the MPEG-TS engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TsConfig {
    pub url: String,
    pub is_live: bool,
    pub enable_stash_buffer: bool,
    pub stash_initial_size: u32,
    pub enable_worker: bool,
    pub lazy_load: bool,
    pub auto_cleanup_source_buffer: bool,
    /// Extra request headers sent by the engine's loader.
    pub headers: Vec<(String, String)>,
}

/// The media element playback engines render into.
pub trait RenderSurface: Send + Sync {
    /// Whether the surface can play the MIME type without an engine.
    fn can_play_type(&self, mime: &str) -> bool;

    /// Assign a source URL directly. The surface emits
    /// [`EngineEvent::MetadataLoaded`](super::EngineEvent::MetadataLoaded)
    /// through `events` once it is ready to play.
    fn set_source(&self, url: &str, events: EventSink);

    /// Drop any directly assigned source.
    fn clear_source(&self);

    fn ready_state(&self) -> ReadyState;

    /// Start playback.
    fn play(&self) -> PlayFuture;
}

/// An adaptive HLS playback engine.
pub trait HlsEngine: Send {
    fn load_source(&mut self, url: &str);

    fn attach_media(&mut self, surface: Arc<dyn RenderSurface>);

    /// Restart loading from the current segment.
    fn start_load(&mut self);

    /// Reset the media pipeline after a decode failure.
    fn recover_media_error(&mut self);

    /// Live configuration. Changes take effect without reloading.
    fn config(&self) -> &HlsConfig;

    fn config_mut(&mut self) -> &mut HlsConfig;

    /// Release every resource held by the engine.
    fn destroy(&mut self);
}

/// A live MPEG-TS playback engine.
pub trait TsEngine: Send {
    fn attach_media(&mut self, surface: Arc<dyn RenderSurface>);

    fn load(&mut self);

    fn play(&mut self) -> PlayFuture;

    fn destroy(&mut self);
}

/// Capabilities and engine factories of the hosting runtime.
pub trait MediaRuntime: Send + Sync {
    /// The surface every session renders into.
    fn surface(&self) -> Arc<dyn RenderSurface>;

    /// Whether the adaptive HLS engine can run here.
    fn hls_supported(&self) -> bool;

    fn create_hls(&self, config: HlsConfig, events: EventSink) -> Result<Box<dyn HlsEngine>>;

    /// Whether media source extensions support live TS playback.
    fn mse_live_playback(&self) -> bool;

    fn create_ts(&self, config: TsConfig, events: EventSink) -> Result<Box<dyn TsEngine>>;
}
