//! Player configuration.
//!
//! All sections have defaults matching the stock player, so an empty TOML
//! document is a valid configuration.

use std::path::Path;
use std::time::Duration;

use m3u_playlist::{DEFAULT_USER_AGENT, LoaderConfig};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::buffer::BufferPolicy;
use crate::engine::{HlsConfig, TsConfig};
use crate::session::RetryConfig;
use crate::{PlayerError, Result};

/// Fixed tuning applied to every HLS engine on top of the buffer policy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HlsTuning {
    /// Buffer size ceiling in bytes.
    pub max_buffer_size: u64,
    /// Allowed buffer gap in seconds.
    pub max_buffer_hole: f64,
    pub low_latency_mode: bool,
}

impl Default for HlsTuning {
    fn default() -> Self {
        Self {
            max_buffer_size: 60 * 1000 * 1000,
            max_buffer_hole: 0.5,
            low_latency_mode: true,
        }
    }
}

impl HlsTuning {
    pub fn engine_config(&self, buffer: &BufferPolicy) -> HlsConfig {
        HlsConfig {
            max_buffer_length: buffer.target_buffer_secs,
            max_max_buffer_length: buffer.max_buffer_secs,
            max_buffer_size: self.max_buffer_size,
            max_buffer_hole: self.max_buffer_hole,
            low_latency_mode: self.low_latency_mode,
        }
    }
}

/// Live ingestion settings for the MPEG-TS engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TsTuning {
    pub enable_stash_buffer: bool,
    pub stash_initial_size: u32,
    pub enable_worker: bool,
    pub lazy_load: bool,
    pub auto_cleanup_source_buffer: bool,
    /// Client identifier sent with every engine request.
    pub user_agent: String,
}

impl Default for TsTuning {
    fn default() -> Self {
        Self {
            enable_stash_buffer: false,
            stash_initial_size: 128,
            enable_worker: true,
            lazy_load: false,
            auto_cleanup_source_buffer: true,
            user_agent: DEFAULT_USER_AGENT.to_owned(),
        }
    }
}

impl TsTuning {
    pub fn engine_config(&self, url: &str) -> TsConfig {
        TsConfig {
            url: url.to_string(),
            is_live: true,
            enable_stash_buffer: self.enable_stash_buffer,
            stash_initial_size: self.stash_initial_size,
            enable_worker: self.enable_worker,
            lazy_load: self.lazy_load,
            auto_cleanup_source_buffer: self.auto_cleanup_source_buffer,
            headers: vec![("User-Agent".to_string(), self.user_agent.clone())],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WatchdogConfig {
    pub enabled: bool,
    /// Seconds between stall checks.
    pub interval_secs: u64,
}

impl Default for WatchdogConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            interval_secs: 5,
        }
    }
}

impl WatchdogConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }
}

/// Configuration for the whole player.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    /// Initial buffer policy; the UI may change it at runtime.
    pub buffer: BufferPolicy,
    pub retry: RetryConfig,
    pub watchdog: WatchdogConfig,
    pub hls: HlsTuning,
    pub ts: TsTuning,
    pub playlist: LoaderConfig,
}

impl PlayerConfig {
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)
            .map_err(|e| PlayerError::config(format!("invalid player config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = tokio::fs::read_to_string(path).await.map_err(|e| {
            PlayerError::config(format!("failed to read {}: {e}", path.display()))
        })?;
        debug!(path = %path.display(), "Loaded player config");
        Self::from_toml_str(&content)
    }

    pub fn validate(&self) -> Result<()> {
        if self.watchdog.enabled && self.watchdog.interval_secs == 0 {
            return Err(PlayerError::config("watchdog.interval_secs must be > 0"));
        }
        if self.hls.max_buffer_hole < 0.0 {
            return Err(PlayerError::config("hls.max_buffer_hole must be >= 0"));
        }
        Ok(())
    }
}
