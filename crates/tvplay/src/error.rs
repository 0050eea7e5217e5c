//! Player error types.
//!
//! Every failure the player can hit ends up here and, through the
//! [`ErrorReporter`](crate::ErrorReporter), in front of the user. The
//! `Display` text of each variant is the user-facing message.

use m3u_playlist::PlaylistError;
use thiserror::Error;

use crate::engine::{ErrorCategory, SessionKind};

/// Player-wide result type.
pub type Result<T> = std::result::Result<T, PlayerError>;

/// How serious a reported error is for the current session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Playback may continue or recover on its own.
    Warning,
    /// The session is gone, or was never created.
    Terminal,
}

#[derive(Error, Debug)]
pub enum PlayerError {
    #[error("Error loading playlist: {0}")]
    PlaylistLoad(#[from] PlaylistError),

    #[error("Your runtime does not support {format}")]
    FormatUnsupported { format: &'static str },

    #[error("Playback error: {reason}")]
    PlaybackStartRejected { reason: String },

    #[error("Network error: {details}")]
    EngineNetwork { details: String },

    #[error("Media error: {details}")]
    EngineMedia { details: String },

    /// Non-network failure reported by an engine that keeps running.
    #[error("{engine} error: {category} - {details}")]
    Engine {
        engine: &'static str,
        category: ErrorCategory,
        details: String,
    },

    /// Unrecoverable engine failure; the session has been released.
    #[error("{engine} error: {category} - {details}")]
    EngineFatal {
        engine: &'static str,
        category: ErrorCategory,
        details: String,
    },

    #[error("Failed to create {kind} engine: {reason}")]
    EngineCreate { kind: SessionKind, reason: String },

    #[error("Failed to play the channel after {attempts} attempts. Please try again later.")]
    RetryExhausted { attempts: u32 },

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Player controller is not running")]
    ControllerClosed,
}

impl PlayerError {
    pub fn format_unsupported(format: &'static str) -> Self {
        Self::FormatUnsupported { format }
    }

    pub fn playback_rejected(reason: impl Into<String>) -> Self {
        Self::PlaybackStartRejected {
            reason: reason.into(),
        }
    }

    pub fn engine_create(kind: SessionKind, reason: impl Into<String>) -> Self {
        Self::EngineCreate {
            kind,
            reason: reason.into(),
        }
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    pub fn severity(&self) -> Severity {
        match self {
            Self::PlaylistLoad(_)
            | Self::PlaybackStartRejected { .. }
            | Self::EngineNetwork { .. }
            | Self::EngineMedia { .. }
            | Self::Engine { .. } => Severity::Warning,
            Self::FormatUnsupported { .. }
            | Self::EngineFatal { .. }
            | Self::EngineCreate { .. }
            | Self::RetryExhausted { .. }
            | Self::Configuration(_)
            | Self::ControllerClosed => Severity::Terminal,
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.severity() == Severity::Terminal
    }
}
