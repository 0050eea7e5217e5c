//! Playlist sources: a local file or a remote URL, both feeding [`parse`].

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use url::Url;

use crate::channel::ChannelList;
use crate::error::PlaylistError;
use crate::parser::parse;

pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

/// Where a playlist comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlaylistSource {
    /// A locally selected file, read as text.
    File(PathBuf),
    /// A remote playlist, fetched as text.
    Url(String),
}

impl PlaylistSource {
    /// Interpret a user-supplied string. `http://` and `https://` inputs are
    /// remote, everything else is a file path.
    pub fn parse_arg(input: &str) -> Self {
        let input = input.trim();
        let lower = input.to_ascii_lowercase();
        if lower.starts_with("http://") || lower.starts_with("https://") {
            Self::Url(input.to_string())
        } else {
            Self::File(PathBuf::from(input))
        }
    }
}

impl fmt::Display for PlaylistSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::File(path) => write!(f, "{}", path.display()),
            Self::Url(url) => write!(f, "{url}"),
        }
    }
}

/// HTTP settings for remote playlists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoaderConfig {
    /// User agent sent when fetching remote playlists.
    pub user_agent: String,
    /// Overall request timeout in seconds (0 = no timeout).
    pub timeout_secs: u64,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_owned(),
            timeout_secs: 30,
        }
    }
}

/// Reads playlists from any [`PlaylistSource`].
#[derive(Debug, Clone)]
pub struct PlaylistLoader {
    client: Client,
}

impl PlaylistLoader {
    pub fn new(config: &LoaderConfig) -> Result<Self, PlaylistError> {
        let mut builder = Client::builder().user_agent(&config.user_agent);
        if config.timeout_secs > 0 {
            builder = builder.timeout(Duration::from_secs(config.timeout_secs));
        }
        Ok(Self {
            client: builder.build()?,
        })
    }

    /// Use an existing client, e.g. one shared with other HTTP work.
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }

    /// Load and parse a playlist.
    pub async fn load(&self, source: &PlaylistSource) -> Result<ChannelList, PlaylistError> {
        let content = match source {
            PlaylistSource::File(path) => tokio::fs::read_to_string(path)
                .await
                .map_err(|e| PlaylistError::io(path.display().to_string(), e))?,
            PlaylistSource::Url(input) => self.fetch(input).await?,
        };

        let channels = parse(&content);
        info!(source = %source, channels = channels.len(), "Playlist loaded");
        Ok(channels)
    }

    async fn fetch(&self, input: &str) -> Result<String, PlaylistError> {
        let url = Url::parse(input).map_err(|e| PlaylistError::invalid_url(input, e.to_string()))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(PlaylistError::invalid_url(
                input,
                format!("unsupported scheme `{}`", url.scheme()),
            ));
        }

        debug!(url = %url, "Fetching remote playlist");
        let response = self.client.get(url.clone()).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(PlaylistError::http_status(status, url.as_str()));
        }
        Ok(response.text().await?)
    }
}
