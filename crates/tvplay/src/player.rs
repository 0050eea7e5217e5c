//! The player as seen from the UI.
//!
//! [`Player`] keeps the loaded channel list, forwards selections and buffer
//! changes to the session controller task, and turns every failure into a
//! report on the shared [`ErrorReporter`].

use std::sync::Arc;

use m3u_playlist::{ChannelList, ChannelRecord, PlaylistLoader, PlaylistSource, parse};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::config::PlayerConfig;
use crate::engine::MediaRuntime;
use crate::reporter::ErrorReporter;
use crate::session::{ControllerHandle, SessionController, SessionSnapshot};
use crate::{PlayerError, Result};

pub struct Player {
    loader: PlaylistLoader,
    channels: ChannelList,
    reporter: ErrorReporter,
    controller: ControllerHandle,
    task: Option<JoinHandle<()>>,
}

impl Player {
    /// Create a player and start its controller on the current tokio runtime.
    pub fn new(runtime: Arc<dyn MediaRuntime>, config: PlayerConfig) -> Result<Self> {
        Self::with_reporter(runtime, config, ErrorReporter::new())
    }

    /// Like [`Player::new`], reporting into an existing reporter.
    pub fn with_reporter(
        runtime: Arc<dyn MediaRuntime>,
        config: PlayerConfig,
        reporter: ErrorReporter,
    ) -> Result<Self> {
        config.validate()?;
        let loader = PlaylistLoader::new(&config.playlist)?;
        let (controller, task) = SessionController::spawn(runtime, reporter.clone(), config);

        Ok(Self {
            loader,
            channels: ChannelList::new(),
            reporter,
            controller,
            task: Some(task),
        })
    }

    pub fn reporter(&self) -> &ErrorReporter {
        &self.reporter
    }

    pub fn controller(&self) -> &ControllerHandle {
        &self.controller
    }

    pub fn channels(&self) -> &ChannelList {
        &self.channels
    }

    /// Load a playlist and replace the channel list with it.
    ///
    /// On failure the error is reported and the previous list is kept. The
    /// error is also returned for callers that want to react to it.
    pub async fn load_playlist(&mut self, source: &PlaylistSource) -> Result<usize> {
        match self.loader.load(source).await {
            Ok(channels) => Ok(self.replace_channels(channels)),
            Err(e) => {
                warn!(source = %source, error = %e, "Failed to load playlist");
                let err = PlayerError::from(e);
                self.reporter.report(&err);
                Err(err)
            }
        }
    }

    /// Replace the channel list with playlist text the UI already read.
    pub fn load_playlist_text(&mut self, content: &str) -> usize {
        self.replace_channels(parse(content))
    }

    fn replace_channels(&mut self, channels: ChannelList) -> usize {
        self.channels = channels;
        info!(channels = self.channels.len(), "Channel list replaced");
        self.channels.len()
    }

    /// Indices of channels whose name contains `term`, ignoring case.
    pub fn search(&self, term: &str) -> Vec<usize> {
        self.channels.search(term)
    }

    /// Play the channel at `index`. Out-of-range indices are ignored.
    pub fn select(&self, index: usize) -> Result<Option<&ChannelRecord>> {
        let Some(channel) = self.channels.get(index) else {
            debug!(index, "Selection outside the channel list ignored");
            return Ok(None);
        };
        info!(index, name = %channel.name, "Playing channel");
        self.controller.select_channel(channel.url.clone())?;
        Ok(Some(channel))
    }

    pub fn select_url(&self, url: impl Into<String>) -> Result<()> {
        self.controller.select_channel(url)
    }

    pub fn update_buffer_settings(&self, target_buffer_secs: u32, max_buffer_secs: u32) -> Result<()> {
        self.controller
            .update_buffer_settings(target_buffer_secs, max_buffer_secs)
    }

    pub async fn snapshot(&self) -> Result<SessionSnapshot> {
        self.controller.snapshot().await
    }

    /// Release the active session and wait for the controller to stop.
    pub async fn shutdown(mut self) -> Result<()> {
        // A controller that is already gone has nothing left to release.
        let _ = self.controller.shutdown();
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                warn!(error = %e, "Controller task did not finish cleanly");
                return Err(PlayerError::ControllerClosed);
            }
        }
        Ok(())
    }
}

impl Drop for Player {
    fn drop(&mut self) {
        if self.task.is_some() {
            let _ = self.controller.shutdown();
        }
    }
}
