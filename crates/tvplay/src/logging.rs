//! Logging setup for hosts embedding the player.

use tracing::Level;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use crate::{PlayerError, Result};

/// Default log filter directive.
pub const DEFAULT_LOG_FILTER: &str = "tvplay_engine=info,m3u_playlist=info";

/// Build the filter used by [`init_logging`].
///
/// `quiet` wins over `verbose`. Without either, `RUST_LOG` is honoured and
/// falls back to [`DEFAULT_LOG_FILTER`].
pub fn build_filter(verbose: bool, quiet: bool) -> EnvFilter {
    if quiet {
        EnvFilter::new("error")
    } else if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER))
    }
}

/// Install a global fmt subscriber. Fails if one is already installed.
pub fn init_logging(verbose: bool, quiet: bool) -> Result<()> {
    tracing_subscriber::registry()
        .with(build_filter(verbose, quiet))
        .with(fmt::layer().with_target(verbose).with_level(true))
        .try_init()
        .map_err(|e| PlayerError::config(format!("failed to install log subscriber: {e}")))?;

    tracing::event!(Level::DEBUG, "Logging initialised");
    Ok(())
}
