//! Live channel playback core.
//!
//! Loads extended M3U channel lists, plays the selected channel through a
//! pluggable HLS or MPEG-TS engine, and keeps live streams going with bounded
//! restarts and a stall watchdog. Hosts provide the engines and the render
//! surface by implementing [`engine::MediaRuntime`].

pub mod buffer;
pub mod config;
pub mod engine;
pub mod error;
pub mod logging;
pub mod player;
pub mod reporter;
pub mod session;

pub use buffer::BufferPolicy;
pub use config::PlayerConfig;
pub use error::{PlayerError, Result, Severity};
pub use m3u_playlist::{ChannelList, ChannelRecord, PlaylistSource};
pub use player::Player;
pub use reporter::{ErrorReport, ErrorReporter, ErrorSink};
pub use session::{ControllerHandle, SessionController, SessionSnapshot};
