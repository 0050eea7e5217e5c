//! Extended M3U channel playlists: parsing and loading.

pub mod channel;
pub mod error;
pub mod parser;
pub mod source;

pub use channel::{ChannelList, ChannelRecord};
pub use error::PlaylistError;
pub use parser::{EXTINF_MARKER, URL_PREFIX, parse};
pub use source::{DEFAULT_USER_AGENT, LoaderConfig, PlaylistLoader, PlaylistSource};
