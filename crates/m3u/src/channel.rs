use serde::{Deserialize, Serialize};

/// A named stream entry from a playlist.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelRecord {
    /// Display name, empty when the playlist had no `#EXTINF` line for it.
    pub name: String,
    /// Stream URL. Never empty for records produced by the parser.
    pub url: String,
}

impl ChannelRecord {
    #[inline]
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
        }
    }
}

/// Ordered channel list. The position of a record is its selection index.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChannelList {
    channels: Vec<ChannelRecord>,
}

impl ChannelList {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&mut self, record: ChannelRecord) {
        self.channels.push(record);
    }

    pub fn len(&self) -> usize {
        self.channels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }

    /// Get a channel by its selection index.
    pub fn get(&self, index: usize) -> Option<&ChannelRecord> {
        self.channels.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ChannelRecord> {
        self.channels.iter()
    }

    /// Indices of the channels whose name contains `term`, ignoring case.
    ///
    /// An empty term matches every channel. The list itself is never
    /// modified; callers use the indices to hide or show entries.
    pub fn search(&self, term: &str) -> Vec<usize> {
        let needle = term.to_lowercase();
        self.channels
            .iter()
            .enumerate()
            .filter(|(_, channel)| channel.name.to_lowercase().contains(&needle))
            .map(|(index, _)| index)
            .collect()
    }
}

impl From<Vec<ChannelRecord>> for ChannelList {
    fn from(channels: Vec<ChannelRecord>) -> Self {
        Self { channels }
    }
}

impl<'a> IntoIterator for &'a ChannelList {
    type Item = &'a ChannelRecord;
    type IntoIter = std::slice::Iter<'a, ChannelRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.channels.iter()
    }
}

impl IntoIterator for ChannelList {
    type Item = ChannelRecord;
    type IntoIter = std::vec::IntoIter<ChannelRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.channels.into_iter()
    }
}
