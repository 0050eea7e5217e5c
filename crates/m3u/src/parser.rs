//! Line-oriented extended M3U parser.
//!
//! Only two kinds of lines matter: `#EXTINF:` metadata lines, whose text
//! after the last comma names the next channel, and lines starting with
//! `http`, which carry the stream URL and close the pending record.
//! Everything else is skipped. The parser never fails; malformed input
//! just produces fewer records.

use tracing::trace;

use crate::channel::{ChannelList, ChannelRecord};

/// Prefix of a channel metadata line.
pub const EXTINF_MARKER: &str = "#EXTINF:";

/// Prefix of a stream URL line.
pub const URL_PREFIX: &str = "http";

/// Parse playlist text into an ordered channel list.
pub fn parse(content: &str) -> ChannelList {
    let mut channels = ChannelList::new();
    let mut pending = ChannelRecord::default();

    for line in content.lines() {
        let line = line.trim();
        if line.starts_with(EXTINF_MARKER) {
            // rsplit always yields at least one piece, even without a comma
            pending.name = line.rsplit(',').next().unwrap_or(line).trim().to_string();
        } else if line.starts_with(URL_PREFIX) {
            pending.url = line.to_string();
            channels.push(std::mem::take(&mut pending));
        }
    }

    if !pending.name.is_empty() {
        trace!(name = %pending.name, "Dropping trailing metadata without a URL");
    }

    channels
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_parse_round_trip_scenario() {
        let text = "#EXTINF:-1,Channel A\nhttp://example.com/a.m3u8\n#EXTINF:-1,Channel B\nhttp://example.com/b.ts";
        let list = parse(text);
        assert_eq!(
            list,
            ChannelList::from(vec![
                ChannelRecord::new("Channel A", "http://example.com/a.m3u8"),
                ChannelRecord::new("Channel B", "http://example.com/b.ts"),
            ])
        );
    }

    #[test]
    fn test_lone_metadata_yields_nothing() {
        assert!(parse("#EXTM3U\n#EXTINF:-1,Orphan\n").is_empty());
    }

    #[test]
    fn test_lone_url_has_empty_name() {
        let list = parse("http://example.com/stream.ts");
        assert_eq!(list.len(), 1);
        assert_eq!(list.get(0).unwrap().name, "");
        assert_eq!(list.get(0).unwrap().url, "http://example.com/stream.ts");
    }

    #[test]
    fn test_metadata_overwritten_by_next_metadata() {
        let list = parse("#EXTINF:-1,First\n#EXTINF:-1,Second\nhttp://x/y.ts\n");
        assert_eq!(list.len(), 1);
        assert_eq!(list.get(0).unwrap().name, "Second");
    }

    #[test]
    fn test_name_after_last_comma() {
        let list = parse(
            "#EXTINF:-1 tvg-id=\"a\" group-title=\"News, World\",  BBC World  \nhttps://x/bbc.m3u8",
        );
        assert_eq!(list.get(0).unwrap().name, "BBC World");
    }

    #[test]
    fn test_metadata_without_comma_uses_whole_line() {
        let list = parse("#EXTINF:NoComma\nhttp://x/a.ts");
        assert_eq!(list.get(0).unwrap().name, "#EXTINF:NoComma");
    }

    #[test]
    fn test_crlf_and_ignored_lines() {
        let text = "#EXTM3U\r\n#EXTINF:-1,A\r\n#EXTVLCOPT:http-user-agent=x\r\n\r\nhttp://x/a.ts\r\nrtmp://ignored\r\n";
        let list = parse(text);
        assert_eq!(list.len(), 1);
        assert_eq!(list.get(0).unwrap(), &ChannelRecord::new("A", "http://x/a.ts"));
    }

    #[test]
    fn test_name_does_not_leak_into_next_record() {
        let list = parse("#EXTINF:-1,A\nhttp://x/a.ts\nhttp://x/b.ts");
        assert_eq!(list.get(1).unwrap().name, "");
    }

    #[test]
    fn test_empty_input() {
        assert!(parse("").is_empty());
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// For any k well-formed (metadata, URL) pairs, parsing yields exactly
        /// k records in the same order.
        #[test]
        fn prop_parse_preserves_order(
            entries in prop::collection::vec(("[A-Za-z0-9 ]{0,16}", "[a-z0-9/]{1,16}"), 0..32),
        ) {
            let mut text = String::from("#EXTM3U\n");
            for (name, path) in &entries {
                text.push_str(&format!("#EXTINF:-1,{name}\nhttp://example.com/{path}\n"));
            }

            let list = parse(&text);
            prop_assert_eq!(list.len(), entries.len());
            for (record, (name, path)) in list.iter().zip(entries.iter()) {
                prop_assert_eq!(&record.name, name.trim());
                let expected_url = format!("http://example.com/{path}");
                prop_assert_eq!(&record.url, &expected_url);
            }
        }
    }
}
