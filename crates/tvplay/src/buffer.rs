use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};

/// Bounds the UI enforces on the target buffer input, in seconds.
pub const TARGET_BUFFER_RANGE: RangeInclusive<u32> = 5..=60;

/// Bounds the UI enforces on the maximum buffer input, in seconds.
pub const MAX_BUFFER_RANGE: RangeInclusive<u32> = 30..=300;

/// User-tunable buffering for HLS sessions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BufferPolicy {
    pub target_buffer_secs: u32,
    pub max_buffer_secs: u32,
}

impl Default for BufferPolicy {
    fn default() -> Self {
        Self {
            target_buffer_secs: 30,
            max_buffer_secs: 60,
        }
    }
}

impl BufferPolicy {
    pub fn new(target_buffer_secs: u32, max_buffer_secs: u32) -> Self {
        Self {
            target_buffer_secs,
            max_buffer_secs,
        }
    }

    pub fn is_within_bounds(&self) -> bool {
        TARGET_BUFFER_RANGE.contains(&self.target_buffer_secs)
            && MAX_BUFFER_RANGE.contains(&self.max_buffer_secs)
    }

    /// Clamp both values into the input bounds.
    pub fn clamped(self) -> Self {
        Self {
            target_buffer_secs: self
                .target_buffer_secs
                .clamp(*TARGET_BUFFER_RANGE.start(), *TARGET_BUFFER_RANGE.end()),
            max_buffer_secs: self
                .max_buffer_secs
                .clamp(*MAX_BUFFER_RANGE.start(), *MAX_BUFFER_RANGE.end()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_within_bounds() {
        let policy = BufferPolicy::default();
        assert_eq!(policy, BufferPolicy::new(30, 60));
        assert!(policy.is_within_bounds());
    }

    #[test]
    fn test_clamped() {
        assert_eq!(BufferPolicy::new(1, 1000).clamped(), BufferPolicy::new(5, 300));
        assert_eq!(BufferPolicy::new(45, 120).clamped(), BufferPolicy::new(45, 120));
        assert!(!BufferPolicy::new(61, 60).is_within_bounds());
    }
}
