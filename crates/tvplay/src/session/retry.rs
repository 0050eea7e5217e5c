//! Bounded restart policy for live sessions.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;
use tracing::trace;

use crate::engine::EventSink;
use crate::session::SessionEvent;

/// Configuration for retry behavior.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Maximum number of automatic restarts per lineage.
    pub max_retries: u32,
    /// Delay unit in milliseconds. Attempt `n` waits `n * base_delay_ms`.
    pub base_delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay_ms: 2000,
        }
    }
}

impl RetryConfig {
    /// Linear backoff: attempt 1 waits one base delay, attempt 2 two, and so on.
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        Duration::from_millis(self.base_delay_ms.saturating_mul(u64::from(attempt)))
    }
}

/// Where a lineage stands in the retry cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "phase", content = "attempt")]
pub enum RetryPhase {
    Idle,
    Retrying(u32),
    Exhausted,
}

/// What to do about a retryable failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    /// Restart the session after `delay`.
    Retry { attempt: u32, delay: Duration },
    /// The budget just ran out; report it and stop. `attempts` counts the
    /// first start plus every restart.
    Exhausted { attempts: u32 },
    /// The budget ran out earlier; nothing more to do.
    Ignore,
}

/// Retry counter for one session lineage.
///
/// A lineage starts when the user selects a channel and continues through
/// every automatic restart of that channel.
#[derive(Debug, Clone)]
pub struct RetryState {
    config: RetryConfig,
    count: u32,
    exhausted: bool,
}

impl RetryState {
    pub fn new(config: RetryConfig) -> Self {
        Self {
            config,
            count: 0,
            exhausted: false,
        }
    }

    pub fn count(&self) -> u32 {
        self.count
    }

    pub fn max(&self) -> u32 {
        self.config.max_retries
    }

    pub fn phase(&self) -> RetryPhase {
        if self.exhausted {
            RetryPhase::Exhausted
        } else if self.count == 0 {
            RetryPhase::Idle
        } else {
            RetryPhase::Retrying(self.count)
        }
    }

    /// Start a fresh lineage.
    pub fn reset(&mut self) {
        self.count = 0;
        self.exhausted = false;
    }

    /// Playback started; the failures so far are no longer consecutive.
    pub fn record_success(&mut self) {
        if !self.exhausted {
            self.count = 0;
        }
    }

    /// Account for a retryable failure.
    pub fn record_failure(&mut self) -> RetryDecision {
        if self.exhausted {
            return RetryDecision::Ignore;
        }
        if self.count < self.config.max_retries {
            self.count += 1;
            RetryDecision::Retry {
                attempt: self.count,
                delay: self.config.delay_for_attempt(self.count),
            }
        } else {
            self.exhausted = true;
            RetryDecision::Exhausted {
                attempts: self.count.saturating_add(1),
            }
        }
    }
}

/// Deliver [`SessionEvent::RetryDue`] after `delay` unless the session's
/// token is cancelled first.
pub(crate) fn schedule_restart(delay: Duration, sink: EventSink, token: CancellationToken) {
    tokio::spawn(async move {
        tokio::select! {
            _ = token.cancelled() => {
                trace!(generation = %sink.generation(), "Scheduled restart cancelled");
            }
            _ = tokio::time::sleep(delay) => {
                sink.send(SessionEvent::RetryDue);
            }
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_linear_backoff() {
        let config = RetryConfig::default();
        assert_eq!(config.delay_for_attempt(1), Duration::from_millis(2000));
        assert_eq!(config.delay_for_attempt(2), Duration::from_millis(4000));
        assert_eq!(config.delay_for_attempt(3), Duration::from_millis(6000));
    }

    #[test]
    fn test_delay_saturates() {
        let config = RetryConfig {
            max_retries: 3,
            base_delay_ms: u64::MAX,
        };
        assert_eq!(config.delay_for_attempt(2), Duration::from_millis(u64::MAX));
    }

    #[test]
    fn test_state_transitions() {
        let mut state = RetryState::new(RetryConfig::default());
        assert_eq!(state.phase(), RetryPhase::Idle);

        for attempt in 1..=3 {
            assert_eq!(
                state.record_failure(),
                RetryDecision::Retry {
                    attempt,
                    delay: Duration::from_millis(2000 * u64::from(attempt)),
                }
            );
            assert_eq!(state.phase(), RetryPhase::Retrying(attempt));
        }

        assert_eq!(state.record_failure(), RetryDecision::Exhausted { attempts: 4 });
        assert_eq!(state.phase(), RetryPhase::Exhausted);
        assert_eq!(state.record_failure(), RetryDecision::Ignore);
        assert_eq!(state.count(), 3);
    }

    #[test]
    fn test_success_resets_count() {
        let mut state = RetryState::new(RetryConfig::default());
        state.record_failure();
        state.record_failure();
        state.record_success();
        assert_eq!(state.phase(), RetryPhase::Idle);
        assert!(matches!(state.record_failure(), RetryDecision::Retry { attempt: 1, .. }));
    }

    #[test]
    fn test_success_does_not_revive_exhausted_lineage() {
        let mut state = RetryState::new(RetryConfig {
            max_retries: 0,
            base_delay_ms: 10,
        });
        assert_eq!(state.record_failure(), RetryDecision::Exhausted { attempts: 1 });
        state.record_success();
        assert_eq!(state.phase(), RetryPhase::Exhausted);

        state.reset();
        assert_eq!(state.phase(), RetryPhase::Idle);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// *For any* failure/success sequence the count stays within the
        /// budget and exhaustion is announced at most once.
        #[test]
        fn prop_count_never_exceeds_max(
            max_retries in 0u32..6,
            outcomes in prop::collection::vec(any::<bool>(), 0..40),
        ) {
            let mut state = RetryState::new(RetryConfig { max_retries, base_delay_ms: 1 });
            let mut exhausted_reports = 0;

            for failed in outcomes {
                if failed {
                    if let RetryDecision::Exhausted { .. } = state.record_failure() {
                        exhausted_reports += 1;
                    }
                } else {
                    state.record_success();
                }
                prop_assert!(state.count() <= max_retries);
            }
            prop_assert!(exhausted_reports <= 1);
        }
    }
}
