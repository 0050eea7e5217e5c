//! Periodic stall check for HLS sessions.
//!
//! The ticker only nudges the controller; the controller decides whether
//! the surface looks frozen and runs the recovery, so the check always sees
//! the current session.

use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::trace;

use crate::engine::EventSink;
use crate::session::SessionEvent;

/// Send a [`SessionEvent::WatchdogTick`] every `period` until `token` is
/// cancelled or the controller goes away. The first tick fires one period
/// after spawning.
pub(crate) fn spawn_watchdog(
    period: Duration,
    sink: EventSink,
    token: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = token.cancelled() => {
                    trace!(generation = %sink.generation(), "Watchdog cancelled");
                    break;
                }
                _ = ticker.tick() => {
                    if !sink.send(SessionEvent::WatchdogTick) {
                        break;
                    }
                }
            }
        }
    })
}
