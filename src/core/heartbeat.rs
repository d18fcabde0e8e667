//! # Device status heartbeat.
//!
//! [`Heartbeat`] owns the publication timer. The agent loop polls [`Heartbeat::tick`] and calls
//! [`Heartbeat::on_connected`] on every `Connected` event; only the first one fires an immediate
//! tick and restarts the period.
//!
//! ```text
//! t=0        initial Connected ──► publish, reset
//! t=P        tick ──► connected? publish : HeartbeatSkipped
//! t=2P       tick ──► ...
//! ```
//!
//! Missed ticks are delayed, never bunched.

use std::time::Duration;

use tokio::time::{Instant, Interval, MissedTickBehavior, interval_at};

/// Heartbeat timer.
pub(crate) struct Heartbeat {
    timer: Interval,
    awaiting_first_connect: bool,
}

impl Heartbeat {
    pub(crate) fn new(period: Duration) -> Self {
        let mut timer = interval_at(Instant::now() + period, period);
        timer.set_missed_tick_behavior(MissedTickBehavior::Delay);
        Self {
            timer,
            awaiting_first_connect: true,
        }
    }

    /// Completes at the next period boundary.
    pub(crate) async fn tick(&mut self) {
        self.timer.tick().await;
    }

    /// Returns `true` if an immediate heartbeat is due (initial connection only) and restarts the
    /// period.
    pub(crate) fn on_connected(&mut self) -> bool {
        if !self.awaiting_first_connect {
            return false;
        }
        self.awaiting_first_connect = false;
        self.timer.reset();
        true
    }
}
