use std::time::Duration;

use tokio::time::{Instant, Interval, MissedTickBehavior, interval_at};

/// Length of one sampling window.
pub(crate) const WINDOW_LENGTH: Duration = Duration::from_secs(1);

/// Fixed-cadence clock bounding the request-rate and throughput windows.
/// The first tick fires one window after `run_start`.
pub(crate) struct WindowSampler {
    interval: Interval,
}

impl WindowSampler {
    pub(crate) fn start(run_start: Instant) -> Self {
        let first_tick = run_start
            .checked_add(WINDOW_LENGTH)
            .unwrap_or_else(Instant::now);
        let mut interval = interval_at(first_tick, WINDOW_LENGTH);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        Self { interval }
    }

    pub(crate) async fn tick(&mut self) -> Instant {
        self.interval.tick().await
    }
}
