use tokio::time::{Duration, Instant};

/// Default floor for one fetching iteration.
pub const DEFAULT_MIN_INTERVAL: Duration = Duration::from_secs(10);

/// Fixed-interval throttle: each fetching iteration lasts at least
/// `min_interval`, the remainder being slept out after the fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Throttle {
    min_interval: Duration,
}

impl Default for Throttle {
    fn default() -> Self {
        Self::new(DEFAULT_MIN_INTERVAL)
    }
}

impl Throttle {
    pub fn new(min_interval: Duration) -> Self {
        Self { min_interval }
    }

    /// A throttle that never sleeps.
    pub fn disabled() -> Self {
        Self::new(Duration::ZERO)
    }

    pub fn min_interval(&self) -> Duration {
        self.min_interval
    }

    /// How long to sleep after an iteration that took `elapsed`.
    pub fn remaining(&self, elapsed: Duration) -> Option<Duration> {
        self.min_interval
            .checked_sub(elapsed)
            .filter(|rest| !rest.is_zero())
    }

    /// Sleep out whatever is left of the interval that began at `started`.
    pub async fn wait_since(&self, started: Instant) {
        let elapsed = started.elapsed();
        if let Some(rest) = self.remaining(elapsed) {
            log::debug!(
                "Iteration took {:.2}s, sleeping {:.2}s to reach {}s",
                elapsed.as_secs_f64(),
                rest.as_secs_f64(),
                self.min_interval.as_secs_f64(),
            );
            tokio::time::sleep(rest).await;
        }
    }
}
