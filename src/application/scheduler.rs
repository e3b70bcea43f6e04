// Drift-free interval scheduling
use std::time::Duration;
use tokio::time::Instant;

const NANOS_PER_SEC: u128 = 1_000_000_000;

/// Delay from `now` until the next boundary `anchor + k * interval`.
///
/// The result is in `(0, interval]`: a call made exactly on a boundary waits a
/// full interval. Time spent between boundaries never accumulates, so wake-ups
/// stay aligned to the anchor however long each cycle runs.
pub fn next_tick(anchor: Instant, now: Instant, interval: Duration) -> Duration {
    if interval.is_zero() {
        return Duration::ZERO;
    }

    let elapsed = now.saturating_duration_since(anchor);
    // phase < interval, so its seconds always fit back into a Duration
    let phase = elapsed.as_nanos() % interval.as_nanos();
    let phase = Duration::new(
        (phase / NANOS_PER_SEC) as u64,
        (phase % NANOS_PER_SEC) as u32,
    );
    interval.saturating_sub(phase)
}

/// Fixed anchor plus interval, owned by one polling loop
#[derive(Debug, Clone, Copy)]
pub struct Ticker {
    anchor: Instant,
    interval: Duration,
}

impl Ticker {
    pub fn new(anchor: Instant, interval: Duration) -> Self {
        Self { anchor, interval }
    }

    pub fn starting_now(interval: Duration) -> Self {
        Self::new(Instant::now(), interval)
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn until_next(&self, now: Instant) -> Duration {
        next_tick(self.anchor, now, self.interval)
    }
}
