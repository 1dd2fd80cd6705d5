use std::{
    pin::Pin,
    task::{Context, Poll},
    time::{Duration, SystemTime, UNIX_EPOCH},
};

use futures::stream::Stream;
use tokio::time::{Instant, Interval, MissedTickBehavior};

/// A UNIX timestamp in seconds.
pub type Timestamp = u64;

/// Get the current UNIX timestamp in seconds.
pub fn current_timestamp_seconds() -> Timestamp {
    SystemTime::now().duration_since(UNIX_EPOCH).map_or(0, |d| d.as_secs())
}

/// A clock that ticks once per L2 block time.
///
/// A disabled ticker never yields, which lets callers keep a single `select!` arm
/// regardless of whether block production is enabled. Missed ticks are skipped rather
/// than replayed in a burst.
#[derive(Debug)]
pub struct BlockTicker {
    interval: Option<Interval>,
}

impl BlockTicker {
    /// Creates a ticker that fires every `period`, with the first tick after one period.
    pub fn new(period: Duration) -> Self {
        Self::new_at(Instant::now() + period, period)
    }

    /// Creates a ticker that fires every `period`, starting at `start`.
    pub fn new_at(start: Instant, period: Duration) -> Self {
        let mut interval = tokio::time::interval_at(start, period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        Self { interval: Some(interval) }
    }

    /// Creates a ticker that never fires.
    pub const fn disabled() -> Self {
        Self { interval: None }
    }

    /// Returns true if the ticker is enabled.
    pub const fn is_enabled(&self) -> bool {
        self.interval.is_some()
    }
}

impl Stream for BlockTicker {
    type Item = Timestamp;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let Some(interval) = self.interval.as_mut() else {
            return Poll::Pending;
        };

        match interval.poll_tick(cx) {
            Poll::Ready(_) => Poll::Ready(Some(current_timestamp_seconds())),
            Poll::Pending => Poll::Pending,
        }
    }
}
