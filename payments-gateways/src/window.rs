//! Bucketed rolling counter over a fixed lookback.

use std::time::Duration;

use tokio::time::Instant;

#[derive(Debug, Clone, Copy, Default)]
struct Bucket {
    /// Index of the time slice this bucket currently counts for
    epoch: u64,
    count: u32,
}

/// Counts events over the last `buckets × bucket_width` of time.
///
/// Time is cut into slices of `bucket_width` starting at `origin`; each
/// slice maps onto a ring slot. A slot whose epoch is older than the ring
/// length is expired and ignored by [`RollingWindow::count`], then reused
/// by the next [`RollingWindow::record`] that lands on it.
#[derive(Debug, Clone)]
pub struct RollingWindow {
    buckets: Vec<Bucket>,
    bucket_width: Duration,
    origin: Instant,
}

impl RollingWindow {
    /// Zero buckets or a zero width are raised to one bucket / one millisecond.
    pub fn new(buckets: usize, bucket_width: Duration, origin: Instant) -> Self {
        Self {
            buckets: vec![Bucket::default(); buckets.max(1)],
            bucket_width: bucket_width.max(Duration::from_millis(1)),
            origin,
        }
    }

    pub fn lookback(&self) -> Duration {
        crate::breaker::saturating_span(self.bucket_width, self.buckets.len())
    }

    pub fn record(&mut self, now: Instant) {
        let epoch = self.epoch(now);
        let slot = (epoch % self.buckets.len() as u64) as usize;
        let bucket = &mut self.buckets[slot];
        if bucket.epoch != epoch {
            *bucket = Bucket { epoch, count: 0 };
        }
        bucket.count = bucket.count.saturating_add(1);
    }

    /// Events recorded within the lookback ending at `now`.
    pub fn count(&self, now: Instant) -> u32 {
        let current = self.epoch(now);
        let span = self.buckets.len() as u64;
        self.buckets
            .iter()
            .filter(|b| b.epoch <= current && current - b.epoch < span)
            .fold(0u32, |total, b| total.saturating_add(b.count))
    }

    fn epoch(&self, now: Instant) -> u64 {
        let elapsed = now.saturating_duration_since(self.origin);
        (elapsed.as_nanos() / self.bucket_width.as_nanos()) as u64
    }
}
