use std::time::{Duration, Instant};

/// Rate limiter for repetitive log lines and diagnostics.
///
/// The first call always passes, then at most one call per configured
/// interval. Time is measured on the monotonic clock.
#[derive(Debug)]
pub struct LogThrottle {
    min_interval: Duration,
    last: Option<Instant>,
}

impl LogThrottle {
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last: None,
        }
    }

    pub fn from_millis(min_interval_ms: u64) -> Self {
        Self::new(Duration::from_millis(min_interval_ms))
    }

    /// Returns true when the caller is allowed to log now.
    pub fn allow(&mut self) -> bool {
        let now = Instant::now();
        match self.last {
            Some(last) if now.duration_since(last) < self.min_interval => false,
            _ => {
                self.last = Some(now);
                true
            }
        }
    }
}
