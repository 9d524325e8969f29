use std::time::{Duration, Instant};

/// Per-request HTTP timeout.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// When and how often to poll a job's status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    pub fast_interval: Duration,
    pub slow_interval: Duration,
    /// Elapsed time after which polling switches to `slow_interval`.
    pub slow_after: Duration,
    /// Polling stops with a timeout once elapsed time exceeds this.
    pub deadline: Duration,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            fast_interval: Duration::from_millis(500),
            slow_interval: Duration::from_secs(1),
            slow_after: Duration::from_secs(10),
            deadline: Duration::from_secs(60),
        }
    }
}

impl PollPolicy {
    pub fn interval_at(&self, elapsed: Duration) -> Duration {
        if elapsed >= self.slow_after {
            self.slow_interval
        } else {
            self.fast_interval
        }
    }

    pub fn is_expired(&self, elapsed: Duration) -> bool {
        elapsed > self.deadline
    }
}

/// Time source for the polling loop.
pub trait Clock {
    /// Time since some fixed origin.
    fn now(&self) -> Duration;
    fn sleep(&self, duration: Duration);
}

pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }

    fn sleep(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}
