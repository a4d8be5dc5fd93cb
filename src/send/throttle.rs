//! Pacing between sends.

use std::time::{Duration, Instant};

use tracing::trace;

/// Minimum interval between the end of one successful send and the start
/// of the next.
#[derive(Debug, Clone)]
pub struct Throttle {
    interval: Duration,
    last_sent: Option<Instant>,
}

impl Throttle {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last_sent: None,
        }
    }

    /// A throttle that never waits.
    pub fn disabled() -> Self {
        Self::new(Duration::ZERO)
    }

    /// How long [`wait`](Self::wait) would block right now.
    pub fn remaining(&self) -> Duration {
        match self.last_sent {
            Some(at) => self.interval.saturating_sub(at.elapsed()),
            None => Duration::ZERO,
        }
    }

    /// Block until the interval since the last successful send has passed.
    pub fn wait(&self) {
        let remaining = self.remaining();
        if !remaining.is_zero() {
            trace!(millis = remaining.as_millis() as u64, "Throttling");
            std::thread::sleep(remaining);
        }
    }

    /// Record a successful send.
    pub fn mark_sent(&mut self) {
        self.last_sent = Some(Instant::now());
    }
}
