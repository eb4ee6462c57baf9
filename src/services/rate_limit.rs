use std::thread;
use std::time::{Duration, Instant};

use tracing::{debug, info};

use crate::error::ConfigError;

const LONG_WAIT: Duration = Duration::from_secs(1);

/// Fixed-window request budget.
///
/// Policy: **block**. A request beyond `max_requests` in the current window
/// sleeps until the window closes; it never fails. Callers therefore need no
/// throttling of their own.
#[derive(Debug, Clone)]
pub struct RateLimiter {
    window: Duration,
    max_requests: u32,
    window_start: Option<Instant>,
    used: u32,
}

impl RateLimiter {
    pub fn new(window: Duration, max_requests: u32) -> Result<Self, ConfigError> {
        if max_requests == 0 || window.is_zero() {
            return Err(ConfigError::Invalid(format!(
                "rate limit needs a positive budget, got {max_requests} per {window:?}"
            )));
        }
        Ok(Self {
            window,
            max_requests,
            window_start: None,
            used: 0,
        })
    }

    /// Takes one token at `now`, or returns how long to wait before retrying.
    pub fn reserve(&mut self, now: Instant) -> Option<Duration> {
        let start = match self.window_start {
            Some(start) if now.saturating_duration_since(start) < self.window => start,
            _ => {
                self.window_start = Some(now);
                self.used = 0;
                now
            }
        };

        if self.used < self.max_requests {
            self.used += 1;
            return None;
        }

        Some((start + self.window).saturating_duration_since(now))
    }

    /// Blocks until a token is available.
    ///
    /// The sleep is not interruptible: a cancelled sync still waits here for
    /// the window to close before its in-flight component can finish.
    pub fn acquire(&mut self) {
        while let Some(wait) = self.reserve(Instant::now()) {
            if wait >= LONG_WAIT {
                info!(wait_secs = wait.as_secs(), "rate limit reached, waiting for the next window");
            } else {
                debug!(wait_ms = wait.as_millis() as u64, "rate limit reached, waiting");
            }
            thread::sleep(wait);
        }
    }
}
