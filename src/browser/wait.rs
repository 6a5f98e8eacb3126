//! Waiting primitives
//!
//! Readiness is expressed as a predicate polled until a deadline, and bounded
//! retries as an attempt count with a fixed backoff. Durations come from
//! `config::Timing`, so tests run them with zero delays.

use crate::config::Timing;
use std::future::Future;
use std::time::Duration;
use tokio::time::Instant;

/// Polls `check` until it returns true or `timeout` elapses
///
/// The predicate is evaluated at least once, even with a zero timeout.
/// Returns whether the condition was met.
pub async fn until<F, Fut>(timeout: Duration, poll: Duration, mut check: F) -> bool
where
    F: FnMut() -> Fut,
    Fut: Future<Output = bool>,
{
    let deadline = Instant::now() + timeout;
    loop {
        if check().await {
            return true;
        }
        if Instant::now() >= deadline {
            return false;
        }
        pause(poll).await;
    }
}

/// Sleeps for `duration`, skipping the timer entirely when it is zero
pub async fn pause(duration: Duration) {
    if !duration.is_zero() {
        tokio::time::sleep(duration).await;
    }
}

/// Fixed-backoff retry ceiling for transient UI conditions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub attempts: u32,
    pub backoff: Duration,
}

impl RetryPolicy {
    pub fn new(attempts: u32, backoff: Duration) -> Self {
        Self {
            attempts: attempts.max(1),
            backoff,
        }
    }

    pub fn from_timing(timing: &Timing) -> Self {
        Self::new(timing.retry_attempts, timing.retry_backoff())
    }

    /// Waits between attempts; no wait follows the final attempt
    pub async fn backoff_after(&self, attempt: u32) {
        if attempt < self.attempts {
            pause(self.backoff).await;
        }
    }
}
