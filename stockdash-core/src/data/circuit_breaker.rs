//! Circuit breaker for a provider that bans or throttles us.
//!
//! HTTP 403 trips the breaker immediately; a run of consecutive failures trips
//! it too. While open, every request is refused locally until the cooldown
//! expires. The breaker never retries anything itself.

use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BreakerState {
    /// Requests are allowed.
    Closed,
    /// Requests are refused until the cooldown elapses.
    Open { tripped_at: Instant },
}

#[derive(Debug)]
struct Inner {
    state: BreakerState,
    consecutive_failures: u32,
}

#[derive(Debug)]
pub struct CircuitBreaker {
    inner: Mutex<Inner>,
    cooldown: Duration,
    failure_threshold: u32,
}

impl CircuitBreaker {
    pub fn new(cooldown: Duration) -> Self {
        Self::with_threshold(cooldown, 3)
    }

    pub fn with_threshold(cooldown: Duration, failure_threshold: u32) -> Self {
        Self {
            inner: Mutex::new(Inner {
                state: BreakerState::Closed,
                consecutive_failures: 0,
            }),
            cooldown,
            failure_threshold: failure_threshold.max(1),
        }
    }

    /// 30-minute cooldown, trips after 3 consecutive failures.
    pub fn default_provider() -> Self {
        Self::new(Duration::from_secs(30 * 60))
    }

    // A panic while holding the lock leaves plain counters behind, so a
    // poisoned guard is still safe to use.
    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Check whether a request may go out, closing the breaker if the
    /// cooldown has expired.
    pub fn is_allowed(&self) -> bool {
        let mut inner = self.lock();
        match inner.state {
            BreakerState::Closed => true,
            BreakerState::Open { tripped_at } if tripped_at.elapsed() >= self.cooldown => {
                inner.state = BreakerState::Closed;
                inner.consecutive_failures = 0;
                true
            }
            BreakerState::Open { .. } => false,
        }
    }

    #[cfg(test)]
    fn state(&self) -> BreakerState {
        self.lock().state
    }

    pub fn record_success(&self) {
        self.lock().consecutive_failures = 0;
    }

    pub fn record_failure(&self) {
        let mut inner = self.lock();
        inner.consecutive_failures += 1;
        if inner.consecutive_failures >= self.failure_threshold {
            inner.state = BreakerState::Open {
                tripped_at: Instant::now(),
            };
        }
    }

    /// Open immediately (HTTP 403 / IP ban).
    pub fn trip(&self) {
        self.lock().state = BreakerState::Open {
            tripped_at: Instant::now(),
        };
    }

    /// Remaining cooldown, zero when closed.
    pub fn remaining_cooldown(&self) -> Duration {
        match self.lock().state {
            BreakerState::Closed => Duration::ZERO,
            BreakerState::Open { tripped_at } => self.cooldown.saturating_sub(tripped_at.elapsed()),
        }
    }
}
