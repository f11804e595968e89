//! api::retry
//!
//! Retry policy and backoff schedule for the transport.
//!
//! The delay before retry `n` (zero-based) is
//! `base * 2^n + uniform(0, base * 2^n / 2)`.

use std::time::Duration;

/// Maximum attempts per request.
pub const MAX_RETRIES: u32 = 5;

/// Base backoff delay.
pub const BASE_DELAY: Duration = Duration::from_millis(100);

/// Per-attempt HTTP timeout.
pub const TIMEOUT: Duration = Duration::from_secs(30);

/// Content type for request bodies.
pub const CONTENT_TYPE: &str = "application/json";

/// Bounded retry with exponential backoff and half-range jitter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first.
    pub max_retries: u32,
    /// Delay unit doubled on every retry.
    pub base_delay: Duration,
    /// Timeout applied to each HTTP attempt.
    pub timeout: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: MAX_RETRIES,
            base_delay: BASE_DELAY,
            timeout: TIMEOUT,
        }
    }
}

impl RetryPolicy {
    /// Deterministic part of the delay: `base * 2^attempt`, saturating.
    pub fn base_backoff(&self, attempt: u32) -> Duration {
        let factor = 2u32.checked_pow(attempt).unwrap_or(u32::MAX);
        self.base_delay.saturating_mul(factor)
    }

    /// Delay for `attempt` with `jitter` in `[0, 1]` scaling the half-range.
    pub fn backoff_with_jitter(&self, attempt: u32, jitter: f64) -> Duration {
        let backoff = self.base_backoff(attempt);
        let jitter = jitter.clamp(0.0, 1.0);
        backoff.saturating_add((backoff / 2).mul_f64(jitter))
    }

    /// Delay for `attempt` with a random jitter.
    pub fn backoff(&self, attempt: u32) -> Duration {
        let jitter: f64 = rand::random();
        self.backoff_with_jitter(attempt, jitter)
    }
}
