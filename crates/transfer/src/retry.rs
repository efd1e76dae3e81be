//! Automatic retry policy for failed transfers.

use std::time::Duration;

/// Linear backoff: the delay before retry attempt `n` (1-based) is
/// `base_delay * n`.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Maximum automatic retries per task before it stays in error.
    pub max_retries: u32,
    /// Base delay, multiplied by the attempt number.
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay: Duration::from_millis(1000),
        }
    }
}

impl RetryPolicy {
    /// Delay before the given attempt (1-based).
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        self.base_delay.saturating_mul(attempt.max(1))
    }
}
