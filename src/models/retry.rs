use std::time::Duration;

/// Linear backoff: after failed attempt `i` the caller sleeps `i * backoff_unit`.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub backoff_unit: Duration,
}

impl RetryPolicy {
    /// Saturates at `Duration::MAX` instead of overflowing.
    pub fn delay_after(&self, attempt: u32) -> Duration {
        self.backoff_unit
            .checked_mul(attempt)
            .unwrap_or(Duration::MAX)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 10,
            backoff_unit: Duration::from_secs(1),
        }
    }
}
