//! Bounded retry with exponential backoff for network operations

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

/// Attempts per operation, including the first one
pub const MAX_ATTEMPTS: u32 = 3;

/// Retry policy: fixed attempt ceiling, exponential backoff, no jitter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Delay before the first retry; doubles for every retry after it
    pub base_delay: Duration,
}

impl RetryPolicy {
    pub fn new(base_delay: Duration) -> Self {
        Self { base_delay }
    }

    /// Delay before retry number `retry` (1-indexed): `base * 2^(retry - 1)`
    pub fn delay_before_retry(&self, retry: u32) -> Duration {
        self.base_delay
            .saturating_mul(2_u32.saturating_pow(retry.saturating_sub(1)))
    }

    /// Run `op` until it succeeds, fails with an error `is_retryable` rejects,
    /// or [`MAX_ATTEMPTS`] is reached. The last error is returned.
    pub async fn run<T, E, F, Fut>(
        &self,
        operation: &str,
        is_retryable: impl Fn(&E) -> bool,
        mut op: F,
    ) -> Result<T, E>
    where
        E: Display,
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let mut attempt = 1;
        loop {
            match op().await {
                Ok(value) => return Ok(value),
                Err(error) if attempt < MAX_ATTEMPTS && is_retryable(&error) => {
                    let delay = self.delay_before_retry(attempt);
                    tracing::warn!(
                        operation = %operation,
                        attempt = attempt,
                        delay_ms = delay.as_millis() as u64,
                        error = %error,
                        "Attempt failed, retrying"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(error) => {
                    tracing::error!(
                        operation = %operation,
                        attempt = attempt,
                        error = %error,
                        "Giving up"
                    );
                    return Err(error);
                }
            }
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(Duration::from_millis(1000))
    }
}
