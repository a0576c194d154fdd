use tokio::time::sleep;
use tracing::{info, warn};

use crate::models::retry::RetryPolicy;

/// Runs `operation` until it succeeds or `policy.max_attempts` is spent.
///
/// After failed attempt `i` it sleeps `i * policy.backoff_unit`; there is no
/// sleep after the last attempt. The last error is returned on exhaustion.
pub async fn retry_with_linear_backoff<F, Fut, T, E>(
    policy: &RetryPolicy,
    operation: F,
) -> Result<T, E>
where
    F: Fn() -> Fut,
    Fut: std::future::Future<Output = Result<T, E>>,
    E: std::fmt::Display,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 0;

    loop {
        attempt += 1;

        match operation().await {
            Ok(result) => {
                info!(attempt, max_attempts, "Attempt succeeded");
                return Ok(result);
            }
            Err(e) => {
                if attempt >= max_attempts {
                    warn!(
                        max_attempts,
                        error = %e,
                        "Giving up after exhausting all attempts"
                    );
                    return Err(e);
                }

                let delay = policy.delay_after(attempt);

                warn!(
                    attempt,
                    max_attempts,
                    delay_ms = delay.as_millis() as u64,
                    error = %e,
                    "Attempt failed, backing off"
                );

                sleep(delay).await;
            }
        }
    }
}
