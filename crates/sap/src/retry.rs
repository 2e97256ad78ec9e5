//! Fixed-delay retry for idempotent gateway reads.
//!
//! Only transient failures are retried; a definite answer from the gateway
//! (4xx, or a `success: false` reply) is returned on the first attempt.

use std::future::Future;
use std::time::Duration;

/// How many times to try, and how long to wait in between.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Total attempts including the first. Values below 1 are treated as 1.
    pub attempts: u32,
    /// Pause between consecutive attempts.
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts: 3,
            delay: Duration::from_millis(1000),
        }
    }
}

impl RetryPolicy {
    /// A policy that never retries.
    pub fn none() -> Self {
        Self {
            attempts: 1,
            delay: Duration::ZERO,
        }
    }
}

/// Run `op` until it succeeds, fails permanently, or runs out of attempts.
///
/// `is_transient` decides whether an error is worth another try. The last
/// error is returned when all attempts fail.
pub async fn with_retry<T, E, F, Fut>(
    policy: &RetryPolicy,
    operation: &str,
    is_transient: impl Fn(&E) -> bool,
    mut op: F,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: std::fmt::Display,
{
    let attempts = policy.attempts.max(1);
    let mut attempt = 0u32;

    loop {
        attempt += 1;
        match op().await {
            Ok(value) => {
                if attempt > 1 {
                    tracing::info!(operation, attempt, "Gateway call succeeded after retry");
                }
                return Ok(value);
            }
            Err(e) if attempt < attempts && is_transient(&e) => {
                tracing::warn!(
                    operation,
                    attempt,
                    delay_ms = policy.delay.as_millis() as u64,
                    error = %e,
                    "Gateway call attempt {attempt} failed, retrying",
                );
                tokio::time::sleep(policy.delay).await;
            }
            Err(e) => return Err(e),
        }
    }
}
