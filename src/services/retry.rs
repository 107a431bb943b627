//! Generic retry policy with exponential backoff
//!
//! Applied at call sites that talk to flaky upstreams (webhook
//! registration). The relay path deliberately stays retry-free so a failed
//! clip surfaces to the user immediately.

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;
use tracing::warn;

/// Retry policy: max attempts, exponential backoff, and a caller-supplied
/// predicate deciding which errors are worth retrying.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            max_attempts,
            base_delay,
        }
    }

    /// Run `op` until it succeeds, the predicate rejects the error, or
    /// attempts run out. Backoff doubles after each failed attempt.
    pub async fn run<T, E, F, Fut, P>(&self, mut op: F, should_retry: P) -> Result<T, E>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        P: Fn(&E) -> bool,
        E: Display,
    {
        let mut attempt = 0;

        loop {
            attempt += 1;

            match op().await {
                Ok(value) => return Ok(value),
                Err(e) => {
                    if attempt >= self.max_attempts || !should_retry(&e) {
                        return Err(e);
                    }

                    warn!(
                        attempt = attempt,
                        max_attempts = self.max_attempts,
                        error = %e,
                        "Operation failed, retrying..."
                    );

                    let delay = self.base_delay * 2_u32.pow(attempt - 1);
                    tokio::time::sleep(delay).await;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn quick_policy() -> RetryPolicy {
        RetryPolicy::new(3, Duration::from_millis(1))
    }

    #[tokio::test]
    async fn test_succeeds_after_transient_failures() {
        let calls = AtomicU32::new(0);

        let result: Result<u32, String> = quick_policy()
            .run(
                || {
                    let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
                    async move {
                        if n < 3 {
                            Err("transient".to_string())
                        } else {
                            Ok(n)
                        }
                    }
                },
                |_| true,
            )
            .await;

        assert_eq!(result, Ok(3));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_stops_at_max_attempts() {
        let calls = AtomicU32::new(0);

        let result: Result<(), String> = quick_policy()
            .run(
                || {
                    calls.fetch_add(1, Ordering::SeqCst);
                    async { Err("still broken".to_string()) }
                },
                |_| true,
            )
            .await;

        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_predicate_short_circuits() {
        let calls = AtomicU32::new(0);

        let result: Result<(), String> = quick_policy()
            .run(
                || {
                    calls.fetch_add(1, Ordering::SeqCst);
                    async { Err("permanent".to_string()) }
                },
                |e| e != "permanent",
            )
            .await;

        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
