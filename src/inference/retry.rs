use std::future::Future;
use std::time::Duration;
use tokio::time::{sleep, timeout};

use crate::error::{Error, Result};

/// Per-call timeout plus a bounded number of retries on transient failures.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub retries: u32,
    pub timeout: Duration,
    pub backoff: Duration,
}

impl RetryPolicy {
    pub fn new(retries: u32, timeout: Duration) -> Self {
        Self {
            retries,
            timeout,
            backoff: Duration::from_millis(250),
        }
    }

    pub fn with_backoff(mut self, backoff: Duration) -> Self {
        self.backoff = backoff;
        self
    }

    pub async fn call<T, F, Fut>(&self, what: &str, mut op: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let mut attempt = 0;
        loop {
            let outcome = match timeout(self.timeout, op()).await {
                Ok(result) => result,
                Err(_) => Err(Error::Timeout(self.timeout)),
            };

            match outcome {
                Ok(value) => return Ok(value),
                Err(e) if e.is_retryable() && attempt < self.retries => {
                    attempt += 1;
                    let wait = self.wait_before_retry(&e);
                    tracing::debug!(
                        "{} failed ({}), retry {}/{} in {:?}",
                        what,
                        e,
                        attempt,
                        self.retries,
                        wait
                    );
                    sleep(wait).await;
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Server wait hints are honoured but never exceed the per-call timeout.
    fn wait_before_retry(&self, error: &Error) -> Duration {
        let hint = match error {
            Error::ModelUnavailable(secs) if secs.is_finite() && *secs > 0.0 => {
                Duration::from_secs_f64(secs.min(self.timeout.as_secs_f64()))
            }
            Error::RateLimited(secs) => Duration::from_secs(*secs),
            _ => Duration::ZERO,
        };
        hint.min(self.timeout).max(self.backoff)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(1, Duration::from_secs(30))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn fast_policy(retries: u32) -> RetryPolicy {
        RetryPolicy::new(retries, Duration::from_millis(50)).with_backoff(Duration::from_millis(1))
    }

    #[tokio::test]
    async fn test_retries_once_then_succeeds() {
        let calls = AtomicU32::new(0);
        let result = fast_policy(1)
            .call("ner", || async {
                if calls.fetch_add(1, Ordering::SeqCst) == 0 {
                    Err(Error::Timeout(Duration::from_millis(1)))
                } else {
                    Ok(7)
                }
            })
            .await;

        assert_eq!(result.unwrap(), 7);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_gives_up_after_retry_budget() {
        let calls = AtomicU32::new(0);
        let result: Result<()> = fast_policy(1)
            .call("ner", || async {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(Error::RateLimited(0))
            })
            .await;

        assert!(matches!(result, Err(Error::RateLimited(_))));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_permanent_errors_are_not_retried() {
        let calls = AtomicU32::new(0);
        let result: Result<()> = fast_policy(3)
            .call("ner", || async {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(Error::InputTooLong(9000))
            })
            .await;

        assert!(matches!(result, Err(Error::InputTooLong(9000))));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_wait_hints_are_capped_by_call_timeout() {
        let policy = fast_policy(1);
        assert_eq!(
            policy.wait_before_retry(&Error::RateLimited(3600)),
            Duration::from_millis(50)
        );
        assert_eq!(
            policy.wait_before_retry(&Error::ModelUnavailable(120.0)),
            Duration::from_millis(50)
        );
        assert_eq!(
            policy.wait_before_retry(&Error::ModelUnavailable(f64::NAN)),
            Duration::from_millis(1)
        );

        let patient = RetryPolicy::new(1, Duration::from_secs(30));
        assert_eq!(patient.wait_before_retry(&Error::RateLimited(2)), Duration::from_secs(2));
        assert_eq!(
            patient.wait_before_retry(&Error::Timeout(Duration::from_secs(1))),
            Duration::from_millis(250)
        );
    }

    #[tokio::test]
    async fn test_long_retry_after_does_not_stall() {
        let calls = AtomicU32::new(0);
        let policy = fast_policy(1);
        let call = policy.call("ner", || async {
            if calls.fetch_add(1, Ordering::SeqCst) == 0 {
                Err(Error::RateLimited(3600))
            } else {
                Ok("done")
            }
        });

        let result = timeout(Duration::from_secs(2), call)
            .await
            .expect("retry waited past the call timeout");
        assert_eq!(result.unwrap(), "done");
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_slow_call_times_out() {
        let result: Result<()> = fast_policy(0)
            .call("summarize", || async {
                sleep(Duration::from_secs(5)).await;
                Ok(())
            })
            .await;

        assert!(matches!(result, Err(Error::Timeout(_))));
    }
}
