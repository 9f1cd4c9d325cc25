//! Retry with exponential back-off and jitter for storefront fetches.
//!
//! [`RetryPolicy::run`] wraps any fallible async operation and retries on
//! transient errors (network failures, non-200 statuses). Non-transient
//! errors — parse failures, credential problems, configuration defects — are
//! returned immediately without any retry.

use std::future::Future;
use std::time::Duration;

use crate::error::{is_retriable, ScrapeError};

/// Exponential back-off schedule for a fallible operation.
///
/// `max_attempts` counts *total* attempts: a policy with `max_attempts = 3`
/// issues at most three requests. The sleep before the (n+1)-th attempt is
/// `min(max_delay, base_delay · multiplier^n)`, plus up to one second of
/// uniform jitter when `jitter` is on.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
    pub backoff_multiplier: f64,
    pub jitter: bool,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(10),
            backoff_multiplier: 2.0,
            jitter: true,
        }
    }
}

impl RetryPolicy {
    /// Sleep duration after the 0-indexed `attempt`-th failed attempt.
    #[allow(clippy::cast_possible_wrap)]
    fn delay_for(&self, attempt: u32) -> Duration {
        let exponential =
            self.base_delay.as_secs_f64() * self.backoff_multiplier.powi(attempt.min(30) as i32);
        let capped = exponential.min(self.max_delay.as_secs_f64());
        let with_jitter = if self.jitter {
            capped + rand::random::<f64>()
        } else {
            capped
        };
        Duration::from_secs_f64(with_jitter)
    }

    /// Runs `operation` until it succeeds, fails non-retriably, or
    /// `max_attempts` is exhausted.
    ///
    /// # Errors
    ///
    /// - The operation's own error, unchanged, when it is not retriable.
    /// - [`ScrapeError::RetryExhausted`] wrapping the last transient error
    ///   once all attempts are spent.
    pub async fn run<T, F, Fut>(&self, mut operation: F) -> Result<T, ScrapeError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, ScrapeError>>,
    {
        let max_attempts = self.max_attempts.max(1);
        let mut attempt = 0u32;
        loop {
            match operation().await {
                Ok(value) => return Ok(value),
                Err(err) => {
                    if !is_retriable(&err) {
                        return Err(err);
                    }
                    attempt += 1;
                    if attempt >= max_attempts {
                        return Err(ScrapeError::RetryExhausted {
                            attempts: max_attempts,
                            source: Box::new(err),
                        });
                    }
                    let delay = self.delay_for(attempt - 1);
                    tracing::warn!(
                        attempt,
                        max_attempts,
                        delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                        error = %err,
                        "transient fetch error — retrying after backoff"
                    );
                    tokio::time::sleep(delay).await;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    use super::*;

    /// Policy with no sleeping so tests run instantly.
    fn instant_policy(max_attempts: u32) -> RetryPolicy {
        RetryPolicy {
            max_attempts,
            base_delay: Duration::ZERO,
            max_delay: Duration::ZERO,
            backoff_multiplier: 2.0,
            jitter: false,
        }
    }

    fn transient_error() -> ScrapeError {
        ScrapeError::Status {
            status: 503,
            url: "https://example.test/p".to_owned(),
        }
    }

    #[tokio::test]
    async fn succeeds_immediately_on_first_try() {
        let calls = Arc::new(AtomicU32::new(0));
        let c = Arc::clone(&calls);
        let result = instant_policy(3)
            .run(|| {
                let c = Arc::clone(&c);
                async move {
                    c.fetch_add(1, Ordering::SeqCst);
                    Ok::<u32, ScrapeError>(42)
                }
            })
            .await;
        assert_eq!(result.unwrap(), 42);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn always_failing_operation_performs_exactly_max_attempts() {
        let calls = Arc::new(AtomicU32::new(0));
        let c = Arc::clone(&calls);
        let result = instant_policy(3)
            .run(|| {
                let c = Arc::clone(&c);
                async move {
                    c.fetch_add(1, Ordering::SeqCst);
                    Err::<u32, ScrapeError>(transient_error())
                }
            })
            .await;
        assert_eq!(calls.load(Ordering::SeqCst), 3, "max_attempts is total attempts");
        assert!(
            matches!(result, Err(ScrapeError::RetryExhausted { attempts: 3, .. })),
            "expected RetryExhausted, got: {result:?}"
        );
    }

    #[tokio::test]
    async fn success_on_second_attempt_performs_exactly_two_attempts() {
        let calls = Arc::new(AtomicU32::new(0));
        let c = Arc::clone(&calls);
        let result = instant_policy(3)
            .run(|| {
                let c = Arc::clone(&c);
                async move {
                    if c.fetch_add(1, Ordering::SeqCst) == 0 {
                        Err(transient_error())
                    } else {
                        Ok::<u32, ScrapeError>(99)
                    }
                }
            })
            .await;
        assert_eq!(result.unwrap(), 99);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn does_not_retry_parse_error() {
        let calls = Arc::new(AtomicU32::new(0));
        let c = Arc::clone(&calls);
        let result = instant_policy(3)
            .run(|| {
                let c = Arc::clone(&c);
                async move {
                    c.fetch_add(1, Ordering::SeqCst);
                    Err::<u32, ScrapeError>(ScrapeError::Parse {
                        context: "test".to_owned(),
                        reason: "missing marker".to_owned(),
                    })
                }
            })
            .await;
        assert_eq!(calls.load(Ordering::SeqCst), 1, "parse errors must not be retried");
        assert!(matches!(result, Err(ScrapeError::Parse { .. })));
    }

    #[tokio::test]
    async fn retry_exhausted_preserves_the_last_failure_as_source() {
        let result = instant_policy(2)
            .run(|| async { Err::<u32, ScrapeError>(transient_error()) })
            .await;
        let Err(ScrapeError::RetryExhausted { attempts, source }) = result else {
            panic!("expected RetryExhausted");
        };
        assert_eq!(attempts, 2);
        assert!(matches!(*source, ScrapeError::Status { status: 503, .. }));
    }

    #[test]
    fn delay_is_capped_at_max_delay() {
        let policy = RetryPolicy {
            max_attempts: 10,
            base_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(10),
            backoff_multiplier: 2.0,
            jitter: false,
        };
        assert_eq!(policy.delay_for(0), Duration::from_secs(1));
        assert_eq!(policy.delay_for(2), Duration::from_secs(4));
        // 2^6 = 64s exceeds the cap.
        assert_eq!(policy.delay_for(6), Duration::from_secs(10));
    }

    #[test]
    fn jitter_adds_less_than_one_second() {
        let policy = RetryPolicy {
            max_attempts: 3,
            base_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(10),
            backoff_multiplier: 2.0,
            jitter: true,
        };
        let delay = policy.delay_for(0);
        assert!(delay >= Duration::from_secs(1));
        assert!(delay < Duration::from_secs(2));
    }
}
