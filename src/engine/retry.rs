//! Retry controller
//!
//! Wraps a step's execute-and-assert cycle in a bounded retry loop with a
//! fixed delay. Deliberately simple: no backoff, no jitter, no circuit
//! breaking. Only assertion failures consume attempts; any other error
//! propagates immediately. The delay suspends only the current case, so
//! hosts running cases concurrently are unaffected.

use std::future::Future;
use std::time::Duration;

use tracing::debug;

use crate::common::Result;

/// Per-step retry policy, passed as data so it can vary at run time
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total number of attempts, at least one
    pub attempts: u32,
    /// Fixed delay between attempts
    pub delay: Duration,
}

impl RetryPolicy {
    pub fn new(attempts: u32, delay: Duration) -> Self {
        Self {
            attempts: attempts.max(1),
            delay,
        }
    }
}

/// Call `thunk` up to `policy.attempts` times.
///
/// Retries only when the error is retryable (an assertion failure) and
/// attempts remain. On exhaustion the last failure is returned unchanged so
/// the caller sees the original comparison detail.
pub async fn run_with_retry<T, F, Fut>(policy: RetryPolicy, mut thunk: F) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let mut attempt = 1;
    loop {
        match thunk().await {
            Ok(value) => return Ok(value),
            Err(e) if e.is_retryable() && attempt < policy.attempts => {
                debug!(
                    attempt,
                    max_attempts = policy.attempts,
                    delay_ms = policy.delay.as_millis() as u64,
                    "assertion failed, retrying: {e}"
                );
                tokio::time::sleep(policy.delay).await;
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::Error;
    use serde_json::json;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn mismatch() -> Error {
        Error::AssertionFailed {
            assertion: "equals".to_string(),
            expected: json!(2),
            actual: json!(1),
        }
    }

    #[test]
    fn test_policy_clamps_to_one_attempt() {
        let policy = RetryPolicy::new(0, Duration::ZERO);
        assert_eq!(policy.attempts, 1);
    }

    #[tokio::test]
    async fn test_success_on_first_attempt() {
        let calls = AtomicU32::new(0);
        let result = run_with_retry(RetryPolicy::new(3, Duration::ZERO), || {
            calls.fetch_add(1, Ordering::Relaxed);
            async { Ok(42) }
        })
        .await;
        assert_eq!(result.unwrap(), 42);
        assert_eq!(calls.load(Ordering::Relaxed), 1);
    }

    #[tokio::test]
    async fn test_retries_until_success() {
        let calls = AtomicU32::new(0);
        let result = run_with_retry(RetryPolicy::new(5, Duration::ZERO), || {
            let n = calls.fetch_add(1, Ordering::Relaxed) + 1;
            async move {
                if n < 3 {
                    Err(mismatch())
                } else {
                    Ok(n)
                }
            }
        })
        .await;
        assert_eq!(result.unwrap(), 3);
        assert_eq!(calls.load(Ordering::Relaxed), 3);
    }

    #[tokio::test]
    async fn test_exhaustion_returns_last_error_unchanged() {
        let calls = AtomicU32::new(0);
        let result: Result<u32> = run_with_retry(RetryPolicy::new(4, Duration::ZERO), || {
            calls.fetch_add(1, Ordering::Relaxed);
            async { Err(mismatch()) }
        })
        .await;
        assert_eq!(calls.load(Ordering::Relaxed), 4);
        match result.unwrap_err() {
            Error::AssertionFailed {
                expected, actual, ..
            } => {
                assert_eq!(expected, json!(2));
                assert_eq!(actual, json!(1));
            }
            other => panic!("expected AssertionFailed, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_non_retryable_error_fails_immediately() {
        let calls = AtomicU32::new(0);
        let result: Result<u32> = run_with_retry(RetryPolicy::new(5, Duration::ZERO), || {
            calls.fetch_add(1, Ordering::Relaxed);
            async { Err(Error::UnboundVariable("missing".to_string())) }
        })
        .await;
        assert_eq!(calls.load(Ordering::Relaxed), 1);
        assert!(matches!(result.unwrap_err(), Error::UnboundVariable(_)));
    }
}
