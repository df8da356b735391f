//! Retry loop: await a request until success or policy says stop.

use std::future::Future;

use super::classify;
use super::error::BatchError;
use super::policy::{RetryDecision, RetryPolicy};

/// Awaits `f()` until it succeeds or the retry policy says to stop.
/// On retryable failure, sleeps for the backoff duration then tries again.
/// The final error is returned as-is so the caller can report it.
pub async fn run_with_retry<T, F, Fut>(policy: &RetryPolicy, mut f: F) -> Result<T, BatchError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, BatchError>>,
{
    let mut attempt = 1u32;
    loop {
        match f().await {
            Ok(v) => return Ok(v),
            Err(e) => {
                let kind = classify::classify(&e);
                match policy.decide(attempt, kind) {
                    RetryDecision::NoRetry => return Err(e),
                    RetryDecision::RetryAfter(d) => {
                        tracing::warn!(
                            attempt,
                            ?kind,
                            delay_ms = d.as_millis() as u64,
                            "batch request failed: {}; retrying",
                            e
                        );
                        tokio::time::sleep(d).await;
                        attempt += 1;
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[tokio::test(start_paused = true)]
    async fn retries_transient_then_succeeds() {
        let calls = Cell::new(0u32);
        let policy = RetryPolicy::default();
        let out = run_with_retry(&policy, || {
            calls.set(calls.get() + 1);
            let n = calls.get();
            async move {
                if n < 3 {
                    Err(BatchError::Http(503))
                } else {
                    Ok(7u64)
                }
            }
        })
        .await
        .unwrap();
        assert_eq!(out, 7);
        assert_eq!(calls.get(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn gives_up_after_max_attempts() {
        let calls = Cell::new(0u32);
        let policy = RetryPolicy {
            max_attempts: 2,
            ..RetryPolicy::default()
        };
        let err = run_with_retry(&policy, || {
            calls.set(calls.get() + 1);
            async { Err::<u64, _>(BatchError::Http(500)) }
        })
        .await
        .unwrap_err();
        assert!(matches!(err, BatchError::Http(500)));
        assert_eq!(calls.get(), 2);
    }

    #[tokio::test]
    async fn malformed_is_not_retried() {
        let calls = Cell::new(0u32);
        let err = run_with_retry(&RetryPolicy::default(), || {
            calls.set(calls.get() + 1);
            async { Err::<u64, _>(BatchError::Malformed("oops".to_string())) }
        })
        .await
        .unwrap_err();
        assert!(matches!(err, BatchError::Malformed(_)));
        assert_eq!(calls.get(), 1);
    }
}
