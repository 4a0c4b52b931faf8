//! Exponential backoff for idempotent node reads.
//!
//! Only errors for which [`AptosError::is_retryable`](crate::AptosError::is_retryable) holds are retried.
//! Transaction encoding and submission never go through here.

use rand::Rng;
use std::future::Future;
use std::time::Duration;

use crate::error::Result;

/// Retry schedule
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Delay before the first retry
    pub initial_delay: Duration,
    /// Upper bound for any single delay
    pub max_delay: Duration,
    /// Growth factor per retry
    pub multiplier: f64,
    /// Jitter as a fraction of the delay (0.0 to 1.0)
    pub jitter: f64,
    /// Retries after the first attempt
    pub max_retries: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            initial_delay: Duration::from_millis(200),
            max_delay: Duration::from_secs(5),
            multiplier: 2.0,
            jitter: 0.2,
            max_retries: 3,
        }
    }
}

impl RetryPolicy {
    /// Policy with `max_retries` retries starting at `initial_delay`
    pub fn new(max_retries: u32, initial_delay: Duration) -> Self {
        Self {
            initial_delay,
            max_retries,
            ..Self::default()
        }
    }

    /// Never retries
    pub fn none() -> Self {
        Self::new(0, Duration::ZERO)
    }

    /// Sets the jitter fraction
    pub fn with_jitter(mut self, jitter: f64) -> Self {
        self.jitter = jitter.clamp(0.0, 1.0);
        self
    }

    /// Sets the delay cap
    pub fn with_max_delay(mut self, delay: Duration) -> Self {
        self.max_delay = delay;
        self
    }
}

/// Iterator over the delays of a [`RetryPolicy`].
pub struct Backoff {
    policy: RetryPolicy,
    retries: u32,
    current: Duration,
}

impl Backoff {
    /// Starts a schedule
    pub fn new(policy: RetryPolicy) -> Self {
        Self {
            current: policy.initial_delay,
            policy,
            retries: 0,
        }
    }

    fn jittered(&self, base: Duration) -> Duration {
        if self.policy.jitter <= 0.0 || base.is_zero() {
            return base;
        }
        let range = base.as_secs_f64() * self.policy.jitter;
        let offset = rand::thread_rng().gen_range(-range..range);
        Duration::from_secs_f64((base.as_secs_f64() + offset).max(0.0))
    }
}

impl Iterator for Backoff {
    type Item = Duration;

    fn next(&mut self) -> Option<Duration> {
        if self.retries >= self.policy.max_retries {
            return None;
        }
        let delay = self.jittered(self.current).min(self.policy.max_delay);

        self.retries += 1;
        self.current = self.current.mul_f64(self.policy.multiplier).min(self.policy.max_delay);
        Some(delay)
    }
}

/// Runs `f` until it succeeds, fails with a non-retryable error, or the
/// policy runs out of retries.
pub async fn with_retry<F, Fut, T>(policy: &RetryPolicy, operation: &str, mut f: F) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let mut backoff = Backoff::new(policy.clone());
    loop {
        match f().await {
            Ok(value) => return Ok(value),
            Err(err) if err.is_retryable() => match backoff.next() {
                Some(delay) => {
                    tracing::warn!(operation, error = %err, delay_ms = delay.as_millis() as u64, "Retrying node read");
                    tokio::time::sleep(delay).await;
                }
                None => return Err(err),
            },
            Err(err) => return Err(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AptosError;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn connection_error() -> AptosError {
        AptosError::Connection {
            url: "http://localhost".into(),
            reason: "refused".into(),
        }
    }

    #[test]
    fn test_backoff_grows_and_caps() {
        let policy = RetryPolicy::new(5, Duration::from_millis(100))
            .with_jitter(0.0)
            .with_max_delay(Duration::from_millis(300));
        let delays: Vec<_> = Backoff::new(policy).collect();
        assert_eq!(
            delays,
            vec![
                Duration::from_millis(100),
                Duration::from_millis(200),
                Duration::from_millis(300),
                Duration::from_millis(300),
                Duration::from_millis(300),
            ]
        );
    }

    #[test]
    fn test_none_policy_is_empty() {
        assert_eq!(Backoff::new(RetryPolicy::none()).count(), 0);
    }

    #[test]
    fn test_jitter_within_bounds() {
        let policy = RetryPolicy::new(1, Duration::from_millis(1000)).with_jitter(0.2);
        let delay = Backoff::new(policy).next().unwrap();
        assert!(delay >= Duration::from_millis(800));
        assert!(delay <= Duration::from_millis(1200));
    }

    #[tokio::test]
    async fn test_retries_connection_errors() {
        let counter = AtomicU32::new(0);
        let calls = &counter;
        let policy = RetryPolicy::new(3, Duration::from_millis(1)).with_jitter(0.0);
        let result = with_retry(&policy, "test", || async move {
            if calls.fetch_add(1, Ordering::SeqCst) < 2 {
                Err(connection_error())
            } else {
                Ok(7u64)
            }
        })
        .await;
        assert_eq!(result.unwrap(), 7);
        assert_eq!(counter.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_gives_up_after_max_retries() {
        let counter = AtomicU32::new(0);
        let calls = &counter;
        let policy = RetryPolicy::new(2, Duration::from_millis(1)).with_jitter(0.0);
        let result: Result<()> = with_retry(&policy, "test", || async move {
            calls.fetch_add(1, Ordering::SeqCst);
            Err(connection_error())
        })
        .await;
        assert!(matches!(result, Err(AptosError::Connection { .. })));
        assert_eq!(counter.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_not_found_is_not_retried() {
        let counter = AtomicU32::new(0);
        let calls = &counter;
        let result: Result<()> = with_retry(&RetryPolicy::default(), "test", || async move {
            calls.fetch_add(1, Ordering::SeqCst);
            Err(AptosError::NotFound("account".into()))
        })
        .await;
        assert!(matches!(result, Err(AptosError::NotFound(_))));
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }
}
