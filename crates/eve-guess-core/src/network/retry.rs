//! Bounded retry for ESI calls.
//!
//! ESI hiccups are usually a single dropped request, so the default policy is
//! one retry after a short, jittered pause.

use crate::config::NetworkConfig;
use rand::Rng;
use std::future::Future;
use std::time::Duration;
use tracing::{debug, warn};

/// How often and how patiently to retry a remote call.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Maximum number of attempts (including the first one).
    pub max_attempts: u32,
    /// Delay before the first retry, doubled for each following one.
    pub base_delay: Duration,
    /// Whether to spread delays by a random factor in `0.5..1.5`.
    pub jitter: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: NetworkConfig::MAX_ATTEMPTS,
            base_delay: NetworkConfig::RETRY_BASE_DELAY,
            jitter: true,
        }
    }
}

impl RetryConfig {
    /// A policy that never waits, used by tests and mock sources.
    pub fn immediate(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            base_delay: Duration::ZERO,
            jitter: false,
        }
    }

    pub fn with_max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = attempts;
        self
    }

    pub fn with_base_delay(mut self, delay: Duration) -> Self {
        self.base_delay = delay;
        self
    }

    pub fn with_jitter(mut self, jitter: bool) -> Self {
        self.jitter = jitter;
        self
    }

    /// Delay to wait after the given (0-indexed) failed attempt.
    pub fn calculate_delay(&self, attempt: u32) -> Duration {
        let delay = self.base_delay.saturating_mul(1u32 << attempt.min(16));
        if self.jitter && !delay.is_zero() {
            let factor: f64 = rand::rng().random_range(0.5..1.5);
            delay.mul_f64(factor)
        } else {
            delay
        }
    }
}

/// Run `operation` until it succeeds, fails with a non-retryable error, or
/// the attempts are used up. Returns the last result and the attempt count.
pub async fn retry_async<F, Fut, T, E>(
    config: &RetryConfig,
    mut operation: F,
    should_retry: impl Fn(&E) -> bool,
) -> (Result<T, E>, u32)
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: std::fmt::Display,
{
    let max_attempts = config.max_attempts.max(1);
    let mut attempt = 0;

    loop {
        attempt += 1;
        match operation().await {
            Ok(value) => {
                if attempt > 1 {
                    debug!("Request succeeded on attempt {}", attempt);
                }
                return (Ok(value), attempt);
            }
            Err(e) if attempt < max_attempts && should_retry(&e) => {
                let delay = config.calculate_delay(attempt - 1);
                warn!("Request failed: {}, retrying in {:?}", e, delay);
                tokio::time::sleep(delay).await;
            }
            Err(e) => return (Err(e), attempt),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    #[test]
    fn test_delay_doubles_without_jitter() {
        let config = RetryConfig::default()
            .with_base_delay(Duration::from_millis(100))
            .with_jitter(false);

        assert_eq!(config.calculate_delay(0), Duration::from_millis(100));
        assert_eq!(config.calculate_delay(1), Duration::from_millis(200));
        assert_eq!(config.calculate_delay(2), Duration::from_millis(400));
    }

    #[test]
    fn test_delay_with_jitter_stays_in_band() {
        let config = RetryConfig::default().with_base_delay(Duration::from_secs(2));
        for _ in 0..20 {
            let delay = config.calculate_delay(0);
            assert!(delay >= Duration::from_secs(1) && delay <= Duration::from_secs(3));
        }
    }

    #[tokio::test]
    async fn test_retries_once_then_succeeds() {
        let counter = Arc::new(AtomicU32::new(0));
        let seen = counter.clone();

        let (result, attempts) = retry_async(
            &RetryConfig::immediate(2),
            || {
                let seen = seen.clone();
                async move {
                    if seen.fetch_add(1, Ordering::SeqCst) == 0 {
                        Err("connection reset".to_string())
                    } else {
                        Ok(7)
                    }
                }
            },
            |_: &String| true,
        )
        .await;

        assert_eq!(result.unwrap(), 7);
        assert_eq!(attempts, 2);
        assert_eq!(counter.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_gives_up_after_max_attempts() {
        let (result, attempts) = retry_async(
            &RetryConfig::immediate(2),
            || async { Err::<i32, _>("down".to_string()) },
            |_: &String| true,
        )
        .await;

        assert!(result.is_err());
        assert_eq!(attempts, 2);
    }

    #[tokio::test]
    async fn test_non_retryable_error_stops_immediately() {
        let (result, attempts) = retry_async(
            &RetryConfig::immediate(3),
            || async { Err::<i32, _>("404 not found".to_string()) },
            |e: &String| !e.starts_with("404"),
        )
        .await;

        assert!(result.is_err());
        assert_eq!(attempts, 1);
    }
}
