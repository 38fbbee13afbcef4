//! Retry with exponential backoff and jitter.
//!
//! Every remote call a tree operation makes goes through [`with_retry`].
//! Transient failures (see [`KvError::is_retryable`]) are retried after
//! `min(base * 2^attempt + jitter, max_delay)`, with jitter drawn uniformly
//! from up to 10% of the exponential term. Fatal errors propagate on the
//! first attempt.

use std::future::Future;
use std::time::Duration;

use rand::Rng;
use tokio::time::sleep;
use tracing::{debug, warn};

use crate::error::{KvError, KvResult};

/// Backoff settings for a single remote operation.
#[derive(Clone, Debug, PartialEq)]
pub struct RetryPolicy {
    /// Total attempts, including the first. Zero behaves as one.
    pub max_attempts: u32,
    /// Delay before the first retry, before jitter.
    pub base_delay: Duration,
    /// Upper bound on any single delay.
    pub max_delay: Duration,
    /// Jitter as a fraction of the exponential term.
    pub jitter: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            base_delay: Duration::from_millis(1000),
            max_delay: Duration::from_millis(30_000),
            jitter: 0.1,
        }
    }
}

impl RetryPolicy {
    /// A policy with the default cap and jitter.
    pub fn new(max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            max_attempts,
            base_delay,
            ..Self::default()
        }
    }

    /// Never retry.
    pub fn no_retry() -> Self {
        Self::new(1, Duration::ZERO)
    }

    /// The delay after failed attempt number `attempt` (zero-based), for a
    /// jitter sample `unit` in `[0, 1)`.
    pub fn delay_with_sample(&self, attempt: u32, unit: f64) -> Duration {
        let exponential = self.base_delay.as_secs_f64() * 2f64.powi(attempt.min(63) as i32);
        let jitter = exponential * self.jitter * unit.clamp(0.0, 1.0);
        let cap = self.max_delay.as_secs_f64();
        Duration::from_secs_f64((exponential + jitter).min(cap))
    }

    /// The delay after failed attempt number `attempt`, with random jitter.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        self.delay_with_sample(attempt, rand::thread_rng().gen::<f64>())
    }
}

/// Run `operation`, retrying transient failures according to `policy`.
///
/// `context` names the operation in logs and in the
/// [`KvError::RetryExhausted`] raised once every attempt has failed
/// transiently.
pub async fn with_retry<F, Fut, T>(context: &str, policy: &RetryPolicy, mut operation: F) -> KvResult<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = KvResult<T>>,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 0;

    loop {
        match operation().await {
            Ok(value) => {
                if attempt > 0 {
                    debug!(context, retries = attempt, "store call succeeded after retry");
                }
                return Ok(value);
            }
            Err(err) if err.is_retryable() => {
                attempt += 1;
                if attempt >= max_attempts {
                    return Err(KvError::RetryExhausted {
                        context: context.to_string(),
                        attempts: attempt,
                        source: Box::new(err),
                    });
                }
                let delay = policy.delay_for(attempt - 1);
                warn!(
                    context,
                    attempt,
                    max_attempts,
                    delay_ms = delay.as_millis() as u64,
                    error = %err,
                    "transient store failure; retrying"
                );
                sleep(delay).await;
            }
            Err(err) => return Err(err),
        }
    }
}
