// Retry logic with jitter-free exponential backoff
// Author: kelexine (https://github.com/kelexine)

use crate::error::{Result, StudioError};
use crate::models::params::GenerationParameters;
use backoff::{backoff::Backoff, ExponentialBackoff};
use std::future::Future;
use std::time::Duration;
use tracing::{debug, error, warn};

/// Decides whether a failed attempt may be retried.
pub type RetryPredicate = fn(&StudioError) -> bool;

/// Bounded retry settings for one remote operation.
#[derive(Clone, Copy)]
pub struct RetryPolicy {
    /// Total attempts, at least 1.
    pub max_retries: u32,
    /// Wait before the second attempt; doubles after every failure.
    pub base_wait: Duration,
    predicate: RetryPredicate,
}

impl RetryPolicy {
    /// Policy that retries transient failures only (see [`is_transient`]).
    pub fn new(max_retries: u32, base_wait: Duration) -> Self {
        Self {
            max_retries: max_retries.max(1),
            base_wait,
            predicate: is_transient,
        }
    }

    pub fn from_params(params: &GenerationParameters) -> Self {
        Self::new(params.max_retries, params.base_wait())
    }

    /// Opt in to retrying every error, including credential rejections.
    pub fn retry_all(mut self) -> Self {
        self.predicate = retry_everything;
        self
    }

    pub fn should_retry(&self, error: &StudioError) -> bool {
        (self.predicate)(error)
    }
}

impl std::fmt::Debug for RetryPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RetryPolicy")
            .field("max_retries", &self.max_retries)
            .field("base_wait", &self.base_wait)
            .finish_non_exhaustive()
    }
}

fn retry_everything(_: &StudioError) -> bool {
    true
}

/// Backoff schedule for one call: `base`, `2 * base`, `4 * base`, ...
///
/// No jitter and no elapsed-time cutoff; the attempt count bounds the loop.
pub fn create_backoff(base: Duration) -> ExponentialBackoff {
    ExponentialBackoff {
        current_interval: base,
        initial_interval: base,
        randomization_factor: 0.0,
        multiplier: 2.0,
        max_interval: Duration::MAX,
        max_elapsed_time: None,
        ..Default::default()
    }
}

/// Determine if an HTTP status code is retryable
pub fn is_retryable(status: u16) -> bool {
    matches!(status, 408 | 429 | 500 | 502 | 503 | 504)
}

/// Default retry predicate.
///
/// Transport failures without a status (connect errors, timeouts, broken
/// bodies) and retryable statuses are transient. Any other status, including
/// 401/403, is terminal.
pub fn is_transient(error: &StudioError) -> bool {
    match error {
        StudioError::Api { status: None, .. } => true,
        StudioError::Api { status: Some(status), .. } => is_retryable(*status),
        StudioError::Http(e) => match e.status() {
            Some(status) => is_retryable(status.as_u16()),
            None => e.is_timeout() || e.is_connect() || e.is_request() || e.is_body(),
        },
        _ => false,
    }
}

/// Execute `operation` with bounded exponential backoff.
///
/// Attempt `n` (0-based) that fails with a retryable error is followed by a
/// wait of `base_wait * 2^n`, unless it was the last attempt. Exhaustion
/// yields [`StudioError::RetryExhausted`] carrying the last error; an error
/// the policy refuses to retry is returned unchanged right away. The wait
/// suspends the calling task; attempts never overlap.
pub async fn with_retry<F, Fut, T>(operation_name: &str, policy: &RetryPolicy, mut operation: F) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let max_attempts = policy.max_retries.max(1);
    let mut backoff = create_backoff(policy.base_wait);
    let mut attempt = 0;

    loop {
        match operation().await {
            Ok(result) => {
                if attempt > 0 {
                    debug!("{} succeeded on attempt {}", operation_name, attempt + 1);
                }
                crate::metrics::record_retry_attempt(operation_name, "success");
                return Ok(result);
            }
            Err(e) if !policy.should_retry(&e) => {
                debug!("{} failed with non-retryable error: {}", operation_name, e);
                crate::metrics::record_retry_attempt(operation_name, "terminal");
                return Err(e);
            }
            Err(e) if attempt + 1 >= max_attempts => {
                error!(
                    "{} failed after {} attempts: {}",
                    operation_name,
                    max_attempts,
                    crate::utils::logging::sanitize(&e.to_string())
                );
                crate::metrics::record_retry_attempt(operation_name, "exhausted");
                return Err(StudioError::RetryExhausted {
                    operation: operation_name.to_string(),
                    attempts: max_attempts,
                    last_error: Box::new(e),
                });
            }
            Err(e) => {
                let delay = backoff.next_backoff().unwrap_or(policy.base_wait);
                warn!(
                    "{} failed (attempt {}/{}), retrying in {:.2} seconds: {}",
                    operation_name,
                    attempt + 1,
                    max_attempts,
                    delay.as_secs_f64(),
                    crate::utils::logging::sanitize(&e.to_string())
                );
                crate::metrics::record_retry_attempt(operation_name, "retry");
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
        }
    }
}
