//! Retry with exponential backoff
//!
//! Waiting goes through the [`Sleeper`] trait so the client can be driven by
//! tokio's timer in production and by a recording fake in tests.

use crate::error::QueryError;
use crate::logging::Logger;
use async_trait::async_trait;
use serde_json::Value;
use std::future::Future;
use std::time::Duration;

/// Something that can pause the current task
#[async_trait]
pub trait Sleeper: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

/// Real wall-clock sleeping
#[derive(Debug, Default, Clone, Copy)]
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Attempt budget and base delay for one batch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
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

    /// Wait before the attempt following `attempt` (1-indexed): `base * 2^(attempt-1)`
    pub fn backoff_delay(&self, attempt: u32) -> Duration {
        2u32.checked_pow(attempt.saturating_sub(1))
            .and_then(|factor| self.base_delay.checked_mul(factor))
            .unwrap_or(Duration::MAX)
    }
}

/// Run `operation` until it yields a non-empty list or the attempts run out.
///
/// An empty list counts as a failed attempt. There is no wait after the final
/// attempt, and a failure after the last one discards everything.
pub async fn retry_with_backoff<F, Fut>(
    policy: RetryPolicy,
    service: &str,
    sleeper: &dyn Sleeper,
    logger: &Logger,
    mut operation: F,
) -> Result<Vec<Value>, QueryError>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<Vec<Value>, QueryError>>,
{
    for attempt in 1..=policy.max_attempts {
        let terminal = match operation(attempt).await {
            Ok(records) if !records.is_empty() => return Ok(records),
            Ok(_) => {
                logger.warning(&format!(
                    "Attempt {} for service '{}' failed: empty response.",
                    attempt, service
                ));
                false
            }
            Err(err) => {
                logger.warning(&format!(
                    "Attempt {} for service '{}' failed: {}",
                    attempt, service, err
                ));
                !err.is_retryable()
            }
        };

        if terminal {
            break;
        }

        if attempt < policy.max_attempts {
            let delay = policy.backoff_delay(attempt);
            logger.info(&format!("Retrying in {} seconds...", delay.as_secs()));
            sleeper.sleep(delay).await;
        }
    }

    logger.error(&format!(
        "All {} retry attempts failed for service '{}'.",
        policy.max_attempts, service
    ));
    Err(QueryError::RetriesExhausted {
        service: service.to_string(),
        attempts: policy.max_attempts,
    })
}
