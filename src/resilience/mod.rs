//! Retry and rate limiting around remote calls
//!
//! Every remote call goes through [`Resilience::run`]. Each attempt first
//! waits on the shared outbound limiter, then runs the call. Only transient
//! failures are retried, with capped exponential backoff between attempts.
//! Not-found, unauthorized and every other failure propagate immediately.

pub mod rate_limit;
pub mod retry;

pub use rate_limit::OutboundLimiter;
pub use retry::{CallClass, RetryPolicy};

use crate::config::{RateLimitConfig, RetryConfig};
use crate::error::{GatewayError, GatewayResult};
use serde::Serialize;
use std::future::Future;
use tracing::{debug, warn};

/// Attempts made by one wrapped call
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RetryStats {
    pub attempts: u32,
    pub retries: u32,
}

/// Retry policy per call class plus the shared outbound limiter
#[derive(Debug, Clone)]
pub struct Resilience {
    retry: RetryConfig,
    limiter: OutboundLimiter,
}

impl Resilience {
    pub fn new(retry: RetryConfig, limiter: OutboundLimiter) -> Self {
        Self { retry, limiter }
    }

    pub fn from_config(retry: &RetryConfig, rate_limit: &RateLimitConfig) -> Self {
        Self::new(retry.clone(), OutboundLimiter::from_config(rate_limit))
    }

    pub fn policy(&self, class: CallClass) -> RetryPolicy {
        RetryPolicy::for_class(&self.retry, class)
    }

    /// Run `op` under the policy for `class`
    pub async fn run<T, F, Fut>(&self, class: CallClass, operation: &str, op: F) -> GatewayResult<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = GatewayResult<T>>,
    {
        self.run_recorded(class, operation, op).await.0
    }

    /// Like [`run`](Self::run), also reporting how many attempts were made
    pub async fn run_recorded<T, F, Fut>(
        &self,
        class: CallClass,
        operation: &str,
        mut op: F,
    ) -> (GatewayResult<T>, RetryStats)
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = GatewayResult<T>>,
    {
        let policy = self.policy(class);
        let mut stats = RetryStats::default();

        loop {
            self.limiter.acquire().await;
            stats.attempts += 1;

            let err = match op().await {
                Ok(value) => return (Ok(value), stats),
                Err(err) if !err.is_retryable() => return (Err(err), stats),
                Err(err) => err,
            };

            if stats.attempts >= policy.max_attempts {
                if policy.max_attempts == 1 {
                    return (Err(err), stats);
                }
                warn!(
                    "{} gave up after {} attempts: {}",
                    operation, stats.attempts, err
                );
                let exhausted = GatewayError::RetriesExhausted {
                    operation: operation.to_string(),
                    attempts: stats.attempts,
                    last: Box::new(err),
                };
                return (Err(exhausted), stats);
            }

            let delay = policy.delay_for(stats.retries);
            warn!(
                "{} failed (attempt {}/{}), retrying in {}ms: {}",
                operation,
                stats.attempts,
                policy.max_attempts,
                delay.as_millis(),
                err
            );
            stats.retries += 1;
            tokio::time::sleep(delay).await;
            debug!("Retrying {} ({} class)", operation, class);
        }
    }
}
