//! Retry policies with capped exponential backoff

use crate::config::RetryConfig;
use serde::Serialize;
use std::fmt;
use std::time::Duration;

/// Kind of remote call, which decides how often it may be retried
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CallClass {
    /// Catalog, job and build metadata reads
    Metadata,
    /// Console text reads, which can be large
    Console,
    /// Trigger, create and delete; not safe to repeat blindly
    Mutation,
}

impl fmt::Display for CallClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Metadata => "metadata",
            Self::Console => "console",
            Self::Mutation => "mutation",
        };
        write!(f, "{}", name)
    }
}

/// Attempt budget and backoff window for one call class
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub min_delay: Duration,
    pub max_delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, min_delay: Duration, max_delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            min_delay,
            max_delay: max_delay.max(min_delay),
        }
    }

    /// Policy for `class` taken from the retry settings
    pub fn for_class(config: &RetryConfig, class: CallClass) -> Self {
        let attempts = match class {
            CallClass::Metadata => config.metadata_attempts,
            CallClass::Console => config.console_attempts,
            CallClass::Mutation => config.mutation_attempts,
        };
        Self::new(
            attempts,
            Duration::from_millis(config.min_delay_ms),
            Duration::from_millis(config.max_delay_ms),
        )
    }

    /// Sleep before retry number `retry` (0-based): `min * 2^retry`, clamped
    pub fn delay_for(&self, retry: u32) -> Duration {
        let min_ms = u64::try_from(self.min_delay.as_millis()).unwrap_or(u64::MAX);
        let max_ms = u64::try_from(self.max_delay.as_millis()).unwrap_or(u64::MAX);
        let scaled = min_ms.saturating_mul(2_u64.saturating_pow(retry));
        Duration::from_millis(scaled.clamp(min_ms, max_ms))
    }
}
