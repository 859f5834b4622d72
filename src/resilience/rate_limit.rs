//! Outbound request throttling
//!
//! One direct (unkeyed) governor limiter shared by every call towards the
//! build server. Callers wait for a permit instead of being rejected.

use crate::config::RateLimitConfig;
use governor::clock::DefaultClock;
use governor::middleware::NoOpMiddleware;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter};
use std::num::NonZeroU32;
use std::sync::Arc;

type DirectLimiter = RateLimiter<NotKeyed, InMemoryState, DefaultClock, NoOpMiddleware>;

/// Shared outbound limiter; disabled limiters never wait
#[derive(Debug, Clone, Default)]
pub struct OutboundLimiter {
    limiter: Option<Arc<DirectLimiter>>,
}

impl OutboundLimiter {
    pub fn from_config(config: &RateLimitConfig) -> Self {
        if !config.enabled {
            return Self::unlimited();
        }

        let rate = NonZeroU32::new(config.requests_per_second).unwrap_or(NonZeroU32::MIN);
        let burst = NonZeroU32::new(config.burst).unwrap_or(rate);
        let quota = Quota::per_second(rate).allow_burst(burst);
        Self {
            limiter: Some(Arc::new(RateLimiter::direct(quota))),
        }
    }

    pub fn unlimited() -> Self {
        Self { limiter: None }
    }

    pub fn is_enabled(&self) -> bool {
        self.limiter.is_some()
    }

    /// Wait until one more request may be sent
    pub async fn acquire(&self) {
        if let Some(limiter) = &self.limiter {
            limiter.until_ready().await;
        }
    }
}
