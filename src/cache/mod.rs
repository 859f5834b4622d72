//! Response cache for remote reads
//!
//! Three independent scopes, each an LRU bounded by entry count with a
//! per-scope TTL. Keys are built from every input that affects the cached
//! value.
//!
//! | Scope | Key | Default TTL |
//! |-------|-----|-------------|
//! | listings | `jobs:{prefix}:{recursive}` | 300s |
//! | builds | `builds:{job}` | 60s |
//! | status | `status:{job}:{token}` | 10s |

pub mod ttl;

pub use ttl::{CacheStats, Cached, Source, TtlCache};

use crate::config::CacheConfig;
use crate::remote::CatalogItem;
use serde::Serialize;
use std::time::Duration;

/// Cache key for a job's build list
pub fn builds_key(job_path: &str) -> String {
    format!("builds:{}", job_path)
}

/// Cache key for a build status lookup
pub fn status_key(job_path: &str, token: &str) -> String {
    format!("status:{}:{}", job_path, token)
}

/// The gateway's cache scopes
#[derive(Debug)]
pub struct GatewayCache<B, S> {
    pub listings: TtlCache<Vec<CatalogItem>>,
    pub builds: TtlCache<Vec<B>>,
    pub status: TtlCache<S>,
}

/// Per-scope counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct GatewayCacheStats {
    pub listings: CacheStats,
    pub builds: CacheStats,
    pub status: CacheStats,
}

impl<B: Clone, S: Clone> GatewayCache<B, S> {
    pub fn from_config(config: &CacheConfig) -> Self {
        Self {
            listings: scope("listings", config.capacity, config.listing_ttl_secs, config.enabled),
            builds: scope("builds", config.capacity, config.builds_ttl_secs, config.enabled),
            status: scope("status", config.capacity, config.status_ttl_secs, config.enabled),
        }
    }

    /// Drop everything cached about a job and anything nested below it.
    ///
    /// Prefix matching may also drop siblings sharing the leading
    /// characters, which only costs a refetch.
    pub fn invalidate_job(&self, job_path: &str) {
        self.builds.invalidate_prefix(&builds_key(job_path));
        self.status.invalidate_prefix(&format!("status:{}", job_path));
    }

    /// Drop every listing; membership changed somewhere
    pub fn invalidate_listings(&self) {
        self.listings.clear();
    }

    pub fn clear(&self) {
        self.listings.clear();
        self.builds.clear();
        self.status.clear();
    }

    pub fn stats(&self) -> GatewayCacheStats {
        GatewayCacheStats {
            listings: self.listings.stats(),
            builds: self.builds.stats(),
            status: self.status.stats(),
        }
    }
}

fn scope<V: Clone>(name: &'static str, capacity: usize, ttl_secs: u64, enabled: bool) -> TtlCache<V> {
    let cache = TtlCache::new(name, capacity, Duration::from_secs(ttl_secs));
    if enabled {
        cache
    } else {
        cache.disabled()
    }
}
