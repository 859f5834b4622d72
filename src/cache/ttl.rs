//! Bounded LRU cache with per-entry expiry
//!
//! Entries expire lazily: an expired entry is dropped by the lookup that
//! finds it. Capacity is enforced independently of expiry by evicting the
//! least recently used entry. The lock is held only for lookup and insert,
//! never while a value is being computed.

use crate::error::GatewayResult;
use lru::LruCache;
use parking_lot::Mutex;
use serde::Serialize;
use std::future::Future;
use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};
use tracing::debug;

/// Where a value came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Source {
    /// Served from the cache without a remote call
    Cache,
    /// Freshly fetched from the remote server
    Remote,
}

/// A value tagged with its source
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Cached<T> {
    pub value: T,
    pub source: Source,
}

impl<T> Cached<T> {
    pub fn remote(value: T) -> Self {
        Self {
            value,
            source: Source::Remote,
        }
    }

    pub fn is_cached(&self) -> bool {
        self.source == Source::Cache
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Cached<U> {
        Cached {
            value: f(self.value),
            source: self.source,
        }
    }
}

#[derive(Debug)]
struct Entry<V> {
    value: V,
    /// `None` when the TTL reaches past what `Instant` can represent
    expires_at: Option<Instant>,
}

impl<V> Entry<V> {
    fn is_fresh(&self, now: Instant) -> bool {
        self.expires_at.map_or(true, |at| now < at)
    }
}

/// Counters for one cache scope
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub entries: usize,
    pub capacity: usize,
}

/// LRU cache whose entries expire after a TTL
#[derive(Debug)]
pub struct TtlCache<V> {
    name: &'static str,
    ttl: Duration,
    enabled: bool,
    entries: Mutex<LruCache<String, Entry<V>>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl<V: Clone> TtlCache<V> {
    /// Create a cache scope; a capacity of zero is raised to one
    pub fn new(name: &'static str, capacity: usize, ttl: Duration) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            name,
            ttl,
            enabled: true,
            entries: Mutex::new(LruCache::new(capacity)),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// Turn storage off; every lookup then computes
    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Fresh value for `key`, evicting it if expired
    pub fn get(&self, key: &str) -> Option<V> {
        if !self.enabled {
            return None;
        }

        let mut entries = self.entries.lock();
        let expired = match entries.get(key) {
            Some(entry) if entry.is_fresh(Instant::now()) => return Some(entry.value.clone()),
            Some(_) => true,
            None => false,
        };
        if expired {
            entries.pop(key);
            debug!("Cache {}: evicted expired entry {}", self.name, key);
        }
        None
    }

    /// Store `value` under `key` for `ttl`
    pub fn insert_for(&self, key: &str, value: V, ttl: Duration) {
        if !self.enabled {
            return;
        }

        let entry = Entry {
            value,
            expires_at: Instant::now().checked_add(ttl),
        };
        let evicted = self.entries.lock().push(key.to_string(), entry);
        if let Some((evicted_key, _)) = evicted.filter(|(k, _)| k != key) {
            debug!("Cache {}: capacity reached, evicted {}", self.name, evicted_key);
        }
    }

    /// Store `value` under `key` for the scope TTL
    pub fn insert(&self, key: &str, value: V) {
        self.insert_for(key, value, self.ttl);
    }

    /// Return the cached value or compute, store and return a fresh one
    pub async fn get_or_compute<F, Fut>(&self, key: &str, compute: F) -> GatewayResult<Cached<V>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = GatewayResult<V>>,
    {
        self.get_or_compute_for(key, self.ttl, compute).await
    }

    /// Same as [`get_or_compute`](Self::get_or_compute) with an explicit TTL.
    ///
    /// Concurrent misses on one key each run `compute`; the last write wins.
    /// A failed compute leaves the cache untouched.
    pub async fn get_or_compute_for<F, Fut>(
        &self,
        key: &str,
        ttl: Duration,
        compute: F,
    ) -> GatewayResult<Cached<V>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = GatewayResult<V>>,
    {
        if let Some(value) = self.get(key) {
            self.hits.fetch_add(1, Ordering::Relaxed);
            debug!("Cache {}: hit {}", self.name, key);
            return Ok(Cached {
                value,
                source: Source::Cache,
            });
        }

        self.misses.fetch_add(1, Ordering::Relaxed);
        debug!("Cache {}: miss {}", self.name, key);

        let value = compute().await?;
        self.insert_for(key, value.clone(), ttl);
        Ok(Cached::remote(value))
    }

    /// Drop one entry
    pub fn invalidate(&self, key: &str) {
        self.entries.lock().pop(key);
    }

    /// Drop every entry whose key starts with `prefix`
    pub fn invalidate_prefix(&self, prefix: &str) {
        let mut entries = self.entries.lock();
        let doomed: Vec<String> = entries
            .iter()
            .filter(|(key, _)| key.starts_with(prefix))
            .map(|(key, _)| key.clone())
            .collect();
        for key in &doomed {
            entries.pop(key);
        }
        if !doomed.is_empty() {
            debug!("Cache {}: invalidated {} entries under {}", self.name, doomed.len(), prefix);
        }
    }

    /// Drop every entry
    pub fn clear(&self) {
        self.entries.lock().clear();
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn stats(&self) -> CacheStats {
        let entries = self.entries.lock();
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            entries: entries.len(),
            capacity: entries.cap().get(),
        }
    }
}
