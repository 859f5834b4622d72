//! Configuration schema for the gateway
//!
//! Configuration is stored at `~/.config/jenkins-gateway/config.toml`

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// General settings
    pub general: GeneralConfig,

    /// Jenkins connection settings
    pub jenkins: JenkinsConfig,

    /// Response cache settings
    pub cache: CacheConfig,

    /// Retry and backoff settings
    pub retry: RetryConfig,

    /// Outbound rate limiting
    pub rate_limit: RateLimitConfig,

    /// Gateway operation settings
    pub gateway: GatewayConfig,
}

/// General application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Log format: "text" or "json"
    pub log_format: String,

    /// Enable audit logging of mutating operations
    pub audit_log: bool,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_format: "text".to_string(),
            audit_log: true,
        }
    }
}

/// Jenkins connection settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct JenkinsConfig {
    /// Base URL of the Jenkins server
    pub url: Option<String>,

    /// User name for HTTP basic auth
    pub user: Option<String>,

    /// API token for HTTP basic auth
    pub api_token: Option<String>,

    /// Per-request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for JenkinsConfig {
    fn default() -> Self {
        Self {
            url: None,
            user: None,
            api_token: None,
            timeout_secs: 10,
        }
    }
}

impl JenkinsConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.max(1))
    }
}

/// Cache configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Enable response caching (default: true)
    pub enabled: bool,

    /// Maximum entries per cache scope before LRU eviction
    pub capacity: usize,

    /// TTL for job listings, which change rarely
    pub listing_ttl_secs: u64,

    /// TTL for per-job build lists
    pub builds_ttl_secs: u64,

    /// TTL for per-build status, which changes fastest
    pub status_ttl_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            capacity: 256,
            listing_ttl_secs: 300,
            builds_ttl_secs: 60,
            status_ttl_secs: 10,
        }
    }
}

/// Retry configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Backoff floor in milliseconds
    pub min_delay_ms: u64,

    /// Backoff ceiling in milliseconds
    pub max_delay_ms: u64,

    /// Attempts for metadata reads (catalog, job, build)
    pub metadata_attempts: u32,

    /// Attempts for console text reads
    pub console_attempts: u32,

    /// Attempts for non-idempotent calls (trigger, create, delete)
    pub mutation_attempts: u32,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            min_delay_ms: 250,
            max_delay_ms: 4000,
            metadata_attempts: 3,
            console_attempts: 2,
            mutation_attempts: 1,
        }
    }
}

/// Outbound rate limit configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RateLimitConfig {
    /// Whether outbound calls are rate limited
    pub enabled: bool,

    /// Sustained requests per second towards Jenkins
    pub requests_per_second: u32,

    /// Requests allowed above the sustained rate
    pub burst: u32,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            requests_per_second: 10,
            burst: 20,
        }
    }
}

/// Gateway operation settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    /// Maximum builds returned by a build listing
    pub max_builds: usize,

    /// Concurrent build metadata fetches per listing
    pub fetch_concurrency: usize,

    /// Console lines kept verbatim in a log summary
    pub log_head_lines: usize,

    /// Keyword hits kept per category in a log summary
    pub log_max_hits: usize,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            max_builds: 25,
            fetch_concurrency: 4,
            log_head_lines: 20,
            log_max_hits: 5,
        }
    }
}
