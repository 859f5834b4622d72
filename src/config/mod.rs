//! Configuration loading for the gateway
//!
//! Values are layered: built-in defaults, then the TOML file, then the
//! `JENKINS_*` environment variables. The merged result is validated once
//! so the rest of the crate can trust its ranges.

pub mod schema;

pub use schema::{
    CacheConfig, Config, GatewayConfig, GeneralConfig, JenkinsConfig, RateLimitConfig, RetryConfig,
};

use crate::error::{GatewayError, GatewayResult};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info};

/// Jenkins base URL
pub const ENV_URL: &str = "JENKINS_URL";
/// Jenkins user for basic auth
pub const ENV_USER: &str = "JENKINS_USER";
/// Jenkins API token for basic auth
pub const ENV_API_TOKEN: &str = "JENKINS_API_TOKEN";

const APP_DIR: &str = "jenkins-gateway";

/// Locates, reads and writes the configuration file
pub struct ConfigManager {
    config_path: PathBuf,
}

impl ConfigManager {
    /// Manager for the per-user config file
    pub fn new() -> Self {
        Self {
            config_path: Self::default_config_path(),
        }
    }

    /// Manager for an explicit file (`--config` or `JENKINS_GATEWAY_CONFIG`)
    pub fn with_path(path: PathBuf) -> Self {
        Self { config_path: path }
    }

    /// `~/.config/jenkins-gateway/config.toml` or the platform equivalent
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(APP_DIR)
            .join("config.toml")
    }

    /// Directory for the audit trail
    pub fn state_dir() -> PathBuf {
        dirs::state_dir()
            .or_else(dirs::data_local_dir)
            .unwrap_or_else(|| PathBuf::from("."))
            .join(APP_DIR)
    }

    pub fn audit_log_path() -> PathBuf {
        Self::state_dir().join("audit.log")
    }

    pub fn path(&self) -> &Path {
        &self.config_path
    }

    /// Effective configuration: defaults, file, environment, validated
    pub async fn load(&self) -> GatewayResult<Config> {
        let mut config = self.load_file().await?;
        apply_env_overrides(&mut config);
        validate(&config).map_err(|reason| GatewayError::ConfigInvalid {
            path: self.config_path.clone(),
            reason,
        })?;
        Ok(config)
    }

    /// File values over defaults, without environment overrides.
    ///
    /// Used when editing so environment values are never persisted.
    pub async fn load_file(&self) -> GatewayResult<Config> {
        if !self.config_path.exists() {
            debug!("No config at {}, using defaults", self.config_path.display());
            return Ok(Config::default());
        }
        self.load_from_file(&self.config_path).await
    }

    /// Parse one TOML file
    pub async fn load_from_file(&self, path: &Path) -> GatewayResult<Config> {
        let content = fs::read_to_string(path)
            .await
            .map_err(|e| GatewayError::io(format!("reading config from {}", path.display()), e))?;

        toml::from_str(&content).map_err(|e| GatewayError::ConfigInvalid {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    /// Write `config`, creating the parent directory on first use
    pub async fn save(&self, config: &Config) -> GatewayResult<()> {
        validate(config).map_err(|reason| GatewayError::ConfigInvalid {
            path: self.config_path.clone(),
            reason,
        })?;

        if let Some(parent) = self.config_path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| GatewayError::ConfigDirCreate {
                    path: parent.to_path_buf(),
                    source: e,
                })?;
        }

        let content = toml::to_string_pretty(config)?;
        fs::write(&self.config_path, content).await.map_err(|e| {
            GatewayError::io(format!("writing config to {}", self.config_path.display()), e)
        })?;

        info!("Configuration saved to {}", self.config_path.display());
        Ok(())
    }
}

impl Default for ConfigManager {
    fn default() -> Self {
        Self::new()
    }
}

/// Overlay non-blank `JENKINS_URL`, `JENKINS_USER` and `JENKINS_API_TOKEN`
pub fn apply_env_overrides(config: &mut Config) {
    let read = |name: &str| std::env::var(name).ok().filter(|v| !v.trim().is_empty());

    if let Some(url) = read(ENV_URL) {
        debug!("Jenkins URL taken from {}", ENV_URL);
        config.jenkins.url = Some(url);
    }
    if let Some(user) = read(ENV_USER) {
        config.jenkins.user = Some(user);
    }
    if let Some(token) = read(ENV_API_TOKEN) {
        config.jenkins.api_token = Some(token);
    }
}

/// Reject values the gateway cannot run with
pub fn validate(config: &Config) -> Result<(), String> {
    if !matches!(config.general.log_format.as_str(), "text" | "json") {
        return Err(format!(
            "general.log_format must be \"text\" or \"json\", got \"{}\"",
            config.general.log_format
        ));
    }

    let retry = &config.retry;
    if retry.min_delay_ms > retry.max_delay_ms {
        return Err(format!(
            "retry.min_delay_ms ({}) exceeds retry.max_delay_ms ({})",
            retry.min_delay_ms, retry.max_delay_ms
        ));
    }
    for (key, attempts) in [
        ("retry.metadata_attempts", retry.metadata_attempts),
        ("retry.console_attempts", retry.console_attempts),
        ("retry.mutation_attempts", retry.mutation_attempts),
    ] {
        if attempts == 0 {
            return Err(format!("{} must be at least 1", key));
        }
    }

    if config.rate_limit.enabled && config.rate_limit.requests_per_second == 0 {
        return Err("rate_limit.requests_per_second must be at least 1 when enabled".to_string());
    }
    if config.gateway.fetch_concurrency == 0 {
        return Err("gateway.fetch_concurrency must be at least 1".to_string());
    }
    if config.jenkins.timeout_secs == 0 {
        return Err("jenkins.timeout_secs must be at least 1".to_string());
    }

    Ok(())
}
