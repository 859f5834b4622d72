//! Config command - show or edit configuration

use crate::cli::args::{ConfigAction, ConfigArgs};
use crate::config::{Config, ConfigManager};
use crate::error::{GatewayError, GatewayResult};
use crate::ui::{self, UiContext};

const REDACTED: &str = "********";

/// Execute the config command
pub async fn execute(args: ConfigArgs, manager: &ConfigManager, config: &Config) -> GatewayResult<()> {
    match args.action {
        None | Some(ConfigAction::Show) => show_config(config)?,
        Some(ConfigAction::Path) => println!("{}", manager.path().display()),
        Some(ConfigAction::Init { force }) => init_config(manager, force).await?,
        Some(ConfigAction::Set { key, value }) => set_value(manager, &key, &value).await?,
    }

    Ok(())
}

fn show_config(config: &Config) -> GatewayResult<()> {
    let mut shown = config.clone();
    if shown.jenkins.api_token.is_some() {
        shown.jenkins.api_token = Some(REDACTED.to_string());
    }
    println!("{}", toml::to_string_pretty(&shown)?);
    Ok(())
}

async fn init_config(manager: &ConfigManager, force: bool) -> GatewayResult<()> {
    let ctx = UiContext::detect();
    let path = manager.path();

    if path.exists() && !force {
        ui::warning(
            &ctx,
            &format!("Config already exists at {}", path.display()),
            Some("Use --force to overwrite"),
        );
        return Ok(());
    }

    manager.save(&Config::default()).await?;
    ui::success(
        &ctx,
        "Configuration initialized",
        Some(&path.display().to_string()),
    );
    ui::note(&ctx, "Next: jenkins-gateway config set jenkins.url https://jenkins.example.com");

    Ok(())
}

async fn set_value(manager: &ConfigManager, key: &str, value: &str) -> GatewayResult<()> {
    let ctx = UiContext::detect();

    // Edit the file as written; environment overrides must not leak into it
    let mut config = manager.load_file().await?;

    apply_value(&mut config, key, value)?;
    manager.save(&config).await?;

    let shown = if key == "jenkins.api_token" { REDACTED } else { value };
    ui::success(&ctx, &format!("Set {} = {}", key, shown), None);
    Ok(())
}

/// Set a dot-separated key on `config`
fn apply_value(config: &mut Config, key: &str, value: &str) -> GatewayResult<()> {
    let parts: Vec<&str> = key.split('.').collect();

    match parts.as_slice() {
        ["general", "log_format"] => config.general.log_format = parse_log_format(value)?,
        ["general", "audit_log"] => config.general.audit_log = parse_bool(value)?,

        ["jenkins", "url"] => config.jenkins.url = optional(value),
        ["jenkins", "user"] => config.jenkins.user = optional(value),
        ["jenkins", "api_token"] => config.jenkins.api_token = optional(value),
        ["jenkins", "timeout_secs"] => config.jenkins.timeout_secs = parse_num(value)?,

        ["cache", "enabled"] => config.cache.enabled = parse_bool(value)?,
        ["cache", "capacity"] => config.cache.capacity = parse_num(value)?,
        ["cache", "listing_ttl_secs"] => config.cache.listing_ttl_secs = parse_num(value)?,
        ["cache", "builds_ttl_secs"] => config.cache.builds_ttl_secs = parse_num(value)?,
        ["cache", "status_ttl_secs"] => config.cache.status_ttl_secs = parse_num(value)?,

        ["retry", "min_delay_ms"] => config.retry.min_delay_ms = parse_num(value)?,
        ["retry", "max_delay_ms"] => config.retry.max_delay_ms = parse_num(value)?,
        ["retry", "metadata_attempts"] => config.retry.metadata_attempts = parse_num(value)?,
        ["retry", "console_attempts"] => config.retry.console_attempts = parse_num(value)?,
        ["retry", "mutation_attempts"] => config.retry.mutation_attempts = parse_num(value)?,

        ["rate_limit", "enabled"] => config.rate_limit.enabled = parse_bool(value)?,
        ["rate_limit", "requests_per_second"] => {
            config.rate_limit.requests_per_second = parse_num(value)?
        }
        ["rate_limit", "burst"] => config.rate_limit.burst = parse_num(value)?,

        ["gateway", "max_builds"] => config.gateway.max_builds = parse_num(value)?,
        ["gateway", "fetch_concurrency"] => config.gateway.fetch_concurrency = parse_num(value)?,
        ["gateway", "log_head_lines"] => config.gateway.log_head_lines = parse_num(value)?,
        ["gateway", "log_max_hits"] => config.gateway.log_max_hits = parse_num(value)?,

        _ => {
            return Err(GatewayError::User(format!(
                "Unknown config key: {}. Valid keys: {}",
                key,
                VALID_KEYS.join(", ")
            )))
        }
    }

    Ok(())
}

const VALID_KEYS: &[&str] = &[
    "general.log_format",
    "general.audit_log",
    "jenkins.url",
    "jenkins.user",
    "jenkins.api_token",
    "jenkins.timeout_secs",
    "cache.enabled",
    "cache.capacity",
    "cache.listing_ttl_secs",
    "cache.builds_ttl_secs",
    "cache.status_ttl_secs",
    "retry.min_delay_ms",
    "retry.max_delay_ms",
    "retry.metadata_attempts",
    "retry.console_attempts",
    "retry.mutation_attempts",
    "rate_limit.enabled",
    "rate_limit.requests_per_second",
    "rate_limit.burst",
    "gateway.max_builds",
    "gateway.fetch_concurrency",
    "gateway.log_head_lines",
    "gateway.log_max_hits",
];

/// Empty string unsets an optional value
fn optional(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

fn parse_bool(value: &str) -> GatewayResult<bool> {
    match value.to_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" => Ok(false),
        _ => Err(GatewayError::User(format!(
            "Invalid boolean value: {}. Use true/false",
            value
        ))),
    }
}

fn parse_num<T: std::str::FromStr>(value: &str) -> GatewayResult<T> {
    value
        .trim()
        .parse()
        .map_err(|_| GatewayError::User(format!("Invalid number: {}", value)))
}

fn parse_log_format(value: &str) -> GatewayResult<String> {
    match value {
        "text" | "json" => Ok(value.to_string()),
        _ => Err(GatewayError::User(format!(
            "Invalid log format: {}. Use text or json",
            value
        ))),
    }
}
