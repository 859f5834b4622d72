//! Health command - check connectivity and credentials

use super::{connect, print_json, ui_context};
use crate::cache::CacheStats;
use crate::cli::args::{HealthArgs, OutputFormat};
use crate::config::Config;
use crate::error::GatewayResult;
use crate::ui::{self, UiContext};

/// Execute the health command
pub async fn execute(args: HealthArgs, config: &Config) -> GatewayResult<()> {
    let ctx = ui_context(args.format);
    let gateway = connect(config)?;

    let report = ui::with_spinner(
        &ctx,
        "Contacting Jenkins...",
        "Jenkins is not reachable",
        gateway.health(),
    )
    .await?;

    match args.format {
        OutputFormat::Json => print_json(&report)?,
        OutputFormat::Plain => println!("{}", report.remote_user),
        OutputFormat::Table => {
            ui::heading(&ctx, "Jenkins gateway health", None);
            ui::check(&ctx, "Server", config.jenkins.url.as_deref().unwrap_or("-"), true);
            ui::check(&ctx, "User", &report.remote_user, true);
            ui::check(
                &ctx,
                "Cache",
                if config.cache.enabled { "enabled" } else { "disabled" },
                config.cache.enabled,
            );
            ui::check(
                &ctx,
                "Rate limit",
                &rate_limit_label(config),
                config.rate_limit.enabled,
            );

            ui::section(&ctx, "Cache scopes");
            print_scope(&ctx, "listings", &report.cache.listings);
            print_scope(&ctx, "builds", &report.cache.builds);
            print_scope(&ctx, "status", &report.cache.status);
        }
    }

    Ok(())
}

fn rate_limit_label(config: &Config) -> String {
    if config.rate_limit.enabled {
        format!(
            "{}/s (burst {})",
            config.rate_limit.requests_per_second, config.rate_limit.burst
        )
    } else {
        "disabled".to_string()
    }
}

fn print_scope(ctx: &UiContext, name: &str, stats: &CacheStats) {
    ui::field(
        ctx,
        name,
        &format!(
            "{}/{} entries, {} hits, {} misses",
            stats.entries, stats.capacity, stats.hits, stats.misses
        ),
    );
}
