//! Status command - show the status of one build

use super::{connect, print_json, ui_context};
use crate::build_ref::BuildOrigin;
use crate::cli::args::{BuildArgs, OutputFormat};
use crate::config::Config;
use crate::error::GatewayResult;
use crate::gateway::BuildStatus;
use crate::ui::{self, UiContext};
use std::time::Duration;

/// Execute the status command
pub async fn execute(args: BuildArgs, config: &Config) -> GatewayResult<()> {
    let ctx = ui_context(args.format);
    let gateway = connect(config)?;

    let status = ui::with_spinner(
        &ctx,
        &format!("Resolving {} of {}...", args.build, args.job),
        "Failed to fetch build status",
        gateway.get_build_status(&args.job, &args.build),
    )
    .await?;

    match args.format {
        OutputFormat::Json => print_json(&status)?,
        OutputFormat::Plain => println!(
            "{} {}",
            status.value.build.number,
            status.value.build.result_label()
        ),
        OutputFormat::Table => {
            ui::heading(
                &ctx,
                &format!("{} #{}", status.value.job_path, status.value.build.number),
                Some(status.source),
            );
            print_details(&ctx, &status.value);
        }
    }

    Ok(())
}

/// Field rendering shared with the watch command
pub(crate) fn print_details(ctx: &UiContext, status: &BuildStatus) {
    let build = &status.build;

    if let BuildOrigin::Keyword(keyword) = status.origin {
        ui::field(ctx, "Resolved from", &keyword.to_string());
    }
    ui::field(ctx, "Result", &ui::result_style(build.result_label()).to_string());
    if let Some(started) = build.started_at() {
        ui::field(ctx, "Started", &started.format("%Y-%m-%d %H:%M:%S UTC").to_string());
    }
    if build.building {
        if let Some(estimate) = build.estimated_duration.filter(|ms| *ms > 0) {
            ui::field(
                ctx,
                "Estimated",
                &ui::format_duration(Duration::from_millis(estimate.unsigned_abs())),
            );
        }
    } else {
        ui::field(
            ctx,
            "Duration",
            &ui::format_duration(Duration::from_millis(build.duration)),
        );
    }
    if let Some(description) = build.description.as_deref().filter(|d| !d.is_empty()) {
        ui::field(ctx, "Description", description);
    }
    ui::field(ctx, "URL", &build.url);
}
