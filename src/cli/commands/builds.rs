//! Builds command - list recent builds of a job

use super::{connect, print_json, ui_context};
use crate::cli::args::{BuildsArgs, OutputFormat};
use crate::config::Config;
use crate::error::GatewayResult;
use crate::remote::BuildMetadata;
use crate::ui;
use console::style;
use std::time::Duration;

/// Execute the builds command
pub async fn execute(args: BuildsArgs, config: &Config) -> GatewayResult<()> {
    let ctx = ui_context(args.format);
    let gateway = connect(config)?;

    let builds = ui::with_spinner(
        &ctx,
        &format!("Fetching builds of {}...", args.job),
        "Failed to fetch builds",
        gateway.list_builds(&args.job),
    )
    .await?;

    match args.format {
        OutputFormat::Json => print_json(&builds)?,
        OutputFormat::Plain => {
            for build in &builds.value {
                println!("{} {}", build.number, build.result_label());
            }
        }
        OutputFormat::Table => {
            if builds.value.is_empty() {
                ui::info(&ctx, &format!("{} has no builds", args.job));
                return Ok(());
            }
            ui::heading(&ctx, &format!("Builds of {}", args.job), Some(builds.source));
            print_table(&builds.value);
            println!();
            println!("{} build(s)", builds.value.len());
        }
    }

    Ok(())
}

fn print_table(builds: &[BuildMetadata]) {
    println!(
        "{:<8} {:<10} {:<18} {:<10}",
        style("NUMBER").bold(),
        style("RESULT").bold(),
        style("STARTED").bold(),
        style("DURATION").bold()
    );
    println!("{}", "-".repeat(50));

    for build in builds {
        let started = build
            .started_at()
            .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|| "-".to_string());
        let duration = if build.building {
            "-".to_string()
        } else {
            ui::format_duration(Duration::from_millis(build.duration))
        };

        println!(
            "{:<8} {:<10} {:<18} {:<10}",
            format!("#{}", build.number),
            ui::result_style(build.result_label()),
            started,
            duration
        );
    }
}
