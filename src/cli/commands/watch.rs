//! Watch command - poll a build until it finishes
//!
//! The build token is resolved once; later polls use the concrete number so
//! a newer build starting meanwhile does not switch the target.

use super::connect;
use super::status::print_details;
use crate::cli::args::WatchArgs;
use crate::config::Config;
use crate::error::{GatewayError, GatewayResult};
use crate::ui::{self, TaskSpinner, UiContext};
use std::time::{Duration, Instant};
use tracing::debug;

/// Execute the watch command
pub async fn execute(args: WatchArgs, config: &Config) -> GatewayResult<()> {
    let ctx = UiContext::detect();
    let gateway = connect(config)?;
    let interval = Duration::from_secs(args.interval.max(1));
    let deadline = deadline_after(Instant::now(), args.timeout);

    let mut status = gateway.get_build_status(&args.job, &args.build).await?.value;
    let number = status.build.number;
    let label = format!("{} #{}", status.job_path, number);

    let mut spinner = TaskSpinner::new(&ctx);
    if status.build.building {
        spinner.start(&format!("Waiting for {}...", label));
    }

    let started = Instant::now();
    while status.build.building {
        if deadline.is_some_and(|d| Instant::now() >= d) {
            spinner.fail(&format!("{} still running", label));
            return Err(GatewayError::User(format!(
                "Timed out after {}s waiting for {}",
                args.timeout, label
            )));
        }

        tokio::time::sleep(interval).await;
        status = gateway
            .get_build_status(&status.job_path, &number.to_string())
            .await?
            .value;
        debug!("Polled {}: building={}", label, status.build.building);
        spinner.update(&format!(
            "Waiting for {} ({} elapsed)...",
            label,
            ui::format_duration(started.elapsed())
        ));
    }

    let result = status.build.result_label().to_string();
    spinner.succeed(&format!("{} finished: {}", label, result));
    ui::heading(&ctx, &label, None);
    print_details(&ctx, &status);

    if args.exit_status && result != "SUCCESS" {
        return Err(GatewayError::User(format!(
            "{} finished with {}",
            label, result
        )));
    }
    Ok(())
}

/// When to give up; zero or an unrepresentable timeout means never
fn deadline_after(start: Instant, timeout_secs: u64) -> Option<Instant> {
    if timeout_secs == 0 {
        return None;
    }
    start.checked_add(Duration::from_secs(timeout_secs))
}
