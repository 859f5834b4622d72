//! Trigger command - queue a build

use super::{connect, print_json, ui_context};
use crate::cli::args::{OutputFormat, TriggerArgs};
use crate::config::Config;
use crate::error::GatewayResult;
use crate::ui;
use std::collections::BTreeMap;

/// Execute the trigger command
pub async fn execute(args: TriggerArgs, config: &Config) -> GatewayResult<()> {
    let ctx = ui_context(args.format);
    let gateway = connect(config)?;
    // Later duplicates win, as with repeated shell assignments
    let parameters: BTreeMap<String, String> = args.params.into_iter().collect();

    let triggered = ui::with_spinner(
        &ctx,
        &format!("Queueing {}...", args.job),
        "Failed to queue build",
        gateway.trigger_build(&args.job, parameters),
    )
    .await?;

    match args.format {
        OutputFormat::Json => print_json(&triggered)?,
        OutputFormat::Plain => {
            if let Some(id) = triggered.queue.id {
                println!("{}", id);
            }
        }
        OutputFormat::Table => {
            let detail = triggered
                .queue
                .id
                .map(|id| format!("queue item {}", id))
                .unwrap_or_else(|| "queued".to_string());
            ui::success(
                &ctx,
                &format!("Triggered {}", triggered.job_path),
                Some(&detail),
            );
            for (name, value) in &triggered.parameters {
                ui::field(&ctx, name, value);
            }
            if let Some(url) = &triggered.queue.url {
                ui::note(&ctx, &format!("Queue: {}", url));
            }
        }
    }

    Ok(())
}
