//! Log command - summarize a build's console output

use super::{connect, print_json, ui_context};
use crate::cli::args::{BuildArgs, OutputFormat};
use crate::config::Config;
use crate::error::GatewayResult;
use crate::logs::LineHit;
use crate::ui::{self, UiContext};
use console::style;

/// Execute the log command
pub async fn execute(args: BuildArgs, config: &Config) -> GatewayResult<()> {
    let ctx = ui_context(args.format);
    let gateway = connect(config)?;

    let digest = ui::with_spinner(
        &ctx,
        &format!("Fetching console of {} {}...", args.job, args.build),
        "Failed to fetch console output",
        gateway.get_build_log(&args.job, &args.build),
    )
    .await?;

    let summary = &digest.summary;
    match args.format {
        OutputFormat::Json => print_json(&digest)?,
        OutputFormat::Plain => println!("{}", summary.overall_guess),
        OutputFormat::Table => {
            ui::heading(&ctx, &format!("{} #{}", digest.job_path, digest.number), None);
            let guess = summary.overall_guess.to_string();
            ui::field(&ctx, "Outcome", &ui::result_style(&guess).to_string());
            ui::field(&ctx, "Lines", &summary.total_lines.to_string());

            ui::section(&ctx, "Head");
            for line in &summary.head_lines {
                println!("  {}", style(line).dim());
            }

            print_hits(&ctx, "Errors", &summary.error_hits);
            print_hits(&ctx, "Success markers", &summary.success_hits);

            println!();
            ui::note(&ctx, &format!("Full log: {}", digest.console_url));
        }
    }

    Ok(())
}

fn print_hits(ctx: &UiContext, title: &str, hits: &[LineHit]) {
    if hits.is_empty() {
        return;
    }
    ui::section(ctx, title);
    for hit in hits {
        println!("  {:>6}: {}", style(hit.line).dim(), hit.content);
    }
}
