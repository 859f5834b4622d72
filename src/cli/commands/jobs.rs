//! Jobs command - list jobs and folders

use super::{connect, print_json, ui_context};
use crate::cli::args::{JobsArgs, OutputFormat};
use crate::config::Config;
use crate::error::GatewayResult;
use crate::remote::CatalogItem;
use crate::ui;
use console::style;

/// Execute the jobs command
pub async fn execute(args: JobsArgs, config: &Config) -> GatewayResult<()> {
    let ctx = ui_context(args.format);
    let gateway = connect(config)?;

    let listing = ui::with_spinner(
        &ctx,
        "Fetching jobs from Jenkins...",
        "Failed to fetch jobs",
        gateway.list_jobs(args.folder.as_deref(), args.recursive),
    )
    .await?;

    match args.format {
        OutputFormat::Json => print_json(&listing)?,
        OutputFormat::Plain => {
            for item in &listing.value {
                println!("{}", item.full_path);
            }
        }
        OutputFormat::Table => {
            let scope = args.folder.as_deref().unwrap_or("the root");
            if listing.value.is_empty() {
                ui::info(&ctx, &format!("No jobs found in {}", scope));
                return Ok(());
            }
            ui::heading(&ctx, &format!("Jobs in {}", scope), Some(listing.source));
            print_table(&listing.value);
            println!();
            println!("{} item(s)", listing.value.len());
        }
    }

    Ok(())
}

fn print_table(items: &[CatalogItem]) {
    println!(
        "{:<50} {:<8} {}",
        style("PATH").bold(),
        style("TYPE").bold(),
        style("URL").bold()
    );
    println!("{}", "-".repeat(100));

    for item in items {
        let kind = if item.is_folder {
            style("folder").blue()
        } else {
            style("job").green()
        };
        println!("{:<50} {:<8} {}", item.full_path, kind, style(&item.url).dim());
    }
}
