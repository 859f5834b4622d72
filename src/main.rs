//! Jenkins gateway CLI
//!
//! CLI entry point that dispatches to subcommands.

use clap::Parser;
use console::style;
use jenkins_gateway::cli::{commands, Cli, Commands};
use jenkins_gateway::config::ConfigManager;
use jenkins_gateway::error::GatewayResult;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {}", style("Error:").red().bold(), e);
            if let Some(hint) = e.hint() {
                eprintln!("{} {}", style("Hint:").yellow(), hint);
            }
            ExitCode::FAILURE
        }
    }
}

async fn run() -> GatewayResult<()> {
    let cli = Cli::parse();

    // Completions need neither config nor logging
    if let Commands::Completions(args) = cli.command {
        return commands::completions(args);
    }

    let config_manager = match cli.config {
        Some(ref path) => ConfigManager::with_path(path.clone()),
        None => ConfigManager::new(),
    };
    let config = config_manager.load().await?;

    init_logging(cli.verbose, &config.general.log_format);

    match cli.command {
        Commands::Completions(_) => unreachable!("Completions handled above"),
        Commands::Jobs(args) => commands::jobs(args, &config).await,
        Commands::Builds(args) => commands::builds(args, &config).await,
        Commands::Status(args) => commands::status(args, &config).await,
        Commands::Log(args) => commands::log(args, &config).await,
        Commands::Watch(args) => commands::watch(args, &config).await,
        Commands::Trigger(args) => commands::trigger(args, &config).await,
        Commands::Create(args) => commands::create(args, &config).await,
        Commands::Delete(args) => commands::delete(args, &config).await,
        Commands::Health(args) => commands::health(args, &config).await,
        Commands::Config(args) => commands::config(args, &config_manager, &config).await,
    }
}

/// 0 = warn, 1 = info, 2+ = debug; logs go to stderr
fn init_logging(verbose: u8, log_format: &str) {
    let filter = match verbose {
        0 => EnvFilter::new("jenkins_gateway=warn"),
        1 => EnvFilter::new("jenkins_gateway=info"),
        _ => EnvFilter::new("jenkins_gateway=debug"),
    };

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false);

    if log_format == "json" {
        builder.json().init();
    } else {
        builder.without_time().init();
    }
}
